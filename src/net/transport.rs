// src/net/transport.rs
// =============================================================================
// This module is the only place that talks HTTP.
//
// Key functionality:
// - A Transport trait with the two requests the crawler needs:
//     GET a page (optionally with session cookies)
//     POST the login form without following the redirect
// - ReqwestTransport, the real implementation on top of reqwest
// - Mapping reqwest errors onto our FetchError kinds (timeout, status, other)
//
// Why a trait?
// - The crawler logic can be tested with canned HTML pages
// - Tests can record when each request starts and ends
//
// Rust concepts:
// - async_trait: Lets a trait have async methods and still be used as
//   Arc<dyn Transport>
// - Send + Sync: The transport is shared between concurrent futures
// =============================================================================

use crate::error::FetchError;
use crate::models::Session;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, COOKIE};
use reqwest::redirect::Policy;
use reqwest::Client;
use std::time::Duration;

/// Browser-like user agent sent with every request.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// A response as the crawler sees it: status, body and cookies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
    pub cookies: Vec<(String, String)>,
}

impl HttpResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
            cookies: Vec::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_redirect(&self) -> bool {
        (300..400).contains(&self.status)
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    // GET `url`, sending the session cookies if there is a session
    async fn get(&self, url: &str, session: Option<&Session>) -> Result<HttpResponse, FetchError>;

    // POST a url-encoded form and return the first response (no redirects)
    async fn post_form(
        &self,
        url: &str,
        form: &[(&str, &str)],
    ) -> Result<HttpResponse, FetchError>;
}

// GET a page and insist on a 2xx status
//
// This is what every page fetch in the crawler uses: anything other than a
// success becomes FetchError::Status.
pub async fn fetch_html(
    transport: &dyn Transport,
    url: &str,
    session: Option<&Session>,
) -> Result<String, FetchError> {
    let response = transport.get(url, session).await?;
    if !response.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: response.status,
        });
    }
    Ok(response.body)
}

/// The production transport, backed by two reqwest clients.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    // Follows redirects, used for page fetches
    pages: Client,
    // Never follows redirects, so login can see the 302
    forms: Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, reqwest::Error> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("*/*"));

        let pages = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .default_headers(headers.clone())
            .redirect(Policy::limited(5))
            .build()?;

        let forms = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .default_headers(headers)
            .redirect(Policy::none())
            .build()?;

        Ok(Self { pages, forms })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, url: &str, session: Option<&Session>) -> Result<HttpResponse, FetchError> {
        let mut request = self.pages.get(url);
        if let Some(cookie) = session.and_then(Session::cookie_header) {
            request = request.header(COOKIE, cookie);
        }

        let response = request.send().await.map_err(|e| categorize_error(url, e))?;
        read_response(url, response).await
    }

    async fn post_form(
        &self,
        url: &str,
        form: &[(&str, &str)],
    ) -> Result<HttpResponse, FetchError> {
        let response = self
            .forms
            .post(url)
            .form(form)
            .send()
            .await
            .map_err(|e| categorize_error(url, e))?;
        read_response(url, response).await
    }
}

async fn read_response(url: &str, response: reqwest::Response) -> Result<HttpResponse, FetchError> {
    let status = response.status().as_u16();
    let cookies = response
        .cookies()
        .map(|c| (c.name().to_string(), c.value().to_string()))
        .collect();
    let body = response.text().await.map_err(|e| categorize_error(url, e))?;

    Ok(HttpResponse {
        status,
        body,
        cookies,
    })
}

// Maps a reqwest error onto one of our FetchError kinds
//
// reqwest errors can happen for many reasons:
// - Network timeout
// - Connection refused / DNS failure
// - Body decoding problems
// We only care whether it was a timeout; everything else is "network".
fn categorize_error(url: &str, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else if let Some(status) = error.status() {
        FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        }
    } else {
        FetchError::Network {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}
