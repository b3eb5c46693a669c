// src/net/session.rs
// =============================================================================
// Logging in to the site.
//
// The login form answers a correct username/password with a redirect
// (HTTP 302) that sets the session cookies. A wrong password re-renders the
// form with HTTP 200. So:
// - redirect  -> success, keep the cookies
// - anything else -> AuthError
//
// There is no retry: a rejected login will be rejected again.
// =============================================================================

use crate::error::{AuthError, FetchError};
use crate::models::{Credentials, Session};
use crate::net::Transport;
use tracing::{debug, error, info};
use url::Url;

/// Path of the login form, relative to the site root.
pub const LOGIN_PATH: &str = "/auth/login";

// Posts the login form and returns the captured session
pub async fn login(
    transport: &dyn Transport,
    base: &Url,
    credentials: &Credentials,
) -> Result<Session, AuthError> {
    let url = base
        .join(LOGIN_PATH)
        .map_err(|e| FetchError::Network {
            url: base.to_string(),
            message: e.to_string(),
        })?
        .to_string();

    info!("🔑 Logging in as {}", credentials.username);

    let form = [
        ("returnTo", ""),
        ("forceUser", "0"),
        ("username", credentials.username.as_str()),
        ("password", credentials.password.as_str()),
    ];

    let response = transport.post_form(&url, &form).await.map_err(|e| {
        error!("❌ Login request failed: {}", e);
        AuthError::from(e)
    })?;

    if !response.is_redirect() {
        error!("❌ Login rejected, status {}", response.status);
        return Err(AuthError::Rejected {
            status: response.status,
        });
    }

    for (name, _) in &response.cookies {
        debug!("Session cookie: {}", name);
    }
    info!("✅ Logged in ({} cookie(s))", response.cookies.len());

    Ok(Session::new(response.cookies))
}
