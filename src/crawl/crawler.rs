// src/crawl/crawler.rs
// =============================================================================
// The crawl itself: login, pagination, listing pages, detail pages.
//
// How a crawl runs:
// 1. Log in (if asked to and credentials are configured)
// 2. Read page 1 to find out how many listing pages there are
// 3. Read listing pages 1..=N in order, with a pause between pages
// 4. Fetch every detail page concurrently (bounded by the Throttle),
//    searching contact pages when a detail page has no email
// 5. Re-check each record and return the survivors in listing order
//
// Failures are local: a page that can't be fetched contributes nothing, a
// detail that can't be fetched is dropped. Only a failed login (with the
// Abort policy) or an unbuildable HTTP client ends the crawl with an error.
//
// Cancelling the crawler's token stops it at the next await point, even in
// the middle of a fetch or a pause. What was collected so far is returned.
//
// Rust concepts:
// - Arc<dyn Transport>: the crawler doesn't know (or care) whether it talks
//   to the real site or to a test double
// - futures::stream::buffered: run N futures at once but yield results in
//   the original order
// =============================================================================

use super::summary::{CrawlReport, CrawlSummary};
use crate::config::{CrawlerConfig, LoginFailurePolicy};
use crate::error::{AuthError, CrawlError, FetchError};
use crate::extract::{parse_detail, parse_listing, parse_total_pages, passes_recheck, ListingPage};
use crate::models::{BasicRecord, Credentials, DetailedRecord, ListingQuery, Session};
use crate::net::{fetch_html, login, ReqwestTransport, Throttle, Transport};
use crate::rules::first_valid_email;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

// What became of one listing record
enum DetailOutcome {
    Kept(DetailedRecord),
    Rejected,
    Failed,
    Skipped,
}

pub struct Crawler {
    config: CrawlerConfig,
    query: ListingQuery,
    transport: Arc<dyn Transport>,
    throttle: Throttle,
    session: Option<Session>,
    cancel: CancellationToken,
}

impl Crawler {
    // A crawler talking to the real site
    pub fn new(config: CrawlerConfig) -> Result<Self, CrawlError> {
        let transport = ReqwestTransport::new(config.request_timeout, &config.user_agent)
            .map_err(|e| CrawlError::Client(e.to_string()))?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    pub fn with_transport(config: CrawlerConfig, transport: Arc<dyn Transport>) -> Self {
        let query = config.query();
        let throttle = config.throttle();
        Self {
            config,
            query,
            transport,
            throttle,
            session: None,
            cancel: CancellationToken::new(),
        }
    }

    // Replaces the throttle built from the config
    pub fn with_throttle(mut self, throttle: Throttle) -> Self {
        self.throttle = throttle;
        self
    }

    pub fn config(&self) -> &CrawlerConfig {
        &self.config
    }

    pub fn query(&self) -> &ListingQuery {
        &self.query
    }

    // A handle on the crawl's token; cancelling it stops the crawl
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn is_logged_in(&self) -> bool {
        self.session.is_some()
    }

    // Logs in with the configured credentials
    //
    // Returns false (and stays anonymous) when there are no credentials or
    // the site rejects them.
    pub async fn authenticate(&mut self) -> bool {
        match self.config.credentials.clone() {
            Some(credentials) => self.login_with(credentials).await.is_ok(),
            None => {
                info!("No credentials configured, staying anonymous");
                false
            }
        }
    }

    async fn login_with(&mut self, credentials: Credentials) -> Result<(), AuthError> {
        let transport = Arc::clone(&self.transport);
        let base = self.config.base_url.clone();
        let timeout = self.config.request_timeout;

        let session = self
            .throttle
            .run(&self.cancel, move || async move {
                match tokio::time::timeout(timeout, login(transport.as_ref(), &base, &credentials))
                    .await
                {
                    Ok(result) => result,
                    Err(_) => Err(AuthError::Transport(FetchError::Timeout {
                        url: base.to_string(),
                    })),
                }
            })
            .await
            .ok_or_else(|| FetchError::Cancelled {
                url: self.config.base_url.to_string(),
            })??;

        self.session = Some(session);
        Ok(())
    }

    // GET a page under the throttle, with the session if we have one
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let timeout = self.config.request_timeout;
        let session = self.session.as_ref();
        let transport = self.transport.as_ref();

        self.throttle
            .run(&self.cancel, move || async move {
                match tokio::time::timeout(timeout, fetch_html(transport, url, session)).await {
                    Ok(result) => result,
                    Err(_) => Err(FetchError::Timeout {
                        url: url.to_string(),
                    }),
                }
            })
            .await
            .unwrap_or_else(|| {
                Err(FetchError::Cancelled {
                    url: url.to_string(),
                })
            })
    }

    fn page_url(&self, page: u32) -> Option<String> {
        match self.query.page_url(&self.config.base_url, page) {
            Ok(url) => Some(url.to_string()),
            Err(e) => {
                error!("Cannot build the URL of listing page {}: {}", page, e);
                None
            }
        }
    }

    // Number of listing pages for the query (at least 1)
    pub async fn get_total_pages(&self) -> u32 {
        let Some(url) = self.page_url(1) else {
            return 1;
        };

        match self.fetch(&url).await {
            Ok(html) => parse_total_pages(&html),
            Err(e) => {
                warn!("⚠️ Could not read pagination, assuming 1 page: {}", e);
                1
            }
        }
    }

    // The records on one listing page (empty if the page can't be read)
    pub async fn extract_page(&self, page: u32) -> Vec<BasicRecord> {
        self.listing_page(page)
            .await
            .map(|listing| listing.records)
            .unwrap_or_default()
    }

    async fn listing_page(&self, page: u32) -> Option<ListingPage> {
        let url = self.page_url(page)?;
        match self.fetch(&url).await {
            Ok(html) => Some(parse_listing(
                &html,
                &self.config.base_url,
                &self.config.excluded_school_markers,
            )),
            Err(e) => {
                warn!("⚠️ Listing page {} failed: {}", page, e);
                None
            }
        }
    }

    // One listing record, enriched from its detail page
    //
    // None when the page can't be fetched or the record fails the re-check.
    pub async fn extract_detail(&self, basic: BasicRecord) -> Option<DetailedRecord> {
        match self.detail_outcome(basic).await {
            DetailOutcome::Kept(record) => Some(record),
            _ => None,
        }
    }

    async fn detail_outcome(&self, basic: BasicRecord) -> DetailOutcome {
        let html = match self.fetch(&basic.url).await {
            Ok(html) => html,
            Err(FetchError::Cancelled { .. }) => return DetailOutcome::Skipped,
            Err(e) => {
                warn!("⚠️ Detail page failed: {}", e);
                return DetailOutcome::Failed;
            }
        };

        let page = parse_detail(&html, basic);
        let mut record = page.record;
        if record.contact_email.is_none() && !page.contact_links.is_empty() {
            record.contact_email = self.search_contact_pages(&page.contact_links).await;
        }

        if passes_recheck(&record, &self.config.excluded_school_markers) {
            DetailOutcome::Kept(record)
        } else {
            DetailOutcome::Rejected
        }
    }

    // First valid email on any of the given pages, tried in order
    async fn search_contact_pages(&self, links: &[String]) -> Option<String> {
        for link in links {
            debug!("Looking for an email on {}", link);
            match self.fetch(link).await {
                Ok(body) => {
                    if let Some(email) = first_valid_email(&body) {
                        debug!("Email found on contact page: {}", email);
                        return Some(email);
                    }
                }
                Err(FetchError::Cancelled { .. }) => break,
                Err(e) => debug!("Contact page skipped: {}", e),
            }
        }
        None
    }

    // Runs a whole crawl and returns the records
    //
    // max_pages overrides the configured page limit; zero or less means
    // "nothing to do" and no request is made.
    pub async fn fetch_all(
        &mut self,
        max_pages: Option<i32>,
        login_first: bool,
    ) -> Result<Vec<DetailedRecord>, CrawlError> {
        let report = self.fetch_all_with_summary(max_pages, login_first).await?;
        Ok(report.records)
    }

    pub async fn fetch_all_with_summary(
        &mut self,
        max_pages: Option<i32>,
        login_first: bool,
    ) -> Result<CrawlReport, CrawlError> {
        let max_pages = max_pages.or(self.query.max_pages);
        if let Some(limit) = max_pages.filter(|limit| *limit <= 0) {
            info!("Page limit is {}, nothing to crawl", limit);
            return Ok(CrawlReport::default());
        }

        if login_first {
            match self.config.credentials.clone() {
                Some(credentials) => {
                    if let Err(e) = self.login_with(credentials).await {
                        if self.cancel.is_cancelled() {
                            warn!("Crawl cancelled during login");
                            return Ok(CrawlReport {
                                records: Vec::new(),
                                summary: CrawlSummary {
                                    stopped_early: true,
                                    ..CrawlSummary::default()
                                },
                            });
                        }
                        match self.config.login_failure {
                            LoginFailurePolicy::Abort => return Err(CrawlError::Auth(e)),
                            LoginFailurePolicy::ContinueUnauthenticated => {
                                warn!("Continuing without a session: {}", e)
                            }
                        }
                    }
                }
                None => info!("No credentials, crawling public listings only"),
            }
        }

        let mut summary = CrawlSummary::default();
        let basics = self.collect_listings(max_pages, &mut summary).await;
        info!("📊 {} offer(s) on the listing pages", basics.len());

        let records = self.collect_details(basics, &mut summary).await;
        summary.count_records(&records);
        summary.stopped_early = self.cancel.is_cancelled();

        if records.is_empty() {
            info!("No offers found");
        } else {
            info!(
                "🎯 {} offer(s), {} with a contact email",
                summary.records, summary.records_with_email
            );
        }

        Ok(CrawlReport { records, summary })
    }

    fn limit_reached(&self, collected: usize) -> bool {
        self.config
            .max_offers
            .is_some_and(|limit| collected >= limit)
    }

    async fn collect_listings(
        &self,
        max_pages: Option<i32>,
        summary: &mut CrawlSummary,
    ) -> Vec<BasicRecord> {
        if self.cancel.is_cancelled() {
            return Vec::new();
        }

        let total = self.get_total_pages().await;
        let pages = match max_pages {
            Some(limit) => u32::try_from(limit).map_or(total, |limit| total.min(limit)),
            None => total,
        };
        summary.pages_planned = pages;
        info!("📚 {} listing page(s) available, reading {}", total, pages);

        let mut basics = Vec::new();
        for page in 1..=pages {
            if self.cancel.is_cancelled() {
                warn!("Crawl cancelled, skipping the remaining listing pages");
                break;
            }
            if self.limit_reached(basics.len()) {
                info!("Offer limit reached after {} page(s)", page - 1);
                break;
            }

            match self.listing_page(page).await {
                Some(listing) => {
                    summary.rows_malformed += listing.malformed;
                    summary.rows_excluded += listing.excluded;
                    if listing.records.is_empty() {
                        warn!("⚠️ Page {}/{}: no offers", page, pages);
                        summary.pages_empty += 1;
                    } else {
                        info!("✅ Page {}/{}: {} offer(s)", page, pages, listing.records.len());
                    }
                    basics.extend(listing.records);
                }
                None if self.cancel.is_cancelled() => break,
                None => summary.pages_empty += 1,
            }

            if page < pages {
                self.throttle.page_pause(&self.cancel).await;
            }
        }

        if let Some(limit) = self.config.max_offers {
            basics.truncate(limit);
        }
        basics
    }

    async fn collect_details(
        &self,
        basics: Vec<BasicRecord>,
        summary: &mut CrawlSummary,
    ) -> Vec<DetailedRecord> {
        if basics.is_empty() {
            return Vec::new();
        }

        info!("🔍 Fetching {} detail page(s)...", basics.len());
        let width = self.config.max_concurrent_workers.max(1);

        let outcomes: Vec<DetailOutcome> = stream::iter(basics)
            .map(|basic| self.detail_outcome(basic))
            .buffered(width)
            .collect()
            .await;

        let mut records = Vec::new();
        for outcome in outcomes {
            match outcome {
                DetailOutcome::Kept(record) => records.push(record),
                DetailOutcome::Rejected => summary.details_rejected += 1,
                DetailOutcome::Failed => summary.details_failed += 1,
                DetailOutcome::Skipped => {}
            }
        }
        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::{DelayPolicy, HttpResponse, Jitter};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::{Duration, Instant};

    const BASE: &str = "https://www.educationposts.ie";

    #[derive(Debug, Clone)]
    struct Request {
        url: String,
        cookie: Option<String>,
        started: Instant,
        finished: Instant,
    }

    // An in-memory copy of the site
    struct FakeSite {
        pages: HashMap<String, HttpResponse>,
        login_status: u16,
        latency: Duration,
        requests: Mutex<Vec<Request>>,
        posts: AtomicUsize,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    impl FakeSite {
        fn new() -> Self {
            Self {
                pages: HashMap::new(),
                login_status: 302,
                latency: Duration::from_millis(5),
                requests: Mutex::new(Vec::new()),
                posts: AtomicUsize::new(0),
                in_flight: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
            }
        }

        fn page(mut self, url: impl Into<String>, body: impl Into<String>) -> Self {
            self.pages.insert(url.into(), HttpResponse::ok(body));
            self
        }

        fn requests(&self) -> Vec<Request> {
            self.requests.lock().unwrap().clone()
        }

        fn urls(&self) -> Vec<String> {
            self.requests().into_iter().map(|r| r.url).collect()
        }
    }

    #[async_trait]
    impl Transport for FakeSite {
        async fn get(&self, url: &str, session: Option<&Session>) -> Result<HttpResponse, FetchError> {
            let started = Instant::now();
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(self.latency).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            self.requests.lock().unwrap().push(Request {
                url: url.to_string(),
                cookie: session.and_then(Session::cookie_header),
                started,
                finished: Instant::now(),
            });

            Ok(self.pages.get(url).cloned().unwrap_or(HttpResponse {
                status: 404,
                ..Default::default()
            }))
        }

        async fn post_form(&self, _: &str, _: &[(&str, &str)]) -> Result<HttpResponse, FetchError> {
            self.posts.fetch_add(1, Ordering::SeqCst);
            Ok(HttpResponse {
                status: self.login_status,
                body: String::new(),
                cookies: vec![("sid".to_string(), "abc".to_string())],
            })
        }
    }

    fn config() -> CrawlerConfig {
        CrawlerConfig::default()
    }

    fn listing_url(config: &CrawlerConfig, page: u32) -> String {
        config
            .query()
            .page_url(&config.base_url, page)
            .unwrap()
            .to_string()
    }

    fn row(id: u32, school: &str, vacancy: &str) -> String {
        format!(
            r#"<tr data-href="/post/view/{id}"><td>{id}</td><td>{school}</td><td>{vacancy}</td>
               <td>Open</td><td>Cork</td><td>14/06/2025</td></tr>"#
        )
    }

    fn listing(last_page: u32, rows: &[String]) -> String {
        format!(
            r#"<html><body>
               <ul class="pagination"><li><a data-page="1">1</a></li>
                 <li><a data-page="{last_page}">Last</a></li></ul>
               <table id="tblAdverts"><tbody>{}</tbody></table>
               </body></html>"#,
            rows.concat()
        )
    }

    fn detail_url(id: u32) -> String {
        format!("{BASE}/post/view/{id}")
    }

    fn apply_to(email: &str) -> String {
        format!(
            r#"<div class="row advertRow"><div><strong>Apply To:</strong></div>
               <div>{email}</div></div>
               <p>Roll Number: 12345A</p>"#
        )
    }

    // Two listing pages, three offers that survive the listing filter
    fn two_page_site(config: &CrawlerConfig) -> FakeSite {
        FakeSite::new()
            .page(
                listing_url(config, 1),
                listing(
                    2,
                    &[
                        row(1, "St. Mary's NS", "Mainstream Class Teacher"),
                        row(9, "Gaelscoil Chorcaí", "Class Teacher"),
                        row(2, "Scoil Íde", "Learning Support Teacher"),
                    ],
                ),
            )
            .page(
                listing_url(config, 2),
                listing(
                    2,
                    &[
                        row(3, "Holy Family NS", "Resource Teacher"),
                        row(8, "Holy Family NS", "Deputy Principal"),
                    ],
                ),
            )
            .page(detail_url(1), apply_to("office@stmarys.ie"))
            // 2 is missing: 404
            .page(
                detail_url(3),
                r#"<div class="job-description">The Board of Management invites applications
                   for the post of Principal Teacher at Holy Family NS.</div>"#,
            )
    }

    fn crawler(config: CrawlerConfig, site: Arc<FakeSite>, permits: usize) -> Crawler {
        Crawler::with_transport(config, site).with_throttle(Throttle::new(permits, DelayPolicy::none()))
    }

    #[tokio::test]
    async fn test_full_crawl() {
        let config = config();
        let site = Arc::new(two_page_site(&config));
        let mut crawler = crawler(config, site.clone(), 3);

        let report = crawler.fetch_all_with_summary(None, true).await.unwrap();

        assert_eq!(report.records.len(), 1);
        let record = &report.records[0];
        assert_eq!(record.basic.url, detail_url(1));
        assert_eq!(record.contact_email.as_deref(), Some("office@stmarys.ie"));
        assert_eq!(record.roll_number.as_deref(), Some("12345A"));

        let summary = &report.summary;
        assert_eq!(summary.pages_planned, 2);
        assert_eq!(summary.rows_excluded, 2);
        assert_eq!(summary.details_failed, 1);
        assert_eq!(summary.details_rejected, 1);
        assert_eq!(summary.records_with_email, 1);
        assert!(!summary.stopped_early);
    }

    #[tokio::test]
    async fn test_zero_pages_makes_no_requests() {
        let config = config().with_credentials(Some(Credentials::new("me", "pw")));
        let site = Arc::new(two_page_site(&config));
        let mut crawler = crawler(config, site.clone(), 3);

        assert!(crawler.fetch_all(Some(0), true).await.unwrap().is_empty());
        assert!(crawler.fetch_all(Some(-3), true).await.unwrap().is_empty());
        assert!(site.requests().is_empty());
        assert_eq!(site.posts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_page_limit() {
        let config = config();
        let site = Arc::new(two_page_site(&config));
        let mut crawler = crawler(config.clone(), site.clone(), 3);

        let report = crawler.fetch_all_with_summary(Some(1), false).await.unwrap();
        assert_eq!(report.summary.pages_planned, 1);
        assert!(!site.urls().contains(&listing_url(&config, 2)));
    }

    #[tokio::test]
    async fn test_single_permit_never_overlaps() {
        let config = config().with_workers(3);
        let site = Arc::new(two_page_site(&config));
        let mut crawler = crawler(config, site.clone(), 1);

        crawler.fetch_all(None, false).await.unwrap();

        assert_eq!(site.peak.load(Ordering::SeqCst), 1);
        let mut requests = site.requests();
        requests.sort_by_key(|r| r.started);
        for pair in requests.windows(2) {
            assert!(pair[1].started >= pair[0].finished, "{} overlapped {}", pair[1].url, pair[0].url);
        }
    }

    #[tokio::test]
    async fn test_pool_bounds_concurrency() {
        let config = config().with_workers(3);
        let site = Arc::new(two_page_site(&config));
        let mut crawler = crawler(config, site.clone(), 2);

        crawler.fetch_all(None, false).await.unwrap();
        assert!(site.peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn test_pagination_is_stable() {
        let config = config();
        let site = Arc::new(two_page_site(&config));
        let crawler = crawler(config, site, 3);

        assert_eq!(crawler.get_total_pages().await, 2);
        assert_eq!(crawler.get_total_pages().await, 2);
    }

    #[tokio::test]
    async fn test_unreachable_site_is_one_empty_page() {
        let site = Arc::new(FakeSite::new());
        let crawler = crawler(config(), site, 3);

        assert_eq!(crawler.get_total_pages().await, 1);
        assert!(crawler.extract_page(1).await.is_empty());
    }

    #[tokio::test]
    async fn test_rejected_login_aborts() {
        let config = config().with_credentials(Some(Credentials::new("me", "wrong")));
        let mut site = two_page_site(&config);
        site.login_status = 200;
        let site = Arc::new(site);
        let mut crawler = crawler(config, site.clone(), 3);

        let err = crawler.fetch_all(None, true).await.unwrap_err();
        assert!(matches!(err, CrawlError::Auth(AuthError::Rejected { status: 200 })));
        assert!(site.requests().is_empty());
    }

    #[tokio::test]
    async fn test_rejected_login_can_continue() {
        let config = config()
            .with_credentials(Some(Credentials::new("me", "wrong")))
            .with_login_failure(LoginFailurePolicy::ContinueUnauthenticated);
        let mut site = two_page_site(&config);
        site.login_status = 200;
        let site = Arc::new(site);
        let mut crawler = crawler(config, site.clone(), 3);

        let records = crawler.fetch_all(None, true).await.unwrap();
        assert_eq!(records.len(), 1);
        assert!(!crawler.is_logged_in());
        assert!(site.requests().iter().all(|r| r.cookie.is_none()));
    }

    #[tokio::test]
    async fn test_session_cookies_sent() {
        let config = config().with_credentials(Some(Credentials::new("me", "pw")));
        let site = Arc::new(two_page_site(&config));
        let mut crawler = crawler(config, site.clone(), 3);

        assert!(crawler.authenticate().await);
        crawler.fetch_all(None, false).await.unwrap();

        let requests = site.requests();
        assert!(!requests.is_empty());
        assert!(requests.iter().all(|r| r.cookie.as_deref() == Some("sid=abc")));
    }

    #[tokio::test]
    async fn test_authenticate_without_credentials() {
        let site = Arc::new(FakeSite::new());
        let mut crawler = crawler(config(), site.clone(), 3);
        assert!(!crawler.authenticate().await);
        assert_eq!(site.posts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_offer_limit() {
        let config = config().with_max_offers(Some(1));
        let site = Arc::new(two_page_site(&config));
        let mut crawler = crawler(config.clone(), site.clone(), 3);

        let records = crawler.fetch_all(None, false).await.unwrap();
        assert_eq!(records.len(), 1);
        // page 1 already had enough offers
        assert!(!site.urls().contains(&listing_url(&config, 2)));
        assert!(!site.urls().contains(&detail_url(2)));
    }

    #[tokio::test]
    async fn test_contact_page_searched_when_no_email() {
        let config = config();
        let site = FakeSite::new()
            .page(
                listing_url(&config, 1),
                listing(1, &[row(5, "St. Joseph's NS", "Class Teacher")]),
            )
            .page(
                detail_url(5),
                r#"<p>See our <a href="/schools/5/about">school page</a>.</p>
                   <p><a href="/schools/5/contact">Contact</a></p>"#,
            )
            .page(
                format!("{BASE}/schools/5/contact"),
                "<p>Email: info@stjosephs.ie</p>",
            );
        let site = Arc::new(site);
        let mut crawler = crawler(config, site.clone(), 3);

        let records = crawler.fetch_all(None, false).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].contact_email.as_deref(), Some("info@stjosephs.ie"));
        // about page (404) first, then contact
        assert!(site.urls().contains(&format!("{BASE}/schools/5/about")));
    }

    #[tokio::test]
    async fn test_failed_detail_is_none() {
        let site = Arc::new(FakeSite::new());
        let crawler = crawler(config(), site, 3);
        assert!(crawler.extract_detail(BasicRecord::new(detail_url(404))).await.is_none());
    }

    #[tokio::test]
    async fn test_cancel_before_start() {
        let config = config();
        let site = Arc::new(two_page_site(&config));
        let mut crawler = crawler(config, site.clone(), 3);

        crawler.cancel_token().cancel();
        let report = crawler.fetch_all_with_summary(None, false).await.unwrap();
        assert!(report.records.is_empty());
        assert!(report.summary.stopped_early);
        assert!(site.requests().is_empty());
    }

    #[tokio::test]
    async fn test_heading_rejects_row_with_empty_vacancy_cell() {
        let config = config();
        let site = FakeSite::new()
            .page(
                listing_url(&config, 1),
                listing(
                    1,
                    &[r#"<tr data-href="/post/view/6"><td>6</td><td>St. Kevin's NS</td><td></td>
                         <td>Open</td><td>Mayo</td><td>Teacher post - 14/06/2025</td></tr>"#
                        .to_string()],
                ),
            )
            .page(
                detail_url(6),
                r#"<div class="purple-text col-8"><h2>Deputy Principal Teacher</h2></div>
                   <div class="row advertRow"><div><strong>Apply To:</strong></div>
                   <div>office@stkevins.ie</div></div>"#,
            );
        let site = Arc::new(site);
        let mut crawler = crawler(config, site, 3);

        let report = crawler.fetch_all_with_summary(None, false).await.unwrap();
        assert!(report.records.is_empty());
        assert_eq!(report.summary.details_rejected, 1);
    }

    // Cancels the token after `after`, from another task
    fn cancel_later(crawler: &Crawler, after: Duration) {
        let cancel = crawler.cancel_token();
        tokio::spawn(async move {
            tokio::time::sleep(after).await;
            cancel.cancel();
        });
    }

    #[tokio::test]
    async fn test_cancel_interrupts_page_pause() {
        let config = config();
        let site = Arc::new(two_page_site(&config));
        let delays = DelayPolicy {
            between_pages: Jitter::secs(3.0, 3.0),
            ..DelayPolicy::none()
        };
        let mut crawler =
            Crawler::with_transport(config.clone(), site.clone()).with_throttle(Throttle::new(3, delays));

        cancel_later(&crawler, Duration::from_millis(100));
        let started = Instant::now();
        let report = crawler.fetch_all_with_summary(None, false).await.unwrap();

        assert!(started.elapsed() < Duration::from_secs(1), "took {:?}", started.elapsed());
        assert!(report.summary.stopped_early);
        assert!(report.records.is_empty());
        assert!(!site.urls().contains(&listing_url(&config, 2)));
    }

    #[tokio::test]
    async fn test_cancel_interrupts_request_in_flight() {
        let config = config();
        let mut site = two_page_site(&config);
        site.latency = Duration::from_secs(3);
        let site = Arc::new(site);
        let mut crawler = crawler(config, site.clone(), 3);

        cancel_later(&crawler, Duration::from_millis(100));
        let started = Instant::now();
        let report = crawler.fetch_all_with_summary(None, false).await.unwrap();

        assert!(started.elapsed() < Duration::from_secs(1), "took {:?}", started.elapsed());
        assert!(report.summary.stopped_early);
        // the pagination request was dropped before it completed
        assert!(site.requests().is_empty());
    }
}
