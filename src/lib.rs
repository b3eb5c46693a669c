// src/lib.rs
// =============================================================================
// edupost-crawler: collects teaching vacancies from educationposts.ie.
//
// Layout (leaves first):
// - rules: vacancy and email checks
// - catalog: county, vacancy type and district codes
// - models: records and query types
// - error: error enums
// - net: HTTP transport, login, throttling
// - extract: HTML parsing of listing and detail pages
// - config: crawl settings
// - crawl: the Crawler that ties it all together
// - telemetry: log setup for the binary
//
// Typical use:
//
//   let config = CrawlerConfig::load()?.with_county("27");
//   let mut crawler = Crawler::new(config)?;
//   let records = crawler.fetch_all(Some(2), true).await?;
// =============================================================================

pub mod catalog;
pub mod config;
pub mod crawl;
pub mod error;
pub mod extract;
pub mod models;
pub mod net;
pub mod rules;
pub mod telemetry;

pub use config::{ConfigError, CrawlerConfig, LoginFailurePolicy, TelemetryConfig};
pub use crawl::{CrawlReport, CrawlSummary, Crawler};
pub use error::{AuthError, CrawlError, FetchError, ParseError};
pub use models::{BasicRecord, Credentials, DetailedRecord, ListingQuery, PositionInfo, Session};
pub use tokio_util::sync::CancellationToken;
