// src/error.rs
// =============================================================================
// Error types for the crawler.
//
// Only two of these ever reach the caller of fetch_all():
// - CrawlError::Auth when login fails and the policy says abort
// - CrawlError::Client when the HTTP client cannot even be built
//
// FetchError and ParseError are scoped to one page, row or record. The
// crawler logs them, counts them in the run summary and moves on.
// =============================================================================

use thiserror::Error;

/// Why a single HTTP fetch produced no data.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("request to {url} failed: {message}")]
    Network { url: String, message: String },

    #[error("request to {url} cancelled")]
    Cancelled { url: String },
}

/// Why login did not produce a session.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("login rejected with HTTP {status} (expected a redirect)")]
    Rejected { status: u16 },

    #[error("login request failed: {0}")]
    Transport(#[from] FetchError),
}

/// A listing row we could not turn into a record.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("row has no detail link")]
    MissingLink,

    #[error("row has {found} cells, need at least {needed}")]
    TooFewCells { found: usize, needed: usize },

    #[error("could not resolve link '{href}': {reason}")]
    BadLink { href: String, reason: String },
}

/// Errors that stop a whole crawl.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("authentication failed: {0}")]
    Auth(#[from] AuthError),

    #[error("could not build HTTP client: {0}")]
    Client(String),
}
