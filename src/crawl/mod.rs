// src/crawl/mod.rs
// =============================================================================
// This module runs a crawl from start to finish.
//
// Features:
// - Optional login, with a choice of aborting or carrying on if it fails
// - Listing pages read in order, detail pages fetched concurrently
// - One shared Throttle for every request of the run
// - A summary of everything that was skipped along the way
// - Cancellation through a CancellationToken (Ctrl-C in the CLI)
//
// Rust concepts:
// - &mut self for the steps that change state (logging in), &self for the
//   rest, so the detail futures can share the crawler
// =============================================================================

mod crawler;
mod summary;

pub use crawler::Crawler;
pub use summary::{CrawlReport, CrawlSummary};
