// src/extract/mod.rs
// =============================================================================
// HTML extraction: listing pages, pagination and detail pages.
//
// Submodules:
// - dom: Small helpers on top of scraper
// - pagination: How many listing pages a query has
// - listing: Listing page -> BasicRecord list (two table layouts)
// - fields: Best-effort extractors for single fields of a detail page
// - detail: Detail page -> DetailedRecord, plus the post-detail re-check
//
// Everything here is synchronous and works on strings. The crawler does the
// fetching and calls in here between requests.
// =============================================================================

mod detail;
mod dom;
mod fields;
mod listing;
mod pagination;

pub use detail::{parse_detail, passes_recheck, DetailPage};
pub use fields::sanitize_roll_number;
pub use listing::{parse_listing, ListingPage};
pub use pagination::parse_total_pages;
