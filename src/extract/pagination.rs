// src/extract/pagination.rs
// =============================================================================
// Reads the number of result pages from the first listing page.
//
// The pagination control looks like:
//   <ul class="pagination">
//     <li><a data-page="1">1</a></li> ... <li><a data-page="14">Last</a></li>
//   </ul>
//
// We take the largest data-page value. No control (a single page of results)
// or unreadable values mean 1 page.
// =============================================================================

use super::dom::css;
use scraper::Html;

pub fn parse_total_pages(html: &str) -> u32 {
    let document = Html::parse_document(html);
    let selector = css(".pagination a[data-page]");

    document
        .select(&selector)
        .filter_map(|a| a.value().attr("data-page"))
        .filter_map(|page| page.trim().parse::<u32>().ok())
        .max()
        .unwrap_or(1)
        .max(1)
}
