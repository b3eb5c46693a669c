// src/extract/detail.rs
// =============================================================================
// Turns a fetched detail page into a DetailedRecord.
//
// Key functionality:
// - Finding the contact email in the "Apply To" row of the advert
// - Running every field extractor from fields.rs
// - Collecting links worth searching when the page has no email
// - The final re-check that drops records the listing filter let through
//
// Fetching is not done here: the crawler fetches the page (and any contact
// pages) under the throttle and hands us the HTML.
//
// Rust concepts:
// - Ownership: parse_detail() takes the BasicRecord by value and moves it
//   into the DetailedRecord, so a listing record becomes at most one detail
// =============================================================================

use super::dom::{child_elements, css, document_text, select_first, text_of};
use super::fields;
use crate::models::{BasicRecord, DetailedRecord};
use crate::rules::{first_valid_email, is_excluded_school, is_valid_vacancy};
use scraper::{ElementRef, Html};
use tracing::{debug, info, warn};
use url::Url;

// How many contact/about/staff links to search for an email
const MAX_CONTACT_LINKS: usize = 2;
const CONTACT_LINK_HINTS: &[&str] = &["contact", "about", "staff"];

/// Everything read from one detail page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailPage {
    pub record: DetailedRecord,
    /// Absolute URLs of pages that may carry the email. Empty when the
    /// email was already found.
    pub contact_links: Vec<String>,
}

pub fn parse_detail(html: &str, basic: BasicRecord) -> DetailPage {
    let document = Html::parse_document(html);
    let full_text = document_text(&document);

    let mut record = DetailedRecord::from_basic(basic);

    record.contact_email = contact_email(&document);
    record.description = fields::description(&document);
    record.requirements = fields::requirements(&document, &full_text);
    record.position_info = fields::position_info(&full_text);
    record.posted_date = fields::posted_date(&document);
    record.closing_date = fields::closing_date(&full_text);
    record.contact_info = fields::contact_info(&document, &full_text);
    record.roll_number = fields::roll_number(&document, &full_text);

    let has_vacancy = record
        .basic
        .vacancy
        .as_deref()
        .is_some_and(|v| !v.trim().is_empty());
    if !has_vacancy {
        if let Some(h2) = select_first(&document, "div.purple-text.col-8 h2") {
            let label = text_of(h2);
            if !label.is_empty() {
                debug!("Vacancy label taken from page heading: {}", label);
                record.basic.vacancy = Some(label);
            }
        }
    }

    let contact_links = if record.contact_email.is_none() {
        contact_links(&document, &record.basic.url)
    } else {
        Vec::new()
    };

    info!(
        "📄 {} - {} (email: {}, roll: {})",
        record.basic.school.as_deref().unwrap_or("N/A"),
        record.basic.vacancy.as_deref().unwrap_or("N/A"),
        record.contact_email.as_deref().unwrap_or("none"),
        record.roll_number.as_deref().unwrap_or("none"),
    );

    DetailPage {
        record,
        contact_links,
    }
}

// Second look at a record once the detail page has filled it in
//
// The listing only saw a short label. The description and requirements can
// reveal that a post is really a principal or placement role.
pub fn passes_recheck<S: AsRef<str>>(record: &DetailedRecord, excluded_schools: &[S]) -> bool {
    if let Some(school) = record.basic.school.as_deref() {
        if is_excluded_school(school, excluded_schools) {
            info!("⛔ Dropped after detail: excluded school {}", school);
            return false;
        }
    }

    if !is_valid_vacancy(&record.vacancy_text()) {
        info!("⛔ Dropped after detail: not a teaching vacancy ({})", record.basic.url);
        return false;
    }

    true
}

// ---------------------------------------------------------------------------
// Contact email
// ---------------------------------------------------------------------------

// The address applications should go to
//
// 1. The value of an advert row labelled "Apply To"
// 2. The value of a row labelled "Enquiries" or "Contact"
// 3. A mailto: link near the words "apply to", for adverts that don't use
//    the row layout
fn contact_email(document: &Html) -> Option<String> {
    let rows = advert_rows(document);

    rows.iter()
        .filter(|(label, _)| label.contains("apply to"))
        .find_map(|(_, value)| first_valid_email(value))
        .or_else(|| {
            rows.iter()
                .filter(|(label, _)| label.contains("enquiries") || label.contains("contact"))
                .find_map(|(_, value)| first_valid_email(value))
        })
        .or_else(|| mailto_near_apply_to(document))
}

// (label, value) text of every advert row with at least two cells
fn advert_rows(document: &Html) -> Vec<(String, String)> {
    let strong = css("strong");

    document
        .select(&css("div.row.advertRow"))
        .filter_map(|row| {
            let cells: Vec<ElementRef> = child_elements(row, "div").collect();
            if cells.len() < 2 {
                return None;
            }

            let label_source = cells[0].select(&strong).next().unwrap_or(cells[0]);
            let label = text_of(label_source).to_lowercase().replace(':', "");
            let value = text_of(cells[1]);
            debug!("Advert row: label='{}', value='{}'", label, value);
            Some((label, value))
        })
        .collect()
}

fn mailto_near_apply_to(document: &Html) -> Option<String> {
    let nodes: Vec<_> = document.tree.root().descendants().collect();

    for (position, node) in nodes.iter().enumerate() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        if !text.to_lowercase().contains("apply to") {
            continue;
        }
        let Some(parent) = node.parent() else {
            continue;
        };
        let Some(start) = nodes[..position].iter().rposition(|n| n.id() == parent.id()) else {
            continue;
        };

        // Anything after the opening of the parent: first its own links,
        // then the ones that follow it
        let email = nodes[start + 1..]
            .iter()
            .filter_map(|n| ElementRef::wrap(*n))
            .filter(|el| el.value().name() == "a")
            .filter_map(|a| a.value().attr("href"))
            .find_map(mailto_address)
            .and_then(|address| first_valid_email(&address));

        if email.is_some() {
            return email;
        }
    }

    None
}

// "mailto:office@school.ie?subject=Post" -> "office@school.ie"
fn mailto_address(href: &str) -> Option<String> {
    let href = href.trim();
    if !href.to_lowercase().starts_with("mailto:") {
        return None;
    }
    let address = href.get(7..)?.split('?').next()?.trim();
    (!address.is_empty()).then(|| address.to_string())
}

// ---------------------------------------------------------------------------
// Contact links
// ---------------------------------------------------------------------------

fn contact_links(document: &Html, page_url: &str) -> Vec<String> {
    let base = match Url::parse(page_url) {
        Ok(base) => base,
        Err(e) => {
            warn!("Cannot resolve links on {}: {}", page_url, e);
            return Vec::new();
        }
    };

    document
        .select(&css("a[href]"))
        .filter_map(|a| a.value().attr("href"))
        .filter(|href| {
            let lower = href.to_lowercase();
            CONTACT_LINK_HINTS.iter().any(|hint| lower.contains(hint))
        })
        .take(MAX_CONTACT_LINKS)
        .filter_map(|href| base.join(href).ok())
        .map(|url| url.to_string())
        .collect()
}
