// src/extract/listing.rs
// =============================================================================
// Turns one listing page into BasicRecords.
//
// The site renders the same results twice:
//
// 1. Desktop table (tried first)
//    <table id="tblAdverts"><tbody>
//      <tr data-href="/post/123">
//        <td>id</td><td><a href="/post/123">school</a></td><td>vacancy</td>
//        <td>status</td><td>county</td><td>deadline</td>
//      </tr>
//
// 2. Mobile table (only if the desktop table gave nothing)
//    <table class="mobileTable"><tr data-href="/post/123"><td>
//      <div class="headerData">deadline</div>
//      <div class="mobileRow"><div class="mobileLabel">School Name</div>
//                             <div class="mobileData">...</div></div>
//      ...
//
// Rows are filtered as they are read: excluded schools and vacancies that
// fail the vacancy rule never become records. A broken row is counted and
// skipped; it never stops the rest of the page.
// =============================================================================

use super::dom::{child_elements, css, raw_text_of, text_of};
use crate::error::ParseError;
use crate::models::BasicRecord;
use crate::rules::{is_excluded_school, is_valid_vacancy};
use scraper::{ElementRef, Html};
use tracing::{debug, info, warn};
use url::Url;

/// Cells a desktop row needs: id, school, vacancy, status, county, deadline.
const MIN_CELLS: usize = 6;

/// Everything read from one listing page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingPage {
    pub records: Vec<BasicRecord>,
    /// Rows skipped because they could not be parsed
    pub malformed: usize,
    /// Rows skipped by the school or vacancy rules
    pub excluded: usize,
}

enum Row {
    Keep(BasicRecord),
    Exclude,
}

// Parses a listing page
//
// Parameters:
//   html: the page HTML
//   base: site root, for resolving relative detail links
//   excluded_schools: lowercase markers of schools to skip
pub fn parse_listing<S: AsRef<str>>(html: &str, base: &Url, excluded_schools: &[S]) -> ListingPage {
    let document = Html::parse_document(html);

    let page = parse_desktop_table(&document, base, excluded_schools);
    if !page.records.is_empty() {
        return page;
    }

    debug!("Desktop table gave no records, trying the mobile table");
    let mobile = parse_mobile_table(&document, base, excluded_schools);

    // Both tables list the same postings, so only one set of counters is
    // reported: the desktop one, unless the mobile table is what we use
    let desktop_rows = page.malformed + page.excluded;
    if mobile.records.is_empty() && desktop_rows > 0 {
        return page;
    }
    mobile
}

fn parse_desktop_table<S: AsRef<str>>(document: &Html, base: &Url, excluded_schools: &[S]) -> ListingPage {
    let mut page = ListingPage::default();

    for tr in document.select(&css("table#tblAdverts tbody tr")) {
        match parse_desktop_row(tr, base, excluded_schools) {
            Ok(Row::Keep(record)) => page.records.push(record),
            Ok(Row::Exclude) => page.excluded += 1,
            Err(e) => {
                warn!("Skipping listing row: {}", e);
                page.malformed += 1;
            }
        }
    }

    page
}

fn parse_desktop_row<S: AsRef<str>>(
    tr: ElementRef,
    base: &Url,
    excluded_schools: &[S],
) -> Result<Row, ParseError> {
    let cells: Vec<ElementRef> = child_elements(tr, "td").collect();

    // The row link, or failing that the first link in the school cell
    let href = tr
        .value()
        .attr("data-href")
        .or_else(|| {
            cells
                .get(1)
                .and_then(|cell| cell.select(&css("a")).next())
                .and_then(|a| a.value().attr("href"))
        })
        .ok_or(ParseError::MissingLink)?;

    if cells.len() < MIN_CELLS {
        return Err(ParseError::TooFewCells {
            found: cells.len(),
            needed: MIN_CELLS,
        });
    }

    let url = resolve(base, href)?;
    let school = raw_text_of(cells[1]);
    let vacancy = raw_text_of(cells[2]);

    // Post-primary rows sometimes leave the vacancy cell empty and only
    // mention the post elsewhere in the row. "Teacher" stands in for the
    // filter, but the record keeps the empty cell so the detail page
    // heading can supply the real label.
    let label = if vacancy.is_empty() {
        let mentions_teacher = cells
            .iter()
            .any(|cell| raw_text_of(*cell).to_lowercase().contains("teacher"))
            || raw_text_of(tr).to_lowercase().contains("teacher");
        if mentions_teacher { "Teacher" } else { "" }
    } else {
        vacancy.as_str()
    };

    if is_excluded_school(&school, excluded_schools) {
        info!("Excluded school: {}", school);
        return Ok(Row::Exclude);
    }

    if !is_valid_vacancy(label) {
        info!("Excluded vacancy: '{}' at {}", label, school);
        return Ok(Row::Exclude);
    }

    Ok(Row::Keep(BasicRecord {
        url,
        id: Some(raw_text_of(cells[0])),
        school: Some(school),
        vacancy: (!vacancy.is_empty()).then_some(vacancy),
        status: Some(raw_text_of(cells[3])),
        county: Some(raw_text_of(cells[4])),
        deadline: Some(raw_text_of(cells[5])),
    }))
}

fn parse_mobile_table<S: AsRef<str>>(document: &Html, base: &Url, excluded_schools: &[S]) -> ListingPage {
    let mut page = ListingPage::default();

    let Some(table) = document.select(&css("table.mobileTable")).next() else {
        warn!("No results table found on the listing page");
        return page;
    };

    // Rows without a link are headers or spacers
    for tr in table.select(&css("tr[data-href]")) {
        match parse_mobile_row(tr, base, excluded_schools) {
            Ok(Row::Keep(record)) => page.records.push(record),
            Ok(Row::Exclude) => page.excluded += 1,
            Err(e) => {
                warn!("Skipping mobile listing row: {}", e);
                page.malformed += 1;
            }
        }
    }

    page
}

fn parse_mobile_row<S: AsRef<str>>(
    tr: ElementRef,
    base: &Url,
    excluded_schools: &[S],
) -> Result<Row, ParseError> {
    let href = tr.value().attr("data-href").ok_or(ParseError::MissingLink)?;
    let mut record = BasicRecord::new(resolve(base, href)?);

    record.id = tr.select(&css(".advertId")).next().map(raw_text_of);

    let card = tr.select(&css("td")).next().ok_or(ParseError::TooFewCells {
        found: 0,
        needed: 1,
    })?;

    for row in card.select(&css("div.mobileRow")) {
        let label = row.select(&css(".mobileLabel")).next();
        let value = row.select(&css(".mobileData")).next();
        let (Some(label), Some(value)) = (label, value) else {
            continue;
        };

        let label = text_of(label).to_lowercase();
        let value = raw_text_of(value);

        if label.contains("school name") {
            record.school = Some(value);
        } else if label.contains("type of vacancy") {
            record.vacancy = Some(value);
        } else if label.contains("status") {
            record.status = Some(value);
        } else if label.contains("county") {
            record.county = Some(value);
        }
    }

    record.deadline = card.select(&css(".headerData")).next().map(raw_text_of);

    if let Some(school) = record.school.as_deref() {
        if is_excluded_school(school, excluded_schools) {
            info!("Excluded school (mobile): {}", school);
            return Ok(Row::Exclude);
        }
    }

    // A row without a vacancy label is left for the detail page re-check
    if let Some(vacancy) = record.vacancy.as_deref() {
        if !is_valid_vacancy(vacancy) {
            info!("Excluded vacancy (mobile): '{}'", vacancy);
            return Ok(Row::Exclude);
        }
    }

    Ok(Row::Keep(record))
}

fn resolve(base: &Url, href: &str) -> Result<String, ParseError> {
    base.join(href.trim())
        .map(|url| url.to_string())
        .map_err(|e| ParseError::BadLink {
            href: href.to_string(),
            reason: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::DEFAULT_EXCLUDED_SCHOOLS;

    fn base() -> Url {
        Url::parse("https://www.educationposts.ie").unwrap()
    }

    fn desktop(rows: &str) -> String {
        format!(
            r#"<html><body><table id="tblAdverts" class="d-none d-lg-table">
                <thead><tr><th>Id</th><th>School</th><th>Vacancy</th></tr></thead>
                <tbody>{}</tbody></table></body></html>"#,
            rows
        )
    }

    #[test]
    fn test_desktop_row_with_data_href() {
        let html = desktop(
            r#"<tr data-href="/post/101">
                <td>101</td><td>St. Mary's NS</td><td>Mainstream Class Teacher</td>
                <td>Open</td><td>Cork</td><td>12/06/2025</td></tr>"#,
        );
        let page = parse_listing(&html, &base(), DEFAULT_EXCLUDED_SCHOOLS);

        assert_eq!(page.records.len(), 1);
        let record = &page.records[0];
        assert_eq!(record.url, "https://www.educationposts.ie/post/101");
        assert_eq!(record.id.as_deref(), Some("101"));
        assert_eq!(record.school.as_deref(), Some("St. Mary's NS"));
        assert_eq!(record.vacancy.as_deref(), Some("Mainstream Class Teacher"));
        assert_eq!(record.status.as_deref(), Some("Open"));
        assert_eq!(record.county.as_deref(), Some("Cork"));
        assert_eq!(record.deadline.as_deref(), Some("12/06/2025"));
    }

    #[test]
    fn test_link_from_school_cell() {
        let html = desktop(
            r#"<tr>
                <td>7</td><td><a href="/post/7-holy-family">Holy Family</a></td>
                <td>Resource Teacher</td><td>Open</td><td>Dublin</td><td>01/07/2025</td></tr>"#,
        );
        let page = parse_listing(&html, &base(), DEFAULT_EXCLUDED_SCHOOLS);

        assert_eq!(page.records.len(), 1);
        assert_eq!(page.records[0].url, "https://www.educationposts.ie/post/7-holy-family");
    }

    #[test]
    fn test_empty_vacancy_cell_kept_when_row_mentions_teacher() {
        let html = desktop(
            r#"<tr data-href="/post/8">
                <td>8</td><td>Coláiste Éanna</td><td></td><td>Open</td>
                <td>Dublin</td><td>Teacher of Maths - 01/07/2025</td></tr>
               <tr data-href="/post/9">
                <td>9</td><td>Coláiste Éanna</td><td></td><td>Open</td>
                <td>Dublin</td><td>01/07/2025</td></tr>"#,
        );
        let page = parse_listing(&html, &base(), DEFAULT_EXCLUDED_SCHOOLS);

        assert_eq!(page.records.len(), 1);
        assert_eq!(page.records[0].id.as_deref(), Some("8"));
        // left empty for the detail page heading to fill
        assert_eq!(page.records[0].vacancy, None);
        assert_eq!(page.excluded, 1);
    }

    #[test]
    fn test_rules_applied_inline() {
        let html = desktop(
            r#"<tr data-href="/post/1"><td>1</td><td>Gaelscoil Mhuire</td><td>Class Teacher</td>
                <td>Open</td><td>Cork</td><td>x</td></tr>
               <tr data-href="/post/2"><td>2</td><td>St. Joseph's</td><td>Deputy Principal Teacher</td>
                <td>Open</td><td>Cork</td><td>x</td></tr>
               <tr data-href="/post/3"><td>3</td><td>St. Joseph's</td><td>Special Needs Assistant</td>
                <td>Open</td><td>Cork</td><td>x</td></tr>
               <tr data-href="/post/4"><td>4</td><td>St. Joseph's</td><td>Class Teacher</td>
                <td>Open</td><td>Cork</td><td>x</td></tr>"#,
        );
        let page = parse_listing(&html, &base(), DEFAULT_EXCLUDED_SCHOOLS);

        assert_eq!(page.records.len(), 1);
        assert_eq!(page.records[0].id.as_deref(), Some("4"));
        assert_eq!(page.excluded, 3);
    }

    #[test]
    fn test_malformed_rows_skipped() {
        let html = desktop(
            r#"<tr><td>no link</td><td>School</td></tr>
               <tr data-href="/post/5"><td>5</td><td>Short row</td></tr>
               <tr data-href="/post/6"><td>6</td><td>Scoil Bhríde</td><td>Class Teacher</td>
                <td>Open</td><td>Galway</td><td>x</td></tr>"#,
        );
        let page = parse_listing(&html, &base(), DEFAULT_EXCLUDED_SCHOOLS);

        assert_eq!(page.records.len(), 1);
        assert_eq!(page.malformed, 2);
    }

    #[test]
    fn test_mobile_layout_used_when_desktop_empty() {
        let html = r#"<html><body>
            <table id="tblAdverts"><tbody></tbody></table>
            <table class="mobileTable">
              <tr><td>header</td></tr>
              <tr data-href="/post/900">
                <td>
                  <span class="advertId">900</span>
                  <div class="headerData">Closes 30/06/2025</div>
                  <div class="mobileRow"><div class="mobileLabel">School Name</div><div class="mobileData">Scoil Mhuire</div></div>
                  <div class="mobileRow"><div class="mobileLabel">Type of Vacancy</div><div class="mobileData">SET Teacher</div></div>
                  <div class="mobileRow"><div class="mobileLabel">Status</div><div class="mobileData">Open</div></div>
                  <div class="mobileRow"><div class="mobileLabel">County</div><div class="mobileData">Kerry</div></div>
                </td>
              </tr>
              <tr data-href="/post/901">
                <td>
                  <div class="mobileRow"><div class="mobileLabel">School Name</div><div class="mobileData">Any School</div></div>
                  <div class="mobileRow"><div class="mobileLabel">Type of Vacancy</div><div class="mobileData">Principal Teacher</div></div>
                </td>
              </tr>
            </table></body></html>"#;
        let page = parse_listing(html, &base(), DEFAULT_EXCLUDED_SCHOOLS);

        assert_eq!(page.records.len(), 1);
        let record = &page.records[0];
        assert_eq!(record.url, "https://www.educationposts.ie/post/900");
        assert_eq!(record.id.as_deref(), Some("900"));
        assert_eq!(record.school.as_deref(), Some("Scoil Mhuire"));
        assert_eq!(record.vacancy.as_deref(), Some("SET Teacher"));
        assert_eq!(record.status.as_deref(), Some("Open"));
        assert_eq!(record.county.as_deref(), Some("Kerry"));
        assert_eq!(record.deadline.as_deref(), Some("Closes 30/06/2025"));
        assert_eq!(page.excluded, 1);
    }

    #[test]
    fn test_posting_in_both_tables_counted_once() {
        let html = r#"<html><body>
            <table id="tblAdverts"><tbody>
              <tr data-href="/post/77"><td>77</td><td>St. Kevin's NS</td><td>Principal Teacher</td>
                <td>Open</td><td>Mayo</td><td>x</td></tr>
            </tbody></table>
            <table class="mobileTable">
              <tr data-href="/post/77">
                <td>
                  <div class="mobileRow"><div class="mobileLabel">School Name</div><div class="mobileData">St. Kevin's NS</div></div>
                  <div class="mobileRow"><div class="mobileLabel">Type of Vacancy</div><div class="mobileData">Principal Teacher</div></div>
                </td>
              </tr>
            </table></body></html>"#;
        let page = parse_listing(html, &base(), DEFAULT_EXCLUDED_SCHOOLS);

        assert!(page.records.is_empty());
        assert_eq!(page.excluded, 1);
        assert_eq!(page.malformed, 0);
    }

    #[test]
    fn test_no_tables_is_empty() {
        let page = parse_listing("<html><body>Maintenance</body></html>", &base(), DEFAULT_EXCLUDED_SCHOOLS);
        assert!(page.records.is_empty());
    }
}
