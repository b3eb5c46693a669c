// src/extract/fields.rs
// =============================================================================
// Best-effort field extractors for a vacancy detail page.
//
// Detail pages are written by hundreds of different schools, pasted into a
// rich-text box, so there is no reliable structure. Every extractor here is
// a chain of attempts, from the most specific markup to a plain text search,
// and stops at the first one that finds something.
//
// Every function takes the parsed page (and sometimes its full text) and
// returns Option: None simply means "not found on this page".
// =============================================================================

use super::dom::{css, raw_text_of, select_first, text_of, truncate};
use crate::models::PositionInfo;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

const DESCRIPTION_MAX: usize = 800;
const REQUIREMENTS_MAX: usize = 400;
const REQUIREMENTS_SELECTOR_MAX: usize = 300;
const CONTACT_INFO_MAX: usize = 200;

const DESCRIPTION_SELECTORS: &[&str] = &[
    ".job-description",
    ".description",
    ".post-content",
    ".content",
    ".vacancy-description",
    "[class*='description']",
    ".post-body",
    ".entry-content",
    ".main-content",
    ".job-details",
    ".position-details",
    ".vacancy-details",
];

const REQUIREMENTS_SELECTORS: &[&str] = &[
    ".requirements",
    ".application-requirements",
    "[class*='requirement']",
    ".qualifications",
    ".criteria",
    ".essential",
    ".desirable",
    ".application",
    ".apply",
    ".conditions",
    ".advertRow",
];

const REQUIREMENT_KEYWORDS: &[&str] = &[
    "application requirements",
    "requirements",
    "qualifications",
    "essential criteria",
    "desirable criteria",
    "criteria",
    "must have",
    "should have",
    "experience required",
    "qualification required",
    "essential",
    "desirable",
    "letter of application",
    "application form",
];

// Lines that open a requirements section in the plain-text fallback
const REQUIREMENT_SECTION_MARKERS: &[&str] = &[
    "application requirements",
    "requirements:",
    "qualifications:",
    "essential:",
    "letter of application",
];

// Lines that close it
const SECTION_STOP_MARKERS: &[&str] = &["HOW TO APPLY", "CONTACT", "SALARY", "CLOSING DATE"];

// Text that suggests we've reached the actual list of requirements
const LIST_HINTS: &[&str] = &["•", "-", "1.", "2.", "degree", "experience", "qualification"];

const BOILERPLATE: &[&str] = &["cookie", "privacy", "copyright"];

const DATE_SELECTORS: &[&str] = &[
    ".post-date",
    ".date",
    ".published",
    ".created",
    "[class*='date']",
    ".meta-date",
    ".publish-date",
];

const CONTACT_SELECTORS: &[&str] = &[
    ".contact-info",
    ".contact",
    ".contact-details",
    "[class*='contact']",
    ".principal",
    ".school-contact",
];

fn patterns(sources: &[&str]) -> Vec<Regex> {
    sources
        .iter()
        .map(|p| Regex::new(&format!("(?i){}", p)).expect("built-in pattern is valid"))
        .collect()
}

static SALARY_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    patterns(&[
        r"salary[:\s]*[€£$]?[\d,]+[-\s]*[€£$]?[\d,]*",
        r"[€£$][\d,]+\s*(?:per|/)\s*(?:year|annum|hour)",
        r"scale[:\s]*\w+",
        r"pay[:\s]*[€£$]?[\d,]+",
    ])
});

static SCHEDULE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    patterns(&[
        r"(?:full|part)[-\s]*time",
        r"\d+\s*hours?\s*per\s*week",
        r"temporary|permanent|contract",
        r"maternity\s*cover",
        r"fixed[- ]term",
    ])
});

static CLOSING_DATE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    patterns(&[
        r"closing\s+date[:\s]*(\d{1,2}[/\-.]\d{1,2}[/\-.]\d{2,4})",
        r"apply\s+by[:\s]*(\d{1,2}[/\-.]\d{1,2}[/\-.]\d{2,4})",
        r"deadline[:\s]*(\d{1,2}[/\-.]\d{1,2}[/\-.]\d{2,4})",
    ])
});

static CONTACT_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    patterns(&[
        r"contact[:\s]*([^\n]+)",
        r"principal[:\s]*([^\n]+)",
        r"queries[:\s]*([^\n]+)",
        r"further\s+information[:\s]*([^\n]+)",
    ])
});

static ROLL_NUMBER_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    patterns(&[
        r"roll\s*(?:number|no)[:.]?\s*(\w+)",
        r"roll\s*(?:number|no)\s*(?:is|=)\s*(\w+)",
        r"school\s*roll\s*(?:number|no)[:.]\s*(\w+)",
        r"\b(\d{5}[A-Z])",
    ])
});

static ROLL_IN_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)roll\s*(?:number|no)[:.\s]*(\S+)").expect("valid pattern"));

static CONTENT_CLASS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"content|main|post").expect("valid pattern"));

// ---------------------------------------------------------------------------
// Description
// ---------------------------------------------------------------------------

// The job description, at most 800 characters
//
// 1. A known description container with more than 50 characters of text
// 2. The first three substantial paragraphs of the main content block
pub fn description(document: &Html) -> Option<String> {
    let from_container = DESCRIPTION_SELECTORS
        .iter()
        .filter_map(|s| select_first(document, s))
        .map(text_of)
        .find(|text| text.chars().count() > 50);

    if let Some(text) = from_container {
        return Some(truncate(&text, DESCRIPTION_MAX));
    }

    let main = main_content(document)?;
    let paragraphs: Vec<String> = main
        .select(&css("p"))
        .map(raw_text_of)
        .filter(|text| text.chars().count() > 30)
        .filter(|text| {
            let lower = text.to_lowercase();
            !BOILERPLATE.iter().any(|b| lower.contains(b))
        })
        .take(3)
        .collect();

    if paragraphs.is_empty() {
        return None;
    }

    Some(truncate(&paragraphs.join(" "), DESCRIPTION_MAX))
}

fn main_content(document: &Html) -> Option<ElementRef<'_>> {
    select_first(document, "main")
        .or_else(|| select_first(document, "article"))
        .or_else(|| {
            document.select(&css("div[class]")).find(|div| {
                div.value()
                    .attr("class")
                    .is_some_and(|class| CONTENT_CLASS.is_match(class))
            })
        })
}

// ---------------------------------------------------------------------------
// Requirements
// ---------------------------------------------------------------------------

// The application requirements, at most 400 characters
//
// 1. Bullet lists inside the advert rows
// 2. A known requirements container
// 3. The text following a "requirements"-like heading
// 4. A line scan of the whole page between a requirements line and the
//    next section
pub fn requirements(document: &Html, full_text: &str) -> Option<String> {
    requirements_from_advert_lists(document)
        .or_else(|| requirements_from_selectors(document))
        .or_else(|| requirements_after_heading(document))
        .or_else(|| requirements_from_lines(full_text))
}

fn requirements_from_advert_lists(document: &Html) -> Option<String> {
    let items = css("ul li, ol li");

    document.select(&css("div.advertRow")).find_map(|row| {
        let bullets: Vec<String> = row
            .select(&items)
            .map(raw_text_of)
            .filter(|text| !text.is_empty())
            .map(|text| format!("• {}", text))
            .collect();

        if bullets.is_empty() {
            None
        } else {
            Some(truncate(&bullets.join(" "), REQUIREMENTS_MAX))
        }
    })
}

fn requirements_from_selectors(document: &Html) -> Option<String> {
    REQUIREMENTS_SELECTORS
        .iter()
        .filter_map(|s| select_first(document, s))
        .map(text_of)
        .find(|text| text.chars().count() > 20)
        .map(|text| truncate(&text, REQUIREMENTS_SELECTOR_MAX))
}

fn requirements_after_heading(document: &Html) -> Option<String> {
    let headings = Selector::parse("h1, h2, h3, h4, h5, h6, strong, b, p").ok()?;

    for heading in document.select(&headings) {
        let title = raw_text_of(heading).to_lowercase();
        if title.is_empty() || !REQUIREMENT_KEYWORDS.iter().any(|k| title.contains(k)) {
            continue;
        }

        // Content usually follows the heading; when the heading is the last
        // thing in its block, it follows the block instead
        let mut current = heading.next_sibling().or_else(|| {
            heading
                .parent()
                .and_then(|parent| parent.next_siblings().find(|n| n.value().is_element()))
        });

        let mut collected: Vec<String> = Vec::new();
        while let Some(node) = current {
            if collected.join(" ").chars().count() >= 500 {
                break;
            }

            if let Some(element) = ElementRef::wrap(node) {
                let text = text_of(element);
                if text.chars().count() > 10 {
                    let lower = text.to_lowercase();
                    let looks_like_list = LIST_HINTS.iter().any(|hint| lower.contains(hint));
                    collected.push(text);
                    if looks_like_list {
                        break;
                    }
                }
            } else if let Some(text) = node.value().as_text() {
                let text = text.trim();
                if !text.is_empty() {
                    collected.push(text.to_string());
                }
            }

            current = node.next_sibling();
        }

        if !collected.is_empty() {
            return Some(truncate(&collected.join(" "), REQUIREMENTS_MAX));
        }
    }

    None
}

fn requirements_from_lines(full_text: &str) -> Option<String> {
    let mut section: Vec<&str> = Vec::new();
    let mut inside = false;

    for line in full_text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let lower = line.to_lowercase();
        if REQUIREMENT_SECTION_MARKERS.iter().any(|m| lower.contains(m)) {
            inside = true;
            section = vec![line];
            continue;
        }

        if inside {
            if SECTION_STOP_MARKERS.iter().any(|m| line.starts_with(m)) || section.len() > 10 {
                break;
            }
            section.push(line);
        }
    }

    // A heading on its own isn't worth keeping
    if section.len() > 1 {
        Some(truncate(&section.join(" "), REQUIREMENTS_MAX))
    } else {
        None
    }
}

// ---------------------------------------------------------------------------
// Position, dates, contact
// ---------------------------------------------------------------------------

// Salary and schedule phrases; None when neither is mentioned
pub fn position_info(full_text: &str) -> Option<PositionInfo> {
    let info = PositionInfo {
        salary: first_match(&SALARY_PATTERNS, full_text),
        schedule: first_match(&SCHEDULE_PATTERNS, full_text),
    };
    (!info.is_empty()).then_some(info)
}

fn first_match(patterns: &[Regex], text: &str) -> Option<String> {
    patterns
        .iter()
        .find_map(|re| re.find(text))
        .map(|m| m.as_str().trim().to_string())
}

fn first_capture(patterns: &[Regex], text: &str) -> Option<String> {
    patterns
        .iter()
        .find_map(|re| re.captures(text))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
}

pub fn posted_date(document: &Html) -> Option<String> {
    DATE_SELECTORS
        .iter()
        .filter_map(|s| select_first(document, s))
        .map(raw_text_of)
        .find(|text| text.chars().count() > 3)
}

pub fn closing_date(full_text: &str) -> Option<String> {
    first_capture(&CLOSING_DATE_PATTERNS, full_text)
}

pub fn contact_info(document: &Html, full_text: &str) -> Option<String> {
    let from_selector = CONTACT_SELECTORS
        .iter()
        .filter_map(|s| select_first(document, s))
        .map(raw_text_of)
        .find(|text| text.chars().count() > 5);

    if from_selector.is_some() {
        return from_selector;
    }

    CONTACT_PATTERNS
        .iter()
        .filter_map(|re| re.captures(full_text))
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .find(|text| text.chars().count() > 10)
        .map(|text| text.chars().take(CONTACT_INFO_MAX).collect())
}

// ---------------------------------------------------------------------------
// Roll number
// ---------------------------------------------------------------------------

// The school's roll number
//
// 1. Phrases like "Roll Number: 12345A" anywhere in the page, then a bare
//    five-digits-and-a-letter code
// 2. A table row whose first cell is "Roll Number"
// 3. A key/value block mentioning the roll number
pub fn roll_number(document: &Html, full_text: &str) -> Option<String> {
    let from_text = ROLL_NUMBER_PATTERNS.iter().find_map(|re| {
        re.captures_iter(full_text)
            .filter_map(|caps| caps.get(1))
            .find_map(|m| sanitize_roll_number(m.as_str()))
    });
    if from_text.is_some() {
        return from_text;
    }

    let cell = css("td, th");
    let from_table = document.select(&css("table tr")).find_map(|row| {
        let cells: Vec<ElementRef> = row.select(&cell).collect();
        if cells.len() < 2 {
            return None;
        }
        let header = raw_text_of(cells[0]).to_lowercase();
        if header.contains("roll") && (header.contains("number") || header.contains("no")) {
            sanitize_roll_number(&raw_text_of(cells[1]))
        } else {
            None
        }
    });
    if from_table.is_some() {
        return from_table;
    }

    document
        .select(&css("div.key-value, div.field, div.info-row, div.school-info"))
        .map(text_of)
        .filter(|text| {
            let lower = text.to_lowercase();
            lower.contains("roll") && (lower.contains("number") || lower.contains("no"))
        })
        .find_map(|text| {
            ROLL_IN_BLOCK
                .captures(&text)
                .and_then(|caps| caps.get(1))
                .and_then(|m| sanitize_roll_number(m.as_str()))
        })
}

// Cleans a roll number candidate
//
// Roll numbers are digits followed by at most one check letter. Page text
// often runs straight into the next label, so "123456TApply" must become
// "123456T". Candidates that don't start with digits are rejected.
pub fn sanitize_roll_number(raw: &str) -> Option<String> {
    let raw = raw.trim();
    let digits: String = raw.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }

    let mut rest = raw[digits.len()..].chars();
    let mut roll = digits;
    if let Some(letter) = rest.next().filter(|c| c.is_ascii_alphabetic()) {
        // "Apply" after the digits is a word, not a check letter
        let starts_word = rest.next().is_some_and(|c| c.is_ascii_lowercase());
        if !starts_word {
            roll.push(letter.to_ascii_uppercase());
        }
    }

    Some(roll)
}
