// src/extract/dom.rs
// =============================================================================
// Small helpers on top of `scraper` shared by the extractors.
//
// scraper gives us text as an iterator of text nodes. The site's markup is
// full of indentation and line breaks, so most of the time we want the
// non-empty pieces trimmed and joined with a single space.
// =============================================================================

use scraper::{ElementRef, Html, Selector};

// Parses a selector written in this crate
//
// Only ever called with string constants, so a bad selector is a bug in the
// crawler itself and panicking is the right thing to do.
pub fn css(selector: &str) -> Selector {
    Selector::parse(selector).unwrap_or_else(|e| panic!("invalid selector {selector:?}: {e:?}"))
}

// Text of an element, trimmed pieces joined with a space
pub fn text_of(element: ElementRef) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

// Text of an element exactly as written, trimmed at both ends
pub fn raw_text_of(element: ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

// Every text node of the document, one per line
pub fn document_text(document: &Html) -> String {
    document
        .root_element()
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

// First element matching `selector` (None if it doesn't parse or match)
pub fn select_first<'a>(document: &'a Html, selector: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(selector).ok()?;
    document.select(&selector).next()
}

// Direct element children with the given tag name
pub fn child_elements<'a>(element: ElementRef<'a>, tag: &'a str) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    element
        .children()
        .filter_map(ElementRef::wrap)
        .filter(move |child| child.value().name() == tag)
}

// Cuts `text` to `max` characters, adding "..." when something was cut
pub fn truncate(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
