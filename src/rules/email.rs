// src/rules/email.rs
// =============================================================================
// This module finds contact emails in text scraped from a vacancy page.
//
// Problems we have to deal with:
// - Pages mention portal and no-reply addresses we must never contact
// - HTML text extraction glues words together, so "office@school.ie" followed
//   by a "Website" label often comes out as "office@school.ieWebsite"
//
// Rust concepts:
// - LazyLock: A value computed once, the first time it is used
// - Regex: Compiled pattern matching from the `regex` crate
// =============================================================================

use regex::Regex;
use std::sync::LazyLock;

// Matches things that look like email addresses
// \b = word boundary, so we don't start in the middle of a word
static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b")
        .expect("email pattern is valid")
});

/// Labels the site prints right after an email, often glued onto it.
const GLUED_LABELS: &[&str] = &["Website", "Apply", "Tel"];

/// Fragments that mark an address as unusable (generic, no-reply, portal).
pub const BLOCKLIST: &[&str] = &[
    "noreply",
    "no-reply",
    "wordpress",
    "example.com",
    "educationposts.ie",
    "teachingcouncil.ie",
];

// Returns the first usable email in `text`
//
// Example:
//   "Apply to: noreply@educationposts.ie or principal@scoil.ieWebsite"
//   -> Some("principal@scoil.ie")
pub fn first_valid_email(text: &str) -> Option<String> {
    EMAIL_RE
        .find_iter(text)
        .filter_map(|m| strip_glued_suffix(m.as_str()))
        .find(|email| !is_blocklisted(email))
}

// True if the address (local part or domain) hits the blocklist
pub fn is_blocklisted(email: &str) -> bool {
    let lower = email.to_lowercase();
    BLOCKLIST.iter().any(|bad| lower.contains(bad))
}

// Removes a word glued onto the top-level domain
//
// "ieWebsite" -> "ie", "IEWebsite" -> "IE", "comApply" -> "com"
// A known label is cut whatever the TLD case. Any other capitalised word is
// cut only after a lowercase TLD, so an all-caps TLD like "IE" is left alone.
fn strip_glued_suffix(candidate: &str) -> Option<String> {
    let email = candidate.trim();
    let dot = email.rfind('.')?;
    let (head, tld) = email.split_at(dot + 1);

    let label_cut = GLUED_LABELS
        .iter()
        .filter_map(|label| tld.find(label))
        .filter(|i| *i >= 2)
        .min();

    let cut = label_cut.unwrap_or_else(|| {
        tld.char_indices()
            .skip(2)
            .find(|(i, c)| c.is_ascii_uppercase() && tld[..*i].chars().all(|p| p.is_ascii_lowercase()))
            .map(|(i, _)| i)
            .unwrap_or(tld.len())
    });

    let tld = &tld[..cut];
    if tld.len() < 2 {
        return None;
    }

    Some(format!("{}{}", head, tld))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_email() {
        let found = first_valid_email("Apply to principal@stmarys.ie today");
        assert_eq!(found.as_deref(), Some("principal@stmarys.ie"));
    }

    #[test]
    fn test_skips_blocklisted_addresses() {
        let text = "noreply@school.ie, info@educationposts.ie, office@scoilmhuire.ie";
        assert_eq!(first_valid_email(text).as_deref(), Some("office@scoilmhuire.ie"));
    }

    #[test]
    fn test_only_blocklisted_is_none() {
        let text = "no-reply@site.com wordpress@blog.ie admin@example.com";
        assert_eq!(first_valid_email(text), None);
    }

    #[test]
    fn test_no_email_is_none() {
        assert_eq!(first_valid_email("Contact the school office"), None);
        assert_eq!(first_valid_email(""), None);
        assert_eq!(first_valid_email("broken@address"), None);
    }

    #[test]
    fn test_strips_glued_word() {
        let found = first_valid_email("secretary@cbsnorth.ieWebsite www.cbsnorth.ie");
        assert_eq!(found.as_deref(), Some("secretary@cbsnorth.ie"));

        let found = first_valid_email("jobs@etns.comApply");
        assert_eq!(found.as_deref(), Some("jobs@etns.com"));
    }

    #[test]
    fn test_keeps_uppercase_tld() {
        let found = first_valid_email("OFFICE@SCOIL.IE");
        assert_eq!(found.as_deref(), Some("OFFICE@SCOIL.IE"));
    }

    #[test]
    fn test_strips_label_after_uppercase_tld() {
        let found = first_valid_email("OFFICE@SCHOOL.IEWebsite");
        assert_eq!(found.as_deref(), Some("OFFICE@SCHOOL.IE"));

        let found = first_valid_email("Principal@Scoil.IETel 01 555 0000");
        assert_eq!(found.as_deref(), Some("Principal@Scoil.IE"));

        let found = first_valid_email("board@school.COMApply now");
        assert_eq!(found.as_deref(), Some("board@school.COM"));
    }

    #[test]
    fn test_result_never_blocklisted() {
        let samples = [
            "x@teachingcouncil.ie y@no-reply.ie",
            "a@educationposts.ieWebsite b@school.ie",
            "hello@EXAMPLE.COM",
        ];
        for text in samples {
            if let Some(email) = first_valid_email(text) {
                assert!(!is_blocklisted(&email), "{} slipped through", email);
            }
        }
    }
}
