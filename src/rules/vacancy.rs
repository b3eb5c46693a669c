// src/rules/vacancy.rs
// =============================================================================
// This module decides which vacancies we keep.
//
// We only want ordinary teaching posts:
// - The label must mention "teacher"
// - Principal posts are out
// - Placement schemes (special school placements and any other teacher
//   placement) are out
//
// The checks run in a fixed order, each one able to reject the label.
// The same rule is applied twice during a crawl: once to the short label on
// the listing page, and again to the full text of the detail page.
// =============================================================================

/// Schools we skip no matter which vacancy they advertise.
pub const DEFAULT_EXCLUDED_SCHOOLS: &[&str] = &["gaelscoil"];

// Returns true if the vacancy label describes a post we want
//
// Examples:
//   "Mainstream Class Teacher"          -> true
//   "Deputy Principal Teacher"          -> false (principal teacher)
//   "Special School Teacher Placement"  -> false (placement)
pub fn is_valid_vacancy(label: &str) -> bool {
    let label = label.to_lowercase();

    if !label.contains("teacher") {
        return false;
    }

    if label.contains("principal teacher") {
        return false;
    }

    if label.contains("special school") && label.contains("placement") {
        return false;
    }

    // "teacher" is known to be present at this point
    if label.contains("placement") {
        return false;
    }

    true
}

// Returns true if the school name contains one of the excluded markers
// (case-insensitive substring match)
pub fn is_excluded_school<S: AsRef<str>>(school: &str, markers: &[S]) -> bool {
    let school = school.to_lowercase();
    markers
        .iter()
        .any(|marker| school.contains(&marker.as_ref().to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mainstream_teacher_included() {
        assert!(is_valid_vacancy("Mainstream Class Teacher"));
        assert!(is_valid_vacancy("SET TEACHER"));
    }

    #[test]
    fn test_principal_teacher_excluded() {
        assert!(!is_valid_vacancy("Deputy Principal Teacher"));
        assert!(!is_valid_vacancy("Principal Teacher (Teaching)"));
    }

    #[test]
    fn test_placements_excluded() {
        assert!(!is_valid_vacancy("Special School Teacher Placement"));
        assert!(!is_valid_vacancy("Teacher Placement Scheme"));
    }

    #[test]
    fn test_non_teaching_posts_excluded() {
        assert!(!is_valid_vacancy("Special Needs Assistant"));
        assert!(!is_valid_vacancy("Deputy Principal"));
        assert!(!is_valid_vacancy(""));
    }

    #[test]
    fn test_special_school_without_placement_included() {
        assert!(is_valid_vacancy("Special School Class Teacher"));
    }

    #[test]
    fn test_matches_rule_for_mixed_labels() {
        let labels = [
            "teacher",
            "principal teacher",
            "special school placement",
            "placement teacher",
            "Resource Teacher - Fixed Term",
            "Assistant Principal",
            "special school teacher",
        ];
        for label in labels {
            let l = label.to_lowercase();
            let expected = l.contains("teacher")
                && !l.contains("principal teacher")
                && !(l.contains("special school") && l.contains("placement"))
                && !(l.contains("placement") && l.contains("teacher"));
            assert_eq!(is_valid_vacancy(label), expected, "label: {}", label);
        }
    }

    #[test]
    fn test_excluded_school() {
        assert!(is_excluded_school("Gaelscoil Bhaile Átha Cliath", DEFAULT_EXCLUDED_SCHOOLS));
        assert!(!is_excluded_school("St. Mary's NS", DEFAULT_EXCLUDED_SCHOOLS));
        assert!(is_excluded_school("Holy Family", &["FAMILY".to_string()]));
    }
}
