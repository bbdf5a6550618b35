//! Name normalization and search matching.
//!
//! Two separate rules live here and must not be conflated:
//!
//! - Uniqueness compares names exactly after [`normalize_name`] (trim only).
//!   `"Flour"` and `"flour"` are distinct names.
//! - Search uses [`contains_ignore_case`], a Unicode-lowercase substring test.

/// Normalize a user-supplied name: trim leading and trailing whitespace.
///
/// The normalized form is what the store keeps and what uniqueness is
/// checked against.
pub fn normalize_name(raw: &str) -> String {
    raw.trim().to_string()
}

/// Case-insensitive substring test.
///
/// A blank needle matches every haystack. Any other needle is matched
/// as given, surrounding whitespace included.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    if needle.trim().is_empty() {
        return true;
    }
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn normalize_trims_both_ends() {
        assert_eq!(normalize_name("  Italian \n"), "Italian");
        assert_eq!(normalize_name("\t"), "");
    }

    #[test]
    fn normalize_keeps_inner_whitespace_and_case() {
        assert_eq!(normalize_name(" Apple  Pie "), "Apple  Pie");
    }

    #[test]
    fn contains_is_case_insensitive() {
        assert!(contains_ignore_case("Banana Bread", "bread"));
        assert!(contains_ignore_case("banana bread", "BANANA"));
        assert!(!contains_ignore_case("Carrot Soup", "pie"));
    }

    #[test]
    fn contains_handles_non_ascii() {
        assert!(contains_ignore_case("CRÈME BRÛLÉE", "brûlée"));
    }

    #[test]
    fn empty_needle_matches_everything() {
        assert!(contains_ignore_case("anything", ""));
        assert!(contains_ignore_case("", ""));
        assert!(contains_ignore_case("anything", "   "));
    }

    #[test]
    fn surrounding_whitespace_in_needle_is_significant() {
        assert!(!contains_ignore_case("Pie", "Pie "));
        assert!(!contains_ignore_case("Pie", " pie"));
        assert!(contains_ignore_case("Apple Pie", "e p"));
        assert!(contains_ignore_case("Apple Pie", "apple "));
    }

    proptest! {
        #[test]
        fn normalize_is_idempotent(s in ".{0,24}") {
            let once = normalize_name(&s);
            prop_assert_eq!(normalize_name(&once), once.clone());
        }

        #[test]
        fn every_substring_matches(s in "[a-zA-Z ]{1,24}", start in 0usize..24, len in 0usize..24) {
            let start = start.min(s.len());
            let end = (start + len).min(s.len());
            prop_assert!(contains_ignore_case(&s, &s[start..end]));
        }
    }
}
