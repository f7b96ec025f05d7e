//! Description cleanup.

use super::patterns::{CONTINUED_ARTIFACT, ELLIPSIS_RUN, PAGE_ARTIFACT, WHITESPACE_RUN};

/// Clean a description token: drop control residue and page artifacts,
/// collapse whitespace, keep case and the full remaining text.
///
/// The result is a fixed point: cleaning it again returns it unchanged.
/// May return an empty string; the caller decides on a placeholder.
pub fn clean_description(raw: &str) -> String {
    let mut current = clean_once(raw);
    loop {
        let next = clean_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn clean_once(raw: &str) -> String {
    let text: String = raw
        .chars()
        .filter(|c| *c != '\0' && *c != '\u{FFFD}')
        .collect();

    let text = PAGE_ARTIFACT.replace_all(&text, " ");
    let text = CONTINUED_ARTIFACT.replace_all(&text, " ");
    let text = ELLIPSIS_RUN.replace_all(&text, "...");
    let text = WHITESPACE_RUN.replace_all(&text, " ");

    text.trim_matches(|c: char| c == '|' || c.is_whitespace())
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapses_whitespace_and_keeps_case() {
        assert_eq!(
            clean_description("  UPI/Amazon   Pay\tIndia \n Pvt "),
            "UPI/Amazon Pay India Pvt"
        );
    }

    #[test]
    fn test_strips_artifacts() {
        assert_eq!(
            clean_description("| NEFT SALARY Page 2 of 5 (continued) |"),
            "NEFT SALARY"
        );
        assert_eq!(clean_description("POS\0 CAFE\u{FFFD}"), "POS CAFE");
        assert_eq!(clean_description("SWIGGY......BANGALORE"), "SWIGGY...BANGALORE");
    }

    #[test]
    fn test_never_truncates() {
        let long = "RECURRING MONTHLY CHARGE FOR STREAMING SUBSCRIPTION PLAN PREMIUM FAMILY";
        assert_eq!(clean_description(long), long);
    }

    #[test]
    fn test_artifact_only_becomes_empty() {
        assert_eq!(clean_description(" | Page 1 of 1 | "), "");
    }

    #[test]
    fn test_fixed_point_on_nested_artifacts() {
        let once = clean_description("Page Page 1 of 2 1 of 3 ATM");
        assert_eq!(once, "ATM");
        assert_eq!(clean_description(&once), once);
    }
}
