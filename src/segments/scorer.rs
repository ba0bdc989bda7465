//! Match scoring between a segment and a free-text target description.

use crate::models::Segment;

/// Tokens at or below this length carry no signal ("the", "all", "yrs").
const MIN_TOKEN_LEN: usize = 4;

/// Score how well a segment matches a target-group description.
///
/// The segment's name and filter label are tokenized on non-word-character
/// boundaries; tokens longer than three characters count once per occurrence
/// when they appear as a substring of the lowercased description. Pure and
/// order-independent; ties are left to the caller.
pub fn score_segment(segment: &Segment, description: &str) -> usize {
    let haystack = description.to_lowercase();
    let text = format!("{} {}", segment.name, segment.filter_label).to_lowercase();

    text.split(|c: char| !c.is_alphanumeric() && c != '_')
        .filter(|token| token.chars().count() >= MIN_TOKEN_LEN)
        .filter(|token| haystack.contains(token))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(name: &str, filter_label: &str) -> Segment {
        Segment {
            id: "test".to_string(),
            name: name.to_string(),
            filter_label: filter_label.to_string(),
            emails: Vec::new(),
        }
    }

    #[test]
    fn matches_are_case_insensitive() {
        let sweden = segment("Sweden", "country: Sweden · 3 contacts");
        assert!(score_segment(&sweden, "Customers in Sweden") >= 1);
        assert!(score_segment(&sweden, "customers in SWEDEN") >= 1);
    }

    #[test]
    fn score_is_independent_of_description_word_order() {
        let sweden = segment("Sweden", "country: Sweden · 3 contacts");
        assert_eq!(
            score_segment(&sweden, "Sweden customers, returning"),
            score_segment(&sweden, "returning customers Sweden"),
        );
    }

    #[test]
    fn short_tokens_are_ignored() {
        // "vip" is three characters; it must not count even when present.
        let vip = segment("VIP", "tier: VIP · 2 contacts");
        assert_eq!(score_segment(&vip, "our vip audience"), 0);
    }

    #[test]
    fn repeated_tokens_count_per_occurrence() {
        let sweden = segment("Sweden", "country: Sweden · 3 contacts");
        // "sweden" appears in both the name and the filter label.
        assert_eq!(score_segment(&sweden, "customers in sweden"), 2);
    }

    #[test]
    fn unrelated_description_scores_zero() {
        let sweden = segment("Sweden", "country: Sweden · 3 contacts");
        assert_eq!(score_segment(&sweden, "lapsed trial users"), 0);
    }
}
