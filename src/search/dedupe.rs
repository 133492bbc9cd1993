use std::collections::HashSet;

use crate::models::posting::JobPosting;

fn dedupe_key(posting: &JobPosting) -> (String, String, String) {
    (
        posting.title.to_lowercase(),
        posting.company.to_lowercase(),
        posting.location.to_lowercase(),
    )
}

/// Keeps the first posting for each (title, company, location), compared
/// case-insensitively. Input order decides which duplicate survives.
pub fn dedupe(postings: Vec<JobPosting>) -> Vec<JobPosting> {
    let mut seen = HashSet::with_capacity(postings.len());
    postings
        .into_iter()
        .filter(|p| seen.insert(dedupe_key(p)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::test_support::posting;

    #[test]
    fn same_opportunity_from_two_platforms_collapses() {
        let mut a = posting("PM", "Acme", "NYC");
        a.platform = "Greenhouse".into();
        let mut b = posting("PM", "Acme", "NYC");
        b.platform = "Lever".into();

        let out = dedupe(vec![a, b]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].platform, "Greenhouse");
    }

    #[test]
    fn key_is_case_insensitive() {
        let out = dedupe(vec![
            posting("Product Manager", "ACME", "New York"),
            posting("product manager", "acme", "new york"),
            posting("product manager", "acme", "Boston"),
        ]);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn idempotent() {
        let input = vec![
            posting("PM", "Acme", "NYC"),
            posting("BA", "Acme", "NYC"),
            posting("pm", "acme", "nyc"),
            posting("PM", "Initech", "NYC"),
        ];
        let once = dedupe(input);
        let twice = dedupe(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn fields_do_not_bleed_into_each_other() {
        // Joined naively these would both read "a-b-c-d".
        let out = dedupe(vec![posting("a-b", "c", "d"), posting("a", "b-c", "d")]);
        assert_eq!(out.len(), 2);
    }
}
