use chrono::{DateTime, TimeDelta, Utc};

use crate::models::posting::JobPosting;

/// True iff the posting carries a timestamp strictly inside `(now - window, ..]`.
pub fn is_recent(posting: &JobPosting, now: DateTime<Utc>, window: TimeDelta) -> bool {
    posting
        .posted_date
        .is_some_and(|posted| posted > now - window)
}

pub fn retain_recent(
    postings: Vec<JobPosting>,
    now: DateTime<Utc>,
    window: TimeDelta,
) -> Vec<JobPosting> {
    postings
        .into_iter()
        .filter(|p| is_recent(p, now, window))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::test_support::posting;

    #[test]
    fn boundary_is_exclusive() {
        let now = Utc::now();
        let window = TimeDelta::hours(3);

        let mut at_edge = posting("PM", "Acme", "NYC");
        at_edge.posted_date = Some(now - window);
        assert!(!is_recent(&at_edge, now, window));

        let mut just_inside = posting("PM", "Acme", "NYC");
        just_inside.posted_date = Some(now - window + TimeDelta::milliseconds(1));
        assert!(is_recent(&just_inside, now, window));
    }

    #[test]
    fn missing_date_is_not_recent() {
        let now = Utc::now();
        let mut p = posting("PM", "Acme", "NYC");
        p.posted_date = None;
        assert!(retain_recent(vec![p], now, TimeDelta::hours(3)).is_empty());
    }
}
