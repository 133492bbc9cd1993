use std::sync::{Arc, RwLock};

use chrono::{DateTime, TimeDelta, Utc};

use crate::models::posting::{AggregationResult, JobPosting};
use crate::models::query::{JobFilters, SortSpec};
use crate::search::filter::apply_filters;
use crate::search::sort::sort_postings;

/// A filtered, sorted view over the cached set.
#[derive(Debug, Clone)]
pub struct CachedView {
    pub jobs: Vec<JobPosting>,
    /// Size of the cached set before filters were applied.
    pub total_before_filter: usize,
    pub last_refresh: Option<DateTime<Utc>>,
}

/// Holds the latest aggregation result. Writers swap in a whole new
/// snapshot; readers clone the `Arc` and never see a half-written set.
/// The refresh time is the snapshot's `completed_at`, so both change together.
#[derive(Debug)]
pub struct JobCache {
    current: RwLock<Option<Arc<AggregationResult>>>,
    freshness_window: TimeDelta,
}

impl JobCache {
    pub fn new(freshness_window: TimeDelta) -> Self {
        Self {
            current: RwLock::new(None),
            freshness_window,
        }
    }

    pub fn replace(&self, result: AggregationResult) -> Arc<AggregationResult> {
        let snapshot = Arc::new(result);
        // A poisoned lock still guards a whole Arc, never a partial set.
        let mut slot = self.current.write().unwrap_or_else(|e| e.into_inner());
        *slot = Some(Arc::clone(&snapshot));
        snapshot
    }

    pub fn snapshot(&self) -> Option<Arc<AggregationResult>> {
        self.current
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn last_refresh(&self) -> Option<DateTime<Utc>> {
        self.snapshot().map(|s| s.completed_at)
    }

    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        self.last_refresh()
            .is_some_and(|at| now - at < self.freshness_window)
    }

    /// Answers a query from the cached set. Never fetches.
    pub fn get(&self, filters: &JobFilters, sort: SortSpec) -> CachedView {
        let Some(snapshot) = self.snapshot() else {
            return CachedView {
                jobs: Vec::new(),
                total_before_filter: 0,
                last_refresh: None,
            };
        };

        let filtered = apply_filters(&snapshot.jobs, filters);
        CachedView {
            jobs: sort_postings(&filtered, sort),
            total_before_filter: snapshot.jobs.len(),
            last_refresh: Some(snapshot.completed_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::query::{SortKey, SortOrder};
    use crate::search::test_support::posting;

    fn result_with(jobs: Vec<JobPosting>, completed_at: DateTime<Utc>) -> AggregationResult {
        AggregationResult {
            raw_count: jobs.len(),
            jobs,
            completed_at,
        }
    }

    #[test]
    fn empty_cache_is_stale_and_empty() {
        let cache = JobCache::new(TimeDelta::minutes(10));
        assert!(!cache.is_fresh(Utc::now()));
        let view = cache.get(&JobFilters::default(), SortSpec::default());
        assert!(view.jobs.is_empty());
        assert_eq!(view.total_before_filter, 0);
    }

    #[test]
    fn freshness_window() {
        let cache = JobCache::new(TimeDelta::minutes(10));
        let refreshed = Utc::now();
        cache.replace(AggregationResult::empty(refreshed));

        assert!(cache.is_fresh(refreshed + TimeDelta::minutes(9)));
        assert!(!cache.is_fresh(refreshed + TimeDelta::minutes(10)));
    }

    #[test]
    fn get_filters_and_sorts_without_touching_snapshot() {
        let cache = JobCache::new(TimeDelta::minutes(10));
        let mut a = posting("a", "Zeta", "NYC");
        a.country = "United States".into();
        let mut b = posting("b", "Alpha", "NYC");
        b.country = "United States".into();
        let mut c = posting("c", "Beta", "Berlin");
        c.country = "Germany".into();
        cache.replace(result_with(vec![a, b, c], Utc::now()));

        let filters = JobFilters {
            country: Some("United States".into()),
            ..Default::default()
        };
        let sort = SortSpec {
            sort_by: SortKey::Company,
            sort_order: SortOrder::Asc,
        };
        let view = cache.get(&filters, sort);
        assert_eq!(view.total_before_filter, 3);
        let titles: Vec<_> = view.jobs.iter().map(|j| j.title.as_str()).collect();
        assert_eq!(titles, ["b", "a"]);

        let snapshot = cache.snapshot().unwrap();
        assert_eq!(snapshot.jobs[0].title, "a");
    }

    #[test]
    fn readers_keep_their_snapshot_across_replace() {
        let cache = JobCache::new(TimeDelta::minutes(10));
        cache.replace(result_with(vec![posting("old", "Acme", "NYC")], Utc::now()));
        let held = cache.snapshot().unwrap();

        cache.replace(result_with(Vec::new(), Utc::now()));
        assert_eq!(held.jobs.len(), 1);
        assert!(cache.snapshot().unwrap().jobs.is_empty());
    }
}
