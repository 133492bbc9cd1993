//! Aggregation pipeline: fan out to every collector for every role, then
//! enrich, drop stale postings, dedupe and publish the result to the cache.

pub mod cache;
pub mod dedupe;
pub mod enrich;
pub mod filter;
pub mod recency;
pub mod sort;

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use futures::future::join_all;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::collectors::{CollectorRegistry, JobCollector};
use crate::error::AppError;
use crate::models::posting::{AggregationResult, JobPosting, RawPosting};
use crate::search::cache::JobCache;

#[derive(Debug, Clone, Copy)]
pub struct SearchSettings {
    /// Upper bound for a single (platform, role) call.
    pub call_timeout: Duration,
    pub recency_window: TimeDelta,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            call_timeout: Duration::from_secs(20),
            recency_window: TimeDelta::hours(3),
        }
    }
}

/// Held for the whole of one aggregation run. Dropping it, including while a
/// panicking run task unwinds, lets the next run start.
pub type RunGuard = OwnedMutexGuard<()>;

/// Owns the collector registry and the cache it publishes into.
pub struct JobSearch {
    registry: CollectorRegistry,
    cache: JobCache,
    settings: SearchSettings,
    run_lock: Arc<Mutex<()>>,
}

impl JobSearch {
    pub fn new(registry: CollectorRegistry, cache: JobCache, settings: SearchSettings) -> Self {
        Self {
            registry,
            cache,
            settings,
            run_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn cache(&self) -> &JobCache {
        &self.cache
    }

    pub fn registry(&self) -> &CollectorRegistry {
        &self.registry
    }

    /// Claims the run slot without waiting. `None` while another run holds it.
    pub fn try_begin_run(&self) -> Option<RunGuard> {
        Arc::clone(&self.run_lock).try_lock_owned().ok()
    }

    #[cfg(test)]
    pub fn is_running(&self) -> bool {
        self.run_lock.try_lock().is_err()
    }

    /// One aggregation run, started once any run in flight has finished.
    /// Source failures only shrink the result; the run itself always
    /// completes and replaces the cached set.
    pub async fn aggregate(&self, roles: &[String]) -> Arc<AggregationResult> {
        let guard = Arc::clone(&self.run_lock).lock_owned().await;
        self.aggregate_holding(guard, roles).await
    }

    /// Runs with a slot already claimed through [`JobSearch::try_begin_run`].
    pub async fn aggregate_holding(
        &self,
        _run: RunGuard,
        roles: &[String],
    ) -> Arc<AggregationResult> {
        tracing::info!(
            "Searching {} platforms for roles: {roles:?}",
            self.registry.len()
        );

        let calls: Vec<_> = self
            .registry
            .iter()
            .flat_map(|collector| {
                roles
                    .iter()
                    .map(move |role| (Arc::clone(collector), role.clone()))
            })
            .collect();
        let raw = fan_out(calls, self.settings.call_timeout).await;

        let result = build_result(raw, Utc::now(), self.settings.recency_window);
        tracing::info!(
            "Total unique recent jobs found: {} (from {} raw)",
            result.jobs.len(),
            result.raw_count
        );
        self.cache.replace(result)
    }

    /// Queries a single platform for every role. Results are enriched but not
    /// recency-filtered, deduplicated or cached.
    pub async fn search_platform(
        &self,
        platform: &str,
        roles: &[String],
    ) -> Result<Vec<JobPosting>, AppError> {
        let collector = self
            .registry
            .get(platform)
            .ok_or_else(|| AppError::NotFound(format!("Platform '{platform}' not found")))?;

        let calls = roles
            .iter()
            .map(|role| (Arc::clone(&collector), role.clone()))
            .collect();
        let raw = fan_out(calls, self.settings.call_timeout).await;
        Ok(raw.into_iter().map(enrich::enrich).collect())
    }
}

/// Runs every (collector, role) call on its own task, each under `timeout`,
/// and concatenates the results in call order. A failed, panicked or timed
/// out call contributes nothing.
async fn fan_out(
    calls: Vec<(Arc<dyn JobCollector>, String)>,
    timeout: Duration,
) -> Vec<RawPosting> {
    let (labels, handles): (Vec<_>, Vec<_>) = calls
        .into_iter()
        .map(|(collector, role)| {
            let label = (collector.display_name().to_string(), role.clone());
            let handle = tokio::spawn(async move {
                tracing::debug!("Searching {} for '{role}'", collector.display_name());
                tokio::time::timeout(timeout, collector.search(&role)).await
            });
            (label, handle)
        })
        .unzip();

    let outcomes = join_all(handles).await;

    let mut merged = Vec::new();
    for ((platform, role), outcome) in labels.into_iter().zip(outcomes) {
        match outcome {
            Ok(Ok(Ok(jobs))) => {
                tracing::info!("Found {} jobs on {platform} for '{role}'", jobs.len());
                merged.extend(jobs);
            }
            Ok(Ok(Err(e))) => {
                tracing::warn!("Error searching '{role}' on {platform}: {e}");
            }
            Ok(Err(_elapsed)) => {
                tracing::warn!("Timed out searching '{role}' on {platform} after {timeout:?}");
            }
            Err(e) => {
                tracing::error!("Search task for '{role}' on {platform} failed: {e}");
            }
        }
    }
    merged
}

/// Enrich, keep recent postings, then dedupe. Pure given `now`.
pub fn build_result(
    raw: Vec<RawPosting>,
    now: DateTime<Utc>,
    recency_window: TimeDelta,
) -> AggregationResult {
    let raw_count = raw.len();
    let enriched: Vec<JobPosting> = raw.into_iter().map(enrich::enrich).collect();
    let recent = recency::retain_recent(enriched, now, recency_window);
    tracing::debug!("{} of {raw_count} postings are recent", recent.len());
    let jobs = dedupe::dedupe(recent);

    AggregationResult {
        jobs,
        raw_count,
        completed_at: now,
    }
}
