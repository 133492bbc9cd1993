use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::search::JobSearch;

/// Periodically refreshes the cache through the orchestrator. A tick that
/// finds a run still in flight is dropped, not queued.
pub struct Scheduler {
    search: Arc<JobSearch>,
    roles: Vec<String>,
    interval: Duration,
    startup_delay: Duration,
}

impl Scheduler {
    pub fn new(
        search: Arc<JobSearch>,
        roles: Vec<String>,
        interval: Duration,
        startup_delay: Duration,
    ) -> Self {
        Self {
            search,
            roles,
            interval,
            startup_delay,
        }
    }

    /// Starts a run on its own task unless one is already in flight, in which
    /// case the trigger is dropped.
    pub fn trigger(&self) -> Option<JoinHandle<()>> {
        let Some(guard) = self.search.try_begin_run() else {
            tracing::info!("Previous search still running, skipping");
            return None;
        };

        let search = Arc::clone(&self.search);
        let roles = self.roles.clone();
        Some(tokio::spawn(async move {
            tracing::info!("Starting scheduled job search");
            // A panic surfaces here as a JoinError and drops the guard with
            // the run task; the cache keeps its last set.
            let run = tokio::spawn(async move { search.aggregate_holding(guard, &roles).await });
            match run.await {
                Ok(result) => tracing::info!(
                    "Scheduled job search completed: {} jobs",
                    result.jobs.len()
                ),
                Err(e) => tracing::error!("Scheduled job search failed: {e}"),
            }
        }))
    }

    /// Main scheduler loop: one run after the startup delay, then one per
    /// interval, until `shutdown` is cancelled.
    pub async fn run(self, shutdown: CancellationToken) -> anyhow::Result<()> {
        tracing::info!(
            "Scheduler started: every {}s for roles {:?}",
            self.interval.as_secs(),
            self.roles
        );

        let mut ticker = tokio::time::interval_at(
            tokio::time::Instant::now() + self.startup_delay,
            self.interval,
        );
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => {
                    tracing::info!("Shutdown requested, stopping scheduler");
                    break;
                }
                _ = ticker.tick() => {
                    self.trigger();
                }
            }
        }

        Ok(())
    }
}
