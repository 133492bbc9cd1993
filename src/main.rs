mod collectors;
mod config;
mod error;
mod models;
mod routes;
mod search;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use chrono::Utc;
use clap::Parser;
use tower_http::cors::CorsLayer;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::collectors::CollectorRegistry;
use crate::collectors::runner::Scheduler;
use crate::config::{Command, Config};
use crate::models::query::{JobFilters, SearchResponse, SortSpec};
use crate::routes::api::AppState;
use crate::search::JobSearch;
use crate::search::cache::JobCache;
use crate::search::filter::apply_filters;
use crate::search::sort::sort_postings;

async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

/// Ready once the first aggregation has populated the cache.
async fn readyz(State(search): State<Arc<JobSearch>>) -> impl IntoResponse {
    match search.cache().snapshot() {
        Some(_) => (StatusCode::OK, "ready"),
        None => (StatusCode::SERVICE_UNAVAILABLE, "not ready"),
    }
}

/// Cancels `shutdown` on the first SIGINT so the server and scheduler stop together.
fn cancel_on_ctrl_c(shutdown: CancellationToken) {
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for ctrl-c: {e}");
            return;
        }
        tracing::info!("Shutdown signal received");
        shutdown.cancel();
    });
}

/// Serves until `shutdown` is cancelled, letting in-flight requests finish.
async fn serve(
    listener: tokio::net::TcpListener,
    app: Router,
    shutdown: CancellationToken,
) -> std::io::Result<()> {
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("job_radar=info,tower_http=info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();
    init_tracing(config.log_json);

    let registry = CollectorRegistry::with_defaults(Duration::from_secs(config.http_timeout_secs))?;
    if registry.is_empty() {
        tracing::warn!("No collectors registered, every search will be empty");
    } else {
        tracing::info!("Registered {} collectors: {:?}", registry.len(), registry.display_names());
    }

    let cache = JobCache::new(config.freshness_window());
    let search = Arc::new(JobSearch::new(registry, cache, config.search_settings()));
    let roles = config.default_roles();

    match config.resolved_command() {
        Command::Serve {
            listen_addr,
            no_scheduler,
        } => {
            let shutdown = CancellationToken::new();
            cancel_on_ctrl_c(shutdown.clone());

            if no_scheduler {
                tracing::info!("Scheduler disabled, cache fills only through /api/jobs/search");
            } else {
                let scheduler = Scheduler::new(
                    Arc::clone(&search),
                    roles.clone(),
                    Duration::from_secs(config.refresh_interval_secs),
                    Duration::from_secs(config.startup_delay_secs),
                );
                let scheduler_shutdown = shutdown.clone();
                tokio::spawn(async move {
                    if let Err(e) = scheduler.run(scheduler_shutdown).await {
                        tracing::error!("Scheduler stopped: {e:#}");
                    }
                });
            }

            let state = AppState {
                search: Arc::clone(&search),
                default_roles: Arc::new(roles),
            };
            let probes = Router::new()
                .route("/healthz", get(healthz))
                .route("/readyz", get(readyz))
                .with_state(search);
            let app = probes
                .merge(routes::api::router(state))
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive());

            let listener = tokio::net::TcpListener::bind(&listen_addr).await?;
            tracing::info!("Listening on {listen_addr}");
            serve(listener, app, shutdown).await?;
            tracing::info!("Server stopped");
        }
        Command::Search {
            platform,
            country,
            location,
            min_salary,
            job_type,
            sort_by,
            sort_order,
        } => {
            let filters = JobFilters {
                country,
                location,
                min_salary,
                job_type,
                platform: None,
            };
            let sort = SortSpec::parse(Some(&sort_by), Some(&sort_order));

            let (jobs, timestamp) = match &platform {
                Some(name) => (search.search_platform(name, &roles).await?, Utc::now()),
                None => {
                    let result = search.aggregate(&roles).await;
                    (result.jobs.clone(), result.completed_at)
                }
            };
            let filtered = apply_filters(&jobs, &filters);
            let sorted = sort_postings(&filtered, sort);

            let response = SearchResponse {
                success: true,
                timestamp,
                total_jobs: sorted.len(),
                total_jobs_before_filter: jobs.len(),
                filters,
                sort,
                platform,
                fresh: None,
                last_refresh: None,
                jobs: sorted,
            };
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
    }

    Ok(())
}
