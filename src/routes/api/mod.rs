pub mod jobs;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};

use crate::search::JobSearch;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub search: Arc<JobSearch>,
    pub default_roles: Arc<Vec<String>>,
}

pub fn router(state: AppState) -> Router {
    let jobs = Router::new()
        .route("/countries", get(jobs::countries))
        .route("/platforms", get(jobs::platforms))
        .route("/search", post(jobs::search))
        .route("/search/{platform}", post(jobs::search_platform))
        .route("/cached", get(jobs::cached_all).post(jobs::cached));

    Router::new()
        .nest("/api/jobs", jobs)
        .route("/api/health", get(jobs::health))
        .with_state(state)
}
