use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use chrono::Utc;
use serde_json::{Value, json};

use crate::error::AppError;
use crate::models::query::{JobFilters, SearchRequest, SearchResponse, SortSpec};
use crate::routes::api::AppState;
use crate::search::enrich::all_countries;
use crate::search::filter::apply_filters;
use crate::search::sort::sort_postings;

/// Requests are never rejected. Each field decodes on its own, so a malformed
/// one is dropped without touching the rest; a body that is not a JSON object
/// means "all defaults".
fn parse_request(body: &Bytes) -> SearchRequest {
    if body.iter().all(u8::is_ascii_whitespace) {
        return SearchRequest::default();
    }
    match serde_json::from_slice::<Value>(body) {
        Ok(object @ Value::Object(_)) => serde_json::from_value(object).unwrap_or_else(|e| {
            tracing::warn!("Ignoring unreadable request body: {e}");
            SearchRequest::default()
        }),
        Ok(_) => SearchRequest::default(),
        Err(e) => {
            tracing::warn!("Ignoring unreadable request body: {e}");
            SearchRequest::default()
        }
    }
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "OK", "timestamp": Utc::now() }))
}

pub async fn countries() -> Json<Value> {
    Json(json!({ "countries": all_countries() }))
}

pub async fn platforms(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "platforms": state.search.registry().display_names() }))
}

/// POST /api/jobs/search
///
/// Runs a full aggregation for the requested roles, replacing the cached set,
/// then filters and sorts the fresh result.
pub async fn search(
    State(state): State<AppState>,
    body: Bytes,
) -> Json<SearchResponse> {
    let request = parse_request(&body);
    let roles = request.roles_or(&state.default_roles);
    let sort = request.sort();
    tracing::info!(
        "Search request: roles={roles:?} filters={:?} sort={sort:?}",
        request.filters
    );

    let result = state.search.aggregate(&roles).await;
    let filtered = apply_filters(&result.jobs, &request.filters);
    let jobs = sort_postings(&filtered, sort);

    Json(SearchResponse {
        success: true,
        timestamp: result.completed_at,
        total_jobs: jobs.len(),
        total_jobs_before_filter: result.jobs.len(),
        filters: request.filters,
        sort,
        platform: None,
        fresh: None,
        last_refresh: None,
        jobs,
    })
}

/// POST /api/jobs/search/{platform}
pub async fn search_platform(
    State(state): State<AppState>,
    Path(platform): Path<String>,
    body: Bytes,
) -> Result<Json<SearchResponse>, AppError> {
    let request = parse_request(&body);
    let roles = request.roles_or(&state.default_roles);
    let sort = request.sort();

    let results = state.search.search_platform(&platform, &roles).await?;
    let filtered = apply_filters(&results, &request.filters);
    let jobs = sort_postings(&filtered, sort);

    Ok(Json(SearchResponse {
        success: true,
        timestamp: Utc::now(),
        total_jobs: jobs.len(),
        total_jobs_before_filter: results.len(),
        filters: request.filters,
        sort,
        platform: Some(platform),
        fresh: None,
        last_refresh: None,
        jobs,
    }))
}

fn cached_response(state: &AppState, filters: JobFilters, sort: SortSpec) -> SearchResponse {
    let cache = state.search.cache();
    let now = Utc::now();
    let view = cache.get(&filters, sort);

    SearchResponse {
        success: true,
        timestamp: now,
        total_jobs: view.jobs.len(),
        total_jobs_before_filter: view.total_before_filter,
        filters,
        sort,
        platform: None,
        fresh: Some(cache.is_fresh(now)),
        last_refresh: view.last_refresh,
        jobs: view.jobs,
    }
}

/// POST /api/jobs/cached
///
/// Filters and sorts the last aggregated set without fetching anything.
pub async fn cached(
    State(state): State<AppState>,
    body: Bytes,
) -> Json<SearchResponse> {
    let request = parse_request(&body);
    let sort = request.sort();
    Json(cached_response(&state, request.filters, sort))
}

/// GET /api/jobs/cached
pub async fn cached_all(State(state): State<AppState>) -> Json<SearchResponse> {
    Json(cached_response(
        &state,
        JobFilters::default(),
        SortSpec::default(),
    ))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use chrono::TimeDelta;
    use tower::ServiceExt;

    use super::*;
    use crate::collectors::CollectorRegistry;
    use crate::routes::api::router;
    use crate::search::cache::JobCache;
    use crate::search::test_support::{Behavior, FakeCollector};
    use crate::search::{JobSearch, SearchSettings};

    fn state() -> AppState {
        let registry = CollectorRegistry::new()
            .register(FakeCollector::new("Alpha", Behavior::Returns(2)))
            .register(FakeCollector::new("Beta", Behavior::Fails));
        let search = JobSearch::new(
            registry,
            JobCache::new(TimeDelta::minutes(10)),
            SearchSettings {
                call_timeout: Duration::from_secs(5),
                recency_window: TimeDelta::hours(3),
            },
        );
        AppState {
            search: Arc::new(search),
            default_roles: Arc::new(vec!["product manager".to_string()]),
        }
    }

    async fn send(
        app: axum::Router,
        method: &str,
        uri: &str,
        body: Value,
    ) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn search_then_cached_query() {
        let state = state();

        let (status, body) = send(
            router(state.clone()),
            "POST",
            "/api/jobs/search",
            json!({ "filters": { "platform": "all" }, "sortBy": "company" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["totalJobsBeforeFilter"], 2);
        assert_eq!(body["totalJobs"], 2);
        assert_eq!(body["sortBy"], "company");
        assert_eq!(body["jobs"][0]["country"], "United States");

        let (status, body) = send(
            router(state),
            "POST",
            "/api/jobs/cached",
            json!({ "filters": { "location": "boston" } }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["totalJobsBeforeFilter"], 2);
        assert_eq!(body["totalJobs"], 0);
        assert_eq!(body["fresh"], true);
    }

    #[tokio::test]
    async fn unknown_platform_is_404() {
        let (status, body) = send(
            router(state()),
            "POST",
            "/api/jobs/search/workday",
            json!({}),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn unreadable_body_uses_defaults() {
        let request = parse_request(&Bytes::from_static(b"{not json"));
        assert!(request.roles.is_none());
        assert_eq!(request.sort(), SortSpec::default());
        assert!(parse_request(&Bytes::new()).roles.is_none());
    }

    #[tokio::test]
    async fn malformed_fields_do_not_discard_valid_ones() {
        let (status, body) = send(
            router(state()),
            "POST",
            "/api/jobs/cached",
            json!({
                "roles": "product manager",
                "filters": { "country": "Germany" },
                "sortBy": "salary"
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["filters"]["country"], "Germany");
        assert_eq!(body["sortBy"], "salary");

        let (status, body) = send(
            router(state()),
            "POST",
            "/api/jobs/cached",
            json!({ "filters": null, "sortBy": "salary", "sortOrder": "asc" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["sortBy"], "salary");
        assert_eq!(body["sortOrder"], "asc");
    }

    #[tokio::test]
    async fn platforms_lists_registry() {
        let (status, body) = send(router(state()), "GET", "/api/jobs/platforms", Value::Null).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["platforms"], json!(["Alpha", "Beta"]));
    }
}
