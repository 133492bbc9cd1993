// Platform collectors: one implementation per sourcing platform, looked up
// by identifier through the registry.

pub mod greenhouse;
pub mod lever;
pub mod runner;
pub mod smartrecruiters;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use serde_json::Value;

use crate::error::AppError;
use crate::models::posting::RawPosting;

/// Trait that all job collectors must implement.
/// Each collector queries one external platform for a single role and returns
/// the postings it found, unnormalized.
#[async_trait]
pub trait JobCollector: Send + Sync {
    /// Lower-case identifier used for registry lookup, e.g. "greenhouse".
    fn name(&self) -> &str;

    /// Name stamped on each posting's `platform` field.
    fn display_name(&self) -> &str;

    async fn search(&self, role: &str) -> Result<Vec<RawPosting>, AppError>;
}

/// Ordered set of collectors. Iteration order is registration order, which
/// fixes the merge order of an aggregation run.
#[derive(Clone, Default)]
pub struct CollectorRegistry {
    collectors: Vec<Arc<dyn JobCollector>>,
}

impl CollectorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in HTTP collectors sharing one client.
    pub fn with_defaults(http_timeout: Duration) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .timeout(http_timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self::new()
            .register(greenhouse::Greenhouse::new(client.clone()))
            .register(lever::Lever::new(client.clone()))
            .register(smartrecruiters::SmartRecruiters::new(client)))
    }

    /// Adds a collector. A later registration with the same name replaces the
    /// earlier one in place.
    pub fn register(mut self, collector: impl JobCollector + 'static) -> Self {
        let collector: Arc<dyn JobCollector> = Arc::new(collector);
        match self
            .collectors
            .iter_mut()
            .find(|c| c.name() == collector.name())
        {
            Some(slot) => *slot = collector,
            None => self.collectors.push(collector),
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn JobCollector>> {
        self.collectors
            .iter()
            .find(|c| {
                c.name().eq_ignore_ascii_case(name) || c.display_name().eq_ignore_ascii_case(name)
            })
            .cloned()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn JobCollector>> {
        self.collectors.iter()
    }

    pub fn display_names(&self) -> Vec<String> {
        self.collectors
            .iter()
            .map(|c| c.display_name().to_string())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.collectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collectors.is_empty()
    }
}

/// A title matches when it contains every word of the role.
pub(crate) fn matches_role(title: &str, role: &str) -> bool {
    let title = title.to_lowercase();
    role.to_lowercase()
        .split_whitespace()
        .all(|keyword| title.contains(keyword))
}

/// "airbnb" -> "Airbnb"
pub(crate) fn company_from_slug(slug: &str) -> String {
    let mut chars = slug.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub(crate) fn str_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(|v| v.as_str()).map(String::from)
}

/// GET a JSON document, mapping non-2xx statuses to a source error.
pub(crate) async fn fetch_json(
    client: &reqwest::Client,
    url: &str,
    query: &[(&str, &str)],
) -> Result<Value, AppError> {
    let resp = client
        .get(url)
        .query(query)
        .header("Accept", "application/json")
        .send()
        .await?;

    if !resp.status().is_success() {
        return Err(AppError::Source(format!("{url} returned {}", resp.status())));
    }

    Ok(resp.json().await?)
}

/// Runs one request per board concurrently and merges the results in board
/// order. Individual board failures are logged and skipped; the call only
/// fails when every board failed.
pub(crate) async fn collect_boards<F, Fut>(
    platform: &str,
    boards: &[&'static str],
    fetch_board: F,
) -> Result<Vec<RawPosting>, AppError>
where
    F: Fn(&'static str) -> Fut,
    Fut: Future<Output = Result<Vec<RawPosting>, AppError>>,
{
    let results = join_all(boards.iter().map(|&board| fetch_board(board))).await;

    let mut jobs = Vec::new();
    let mut succeeded = 0usize;
    let mut last_error = None;
    for (board, result) in boards.iter().zip(results) {
        match result {
            Ok(found) => {
                succeeded += 1;
                jobs.extend(found);
            }
            Err(e) => {
                tracing::warn!("{platform}: board '{board}' failed: {e}");
                last_error = Some(e);
            }
        }
    }

    match last_error {
        Some(e) if succeeded == 0 => Err(e),
        _ => Ok(jobs),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Named(&'static str, &'static str);

    #[async_trait]
    impl JobCollector for Named {
        fn name(&self) -> &str {
            self.0
        }
        fn display_name(&self) -> &str {
            self.1
        }
        async fn search(&self, _role: &str) -> Result<Vec<RawPosting>, AppError> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn registry_keeps_order_and_replaces_by_name() {
        let registry = CollectorRegistry::new()
            .register(Named("b", "B"))
            .register(Named("a", "A"))
            .register(Named("b", "B2"));

        assert_eq!(registry.display_names(), ["B2", "A"]);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn lookup_by_name_or_display_name() {
        let registry =
            CollectorRegistry::new().register(Named("smartrecruiters", "SmartRecruiters"));
        assert!(registry.get("SmartRecruiters").is_some());
        assert!(registry.get("SMARTRECRUITERS").is_some());
        assert!(registry.get("workday").is_none());
    }

    #[test]
    fn role_matching_needs_every_keyword() {
        assert!(matches_role("Senior Product Manager, Payments", "product manager"));
        assert!(!matches_role("Product Designer", "product manager"));
    }

    #[tokio::test]
    async fn boards_fail_only_when_all_fail() {
        let partial = collect_boards("test", &["ok", "bad"], |board| async move {
            if board == "bad" {
                Err(AppError::Source("down".into()))
            } else {
                Ok(vec![RawPosting {
                    title: format!("PM at {board}"),
                    ..Default::default()
                }])
            }
        })
        .await
        .unwrap();
        assert_eq!(partial.len(), 1);

        let all_bad = collect_boards("test", &["x", "y"], |_| async {
            Err::<Vec<RawPosting>, _>(AppError::Source("down".into()))
        })
        .await;
        assert!(all_bad.is_err());
    }

    #[test]
    fn slug_is_capitalized() {
        assert_eq!(company_from_slug("airbnb"), "Airbnb");
        assert_eq!(company_from_slug(""), "");
    }
}
