use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::models::posting::JobPosting;

/// Field predicates applied to a posting set. Every field is optional;
/// `"all"` and empty strings switch a predicate off.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobFilters {
    #[serde(default, deserialize_with = "lenient_string")]
    pub country: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub min_salary: Option<f64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub job_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub platform: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Date,
    Salary,
    Company,
    Location,
    Platform,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn parse(order: Option<&str>) -> Self {
        match order.map(|o| o.trim().to_ascii_lowercase()).as_deref() {
            Some("asc") => SortOrder::Asc,
            _ => SortOrder::Desc,
        }
    }
}

/// Resolved sort request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SortSpec {
    pub sort_by: SortKey,
    pub sort_order: SortOrder,
}

impl SortSpec {
    /// Unknown keys fall back to newest-first, whatever order was asked for.
    pub fn parse(sort_by: Option<&str>, sort_order: Option<&str>) -> Self {
        let key = match sort_by.map(|k| k.trim().to_ascii_lowercase()).as_deref() {
            None | Some("") | Some("date") => Some(SortKey::Date),
            Some("salary") => Some(SortKey::Salary),
            Some("company") => Some(SortKey::Company),
            Some("location") => Some(SortKey::Location),
            Some("platform") => Some(SortKey::Platform),
            Some(other) => {
                tracing::debug!("Unknown sort key '{other}', using date desc");
                None
            }
        };

        match key {
            Some(sort_by) => Self {
                sort_by,
                sort_order: SortOrder::parse(sort_order),
            },
            None => Self::default(),
        }
    }
}

/// Body accepted by the search and cached-query endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    #[serde(default, deserialize_with = "lenient_roles")]
    pub roles: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient_filters")]
    pub filters: JobFilters,
    #[serde(default, deserialize_with = "lenient_string")]
    pub sort_by: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub sort_order: Option<String>,
}

impl SearchRequest {
    pub fn sort(&self) -> SortSpec {
        SortSpec::parse(self.sort_by.as_deref(), self.sort_order.as_deref())
    }

    /// Requested roles with blanks dropped, or the defaults when none remain.
    pub fn roles_or(&self, defaults: &[String]) -> Vec<String> {
        let roles: Vec<String> = self
            .roles
            .iter()
            .flatten()
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .collect();
        if roles.is_empty() {
            defaults.to_vec()
        } else {
            roles
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub success: bool,
    pub timestamp: DateTime<Utc>,
    pub total_jobs: usize,
    pub total_jobs_before_filter: usize,
    pub filters: JobFilters,
    #[serde(flatten)]
    pub sort: SortSpec,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fresh: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_refresh: Option<DateTime<Utc>>,
    pub jobs: Vec<JobPosting>,
}

/// Accepts strings, numbers and booleans as text; anything else is treated as absent.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

/// A list keeps its string entries, a lone string is a single role, anything
/// else is absent.
fn lenient_roles<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Array(items)) => Some(
            items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s),
                    _ => None,
                })
                .collect(),
        ),
        Some(Value::String(s)) => Some(vec![s]),
        _ => None,
    })
}

/// Anything but an object means no filters.
fn lenient_filters<'de, D>(deserializer: D) -> Result<JobFilters, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(object @ Value::Object(_)) => serde_json::from_value(object).unwrap_or_default(),
        _ => JobFilters::default(),
    })
}

/// Accepts numbers and numeric strings; anything else is treated as absent.
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}
