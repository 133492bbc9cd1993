use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Optional enrichment some sources attach to a posting. Carried through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostingExtras {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skills: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub benefits: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_size: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub industry_tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub funding: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experience_level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub h1b_sponsorship: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
}

/// A posting exactly as a collector reported it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPosting {
    #[serde(default)]
    pub id: String,
    pub title: String,
    pub company: String,
    pub location: String,
    #[serde(default)]
    pub description: String,
    pub url: String,
    pub platform: String,
    #[serde(rename = "type", default)]
    pub job_type: Option<String>,
    /// Source text; parsed during enrichment.
    #[serde(default)]
    pub posted_date: Option<String>,
    #[serde(default)]
    pub salary: Option<String>,
    #[serde(flatten)]
    pub extras: PostingExtras,
}

/// An enriched posting as served from the cache.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPosting {
    pub id: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub description: String,
    pub url: String,
    pub platform: String,
    #[serde(rename = "type")]
    pub job_type: Option<String>,
    pub posted_date: Option<DateTime<Utc>>,
    pub country: String,
    pub salary: Option<String>,
    pub salary_numeric: f64,
    #[serde(flatten)]
    pub extras: PostingExtras,
}

/// Output of one aggregation run. Never mutated once built.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregationResult {
    pub jobs: Vec<JobPosting>,
    /// Postings merged from all sources before recency filtering and dedup.
    pub raw_count: usize,
    pub completed_at: DateTime<Utc>,
}

impl AggregationResult {
    #[cfg(test)]
    pub fn empty(completed_at: DateTime<Utc>) -> Self {
        Self {
            jobs: Vec::new(),
            raw_count: 0,
            completed_at,
        }
    }
}
