use async_trait::async_trait;
use serde_json::Value;

use crate::collectors::{
    JobCollector, collect_boards, company_from_slug, fetch_json, matches_role, str_field,
};
use crate::error::AppError;
use crate::models::posting::{PostingExtras, RawPosting};

const BASE_URL: &str = "https://boards-api.greenhouse.io/v1/boards";

/// Public job boards queried on every search.
const BOARDS: &[&str] = &["airbnb", "stripe", "coinbase"];

pub struct Greenhouse {
    client: reqwest::Client,
}

impl Greenhouse {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn search_board(&self, board: &str, role: &str) -> Result<Vec<RawPosting>, AppError> {
        let url = format!("{BASE_URL}/{board}/jobs");
        let data = fetch_json(&self.client, &url, &[("content", "true")]).await?;
        let jobs = parse_board(board, &data)?;
        Ok(jobs
            .into_iter()
            .filter(|job| matches_role(&job.title, role))
            .collect())
    }
}

#[async_trait]
impl JobCollector for Greenhouse {
    fn name(&self) -> &str {
        "greenhouse"
    }

    fn display_name(&self) -> &str {
        "Greenhouse"
    }

    async fn search(&self, role: &str) -> Result<Vec<RawPosting>, AppError> {
        collect_boards("Greenhouse", BOARDS, |board| self.search_board(board, role)).await
    }
}

fn parse_board(board: &str, data: &Value) -> Result<Vec<RawPosting>, AppError> {
    let jobs = data
        .get("jobs")
        .and_then(|v| v.as_array())
        .ok_or_else(|| AppError::Source(format!("Greenhouse board '{board}' has no 'jobs'")))?;

    Ok(jobs.iter().filter_map(|raw| parse_job(board, raw)).collect())
}

fn parse_job(board: &str, raw: &Value) -> Option<RawPosting> {
    let id = raw.get("id").and_then(|v| v.as_u64())?;
    let title = str_field(raw, "title")?;
    let url = str_field(raw, "absolute_url")?;

    let location = raw
        .get("location")
        .and_then(|l| str_field(l, "name"))
        .unwrap_or_else(|| "Not specified".to_string());

    let department = raw
        .get("departments")
        .and_then(|v| v.as_array())
        .and_then(|a| a.first())
        .and_then(|d| str_field(d, "name"));

    Some(RawPosting {
        id: format!("greenhouse_{id}"),
        title,
        company: company_from_slug(board),
        location,
        description: str_field(raw, "content")
            .unwrap_or_else(|| "No description available".to_string()),
        url,
        platform: "Greenhouse".to_string(),
        job_type: Some("Full-time".to_string()),
        posted_date: str_field(raw, "updated_at"),
        salary: None,
        extras: PostingExtras {
            department,
            ..Default::default()
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_board_response() {
        let data = json!({
            "jobs": [
                {
                    "id": 4012345,
                    "title": "Senior Product Manager",
                    "absolute_url": "https://boards.greenhouse.io/stripe/jobs/4012345",
                    "location": { "name": "San Francisco, CA" },
                    "updated_at": "2026-10-18T07:15:00-04:00",
                    "content": "&lt;p&gt;Own the roadmap&lt;/p&gt;",
                    "departments": [{ "name": "Product" }]
                },
                { "id": 99, "title": "Missing url" }
            ]
        });

        let jobs = parse_board("stripe", &data).unwrap();
        assert_eq!(jobs.len(), 1);
        let job = &jobs[0];
        assert_eq!(job.id, "greenhouse_4012345");
        assert_eq!(job.company, "Stripe");
        assert_eq!(job.location, "San Francisco, CA");
        assert_eq!(job.posted_date.as_deref(), Some("2026-10-18T07:15:00-04:00"));
        assert_eq!(job.extras.department.as_deref(), Some("Product"));
    }

    #[test]
    fn malformed_board_is_an_error() {
        assert!(parse_board("stripe", &json!({ "error": "nope" })).is_err());
    }
}
