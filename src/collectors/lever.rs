use async_trait::async_trait;
use serde_json::Value;

use crate::collectors::{
    JobCollector, collect_boards, company_from_slug, fetch_json, matches_role, str_field,
};
use crate::error::AppError;
use crate::models::posting::{PostingExtras, RawPosting};

const BASE_URL: &str = "https://api.lever.co/v0/postings";
const COMPANIES: &[&str] = &["netflix", "uber", "lyft"];

pub struct Lever {
    client: reqwest::Client,
}

impl Lever {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn search_company(
        &self,
        company: &str,
        role: &str,
    ) -> Result<Vec<RawPosting>, AppError> {
        let url = format!("{BASE_URL}/{company}");
        let data = fetch_json(&self.client, &url, &[("mode", "json")]).await?;
        let jobs = parse_postings(company, &data)?;
        Ok(jobs
            .into_iter()
            .filter(|job| matches_role(&job.title, role))
            .collect())
    }
}

#[async_trait]
impl JobCollector for Lever {
    fn name(&self) -> &str {
        "lever"
    }

    fn display_name(&self) -> &str {
        "Lever"
    }

    async fn search(&self, role: &str) -> Result<Vec<RawPosting>, AppError> {
        collect_boards("Lever", COMPANIES, |company| {
            self.search_company(company, role)
        })
        .await
    }
}

/// Lever returns a bare array of postings.
fn parse_postings(company: &str, data: &Value) -> Result<Vec<RawPosting>, AppError> {
    let postings = data.as_array().ok_or_else(|| {
        AppError::Source(format!("Lever response for '{company}' is not an array"))
    })?;

    Ok(postings
        .iter()
        .filter_map(|raw| parse_posting(company, raw))
        .collect())
}

fn parse_posting(company: &str, raw: &Value) -> Option<RawPosting> {
    let id = str_field(raw, "id")?;
    let title = str_field(raw, "text")?;
    let url = str_field(raw, "hostedUrl")?;
    let categories = raw.get("categories");
    let category = |key: &str| categories.and_then(|c| str_field(c, key));

    // createdAt is epoch milliseconds; enrichment parses it.
    let posted_date = raw
        .get("createdAt")
        .and_then(|v| v.as_i64())
        .map(|ms| ms.to_string());

    Some(RawPosting {
        id: format!("lever_{id}"),
        title,
        company: company_from_slug(company),
        location: category("location").unwrap_or_else(|| "Not specified".to_string()),
        description: str_field(raw, "descriptionPlain")
            .or_else(|| str_field(raw, "description"))
            .unwrap_or_else(|| "No description available".to_string()),
        url,
        platform: "Lever".to_string(),
        job_type: category("commitment").or_else(|| Some("Full-time".to_string())),
        posted_date,
        salary: None,
        extras: PostingExtras {
            department: category("department"),
            ..Default::default()
        },
    })
}
