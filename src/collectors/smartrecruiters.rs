use async_trait::async_trait;
use serde_json::Value;

use crate::collectors::{JobCollector, collect_boards, company_from_slug, fetch_json, str_field};
use crate::error::AppError;
use crate::models::posting::{PostingExtras, RawPosting};

const BASE_URL: &str = "https://api.smartrecruiters.com/v1/companies";
const COMPANIES: &[&str] = &["visa", "bosch"];
const PAGE_LIMIT: &str = "10";

pub struct SmartRecruiters {
    client: reqwest::Client,
}

impl SmartRecruiters {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// The postings endpoint filters by role server side.
    async fn search_company(
        &self,
        company: &str,
        role: &str,
    ) -> Result<Vec<RawPosting>, AppError> {
        let url = format!("{BASE_URL}/{company}/postings");
        let data = fetch_json(
            &self.client,
            &url,
            &[("q", role), ("limit", PAGE_LIMIT), ("offset", "0")],
        )
        .await?;
        parse_postings(company, &data)
    }
}

#[async_trait]
impl JobCollector for SmartRecruiters {
    fn name(&self) -> &str {
        "smartrecruiters"
    }

    fn display_name(&self) -> &str {
        "SmartRecruiters"
    }

    async fn search(&self, role: &str) -> Result<Vec<RawPosting>, AppError> {
        collect_boards("SmartRecruiters", COMPANIES, |company| {
            self.search_company(company, role)
        })
        .await
    }
}

fn parse_postings(company: &str, data: &Value) -> Result<Vec<RawPosting>, AppError> {
    let content = data
        .get("content")
        .and_then(|v| v.as_array())
        .ok_or_else(|| {
            AppError::Source(format!("SmartRecruiters response for '{company}' has no 'content'"))
        })?;

    Ok(content
        .iter()
        .filter_map(|raw| parse_posting(company, raw))
        .collect())
}

fn parse_posting(company: &str, raw: &Value) -> Option<RawPosting> {
    let id = str_field(raw, "id")?;
    let title = str_field(raw, "name")?;
    let label = |key: &str| raw.get(key).and_then(|v| str_field(v, "label"));

    let location = raw.get("location").and_then(|loc| {
        let parts: Vec<String> = ["city", "region", "country"]
            .iter()
            .filter_map(|k| str_field(loc, k))
            .filter(|s| !s.is_empty())
            .collect();
        (!parts.is_empty()).then(|| parts.join(", "))
    });

    let company_name = raw
        .get("company")
        .and_then(|c| str_field(c, "name"))
        .unwrap_or_else(|| company_from_slug(company));

    Some(RawPosting {
        url: format!("https://jobs.smartrecruiters.com/{company}/{id}"),
        id: format!("smartrecruiters_{id}"),
        title,
        company: company_name,
        location: location.unwrap_or_else(|| "Not specified".to_string()),
        description: raw
            .pointer("/jobAd/sections/jobDescription/text")
            .and_then(|v| v.as_str())
            .unwrap_or("No description available")
            .to_string(),
        platform: "SmartRecruiters".to_string(),
        job_type: label("typeOfEmployment").or_else(|| Some("Full-time".to_string())),
        posted_date: str_field(raw, "releasedDate"),
        salary: None,
        extras: PostingExtras {
            department: label("department"),
            experience_level: label("experienceLevel"),
            ..Default::default()
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_postings() {
        let data = json!({
            "content": [{
                "id": "744000012345",
                "name": "Business Analyst",
                "releasedDate": "2026-10-18T06:12:44.000Z",
                "company": { "name": "Bosch Group" },
                "location": { "city": "Stuttgart", "region": "", "country": "de" },
                "typeOfEmployment": { "label": "Full-time" },
                "department": { "label": "IT" },
                "experienceLevel": { "label": "Mid-Senior Level" }
            }]
        });

        let jobs = parse_postings("bosch", &data).unwrap();
        assert_eq!(jobs.len(), 1);
        let job = &jobs[0];
        assert_eq!(job.company, "Bosch Group");
        assert_eq!(job.location, "Stuttgart, de");
        assert_eq!(job.url, "https://jobs.smartrecruiters.com/bosch/744000012345");
        assert_eq!(job.extras.experience_level.as_deref(), Some("Mid-Senior Level"));
    }
}
