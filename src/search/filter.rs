use crate::models::posting::JobPosting;
use crate::models::query::JobFilters;

type Predicate = Box<dyn Fn(&JobPosting) -> bool + Send + Sync>;

/// Unset, empty and the literal `"all"` switch a predicate off. Anything else,
/// including surrounding whitespace, is matched as given.
fn active(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty() && *v != "all")
}

/// Builds only the predicates that are switched on; inactive filters never
/// enter the chain.
fn predicates(filters: &JobFilters) -> Vec<Predicate> {
    let mut chain: Vec<Predicate> = Vec::new();

    if let Some(country) = active(filters.country.as_deref()) {
        let country = country.to_string();
        chain.push(Box::new(move |p: &JobPosting| p.country == country));
    }

    if let Some(location) = active(filters.location.as_deref()) {
        let needle = location.to_lowercase();
        chain.push(Box::new(move |p: &JobPosting| p.location.to_lowercase().contains(&needle)));
    }

    if let Some(min) = filters.min_salary.filter(|m| *m > 0.0) {
        chain.push(Box::new(move |p: &JobPosting| p.salary_numeric >= min));
    }

    if let Some(job_type) = active(filters.job_type.as_deref()) {
        let needle = job_type.to_lowercase();
        chain.push(Box::new(move |p: &JobPosting| {
            p.job_type
                .as_deref()
                .is_some_and(|t| t.to_lowercase().contains(&needle))
        }));
    }

    if let Some(platform) = active(filters.platform.as_deref()) {
        let platform = platform.to_string();
        chain.push(Box::new(move |p: &JobPosting| p.platform == platform));
    }

    chain
}

pub fn apply_filters(postings: &[JobPosting], filters: &JobFilters) -> Vec<JobPosting> {
    let chain = predicates(filters);
    postings
        .iter()
        .filter(|p| chain.iter().all(|keep| keep(p)))
        .cloned()
        .collect()
}
