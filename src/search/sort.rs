use std::cmp::Ordering;

use crate::models::posting::JobPosting;
use crate::models::query::{SortKey, SortOrder, SortSpec};

fn directed(ordering: Ordering, order: SortOrder) -> Ordering {
    match order {
        SortOrder::Asc => ordering,
        SortOrder::Desc => ordering.reverse(),
    }
}

fn text_cmp(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

fn compare(a: &JobPosting, b: &JobPosting, sort: SortSpec) -> Ordering {
    match sort.sort_by {
        // Undated postings go last in either direction.
        SortKey::Date => match (a.posted_date, b.posted_date) {
            (Some(x), Some(y)) => directed(x.cmp(&y), sort.sort_order),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        },
        SortKey::Salary => directed(
            a.salary_numeric.total_cmp(&b.salary_numeric),
            sort.sort_order,
        ),
        SortKey::Company => directed(text_cmp(&a.company, &b.company), sort.sort_order),
        SortKey::Location => directed(text_cmp(&a.location, &b.location), sort.sort_order),
        SortKey::Platform => directed(text_cmp(&a.platform, &b.platform), sort.sort_order),
    }
}

/// Stable sort into a new vector; equal keys keep their input order.
pub fn sort_postings(postings: &[JobPosting], sort: SortSpec) -> Vec<JobPosting> {
    let mut sorted = postings.to_vec();
    sorted.sort_by(|a, b| compare(a, b, sort));
    sorted
}
