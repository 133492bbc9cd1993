//! Derives structured fields (country, numeric salary, posted timestamp)
//! from the free text a source hands us. Pure functions, no I/O.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use regex::Regex;

use crate::models::posting::{JobPosting, RawPosting};

pub const REMOTE: &str = "Remote";
pub const OTHER: &str = "Other";

const EUR_TO_USD: f64 = 1.10;
const GBP_TO_USD: f64 = 1.25;

/// Country match table. Order matters: the first country with a matching
/// fragment wins. Fragments are matched case-sensitively so that state codes
/// like "IN" or "OR" only hit when written as codes.
static COUNTRY_TABLE: &[(&str, &[&str])] = &[
    (
        "United States",
        &[
            "US", "USA", "United States", "CA", "NY", "TX", "FL", "WA", "IL", "MA", "GA", "NC",
            "VA", "NJ", "PA", "OH", "MI", "TN", "AZ", "IN", "MO", "MD", "WI", "MN", "CO", "AL",
            "SC", "LA", "KY", "OR", "OK", "CT", "UT", "IA", "NV", "AR", "MS", "KS", "NM", "NE",
            "WV", "ID", "HI", "NH", "ME", "MT", "RI", "DE", "SD", "ND", "AK", "VT", "WY",
        ],
    ),
    (
        "United Kingdom",
        &[
            "UK", "United Kingdom", "England", "Scotland", "Wales", "Northern Ireland", "London",
            "Manchester", "Birmingham", "Leeds", "Glasgow", "Sheffield", "Bradford", "Liverpool",
            "Edinburgh",
        ],
    ),
    (
        "Canada",
        &[
            "Canada", "Toronto", "Vancouver", "Montreal", "Calgary", "Ottawa", "Edmonton",
            "Mississauga", "Winnipeg", "Quebec",
        ],
    ),
    (
        "Germany",
        &[
            "Germany", "Deutschland", "Berlin", "Munich", "Frankfurt", "Hamburg", "Cologne",
            "Stuttgart", "Düsseldorf",
        ],
    ),
    (
        "France",
        &["France", "Paris", "Lyon", "Marseille", "Toulouse", "Nice", "Nantes", "Strasbourg"],
    ),
    (
        "Netherlands",
        &["Netherlands", "Holland", "Amsterdam", "Rotterdam", "The Hague", "Utrecht", "Eindhoven"],
    ),
    (
        "Australia",
        &["Australia", "Sydney", "Melbourne", "Brisbane", "Perth", "Adelaide", "Gold Coast"],
    ),
    (
        "India",
        &["India", "Mumbai", "Delhi", "Bangalore", "Hyderabad", "Chennai", "Kolkata", "Pune"],
    ),
    ("Singapore", &["Singapore"]),
    ("Ireland", &["Ireland", "Dublin", "Cork", "Limerick", "Galway"]),
    (
        "Spain",
        &["Spain", "España", "Madrid", "Barcelona", "Valencia", "Seville", "Bilbao"],
    ),
    ("Sweden", &["Sweden", "Stockholm", "Gothenberg", "Malmö"]),
    ("Switzerland", &["Switzerland", "Zurich", "Geneva", "Basel", "Bern"]),
    ("Italy", &["Italy", "Italia", "Rome", "Milan", "Naples", "Turin", "Florence"]),
    ("Japan", &["Japan", "Tokyo", "Osaka", "Kyoto", "Nagoya", "Yokohama"]),
    ("South Korea", &["South Korea", "Korea", "Seoul", "Busan", "Incheon"]),
    ("China", &["China", "Beijing", "Shanghai", "Guangzhou", "Shenzhen"]),
    ("Brazil", &["Brazil", "São Paulo", "Rio de Janeiro", "Brasília"]),
    ("Mexico", &["Mexico", "Mexico City", "Guadalajara", "Monterrey"]),
    ("Argentina", &["Argentina", "Buenos Aires", "Córdoba", "Rosario"]),
    ("Chile", &["Chile", "Santiago", "Valparaíso"]),
    ("Colombia", &["Colombia", "Bogotá", "Medellín", "Cali"]),
    ("Norway", &["Norway", "Oslo", "Bergen", "Trondheim"]),
    ("Denmark", &["Denmark", "Copenhagen", "Aarhus", "Odense"]),
    ("Finland", &["Finland", "Helsinki", "Tampere", "Turku"]),
    ("Belgium", &["Belgium", "Brussels", "Antwerp", "Ghent"]),
    ("Austria", &["Austria", "Vienna", "Salzburg", "Innsbruck"]),
    ("Poland", &["Poland", "Warsaw", "Krakow", "Gdansk"]),
    ("Czech Republic", &["Czech Republic", "Prague", "Brno"]),
    ("Portugal", &["Portugal", "Lisbon", "Porto"]),
    ("Israel", &["Israel", "Tel Aviv", "Jerusalem", "Haifa"]),
    (
        "United Arab Emirates",
        &["UAE", "United Arab Emirates", "Dubai", "Abu Dhabi"],
    ),
    ("South Africa", &["South Africa", "Cape Town", "Johannesburg", "Durban"]),
    ("New Zealand", &["New Zealand", "Auckland", "Wellington", "Christchurch"]),
    ("Russia", &["Russia", "Moscow", "St. Petersburg", "Novosibirsk"]),
    ("Turkey", &["Turkey", "Istanbul", "Ankara", "Izmir"]),
    ("Thailand", &["Thailand", "Bangkok", "Chiang Mai"]),
    ("Vietnam", &["Vietnam", "Ho Chi Minh City", "Hanoi"]),
    ("Philippines", &["Philippines", "Manila", "Cebu", "Davao"]),
    ("Indonesia", &["Indonesia", "Jakarta", "Surabaya", "Bandung"]),
    ("Malaysia", &["Malaysia", "Kuala Lumpur", "Penang", "Johor Bahru"]),
    ("Egypt", &["Egypt", "Cairo", "Alexandria"]),
    ("Nigeria", &["Nigeria", "Lagos", "Abuja", "Kano"]),
    ("Kenya", &["Kenya", "Nairobi", "Mombasa"]),
    ("Ghana", &["Ghana", "Accra", "Kumasi"]),
];

static SALARY_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d[\d,]*").expect("salary pattern is valid")
});

/// Every country a posting can be assigned, in display order.
pub fn all_countries() -> Vec<&'static str> {
    std::iter::once(REMOTE)
        .chain(COUNTRY_TABLE.iter().map(|(country, _)| *country))
        .chain(std::iter::once(OTHER))
        .collect()
}

pub fn extract_country(location: &str) -> String {
    let lower = location.to_lowercase();
    if lower.contains("remote") || lower.contains("worldwide") {
        return REMOTE.to_string();
    }

    COUNTRY_TABLE
        .iter()
        .find(|(_, fragments)| fragments.iter().any(|f| location.contains(f)))
        .map(|(country, _)| (*country).to_string())
        .unwrap_or_else(|| OTHER.to_string())
}

/// Low end of a salary range in USD, or 0 when nothing numeric is present.
pub fn parse_salary(salary: Option<&str>) -> f64 {
    let Some(text) = salary else {
        return 0.0;
    };
    let Some(m) = SALARY_NUMBER.find(text) else {
        return 0.0;
    };
    let Ok(amount) = m.as_str().replace(',', "").parse::<f64>() else {
        return 0.0;
    };

    let rate = if text.contains('€') {
        EUR_TO_USD
    } else if text.contains('£') {
        GBP_TO_USD
    } else {
        1.0
    };

    // Round to cents so 80,000 EUR reads as 88000 rather than 88000.00000000001.
    (amount * rate * 100.0).round() / 100.0
}

/// Parses the date formats sources hand back: RFC 3339, naive ISO datetimes
/// (taken as UTC), plain dates and epoch milliseconds.
pub fn parse_posted_date(raw: Option<&str>) -> Option<DateTime<Utc>> {
    let text = raw?.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, fmt) {
            return Some(naive.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
    }
    if let Ok(millis) = text.parse::<i64>() {
        return Utc.timestamp_millis_opt(millis).single();
    }

    None
}

pub fn enrich(raw: RawPosting) -> JobPosting {
    let country = extract_country(&raw.location);
    let salary_numeric = parse_salary(raw.salary.as_deref());
    let posted_date = parse_posted_date(raw.posted_date.as_deref());
    let id = if raw.id.is_empty() {
        format!("{}_{}", raw.platform.to_lowercase(), uuid::Uuid::new_v4())
    } else {
        raw.id
    };

    JobPosting {
        id,
        title: raw.title,
        company: raw.company,
        location: raw.location,
        description: raw.description,
        url: raw.url,
        platform: raw.platform,
        job_type: raw.job_type,
        posted_date,
        country,
        salary: raw.salary,
        salary_numeric,
        extras: raw.extras,
    }
}
