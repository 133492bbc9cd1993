use std::time::Duration;

use chrono::TimeDelta;
use clap::Parser;

use crate::search::SearchSettings;

#[derive(Parser, Debug, Clone)]
#[command(name = "job-radar", about = "Fresh job postings aggregated from many platforms")]
pub struct Config {
    /// Roles searched by scheduled runs and by requests that name none
    #[arg(
        long,
        env = "SEARCH_ROLES",
        value_delimiter = ',',
        default_value = "product manager,project manager,business analyst"
    )]
    pub roles: Vec<String>,

    /// Seconds between scheduled aggregation runs
    #[arg(long, env = "REFRESH_INTERVAL_SECS", default_value = "900")]
    pub refresh_interval_secs: u64,

    /// Seconds to wait before the first scheduled run
    #[arg(long, env = "STARTUP_DELAY_SECS", default_value = "10")]
    pub startup_delay_secs: u64,

    /// Upper bound for one platform call for one role
    #[arg(long, env = "SOURCE_TIMEOUT_SECS", default_value = "20")]
    pub call_timeout_secs: u64,

    /// Timeout for individual HTTP requests made by collectors
    #[arg(long, env = "HTTP_TIMEOUT_SECS", default_value = "10")]
    pub http_timeout_secs: u64,

    /// Postings older than this many hours are dropped
    #[arg(long, env = "RECENCY_WINDOW_HOURS", default_value = "3")]
    pub recency_window_hours: i64,

    /// Age after which the cached set is reported as stale
    #[arg(long, env = "FRESHNESS_WINDOW_SECS", default_value = "600")]
    pub freshness_window_secs: i64,

    /// Emit logs as JSON lines
    #[arg(long, env = "LOG_JSON", default_value = "false")]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(clap::Subcommand, Debug, Clone)]
pub enum Command {
    /// Start the web server and scheduler (default when no subcommand given)
    Serve {
        /// Listen address
        #[arg(long, env = "LISTEN_ADDR", default_value = "0.0.0.0:5000")]
        listen_addr: String,

        /// Serve only; never refresh the cache on a timer
        #[arg(long)]
        no_scheduler: bool,
    },
    /// Run one aggregation and print the result as JSON
    Search {
        /// Query a single platform instead of all of them
        #[arg(long)]
        platform: Option<String>,

        #[arg(long)]
        country: Option<String>,

        #[arg(long)]
        location: Option<String>,

        #[arg(long)]
        min_salary: Option<f64>,

        #[arg(long)]
        job_type: Option<String>,

        /// date, salary, company, location or platform
        #[arg(long, default_value = "date")]
        sort_by: String,

        /// asc or desc
        #[arg(long, default_value = "desc")]
        sort_order: String,
    },
}

impl Config {
    /// Resolve the command, defaulting to Serve if none specified.
    pub fn resolved_command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Serve {
            listen_addr: std::env::var("LISTEN_ADDR")
                .unwrap_or_else(|_| "0.0.0.0:5000".to_string()),
            no_scheduler: false,
        })
    }

    pub fn search_settings(&self) -> SearchSettings {
        SearchSettings {
            call_timeout: Duration::from_secs(self.call_timeout_secs),
            recency_window: TimeDelta::hours(self.recency_window_hours),
        }
    }

    pub fn freshness_window(&self) -> TimeDelta {
        TimeDelta::seconds(self.freshness_window_secs)
    }

    /// Configured roles with surrounding whitespace and blanks removed.
    pub fn default_roles(&self) -> Vec<String> {
        self.roles
            .iter()
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_scheduling_contract() {
        let config = Config::parse_from(["job-radar"]);
        assert_eq!(config.refresh_interval_secs, 900);
        assert_eq!(config.search_settings().recency_window, TimeDelta::hours(3));
        assert_eq!(
            config.default_roles(),
            ["product manager", "project manager", "business analyst"]
        );
        assert!(matches!(config.resolved_command(), Command::Serve { .. }));
    }

    #[test]
    fn search_subcommand_parses_filters() {
        let config = Config::parse_from([
            "job-radar",
            "--roles",
            "data analyst, ",
            "search",
            "--country",
            "Germany",
            "--sort-by",
            "salary",
        ]);
        assert_eq!(config.default_roles(), ["data analyst"]);
        match config.resolved_command() {
            Command::Search {
                country, sort_by, ..
            } => {
                assert_eq!(country.as_deref(), Some("Germany"));
                assert_eq!(sort_by, "salary");
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
