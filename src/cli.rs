//! CLI interface for oaistat
//!
//! This module defines the command-line interface using clap.
//!
//! # Example
//!
//! ```bash
//! # Usage for one day from the API
//! oaistat fetch --date 2024-10-02
//!
//! # A week of API usage, most expensive models first
//! oaistat --sort cost fetch --date 2024-09-26 --until 2024-10-02
//!
//! # A CSV export, restricted to October, as JSON
//! oaistat --json file usage.csv --since 2024-10-01 --until 2024-10-31
//!
//! # Show the active pricing snapshot
//! oaistat pricing
//! ```

use crate::filters::parse_date;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use oaistat_core::aggregation_types::SortKey;
use oaistat_provider_api::data_loader::DEFAULT_BASE_URL;
use std::path::PathBuf;

/// Summarize OpenAI API usage and cost
#[derive(Parser, Debug, Clone)]
#[command(name = "oaistat")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Show informational output (default shows only warnings and errors)
    #[arg(long, short = 'v', global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Show errors only
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Pricing snapshot file (overrides $OAISTAT_PRICING and the config directory)
    #[arg(long, global = true, value_name = "PATH")]
    pub pricing: Option<PathBuf>,

    /// Row ordering: model, cost, or calls
    #[arg(long, default_value = "model", global = true)]
    pub sort: SortKey,

    /// Timezone for calendar days (e.g. "America/New_York", "UTC", "local"); defaults to UTC
    #[arg(long, short = 'z', global = true)]
    pub timezone: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Fetch usage from the API
    Fetch(FetchArgs),

    /// Read usage from a CSV export
    File(FileArgs),

    /// Show the active pricing snapshot
    Pricing,
}

/// Arguments for `fetch`
#[derive(Args, Debug, Clone)]
pub struct FetchArgs {
    /// Day to fetch, or the first day of a range (YYYY-MM-DD)
    #[arg(long, value_parser = parse_cli_date)]
    pub date: NaiveDate,

    /// Last day of the range, inclusive (YYYY-MM-DD)
    #[arg(long, value_parser = parse_cli_date)]
    pub until: Option<NaiveDate>,

    /// API key
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// JSON config file holding API_KEY
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// API host
    #[arg(long, env = "OAISTAT_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,
}

/// Arguments for `file`
#[derive(Args, Debug, Clone)]
pub struct FileArgs {
    /// CSV usage export
    pub path: PathBuf,

    /// Keep records on or after this day (YYYY-MM-DD)
    #[arg(long, value_parser = parse_cli_date)]
    pub since: Option<NaiveDate>,

    /// Keep records on or before this day (YYYY-MM-DD)
    #[arg(long, value_parser = parse_cli_date)]
    pub until: Option<NaiveDate>,
}

fn parse_cli_date(s: &str) -> std::result::Result<NaiveDate, String> {
    parse_date(s).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_fetch_parsing() {
        let cli = Cli::parse_from([
            "oaistat",
            "fetch",
            "--date",
            "2024-10-01",
            "--until",
            "2024-10-02",
            "--api-key",
            "sk-test",
        ]);
        match cli.command {
            Command::Fetch(args) => {
                assert_eq!(args.date, NaiveDate::from_ymd_opt(2024, 10, 1).unwrap());
                assert_eq!(args.until, NaiveDate::from_ymd_opt(2024, 10, 2));
                assert_eq!(args.api_key.as_deref(), Some("sk-test"));
                assert_eq!(args.base_url, DEFAULT_BASE_URL);
            }
            _ => panic!("Expected Fetch command"),
        }
    }

    #[test]
    fn test_file_parsing_with_global_flags() {
        let cli = Cli::parse_from([
            "oaistat",
            "file",
            "usage.csv",
            "--since",
            "2024-10-01",
            "--json",
            "--sort",
            "cost",
            "-z",
            "Asia/Tokyo",
        ]);
        assert!(cli.json);
        assert_eq!(cli.sort, SortKey::Cost);
        assert_eq!(cli.timezone.as_deref(), Some("Asia/Tokyo"));
        match cli.command {
            Command::File(args) => {
                assert_eq!(args.path, PathBuf::from("usage.csv"));
                assert!(args.since.is_some());
                assert!(args.until.is_none());
            }
            _ => panic!("Expected File command"),
        }
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["oaistat", "pricing"]);
        assert!(matches!(cli.command, Command::Pricing));
        assert_eq!(cli.sort, SortKey::Model);
        assert!(!cli.json && !cli.verbose && !cli.quiet);
        assert!(cli.pricing.is_none());
    }

    #[test]
    fn test_invalid_date_rejected() {
        let result = Cli::try_parse_from(["oaistat", "fetch", "--date", "yesterday"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        let result = Cli::try_parse_from(["oaistat", "-v", "-q", "pricing"]);
        assert!(result.is_err());
    }
}
