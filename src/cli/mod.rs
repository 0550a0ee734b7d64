//! Command-line interface

use crate::{error::Result, types::Verbosity};
use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// webping - measure and rank network latency to a set of hosts
#[derive(Parser, Debug, Clone)]
#[command(name = "webping")]
#[command(about, long_about = None)]
#[command(disable_version_flag = true)]
pub struct Cli {
    /// Number of measurement waves
    #[arg(long, value_name = "N")]
    pub repeats: Option<u32>,

    /// Use HTTP transport (default is TCP)
    #[arg(long)]
    pub http: bool,

    /// Use HTTPS transport; wins over --http
    #[arg(long)]
    pub https: bool,

    /// Verbosity level (0: name-latency; 1: index-host-name-latency; 2: per-attempt breakdown)
    #[arg(long, value_name = "LEVEL", default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=2))]
    pub verbose: u8,

    /// Show the list of hosts and exit
    #[arg(long)]
    pub list_regions: bool,

    /// Show version and exit
    #[arg(short = 'v', long)]
    pub version: bool,

    /// Host to measure as NAME=HOST (repeatable, replaces the catalog)
    #[arg(long = "host", value_name = "NAME=HOST", action = ArgAction::Append)]
    pub hosts: Vec<String>,

    /// JSON file with [{"name": .., "host": ..}] entries
    #[arg(long, value_name = "PATH")]
    pub hosts_file: Option<PathBuf>,

    /// Per-probe timeout in seconds, 0 disables it
    #[arg(long, value_name = "SECONDS", value_parser = parse_timeout)]
    pub timeout: Option<u64>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Enable debug logging (JSON, to stderr)
    #[arg(long)]
    pub debug: bool,
}

impl Cli {
    /// Rendering chosen by `--list-regions` and `--verbose`
    pub fn verbosity(&self) -> Result<Verbosity> {
        if self.list_regions {
            Ok(Verbosity::Regions)
        } else {
            Verbosity::from_level(self.verbose)
        }
    }

    /// Check if colors should be enabled
    pub fn use_colors(&self) -> bool {
        !self.no_color && supports_color()
    }
}

fn parse_timeout(s: &str) -> std::result::Result<u64, String> {
    if s.starts_with('+') {
        return Err(format!("Invalid timeout: {}", s));
    }

    s.parse::<u64>()
        .map_err(|_| format!("Invalid timeout: {}", s))
        .and_then(|secs| {
            if secs > 300 {
                Err("Timeout cannot exceed 300 seconds".to_string())
            } else {
                Ok(secs)
            }
        })
}

/// Check if the terminal supports color output
fn supports_color() -> bool {
    if let Ok(term) = std::env::var("TERM") {
        if term == "dumb" {
            return false;
        }
    }

    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }

    cfg!(unix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["webping"]);
        assert_eq!(cli.repeats, None);
        assert!(!cli.http);
        assert!(!cli.https);
        assert_eq!(cli.verbose, 0);
        assert!(!cli.list_regions);
        assert!(!cli.version);
        assert!(cli.hosts.is_empty());
        assert_eq!(cli.verbosity().unwrap(), Verbosity::Summary);
    }

    #[test]
    fn test_all_options() {
        let cli = Cli::parse_from([
            "webping",
            "--repeats", "3",
            "--http",
            "--https",
            "--verbose", "2",
            "--host", "Ireland=latency-ew1",
            "--host", "Tokyo=latency-an1",
            "--hosts-file", "hosts.json",
            "--timeout", "0",
            "--no-color",
            "--debug",
        ]);

        assert_eq!(cli.repeats, Some(3));
        assert!(cli.http && cli.https);
        assert_eq!(cli.verbosity().unwrap(), Verbosity::Breakdown);
        assert_eq!(cli.hosts.len(), 2);
        assert_eq!(cli.hosts_file, Some(PathBuf::from("hosts.json")));
        assert_eq!(cli.timeout, Some(0));
        assert!(!cli.use_colors());
        assert!(cli.debug);
    }

    #[test]
    fn test_version_short_flag() {
        let cli = Cli::parse_from(["webping", "-v"]);
        assert!(cli.version);
    }

    #[test]
    fn test_list_regions_wins_over_verbose() {
        let cli = Cli::parse_from(["webping", "--list-regions", "--verbose", "2"]);
        assert_eq!(cli.verbosity().unwrap(), Verbosity::Regions);
    }

    #[test]
    fn test_verbose_out_of_range_rejected() {
        assert!(Cli::try_parse_from(["webping", "--verbose", "3"]).is_err());
    }

    #[test]
    fn test_timeout_parsing() {
        assert_eq!(parse_timeout("10"), Ok(10));
        assert_eq!(parse_timeout("0"), Ok(0));
        assert!(parse_timeout("301").is_err());
        assert!(parse_timeout("+5").is_err());
        assert!(parse_timeout("soon").is_err());
    }

    #[test]
    fn test_invalid_repeats_rejected_by_parser() {
        assert!(Cli::try_parse_from(["webping", "--repeats", "many"]).is_err());
    }
}
