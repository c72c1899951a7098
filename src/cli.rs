//! CLI argument definitions for the headless driver.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use clap_complete::Shell;

use crate::config::{LoggingConfig, PageOverrides, PreviewOverrides};
use crate::dispatch::Event;

/// Report output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// YAML (default)
    #[default]
    Yaml,
    /// Pretty-printed JSON
    Json,
    /// One `key: value` per line, without highlighted markup
    Text,
}

/// Drive a star-chart customization page headlessly and print the result.
#[derive(Parser, Debug)]
#[command(name = "starchart-customizer")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Page description (TOML)
    #[arg(short, long, value_name = "FILE", required_unless_present_any = ["completions", "stylesheet"])]
    pub page: Option<PathBuf>,

    /// JSON file standing in for the browser's local storage
    #[arg(short, long, value_name = "FILE")]
    pub storage: Option<PathBuf>,

    /// Event to dispatch after load, in order (repeatable):
    /// click:<group>/<button>, color:<field>=<value>, copy:<trigger>, wait:<ms>
    #[arg(short, long = "event", value_name = "EVENT")]
    pub events: Vec<Event>,

    /// Report format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Yaml)]
    pub format: OutputFormat,

    /// Override the preview base URL
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// Override the page origin used for relative base URLs
    #[arg(long, value_name = "URL")]
    pub origin: Option<String>,

    /// Override the variant rendered at load
    #[arg(long, value_name = "VARIANT")]
    pub initial_variant: Option<String>,

    /// Reference instant for relative times (RFC 3339); defaults to now
    #[arg(long, value_name = "DATETIME", value_parser = parse_datetime)]
    pub now: Option<chrono::DateTime<chrono::Utc>>,

    /// Write logs to this file
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Print the merged configuration as TOML and exit
    #[arg(long)]
    pub print_config: bool,

    /// Print the CSS for a bundled highlighting theme and exit
    #[arg(long, value_name = "THEME")]
    pub stylesheet: Option<String>,

    /// Generate shell completions and exit
    #[arg(long, value_enum, value_name = "SHELL")]
    pub completions: Option<Shell>,
}

impl Cli {
    /// Flags that override file and environment configuration.
    pub fn to_config_overrides(&self) -> PageOverrides {
        PageOverrides {
            preview: PreviewOverrides {
                base_url: self.base_url.clone(),
                origin: self.origin.clone(),
                initial_variant: self.initial_variant.clone(),
            },
            logging: LoggingConfig {
                file: self.log_file.clone(),
                level: self.log_level.clone(),
            },
        }
    }
}

fn parse_datetime(s: &str) -> Result<chrono::DateTime<chrono::Utc>, String> {
    chrono::DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&chrono::Utc))
        .map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn events_parse_in_order() {
        let cli = Cli::parse_from([
            "starchart-customizer",
            "--page",
            "page.toml",
            "-e",
            "click:variant/custom",
            "-e",
            "color:line=#fff",
            "--base-url",
            "https://x/chart",
        ]);
        assert_eq!(cli.events.len(), 2);
        assert!(matches!(cli.events[0], Event::Click { .. }));
        let overrides = cli.to_config_overrides();
        assert_eq!(overrides.preview.base_url.as_deref(), Some("https://x/chart"));
        assert!(overrides.preview.origin.is_none());
    }

    #[test]
    fn page_is_optional_for_completions() {
        let cli = Cli::try_parse_from(["starchart-customizer", "--completions", "bash"]).unwrap();
        assert!(cli.page.is_none());
        assert!(Cli::try_parse_from(["starchart-customizer"]).is_err());
    }
}
