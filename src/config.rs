//! Configuration and CLI argument handling

use std::path::PathBuf;
use clap::Parser;

/// CLI argument parsing structure
#[derive(Parser, Debug)]
#[command(name = "counter")]
#[command(about = "A persisted tally counter with a re-arming countdown")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    /// JSON file holding the persisted count
    #[arg(long, default_value = "counter.json")]
    pub data_file: PathBuf,

    /// Keep the count in memory only
    #[arg(long, conflicts_with = "data_file")]
    pub ephemeral: bool,

    /// Shell command run when a countdown completes
    #[arg(long)]
    pub alert_command: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::try_parse_from(["counter"]).unwrap();
        assert_eq!(config.address(), "0.0.0.0:20554");
        assert_eq!(config.data_file, PathBuf::from("counter.json"));
        assert!(!config.ephemeral);
        assert_eq!(config.log_level(), "info");
    }

    #[test]
    fn test_flags() {
        let config = Config::try_parse_from([
            "counter",
            "-p",
            "8080",
            "--host",
            "127.0.0.1",
            "--alert-command",
            "paplay bell.oga",
            "-v",
        ])
        .unwrap();
        assert_eq!(config.address(), "127.0.0.1:8080");
        assert_eq!(config.alert_command.as_deref(), Some("paplay bell.oga"));
        assert_eq!(config.log_level(), "debug");
    }

    #[test]
    fn test_ephemeral_conflicts_with_data_file() {
        assert!(Config::try_parse_from(["counter", "--ephemeral", "--data-file", "x.json"]).is_err());
    }
}
