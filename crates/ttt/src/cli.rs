//! Command-line interface handling for the tic-tac-toe server.
//!
//! This module provides command-line argument parsing using the `clap`
//! builder API.

use clap::{Arg, ArgMatches, Command};
use std::path::PathBuf;

/// Command line arguments parsed from user input.
///
/// Every option except the config path overrides the matching setting from
/// the configuration file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliArgs {
    /// Path to the configuration file
    pub config_path: PathBuf,
    /// Optional override for bind address
    pub bind_address: Option<String>,
    /// Optional override for log level
    pub log_level: Option<String>,
    /// Whether to force JSON log output
    pub json_logs: bool,
}

impl CliArgs {
    /// Parses the process arguments.
    ///
    /// Exits with a usage message if they are malformed.
    pub fn parse() -> Self {
        Self::from_matches(&command().get_matches())
    }

    /// Parses an explicit argument list, the first item being the binary name.
    pub fn try_parse_from<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Ok(Self::from_matches(&command().try_get_matches_from(args)?))
    }

    fn from_matches(matches: &ArgMatches) -> Self {
        Self {
            config_path: matches
                .get_one::<String>("config")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH)),
            bind_address: matches.get_one::<String>("bind").cloned(),
            log_level: matches.get_one::<String>("log-level").cloned(),
            json_logs: matches.get_flag("json-logs"),
        }
    }
}

const DEFAULT_CONFIG_PATH: &str = "config.toml";

fn command() -> Command {
    Command::new("ttt-server")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Authoritative room server for N-dimensional tic-tac-toe")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .default_value(DEFAULT_CONFIG_PATH),
        )
        .arg(
            Arg::new("bind")
                .short('b')
                .long("bind")
                .value_name("ADDRESS")
                .help("Bind address (e.g., 127.0.0.1:8869)"),
        )
        .arg(
            Arg::new("log-level")
                .short('l')
                .long("log-level")
                .value_name("LEVEL")
                .help("Log level (trace, debug, info, warn, error)"),
        )
        .arg(
            Arg::new("json-logs")
                .long("json-logs")
                .help("Output logs in JSON format")
                .action(clap::ArgAction::SetTrue),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = CliArgs::try_parse_from(["ttt-server"]).unwrap();
        assert_eq!(args.config_path, PathBuf::from("config.toml"));
        assert_eq!(args.bind_address, None);
        assert_eq!(args.log_level, None);
        assert!(!args.json_logs);
    }

    #[test]
    fn test_overrides() {
        let args = CliArgs::try_parse_from([
            "ttt-server",
            "-c",
            "prod.toml",
            "--bind",
            "0.0.0.0:9000",
            "-l",
            "debug",
            "--json-logs",
        ])
        .unwrap();
        assert_eq!(args.config_path, PathBuf::from("prod.toml"));
        assert_eq!(args.bind_address.as_deref(), Some("0.0.0.0:9000"));
        assert_eq!(args.log_level.as_deref(), Some("debug"));
        assert!(args.json_logs);
    }

    #[test]
    fn test_unknown_flag_rejected() {
        assert!(CliArgs::try_parse_from(["ttt-server", "--rank", "3"]).is_err());
    }
}
