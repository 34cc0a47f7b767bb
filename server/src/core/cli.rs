use clap::{Parser, Subcommand};

use std::path::PathBuf;

use super::constants::{
    ENV_ALIAS_FALLBACK_TO_ID, ENV_CONFIG, ENV_CONSISTENCY, ENV_EMPTY_SERIES, ENV_HOST, ENV_HOSTS,
    ENV_KEYSPACE, ENV_PASSWORD, ENV_PORT, ENV_TIMEOUT, ENV_USER,
};
use crate::domain::frames::EmptySeriesPolicy;

#[derive(Parser)]
#[command(name = "cassandra-datasource")]
#[command(version, about = "Cassandra time-series datasource", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Server host address
    #[arg(long, short = 'H', global = true, env = ENV_HOST)]
    pub host: Option<String>,

    /// Server port
    #[arg(long, short = 'p', global = true, env = ENV_PORT)]
    pub port: Option<u16>,

    /// Path to config file
    #[arg(long, short = 'c', global = true, env = ENV_CONFIG)]
    pub config: Option<PathBuf>,

    /// What to return for a series without rows (skip or empty_frame)
    #[arg(long, global = true, env = ENV_EMPTY_SERIES, value_parser = parse_empty_series)]
    pub empty_series: Option<EmptySeriesPolicy>,

    /// Use the series id as legend when the query has no alias
    #[arg(long, global = true, env = ENV_ALIAS_FALLBACK_TO_ID)]
    pub alias_fallback_to_id: Option<bool>,

    // Default datasource options
    /// Contact points of the default datasource (host:port, separated by ';' or ',')
    #[arg(long, global = true, env = ENV_HOSTS)]
    pub hosts: Option<String>,

    /// Keyspace of the default datasource
    #[arg(long, global = true, env = ENV_KEYSPACE)]
    pub keyspace: Option<String>,

    /// User of the default datasource
    #[arg(long, global = true, env = ENV_USER)]
    pub user: Option<String>,

    /// Password of the default datasource
    #[arg(long, global = true, env = ENV_PASSWORD, hide_env_values = true)]
    pub password: Option<String>,

    /// Consistency level of the default datasource (ONE, QUORUM, LOCAL_QUORUM, ...)
    #[arg(long, global = true, env = ENV_CONSISTENCY)]
    pub consistency: Option<String>,

    /// Request timeout of the default datasource in seconds
    #[arg(long, global = true, env = ENV_TIMEOUT)]
    pub timeout: Option<u64>,
}

/// Parse empty series policy from CLI/env string
fn parse_empty_series(s: &str) -> Result<EmptySeriesPolicy, String> {
    match s.to_lowercase().as_str() {
        "skip" => Ok(EmptySeriesPolicy::Skip),
        "empty_frame" | "empty-frame" => Ok(EmptySeriesPolicy::EmptyFrame),
        _ => Err(format!(
            "Invalid empty series policy '{}'. Valid options: skip, empty_frame",
            s
        )),
    }
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Start the server (default command)
    Start,
    /// Connect to configured datasources and report their health
    Check {
        /// Only check this datasource id
        #[arg(long, short)]
        datasource: Option<String>,
    },
}

/// Configuration derived from CLI arguments
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub config: Option<PathBuf>,
    pub empty_series: Option<EmptySeriesPolicy>,
    pub alias_fallback_to_id: Option<bool>,
    pub hosts: Option<String>,
    pub keyspace: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub consistency: Option<String>,
    pub timeout: Option<u64>,
}

/// Parse CLI arguments and return config with command
pub fn parse() -> (CliConfig, Option<Commands>) {
    let cli = Cli::parse();
    let config = CliConfig {
        host: cli.host,
        port: cli.port,
        config: cli.config,
        empty_series: cli.empty_series,
        alias_fallback_to_id: cli.alias_fallback_to_id,
        hosts: cli.hosts,
        keyspace: cli.keyspace,
        user: cli.user,
        password: cli.password,
        consistency: cli.consistency,
        timeout: cli.timeout,
    };
    (config, cli.command)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_empty_series() {
        assert_eq!(parse_empty_series("skip"), Ok(EmptySeriesPolicy::Skip));
        assert_eq!(
            parse_empty_series("EMPTY_FRAME"),
            Ok(EmptySeriesPolicy::EmptyFrame)
        );
        assert!(parse_empty_series("drop").is_err());
    }

    #[test]
    fn test_check_subcommand() {
        let cli = Cli::try_parse_from(["cassandra-datasource", "check", "--datasource", "prod"])
            .unwrap();
        match cli.command {
            Some(Commands::Check { datasource }) => assert_eq!(datasource.as_deref(), Some("prod")),
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
