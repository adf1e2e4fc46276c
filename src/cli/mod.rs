//! CLI command definitions and handlers

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

pub mod cache;
pub mod context;
pub mod refresh;
pub mod serve;
pub mod status;

pub use context::AppContext;

use crate::refresh::Partition;

/// whpetitions - petition response-time statistics
#[derive(Parser, Debug)]
#[command(name = "whpetitions")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (table, json)
    #[arg(
        long,
        global = true,
        env = "WHPETITIONS_FORMAT",
        default_value = "table",
        hide_env = true
    )]
    pub format: OutputFormat,

    /// Override config file location
    #[arg(long, global = true, env = "WHPETITIONS_CONFIG", hide_env = true)]
    pub config: Option<PathBuf>,

    /// Override the petitions API base URL
    #[arg(long, global = true, env = "WHPETITIONS_API_BASE", hide_env = true)]
    pub api_base: Option<String>,

    /// Override the store database path
    #[arg(long, global = true, env = "WHPETITIONS_STORE", hide_env = true)]
    pub store_path: Option<PathBuf>,

    /// Override the view cache database path
    #[arg(long, global = true, env = "WHPETITIONS_CACHE", hide_env = true)]
    pub cache_path: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true, env = "WHPETITIONS_DEBUG", hide_env = true)]
    pub debug: bool,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP server
    Serve {
        /// Address to bind (host:port)
        #[arg(long, env = "WHPETITIONS_BIND")]
        bind: Option<String>,
    },

    /// Refresh one or both partitions from the upstream API
    Refresh {
        /// Which partition to refresh
        #[arg(value_enum)]
        partition: PartitionArg,
    },

    /// Show stored statistics
    Status,

    /// Manage the rendered view cache
    #[command(subcommand)]
    Cache(CacheCommands),

    /// Display version information
    Version,
}

/// View cache subcommands
#[derive(Subcommand, Debug)]
pub enum CacheCommands {
    /// Show cache statistics
    Status,

    /// Remove every cached view
    Clear,
}

/// Output format options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// JSON for scripts
    Json,
}

/// Partition selector for `refresh`
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PartitionArg {
    Pending,
    Responded,
    All,
}

impl PartitionArg {
    pub fn partitions(&self) -> &'static [Partition] {
        match self {
            PartitionArg::Pending => &[Partition::Pending],
            PartitionArg::Responded => &[Partition::Responded],
            PartitionArg::All => &Partition::ALL,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_refresh_all() {
        let cli = Cli::try_parse_from(["whpetitions", "refresh", "all"]).unwrap();
        match cli.command {
            Commands::Refresh { partition } => {
                assert_eq!(partition.partitions(), &Partition::ALL)
            }
            other => panic!("Expected refresh, got {:?}", other),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "whpetitions",
            "status",
            "--format",
            "json",
            "--store-path",
            "/tmp/store.db",
        ])
        .unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.store_path, Some(PathBuf::from("/tmp/store.db")));
    }

    #[test]
    fn test_unknown_partition_rejected() {
        assert!(Cli::try_parse_from(["whpetitions", "refresh", "archived"]).is_err());
    }
}
