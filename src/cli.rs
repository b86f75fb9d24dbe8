//! Command-line interface definitions using clap

use clap::{Parser, Subcommand};

use crate::config::MAX_RETENTION_DAYS;

/// biolinks - a link-in-bio page with click tracking
#[derive(Parser, Debug)]
#[command(name = "biolinks")]
#[command(version)]
#[command(about = "A link-in-bio page with click tracking", long_about = None)]
pub struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, short = 'c', global = true, default_value = "config.toml")]
    pub config: String,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Start the HTTP server (default)
    Serve,

    /// Connect to the database, create missing tables and exit
    InitDb,

    /// Show click counts per link
    Stats {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete click records older than the given number of days
    Purge {
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_RETENTION_DAYS)))]
        older_than_days: u32,

        /// Rows deleted per batch
        #[arg(long, default_value_t = 1000)]
        batch_size: u64,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

/// Configuration management commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ConfigCommands {
    /// Generate example configuration file
    Generate {
        /// Output path (default: config.example.toml)
        output_path: Option<String>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

impl Cli {
    /// 未指定子命令时运行服务器
    pub fn command_or_default(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Serve)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_defaults_to_serve() {
        let cli = Cli::try_parse_from(["biolinks"]).unwrap();
        assert_eq!(cli.command_or_default(), Commands::Serve);
        assert_eq!(cli.config, "config.toml");
    }

    #[test]
    fn test_purge_requires_positive_days() {
        let cli =
            Cli::try_parse_from(["biolinks", "purge", "--older-than-days", "30"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Commands::Purge {
                older_than_days: 30,
                batch_size: 1000
            })
        );
        assert!(Cli::try_parse_from(["biolinks", "purge", "--older-than-days", "0"]).is_err());
        assert!(
            Cli::try_parse_from(["biolinks", "purge", "--older-than-days", "200000000"]).is_err()
        );
    }

    #[test]
    fn test_global_config_flag() {
        let cli = Cli::try_parse_from(["biolinks", "stats", "-c", "/etc/biolinks.toml"]).unwrap();
        assert_eq!(cli.config, "/etc/biolinks.toml");
        assert_eq!(cli.command, Some(Commands::Stats { json: false }));
    }

    #[test]
    fn test_config_generate_parses_optional_path() {
        let cli = Cli::try_parse_from(["biolinks", "config", "generate", "out.toml"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Commands::Config {
                action: ConfigCommands::Generate {
                    output_path: Some("out.toml".to_string()),
                    force: false
                }
            })
        );
    }
}
