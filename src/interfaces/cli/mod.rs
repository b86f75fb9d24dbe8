//! CLI interface module
//!
//! 管理命令：初始化数据库、查看点击统计、清理旧记录、生成配置文件。

pub mod commands;

use std::fmt;

use crate::cli::{Commands, ConfigCommands};
use crate::config::StaticConfig;
use commands::{config_generate, init_db, purge_clicks, show_stats};

#[derive(Debug)]
pub enum CliError {
    StorageError(String),
    ConfigError(String),
    CommandError(String),
}

impl CliError {
    /// Format as simple output
    pub fn format_simple(&self) -> String {
        match self {
            CliError::StorageError(msg) => format!("Storage error: {}", msg),
            CliError::ConfigError(msg) => format!("Config error: {}", msg),
            CliError::CommandError(msg) => format!("Command error: {}", msg),
        }
    }

    /// Format as colored output
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        match self {
            CliError::StorageError(msg) => {
                format!("{} {}", "Storage error:".red().bold(), msg.white())
            }
            CliError::ConfigError(msg) => {
                format!("{} {}", "Config error:".yellow().bold(), msg.white())
            }
            CliError::CommandError(msg) => {
                format!("{} {}", "Command error:".red().bold(), msg.white())
            }
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for CliError {}

impl From<crate::errors::BioLinksError> for CliError {
    fn from(err: crate::errors::BioLinksError) -> Self {
        use crate::errors::BioLinksError;
        match err {
            BioLinksError::Configuration(msg) => CliError::ConfigError(msg),
            BioLinksError::TransientStore(msg) | BioLinksError::FatalStore(msg) => {
                CliError::StorageError(msg)
            }
            other => CliError::CommandError(other.message().to_string()),
        }
    }
}

/// Run a CLI command from clap-parsed input
///
/// `Serve` 由 main 直接处理，不经过这里。
pub async fn run_cli_command(cmd: Commands, config: &StaticConfig) -> Result<(), CliError> {
    match cmd {
        Commands::InitDb => init_db(config).await,
        Commands::Stats { json } => show_stats(config, json).await,
        Commands::Purge {
            older_than_days,
            batch_size,
        } => purge_clicks(config, older_than_days, batch_size).await,
        Commands::Config {
            action: ConfigCommands::Generate { output_path, force },
        } => config_generate(output_path, force).await,
        Commands::Serve => Err(CliError::CommandError(
            "serve is not a management command".to_string(),
        )),
    }
}
