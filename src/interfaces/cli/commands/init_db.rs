//! Initialize database command

use colored::Colorize;

use crate::config::StaticConfig;
use crate::interfaces::cli::CliError;
use crate::storage::{ClickStore, InitOutcome};

/// 建立连接、创建缺失的表后退出
pub async fn init_db(config: &StaticConfig) -> Result<(), CliError> {
    let store = ClickStore::new(config.database.clone());
    let outcome = store.initialize().await?;

    match outcome {
        InitOutcome::Initialized => {
            println!("{} Database is ready", "✓".bold().green());
        }
        InitOutcome::AlreadyReady => {
            println!("{} Database was already initialized", "ℹ".bold().blue());
        }
    }

    store.close().await?;
    Ok(())
}
