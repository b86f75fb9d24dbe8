//! Purge old clicks command

use colored::Colorize;
use std::sync::Arc;

use crate::config::StaticConfig;
use crate::interfaces::cli::CliError;
use crate::services::RetentionTask;
use crate::storage::ClickStore;

pub async fn purge_clicks(
    config: &StaticConfig,
    older_than_days: u32,
    batch_size: u64,
) -> Result<(), CliError> {
    let store = Arc::new(ClickStore::new(config.database.clone()));
    let task = RetentionTask::new(store.clone(), older_than_days, batch_size);

    let report = task.run_once().await?;
    println!(
        "{} Deleted {} clicks recorded before {}",
        "✓".bold().green(),
        report.deleted.to_string().green(),
        report.cutoff.format("%Y-%m-%d %H:%M:%S UTC")
    );

    store.close().await?;
    Ok(())
}
