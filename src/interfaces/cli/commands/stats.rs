//! Click statistics command

use colored::Colorize;

use crate::config::StaticConfig;
use crate::interfaces::cli::CliError;
use crate::services::ClickService;
use crate::storage::{ClickStore, StorageConfig};
use std::sync::Arc;

pub async fn show_stats(config: &StaticConfig, json: bool) -> Result<(), CliError> {
    let store = Arc::new(ClickStore::new(config.database.clone()));
    let service = ClickService::new(store.clone());

    let counts = service.click_counts().await?;
    let total: i64 = counts.iter().map(|c| c.clicks).sum();
    let backend = store.get_backend_config();

    if json {
        let output = serde_json::json!({ "backend": backend, "total": total, "links": counts });
        let rendered = serde_json::to_string_pretty(&output)
            .map_err(|e| CliError::CommandError(format!("Failed to encode stats: {}", e)))?;
        println!("{}", rendered);
    } else if counts.is_empty() {
        print_backend(backend.as_ref());
        println!("{} No clicks recorded yet", "ℹ".bold().blue());
    } else {
        print_backend(backend.as_ref());
        println!("{}", "Clicks per link:".bold().green());
        println!();
        let width = counts.iter().map(|c| c.link_name.len()).max().unwrap_or(0);
        for count in &counts {
            println!(
                "  {:<width$}  {}",
                count.link_name.cyan(),
                count.clicks.to_string().green(),
                width = width
            );
        }
        println!();
        println!(
            "{} Total {} clicks",
            "ℹ".bold().blue(),
            total.to_string().green()
        );
    }

    store.close().await?;
    Ok(())
}

fn print_backend(backend: Option<&StorageConfig>) {
    if let Some(backend) = backend {
        let kind = if backend.in_memory {
            format!("{} (in-memory)", backend.storage_type)
        } else {
            backend.storage_type.clone()
        };
        println!("{} Store: {}", "ℹ".bold().blue(), kind.cyan());
    }
}
