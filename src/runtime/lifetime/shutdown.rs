use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio::time::timeout;
use tracing::{error, info, warn};

use crate::storage::ClickStore;

/// 关闭超时时间（秒）
const SHUTDOWN_TIMEOUT_SECS: u64 = 10;

/// 等待 Ctrl+C，然后关闭连接池
pub async fn listen_for_shutdown(store: Arc<ClickStore>) {
    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Shutdown signal received, closing store...");
        }
        Err(e) => {
            warn!(
                "Failed to listen for Ctrl+C: {}. Proceeding with shutdown anyway.",
                e
            );
        }
    }

    match timeout(Duration::from_secs(SHUTDOWN_TIMEOUT_SECS), store.close()).await {
        Ok(Ok(())) => {
            info!("All shutdown tasks completed successfully");
        }
        Ok(Err(e)) => {
            error!("Failed to close store on shutdown: {}", e);
        }
        Err(_) => {
            error!(
                "Shutdown tasks timed out after {} seconds",
                SHUTDOWN_TIMEOUT_SECS
            );
        }
    }
}
