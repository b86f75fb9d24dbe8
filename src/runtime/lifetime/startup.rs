use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::StaticConfig;
use crate::services::{ClickService, RetentionTask};
use crate::storage::ClickStore;

pub struct StartupContext {
    pub store: Arc<ClickStore>,
    pub click_service: ClickService,
}

/// 准备服务器启动的上下文
///
/// `database.lazy_init = false` 时在这里完成连接与建表，失败直接中止启动；
/// 否则推迟到第一个需要存储的请求。
pub async fn prepare_server_startup(config: &StaticConfig) -> Result<StartupContext> {
    let start_time = std::time::Instant::now();
    debug!("Starting pre-startup processing...");

    let store = Arc::new(ClickStore::new(config.database.clone()));

    if config.database.lazy_init {
        warn!("Lazy store initialization enabled, the database will be connected on first use");
    } else {
        let outcome = store
            .initialize()
            .await
            .context("Failed to initialize click store")?;
        debug!("Store initialization outcome: {:?}", outcome);
    }

    if let Some(task) = RetentionTask::from_config(store.clone(), &config.retention) {
        let interval = Duration::from_secs(config.retention.sweep_interval_secs.max(1));
        Arc::new(task).spawn_background_task(interval);
    }

    let click_service = ClickService::new(store.clone());

    info!(
        "Pre-startup processing completed in {} ms",
        start_time.elapsed().as_millis()
    );

    Ok(StartupContext {
        store,
        click_service,
    })
}
