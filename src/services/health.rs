//! Store health probe

use std::time::Duration;

use serde::Serialize;
use tracing::{error, trace};

use crate::storage::ClickStore;

/// 探活超时
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseStatus {
    Connected,
    Disconnected,
}

/// `/health` 的响应体
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub database: DatabaseStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: String,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        self.status == HealthStatus::Healthy
    }
}

/// 执行与初始化相同的 `SELECT 1` 探活，所有失败都折叠进报告，不向外返回错误
pub async fn check_store_health(store: &ClickStore) -> HealthReport {
    let outcome = match tokio::time::timeout(PROBE_TIMEOUT, store.probe()).await {
        Ok(Ok(())) => {
            trace!("Store health probe passed");
            Ok(())
        }
        Ok(Err(e)) => {
            error!("Store health probe failed: {}", e);
            Err(e.message().to_string())
        }
        Err(_) => {
            error!("Store health probe timed out after {:?}", PROBE_TIMEOUT);
            Err(format!("probe timed out after {}s", PROBE_TIMEOUT.as_secs()))
        }
    };

    let timestamp = chrono::Utc::now().to_rfc3339();
    match outcome {
        Ok(()) => HealthReport {
            status: HealthStatus::Healthy,
            database: DatabaseStatus::Connected,
            error: None,
            timestamp,
        },
        Err(error) => HealthReport {
            status: HealthStatus::Unhealthy,
            database: DatabaseStatus::Disconnected,
            error: Some(error),
            timestamp,
        },
    }
}
