//! 点击记录清理任务
//!
//! 配置了 `retention.max_age_days` 时，后台定期删除过旧的点击记录，防止表无限增长。
//! 未配置时不启动任务，点击记录永久保留。

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};
use tracing::{error, info};

use crate::config::RetentionConfig;
use crate::errors::{BioLinksError, Result};
use crate::storage::ClickStore;

/// 清理报告
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionReport {
    pub cutoff: DateTime<Utc>,
    pub deleted: u64,
}

pub struct RetentionTask {
    store: Arc<ClickStore>,
    max_age_days: u32,
    batch_size: u64,
}

impl RetentionTask {
    /// 未配置保留天数时返回 `None`
    pub fn from_config(store: Arc<ClickStore>, config: &RetentionConfig) -> Option<Self> {
        config
            .max_age_days
            .map(|days| Self::new(store, days, config.batch_size))
    }

    pub fn new(store: Arc<ClickStore>, max_age_days: u32, batch_size: u64) -> Self {
        Self {
            store,
            max_age_days,
            batch_size,
        }
    }

    /// 超出时间可表示范围时返回配置错误
    pub fn cutoff(&self, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
        now.checked_sub_signed(Duration::days(i64::from(self.max_age_days)))
            .ok_or_else(|| {
                BioLinksError::configuration(format!(
                    "retention of {} days reaches before the earliest representable date",
                    self.max_age_days
                ))
            })
    }

    /// 执行一次清理
    pub async fn run_once(&self) -> Result<RetentionReport> {
        let cutoff = self.cutoff(Utc::now())?;
        let deleted = self
            .store
            .purge_older_than(cutoff, self.batch_size)
            .await?;

        info!(
            "Click retention sweep removed {} rows older than {} days",
            deleted, self.max_age_days
        );
        Ok(RetentionReport { cutoff, deleted })
    }

    /// 启动后台清理任务
    pub fn spawn_background_task(self: Arc<Self>, interval: StdDuration) {
        info!(
            "Click retention task started (max age: {} days, interval: {}s)",
            self.max_age_days,
            interval.as_secs()
        );

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                if let Err(e) = self.run_once().await {
                    error!("Click retention sweep failed: {}", e);
                }
            }
        });
    }
}
