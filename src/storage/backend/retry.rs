//! 数据库操作重试模块
//!
//! 指数退避 + 双向随机抖动，连接初始化与请求期的写入/探活共用同一套策略。
//! 可重试性由 [`Retriable`] 给出：驱动能提供结构化错误码时优先使用错误码，
//! 只有在边界处才回退到错误文本的子串匹配。

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use sea_orm::DbErr;
use tokio::time::sleep;
use tracing::{debug, error, warn};

use crate::config::RetryConfig;
use crate::errors::BioLinksError;

/// 错误文本中出现即视为瞬时故障的片段（大小写不敏感）
pub const RETRIABLE_ERROR_MESSAGES: &[&str] = &[
    "connection timed out",
    "deadlock detected",
    "connection reset",
    "connection refused",
    "operational error",
    "lost connection",
    "too many connections",
];

/// 错误是否可以通过重试恢复
pub trait Retriable {
    fn is_retriable(&self) -> bool;
}

impl Retriable for BioLinksError {
    fn is_retriable(&self) -> bool {
        BioLinksError::is_retriable(self)
    }
}

impl Retriable for DbErr {
    fn is_retriable(&self) -> bool {
        match self {
            DbErr::ConnectionAcquire(_) | // 连接池获取失败
            DbErr::Conn(_) => true, // 连接问题
            DbErr::Exec(runtime_err) | DbErr::Query(runtime_err) => {
                is_retriable_runtime_error(runtime_err)
            }
            other => is_retriable_message(&other.to_string()),
        }
    }
}

/// 判断运行时错误是否可重试（死锁、锁超时、连接数耗尽等）
fn is_retriable_runtime_error(err: &sea_orm::error::RuntimeErr) -> bool {
    use sea_orm::error::RuntimeErr;

    match err {
        RuntimeErr::SqlxError(sqlx_err) => {
            use std::ops::Deref;
            if let Some(db_err) = sqlx_err.deref().as_database_error()
                && let Some(code) = db_err.code()
                && is_retriable_sql_state(code.as_ref())
            {
                return true;
            }
            // 回退到字符串匹配（驱动未给出可识别的错误码）
            is_retriable_message(&sqlx_err.to_string())
        }
        RuntimeErr::Internal(msg) => is_retriable_message(msg),
        #[allow(unreachable_patterns)]
        _ => false,
    }
}

/// 通过错误码识别可重试错误
fn is_retriable_sql_state(code: &str) -> bool {
    matches!(
        code,
        // MySQL 死锁、锁超时、连接数过多
        "1213" | "1205" | "1040" |
        // PostgreSQL 序列化失败、死锁、连接数过多
        "40001" | "40P01" | "53300" |
        // SQLite BUSY 和 LOCKED
        "5" | "6"
    )
}

/// 通过错误消息判断是否可重试（回退方案）
pub fn is_retriable_message(message: &str) -> bool {
    let lowered = message.to_lowercase();
    RETRIABLE_ERROR_MESSAGES
        .iter()
        .any(|needle| lowered.contains(needle))
}

/// 重试策略
///
/// `max_retries` 是总调用次数上限（至少调用一次）。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub exponential_base: f64,
    pub max_delay: Duration,
    pub jitter_fraction: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(100),
            exponential_base: 2.0,
            max_delay: Duration::from_secs(2),
            jitter_fraction: 0.1,
        }
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            initial_delay: Duration::from_millis(config.initial_delay_ms),
            exponential_base: config.exponential_base,
            max_delay: Duration::from_millis(config.max_delay_ms),
            jitter_fraction: config.jitter_fraction,
        }
    }
}

impl RetryPolicy {
    /// 实际允许的调用次数
    pub fn attempts(&self) -> u32 {
        self.max_retries.max(1)
    }

    /// 第 `attempt` 次失败（从 0 开始）后的基础延迟：
    /// `min(initial_delay * base^attempt, max_delay)`
    pub fn base_delay(&self, attempt: u32) -> Duration {
        let initial = self.initial_delay.as_secs_f64();
        let max = self.max_delay.as_secs_f64();
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let raw = initial * self.exponential_base.max(1.0).powi(exponent);
        let capped = if raw.is_finite() { raw.min(max) } else { max };
        Duration::from_secs_f64(capped.max(0.0))
    }

    /// 基础延迟加上 ±`jitter_fraction` 比例的随机抖动
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let base = self.base_delay(attempt).as_secs_f64();
        let fraction = self.jitter_fraction.clamp(0.0, 1.0);
        if fraction == 0.0 || base == 0.0 {
            return Duration::from_secs_f64(base);
        }
        let jitter = base * fraction * rand::random_range(-1.0..=1.0);
        Duration::from_secs_f64((base + jitter).max(0.0))
    }
}

/// 指数退避重试执行器
///
/// 每次调用都是对 `operation` 的一次完整重新执行，被包装的操作必须可以安全重复。
/// 不可重试的错误立即原样返回，不消耗重试次数；次数用尽时返回最后一次的错误。
pub async fn with_retry<T, E, F, Fut>(
    operation_name: &str,
    policy: RetryPolicy,
    mut operation: F,
) -> Result<T, E>
where
    E: Retriable + Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let attempts = policy.attempts();
    let mut attempt = 0;
    loop {
        match operation().await {
            Ok(result) => {
                if attempt > 0 {
                    debug!(
                        "Operation '{}' succeeded after {} retries",
                        operation_name, attempt
                    );
                }
                return Ok(result);
            }
            Err(e) if e.is_retriable() && attempt + 1 < attempts => {
                let delay = policy.delay_for(attempt);
                attempt += 1;
                warn!(
                    "Operation '{}' failed (attempt {}/{}): {}; retrying in {} ms",
                    operation_name,
                    attempt,
                    attempts,
                    e,
                    delay.as_millis()
                );
                sleep(delay).await;
            }
            Err(e) => {
                if e.is_retriable() {
                    error!(
                        "Operation '{}' failed after {} attempts: {}",
                        operation_name,
                        attempt + 1,
                        e
                    );
                } else {
                    debug!(
                        "Operation '{}' failed with non-retriable error: {}",
                        operation_name, e
                    );
                }
                return Err(e);
            }
        }
    }
}
