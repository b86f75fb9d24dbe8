//! SeaORM storage backend
//!
//! 点击记录存储，支持 SQLite、MySQL/MariaDB 与 PostgreSQL。
//! 连接在首次 `initialize()` 时建立，之后整个进程复用同一个连接池。

mod clicks;
mod connection;
pub mod retry;

use std::future::Future;
use std::sync::Arc;

use arc_swap::ArcSwap;
use sea_orm::{DatabaseConnection, DbErr};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::config::{DatabaseConfig, MissingUrlPolicy};
use crate::errors::{BioLinksError, Result};
use crate::storage::models::StorageConfig;

pub use connection::{ConnectionDescriptor, StoreKind, probe, run_migrations};
use retry::RetryPolicy;

/// 初始化状态
#[derive(Debug)]
pub enum InitState {
    Uninitialized,
    /// 某个调用者正在连接和建表
    Initializing,
    Ready {
        db: DatabaseConnection,
        descriptor: ConnectionDescriptor,
    },
    Failed(BioLinksError),
}

impl InitState {
    pub fn label(&self) -> &'static str {
        match self {
            InitState::Uninitialized => "uninitialized",
            InitState::Initializing => "initializing",
            InitState::Ready { .. } => "ready",
            InitState::Failed(_) => "failed",
        }
    }
}

/// `initialize()` 的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitOutcome {
    /// 本次调用完成了连接与建表
    Initialized,
    /// 之前已经初始化过，什么都没做
    AlreadyReady,
}

/// 点击存储客户端
///
/// 构造时不做任何 IO。状态读取无锁，连接和建表由 `init_lock` 串行化，
/// 并发调用 `initialize()` 时只有第一个会真正执行。
pub struct ClickStore {
    config: DatabaseConfig,
    init_policy: RetryPolicy,
    op_policy: RetryPolicy,
    state: ArcSwap<InitState>,
    init_lock: Mutex<()>,
}

impl ClickStore {
    pub fn new(config: DatabaseConfig) -> Self {
        let init_policy = RetryPolicy::from(&config.init_retry);
        let op_policy = RetryPolicy::from(&config.op_retry);
        Self {
            config,
            init_policy,
            op_policy,
            state: ArcSwap::from_pointee(InitState::Uninitialized),
            init_lock: Mutex::new(()),
        }
    }

    /// 建立连接池、探活并创建缺失的表
    ///
    /// 已就绪时直接返回 `AlreadyReady`；失败后状态记为 `Failed`，下次调用会重新尝试。
    /// 等锁期间若另一个调用者刚失败，直接返回它的错误，不再重复整轮重试。
    pub async fn initialize(&self) -> Result<InitOutcome> {
        let observed = self.state.load_full();
        if matches!(*observed, InitState::Ready { .. }) {
            return Ok(InitOutcome::AlreadyReady);
        }

        let _guard = self.init_lock.lock().await;
        let current = self.state.load_full();
        match &*current {
            InitState::Ready { .. } => return Ok(InitOutcome::AlreadyReady),
            InitState::Failed(e) if !Arc::ptr_eq(&observed, &current) => return Err(e.clone()),
            _ => {}
        }

        self.state.store(Arc::new(InitState::Initializing));
        match self.bootstrap().await {
            Ok((db, descriptor)) => {
                self.state.store(Arc::new(InitState::Ready { db, descriptor }));
                Ok(InitOutcome::Initialized)
            }
            Err(e) => {
                self.state.store(Arc::new(InitState::Failed(e.clone())));
                Err(e)
            }
        }
    }

    async fn bootstrap(&self) -> Result<(DatabaseConnection, ConnectionDescriptor)> {
        let descriptor = self.resolve_descriptor()?;
        let config = &self.config;
        info!(
            "Connecting to {} store at {}",
            descriptor.kind().as_str(),
            descriptor.redacted()
        );

        let db = retry::with_retry("connect", self.init_policy, || async {
            let db = connection::connect(&descriptor, config).await?;
            probe(&db).await?;
            Ok::<_, DbErr>(db)
        })
        .await
        .map_err(|e| {
            BioLinksError::fatal_store(format!(
                "could not connect to {} store: {}",
                descriptor.kind().as_str(),
                e
            ))
        })?;

        run_migrations(&db).await?;

        info!(
            "{} store initialized (pool_size={}, max_overflow={})",
            descriptor.kind().as_str().to_uppercase(),
            config.pool_size,
            config.max_overflow
        );
        Ok((db, descriptor))
    }

    fn resolve_descriptor(&self) -> Result<ConnectionDescriptor> {
        if !self.config.database_url.trim().is_empty() {
            return ConnectionDescriptor::parse(
                &self.config.database_url,
                self.config.ssl_mode.as_deref(),
            );
        }

        match self.config.on_missing_url {
            MissingUrlPolicy::Fail => Err(BioLinksError::configuration(
                "DATABASE_URL environment variable is not set",
            )),
            MissingUrlPolicy::Memory => {
                warn!("DATABASE_URL is not set, clicks will be kept in an in-memory SQLite store");
                Ok(ConnectionDescriptor::in_memory())
            }
        }
    }

    fn ready_connection(&self) -> Option<DatabaseConnection> {
        match &**self.state.load() {
            InitState::Ready { db, .. } => Some(db.clone()),
            _ => None,
        }
    }

    /// 获取可用连接，未就绪时先初始化
    pub async fn connection(&self) -> Result<DatabaseConnection> {
        if let Some(db) = self.ready_connection() {
            return Ok(db);
        }
        self.initialize().await?;
        self.ready_connection().ok_or_else(|| {
            BioLinksError::fatal_store(format!(
                "store is {} after initialization",
                self.state_label()
            ))
        })
    }

    /// 在就绪连接上执行操作，瞬时错误按 `op_retry` 重试
    pub(crate) async fn run_with_retry<T, F, Fut>(&self, operation_name: &str, op: F) -> Result<T>
    where
        F: Fn(DatabaseConnection) -> Fut,
        Fut: Future<Output = std::result::Result<T, DbErr>>,
    {
        let db = self.connection().await?;
        retry::with_retry(operation_name, self.op_policy, || op(db.clone()))
            .await
            .map_err(BioLinksError::from)
    }

    pub fn state_label(&self) -> &'static str {
        self.state.load().label()
    }

    pub fn is_ready(&self) -> bool {
        matches!(**self.state.load(), InitState::Ready { .. })
    }

    /// 上一次初始化失败的原因
    pub fn last_error(&self) -> Option<String> {
        match &**self.state.load() {
            InitState::Failed(e) => Some(e.message().to_string()),
            _ => None,
        }
    }

    pub fn get_backend_config(&self) -> Option<StorageConfig> {
        match &**self.state.load() {
            InitState::Ready { descriptor, .. } => Some(StorageConfig {
                storage_type: descriptor.kind().as_str().to_string(),
                in_memory: descriptor.is_in_memory(),
            }),
            _ => None,
        }
    }

    /// 对已就绪的连接执行 `SELECT 1`，未就绪时先尝试初始化
    pub async fn probe(&self) -> Result<()> {
        self.run_with_retry("health_probe", |db| async move { probe(&db).await })
            .await
    }

    /// 关闭连接池，状态回到 `Uninitialized`
    pub async fn close(&self) -> Result<()> {
        let _guard = self.init_lock.lock().await;
        let previous = self.state.swap(Arc::new(InitState::Uninitialized));
        if let InitState::Ready { db, .. } = &*previous {
            db.clone().close().await.map_err(BioLinksError::from)?;
            info!("Database connection pool closed");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RetryConfig;
    use sea_orm::error::RuntimeErr;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn memory_store() -> ClickStore {
        ClickStore::new(DatabaseConfig {
            database_url: String::new(),
            on_missing_url: MissingUrlPolicy::Memory,
            op_retry: RetryConfig {
                max_retries: 3,
                initial_delay_ms: 1,
                exponential_base: 2.0,
                max_delay_ms: 5,
                jitter_fraction: 0.0,
            },
            ..DatabaseConfig::default()
        })
    }

    #[tokio::test]
    async fn test_health_check_retries_transient_failure() {
        let store = memory_store();
        let calls = AtomicU32::new(0);

        store
            .run_with_retry("health_probe", |db| {
                let attempt = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if attempt == 0 {
                        return Err(DbErr::Conn(RuntimeErr::Internal(
                            "connection reset by peer".to_string(),
                        )));
                    }
                    probe(&db).await
                }
            })
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(store.probe().await.is_ok());
    }

    #[tokio::test]
    async fn test_non_retriable_failure_is_not_repeated() {
        let store = memory_store();
        let calls = AtomicU32::new(0);

        let err = store
            .run_with_retry("health_probe", |_db| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err::<(), _>(DbErr::Custom("syntax error".to_string())) }
            })
            .await
            .unwrap_err();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(err, BioLinksError::FatalStore(_)));
    }

    #[test]
    fn test_state_labels() {
        assert_eq!(InitState::Uninitialized.label(), "uninitialized");
        assert_eq!(InitState::Initializing.label(), "initializing");
        assert_eq!(
            InitState::Failed(BioLinksError::configuration("x")).label(),
            "failed"
        );
    }
}
