use std::time::Duration;

use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr};
use tracing::info;

use crate::config::DatabaseConfig;
use crate::errors::{BioLinksError, Result};
use migration::{Migrator, MigratorTrait};

const SQLITE_MEMORY_URL: &str = "sqlite::memory:";

/// 数据库类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Sqlite,
    Postgres,
    MySql,
}

impl StoreKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreKind::Sqlite => "sqlite",
            StoreKind::Postgres => "postgres",
            StoreKind::MySql => "mysql",
        }
    }
}

/// 规范化后的连接串
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionDescriptor {
    kind: StoreKind,
    url: String,
    in_memory: bool,
}

impl ConnectionDescriptor {
    /// 解析并规范化连接串
    ///
    /// - `postgres://` 改写为 `postgresql://`，`mariadb://` 改写为 `mysql://`
    /// - 裸 `*.db` / `*.sqlite` 路径视为 SQLite 文件
    /// - `:memory:` 视为 SQLite 内存库
    /// - `ssl_mode` 仅在 PostgreSQL 连接串未指定 sslmode 时追加
    pub fn parse(raw: &str, ssl_mode: Option<&str>) -> Result<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(BioLinksError::configuration(
                "database connection descriptor is empty",
            ));
        }

        if matches!(raw, ":memory:" | "sqlite::memory:" | "sqlite://:memory:") {
            return Ok(Self::in_memory());
        }

        if raw.starts_with("sqlite:") {
            return Ok(Self {
                kind: StoreKind::Sqlite,
                url: raw.to_string(),
                in_memory: raw.contains(":memory:") || raw.contains("mode=memory"),
            });
        }

        if !raw.contains("://")
            && (raw.ends_with(".db") || raw.ends_with(".sqlite") || raw.ends_with(".sqlite3"))
        {
            return Ok(Self {
                kind: StoreKind::Sqlite,
                url: format!("sqlite://{}", raw),
                in_memory: false,
            });
        }

        let (kind, url) = if let Some(rest) = raw.strip_prefix("postgres://") {
            (StoreKind::Postgres, format!("postgresql://{}", rest))
        } else if raw.starts_with("postgresql://") {
            (StoreKind::Postgres, raw.to_string())
        } else if let Some(rest) = raw.strip_prefix("mariadb://") {
            (StoreKind::MySql, format!("mysql://{}", rest))
        } else if raw.starts_with("mysql://") {
            (StoreKind::MySql, raw.to_string())
        } else {
            let scheme = raw.split("://").next().unwrap_or(raw);
            return Err(BioLinksError::configuration(format!(
                "unsupported database scheme '{}'. Supported: sqlite://, postgresql://, postgres://, mysql://, mariadb://",
                scheme
            )));
        };

        let parsed = url::Url::parse(&url).map_err(|e| {
            BioLinksError::configuration(format!("malformed database url: {}", e))
        })?;
        if parsed.host_str().is_none_or(str::is_empty) {
            return Err(BioLinksError::configuration(
                "database url is missing a host",
            ));
        }

        let url = match (kind, ssl_mode) {
            (StoreKind::Postgres, Some(mode)) if !mode.is_empty() && !url.contains("sslmode=") => {
                let separator = if url.contains('?') { '&' } else { '?' };
                format!("{}{}sslmode={}", url, separator, mode)
            }
            _ => url,
        };

        Ok(Self {
            kind,
            url,
            in_memory: false,
        })
    }

    /// 进程内临时 SQLite 内存库
    pub fn in_memory() -> Self {
        Self {
            kind: StoreKind::Sqlite,
            url: SQLITE_MEMORY_URL.to_string(),
            in_memory: true,
        }
    }

    pub fn kind(&self) -> StoreKind {
        self.kind
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn is_in_memory(&self) -> bool {
        self.in_memory
    }

    /// 用于日志输出的连接串，密码替换为 ***
    pub fn redacted(&self) -> String {
        if self.kind == StoreKind::Sqlite {
            return self.url.clone();
        }
        match url::Url::parse(&self.url) {
            Ok(mut parsed) => {
                if parsed.password().is_some() {
                    let _ = parsed.set_password(Some("***"));
                }
                parsed.to_string()
            }
            Err(_) => format!("{}://***", self.kind.as_str()),
        }
    }
}

/// 按连接串类型建立连接池
pub async fn connect(
    descriptor: &ConnectionDescriptor,
    config: &DatabaseConfig,
) -> std::result::Result<DatabaseConnection, DbErr> {
    match descriptor.kind() {
        StoreKind::Sqlite => connect_sqlite(descriptor, config).await,
        _ => connect_generic(descriptor, config).await,
    }
}

/// 连接 SQLite 数据库（带自动创建和性能优化）
async fn connect_sqlite(
    descriptor: &ConnectionDescriptor,
    config: &DatabaseConfig,
) -> std::result::Result<DatabaseConnection, DbErr> {
    use sea_orm::SqlxSqliteConnector;
    use sea_orm::sqlx::sqlite::{
        SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
    };
    use std::str::FromStr;

    let opt = SqliteConnectOptions::from_str(descriptor.url())
        .map_err(|e| DbErr::Custom(format!("invalid SQLite url: {}", e)))?
        .busy_timeout(Duration::from_secs(5));

    let pool_options = if descriptor.is_in_memory() {
        // 内存库随最后一个连接关闭而消失，只保留一个常驻连接
        SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new()
            .max_connections(config.pool_size + config.max_overflow)
            .max_lifetime(Duration::from_secs(config.recycle_secs))
    };

    let opt = if descriptor.is_in_memory() {
        opt
    } else {
        opt.create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .pragma("cache_size", "-64000")
            .pragma("temp_store", "memory")
    };

    let pool = pool_options
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .connect_with(opt)
        .await
        .map_err(|e| DbErr::Conn(sea_orm::error::RuntimeErr::Internal(e.to_string())))?;

    // 转换为 Sea-ORM 的 DatabaseConnection
    Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
}

/// 连接通用数据库（MySQL/PostgreSQL）
async fn connect_generic(
    descriptor: &ConnectionDescriptor,
    config: &DatabaseConfig,
) -> std::result::Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(descriptor.url().to_owned());
    opt.max_connections(config.pool_size + config.max_overflow)
        .min_connections(config.pool_size)
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .max_lifetime(Duration::from_secs(config.recycle_secs))
        .test_before_acquire(true)
        .sqlx_logging(false);

    Database::connect(opt).await
}

/// 最小探活查询
pub async fn probe(db: &DatabaseConnection) -> std::result::Result<(), DbErr> {
    db.execute_unprepared("SELECT 1").await.map(|_| ())
}

/// 运行数据库迁移（仅创建缺失的表）
pub async fn run_migrations(db: &DatabaseConnection) -> Result<()> {
    Migrator::up(db, None)
        .await
        .map_err(|e| BioLinksError::fatal_store(format!("schema creation failed: {}", e)))?;

    info!("Database schema is up to date");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_postgres_alias_is_rewritten() {
        let d = ConnectionDescriptor::parse("postgres://u:p@db.local:5432/app", None).unwrap();
        assert_eq!(d.kind(), StoreKind::Postgres);
        assert_eq!(d.url(), "postgresql://u:p@db.local:5432/app");
    }

    #[test]
    fn test_mariadb_alias_is_rewritten() {
        let d = ConnectionDescriptor::parse("mariadb://root@localhost/app", None).unwrap();
        assert_eq!(d.kind(), StoreKind::MySql);
        assert_eq!(d.url(), "mysql://root@localhost/app");
    }

    #[test]
    fn test_ssl_mode_appended_only_when_absent() {
        let d = ConnectionDescriptor::parse("postgresql://h/app", Some("require")).unwrap();
        assert_eq!(d.url(), "postgresql://h/app?sslmode=require");

        let d = ConnectionDescriptor::parse("postgresql://h/app?application_name=x", Some("require"))
            .unwrap();
        assert_eq!(d.url(), "postgresql://h/app?application_name=x&sslmode=require");

        let d =
            ConnectionDescriptor::parse("postgresql://h/app?sslmode=disable", Some("require")).unwrap();
        assert_eq!(d.url(), "postgresql://h/app?sslmode=disable");

        let d = ConnectionDescriptor::parse("mysql://h/app", Some("require")).unwrap();
        assert_eq!(d.url(), "mysql://h/app");
    }

    #[test]
    fn test_sqlite_forms() {
        let d = ConnectionDescriptor::parse("links.db", None).unwrap();
        assert_eq!(d.kind(), StoreKind::Sqlite);
        assert_eq!(d.url(), "sqlite://links.db");
        assert!(!d.is_in_memory());

        let d = ConnectionDescriptor::parse("sqlite:///var/lib/app/links.db", None).unwrap();
        assert_eq!(d.url(), "sqlite:///var/lib/app/links.db");

        let d = ConnectionDescriptor::parse(":memory:", None).unwrap();
        assert!(d.is_in_memory());
        assert_eq!(d.url(), "sqlite::memory:");
    }

    #[test]
    fn test_unknown_scheme_is_configuration_error() {
        let err = ConnectionDescriptor::parse("oracle://h/app", None).unwrap_err();
        assert!(matches!(err, BioLinksError::Configuration(_)));
        assert!(err.message().contains("oracle"));
    }

    #[test]
    fn test_empty_and_hostless_urls_are_rejected() {
        assert!(matches!(
            ConnectionDescriptor::parse("   ", None),
            Err(BioLinksError::Configuration(_))
        ));
        assert!(matches!(
            ConnectionDescriptor::parse("postgresql:///app", None),
            Err(BioLinksError::Configuration(_))
        ));
    }

    #[test]
    fn test_redacted_hides_password() {
        let d = ConnectionDescriptor::parse("postgres://admin:s3cret@db:5432/app", None).unwrap();
        let shown = d.redacted();
        assert!(!shown.contains("s3cret"));
        assert!(shown.contains("admin:***@db"));
    }
}
