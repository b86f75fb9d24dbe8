use std::fmt;

#[derive(Debug, Clone)]
pub enum BioLinksError {
    Configuration(String),
    Validation(String),
    TransientStore(String),
    FatalStore(String),
    Render(String),
    FileOperation(String),
    Serialization(String),
}

impl BioLinksError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            BioLinksError::Configuration(_) => "E001",
            BioLinksError::Validation(_) => "E002",
            BioLinksError::TransientStore(_) => "E003",
            BioLinksError::FatalStore(_) => "E004",
            BioLinksError::Render(_) => "E005",
            BioLinksError::FileOperation(_) => "E006",
            BioLinksError::Serialization(_) => "E007",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            BioLinksError::Configuration(_) => "Configuration Error",
            BioLinksError::Validation(_) => "Validation Error",
            BioLinksError::TransientStore(_) => "Transient Store Error",
            BioLinksError::FatalStore(_) => "Fatal Store Error",
            BioLinksError::Render(_) => "Render Error",
            BioLinksError::FileOperation(_) => "File Operation Error",
            BioLinksError::Serialization(_) => "Serialization Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            BioLinksError::Configuration(msg) => msg,
            BioLinksError::Validation(msg) => msg,
            BioLinksError::TransientStore(msg) => msg,
            BioLinksError::FatalStore(msg) => msg,
            BioLinksError::Render(msg) => msg,
            BioLinksError::FileOperation(msg) => msg,
            BioLinksError::Serialization(msg) => msg,
        }
    }

    /// 是否值得重试（仅瞬时存储错误）
    pub fn is_retriable(&self) -> bool {
        matches!(self, BioLinksError::TransientStore(_))
    }

    /// 格式化为彩色输出（用于 Server 模式）
    #[cfg(feature = "server")]
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出（用于 CLI 模式）
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for BioLinksError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for BioLinksError {}

// 便捷的构造函数
impl BioLinksError {
    pub fn configuration<T: Into<String>>(msg: T) -> Self {
        BioLinksError::Configuration(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        BioLinksError::Validation(msg.into())
    }

    pub fn transient_store<T: Into<String>>(msg: T) -> Self {
        BioLinksError::TransientStore(msg.into())
    }

    pub fn fatal_store<T: Into<String>>(msg: T) -> Self {
        BioLinksError::FatalStore(msg.into())
    }

    pub fn render<T: Into<String>>(msg: T) -> Self {
        BioLinksError::Render(msg.into())
    }

    pub fn file_operation<T: Into<String>>(msg: T) -> Self {
        BioLinksError::FileOperation(msg.into())
    }
}

/// 数据库错误按可重试性分流到 TransientStore / FatalStore
impl From<sea_orm::DbErr> for BioLinksError {
    fn from(err: sea_orm::DbErr) -> Self {
        use crate::storage::backend::retry::Retriable;

        if err.is_retriable() {
            BioLinksError::transient_store(err.to_string())
        } else {
            BioLinksError::FatalStore(err.to_string())
        }
    }
}

impl From<std::io::Error> for BioLinksError {
    fn from(err: std::io::Error) -> Self {
        BioLinksError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for BioLinksError {
    fn from(err: serde_json::Error) -> Self {
        BioLinksError::Serialization(err.to_string())
    }
}

impl From<toml::ser::Error> for BioLinksError {
    fn from(err: toml::ser::Error) -> Self {
        BioLinksError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, BioLinksError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_transient_store_is_retriable() {
        assert!(BioLinksError::transient_store("connection reset").is_retriable());
        assert!(!BioLinksError::fatal_store("syntax error").is_retriable());
        assert!(!BioLinksError::configuration("missing url").is_retriable());
        assert!(!BioLinksError::validation("empty").is_retriable());
    }

    #[test]
    fn test_db_err_conversion_splits_on_retriability() {
        let err = sea_orm::DbErr::ConnectionAcquire(sea_orm::error::ConnAcquireErr::Timeout);
        assert!(matches!(
            BioLinksError::from(err),
            BioLinksError::TransientStore(_)
        ));

        let err = sea_orm::DbErr::RecordNotFound("missing".to_string());
        assert!(matches!(BioLinksError::from(err), BioLinksError::FatalStore(_)));
    }

    #[test]
    fn test_format_simple_contains_type_and_message() {
        let err = BioLinksError::configuration("DATABASE_URL is not set");
        assert_eq!(err.code(), "E001");
        assert_eq!(
            err.to_string(),
            "Configuration Error: DATABASE_URL is not set"
        );
    }
}
