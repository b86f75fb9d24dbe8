//! Service layer for business logic
//!
//! HTTP handler 与 CLI 共用的业务逻辑。

mod click_service;
mod health;
mod retention;

pub use click_service::{ClickService, MAX_LINK_NAME_LEN, validate_link_name};
pub use health::{DatabaseStatus, HealthReport, HealthStatus, check_store_health};
pub use retention::{RetentionReport, RetentionTask};
