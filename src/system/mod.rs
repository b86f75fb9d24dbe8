//! System-level modules
//!
//! 目前只有日志初始化。

pub mod logging;

pub use logging::init_logging;
