mod config_gen;
mod init_db;
mod purge;
mod stats;

pub use config_gen::config_generate;
pub use init_db::init_db;
pub use purge::purge_clicks;
pub use stats::show_stats;
