use serde::{Deserialize, Serialize};
use sea_orm::FromQueryResult;

use migration::entities::link_click;

/// 一次链接点击
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClickEvent {
    pub id: i64,
    pub link_name: String,
    pub clicked_at: chrono::DateTime<chrono::Utc>,
}

impl From<link_click::Model> for ClickEvent {
    fn from(model: link_click::Model) -> Self {
        Self {
            id: model.id,
            link_name: model.link_name,
            clicked_at: model.clicked_at,
        }
    }
}

/// 按链接名聚合的点击数
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromQueryResult)]
pub struct LinkClickCount {
    pub link_name: String,
    pub clicks: i64,
}

/// 存储后端信息
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct StorageConfig {
    pub storage_type: String,
    pub in_memory: bool,
}
