//! 点击记录的读写操作

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait, sea_query::Expr,
};
use tracing::{debug, warn};

use super::ClickStore;
use crate::errors::{BioLinksError, Result};
use crate::storage::models::{ClickEvent, LinkClickCount};

use migration::entities::link_click;

/// 在单个事务中插入一条点击；插入失败时显式回滚
async fn insert_click(
    db: &DatabaseConnection,
    link_name: &str,
) -> std::result::Result<link_click::Model, DbErr> {
    let txn = db.begin().await?;

    let inserted = link_click::ActiveModel {
        link_name: Set(link_name.to_string()),
        clicked_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await;

    match inserted {
        Ok(model) => {
            txn.commit().await?;
            Ok(model)
        }
        Err(e) => {
            if let Err(rb) = txn.rollback().await {
                warn!("Rollback after failed click insert also failed: {}", rb);
            }
            Err(e)
        }
    }
}

impl ClickStore {
    /// 记录一次点击，瞬时错误按 `op_retry` 重试
    pub async fn record_click(&self, link_name: &str) -> Result<ClickEvent> {
        let model = self
            .run_with_retry("record_click", |db| async move {
                insert_click(&db, link_name).await
            })
            .await?;

        debug!("Click recorded: {} (id={})", model.link_name, model.id);
        Ok(model.into())
    }

    /// 点击总数，可按链接名过滤
    pub async fn count_clicks(&self, link_name: Option<&str>) -> Result<u64> {
        let db = self.connection().await?;

        let mut query = link_click::Entity::find();
        if let Some(name) = link_name {
            query = query.filter(link_click::Column::LinkName.eq(name));
        }
        query.count(&db).await.map_err(BioLinksError::from)
    }

    /// 按链接名聚合点击数，点击多的在前
    pub async fn click_counts(&self) -> Result<Vec<LinkClickCount>> {
        let db = self.connection().await?;

        link_click::Entity::find()
            .select_only()
            .column(link_click::Column::LinkName)
            .column_as(link_click::Column::Id.count(), "clicks")
            .group_by(link_click::Column::LinkName)
            .order_by_desc(Expr::cust("clicks"))
            .order_by_asc(link_click::Column::LinkName)
            .into_model::<LinkClickCount>()
            .all(&db)
            .await
            .map_err(BioLinksError::from)
    }

    /// 最近的点击记录
    pub async fn recent_clicks(&self, limit: u64) -> Result<Vec<ClickEvent>> {
        let db = self.connection().await?;

        let models = link_click::Entity::find()
            .order_by_desc(link_click::Column::ClickedAt)
            .order_by_desc(link_click::Column::Id)
            .limit(limit)
            .all(&db)
            .await?;
        Ok(models.into_iter().map(ClickEvent::from).collect())
    }

    /// 分批删除 `cutoff` 之前的点击，返回删除总数
    pub async fn purge_older_than(&self, cutoff: DateTime<Utc>, batch_size: u64) -> Result<u64> {
        let db = self.connection().await?;
        let batch_size = batch_size.max(1);

        let mut total_deleted = 0u64;
        loop {
            let ids: Vec<i64> = link_click::Entity::find()
                .select_only()
                .column(link_click::Column::Id)
                .filter(link_click::Column::ClickedAt.lt(cutoff))
                .order_by_asc(link_click::Column::Id)
                .limit(batch_size)
                .into_tuple()
                .all(&db)
                .await?;

            if ids.is_empty() {
                break;
            }

            let deleted = link_click::Entity::delete_many()
                .filter(link_click::Column::Id.is_in(ids))
                .exec(&db)
                .await?
                .rows_affected;

            total_deleted += deleted;
            debug!(
                "Purged {} click rows older than {} (total {})",
                deleted, cutoff, total_deleted
            );

            if deleted < batch_size {
                break;
            }
        }

        Ok(total_deleted)
    }
}
