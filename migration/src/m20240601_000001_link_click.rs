//! 点击事件表迁移
//!
//! 创建 link_click 表，每次链接点击写入一行。
//! 仅在表不存在时创建，不做破坏性变更。

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(LinkClick::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LinkClick::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(LinkClick::LinkName).string_len(255).not_null())
                    .col(
                        ColumnDef::new(LinkClick::ClickedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // 按链接名统计
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_link_click_link_name")
                    .table(LinkClick::Table)
                    .col(LinkClick::LinkName)
                    .to_owned(),
            )
            .await?;

        // 保留期清理按时间范围删除
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_link_click_clicked_at")
                    .table(LinkClick::Table)
                    .col(LinkClick::ClickedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_link_click_clicked_at").to_owned())
            .await?;

        manager
            .drop_index(Index::drop().name("idx_link_click_link_name").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(LinkClick::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum LinkClick {
    #[sea_orm(iden = "link_click")]
    Table,
    Id,
    LinkName,
    ClickedAt,
}
