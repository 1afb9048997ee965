//! 访问日志表迁移
//!
//! 创建 access_logs 表，每次成功解析短链接时追加一行：
//! - short_id: 被访问的短链接 ID
//! - timestamp: 访问时间
//! - user_ip: 客户端 IP

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AccessLogs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AccessLogs::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(AccessLogs::ShortId)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AccessLogs::Timestamp)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(AccessLogs::UserIp).string_len(64).not_null())
                    .to_owned(),
            )
            .await?;

        // 按短链接查询访问记录
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_access_logs_short_id")
                    .table(AccessLogs::Table)
                    .col(AccessLogs::ShortId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_access_logs_short_id").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(AccessLogs::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum AccessLogs {
    #[sea_orm(iden = "access_logs")]
    Table,
    Id,
    ShortId,
    Timestamp,
    UserIp,
}
