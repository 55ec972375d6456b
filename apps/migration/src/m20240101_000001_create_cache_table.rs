use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Cache::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Cache::Key).text().not_null().primary_key())
                    .col(ColumnDef::new(Cache::Value).json_binary().not_null())
                    .col(
                        ColumnDef::new(Cache::ExpiresAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Purge scans by expiry.
        manager
            .create_index(
                Index::create()
                    .name("idx_cache_expires_at")
                    .table(Cache::Table)
                    .col(Cache::ExpiresAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Cache::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Cache {
    Table,
    Key,
    Value,
    ExpiresAt,
}
