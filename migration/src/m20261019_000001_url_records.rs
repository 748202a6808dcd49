use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // short_code 主键即唯一约束，插入冲突由数据库判定
        manager
            .create_table(
                Table::create()
                    .table(UrlRecord::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UrlRecord::ShortCode)
                            .string_len(8)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(UrlRecord::OriginalUrl).text().not_null())
                    .col(
                        ColumnDef::new(UrlRecord::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // 预热时按创建时间倒序读取
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_url_records_created_at")
                    .table(UrlRecord::Table)
                    .col(UrlRecord::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_url_records_created_at")
                    .table(UrlRecord::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(UrlRecord::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum UrlRecord {
    #[sea_orm(iden = "url_records")]
    Table,
    ShortCode,
    OriginalUrl,
    CreatedAt,
}
