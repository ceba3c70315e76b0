use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 创建 shortlinks 表
        manager
            .create_table(
                Table::create()
                    .table(Shortlinks::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Shortlinks::Uid)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Shortlinks::OwnerId).string().not_null())
                    .col(ColumnDef::new(Shortlinks::Short).text().not_null())
                    // long 唯一：同一个长链接最多对应一条记录（先写者胜）。
                    // 约束必须随建表一起提交，ON CONFLICT(long) 依赖它
                    .col(
                        ColumnDef::new(Shortlinks::Long)
                            .text()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Shortlinks::Deleted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Shortlinks::CorrelationId).string().null())
                    .to_owned(),
            )
            .await?;

        // owner 索引，用于 list / delete_many
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_shortlinks_owner_id")
                    .table(Shortlinks::Table)
                    .col(Shortlinks::OwnerId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_shortlinks_owner_id").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Shortlinks::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Shortlinks {
    Table,
    Uid,
    OwnerId,
    Short,
    Long,
    Deleted,
    CorrelationId,
}
