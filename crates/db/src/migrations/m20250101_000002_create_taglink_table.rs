//! Create taglink table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Taglink::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Taglink::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Taglink::ContentId).integer().not_null())
                    .col(ColumnDef::new(Taglink::TagId).integer().not_null())
                    .col(ColumnDef::new(Taglink::ContentType).string_len(32).not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_taglink_content_id")
                    .table(Taglink::Table)
                    .col(Taglink::ContentId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_taglink_tag_id")
                    .table(Taglink::Table)
                    .col(Taglink::TagId)
                    .to_owned(),
            )
            .await?;

        // A piece of content carries each tag at most once
        manager
            .create_index(
                Index::create()
                    .name("idx_taglink_content_tag_unique")
                    .table(Taglink::Table)
                    .col(Taglink::ContentId)
                    .col(Taglink::TagId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Taglink::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Taglink {
    Table,
    Id,
    ContentId,
    TagId,
    ContentType,
}
