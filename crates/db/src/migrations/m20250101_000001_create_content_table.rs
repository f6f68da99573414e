//! Create content table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Content::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Content::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Content::Type).string_len(32).not_null())
                    .col(ColumnDef::new(Content::Title).string_len(255).not_null())
                    .col(ColumnDef::new(Content::Teaser).text().null())
                    .col(ColumnDef::new(Content::Description).text().null())
                    .col(ColumnDef::new(Content::Media).string_len(255).null())
                    .col(ColumnDef::new(Content::Format).string_len(255).null())
                    .col(
                        ColumnDef::new(Content::FileSize)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Content::Creator).string_len(255).null())
                    .col(ColumnDef::new(Content::Image).string_len(255).null())
                    .col(ColumnDef::new(Content::Caption).string_len(255).null())
                    .col(ColumnDef::new(Content::Date).date().null())
                    .col(
                        ColumnDef::new(Content::Parent)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Content::Language).string_len(8).null())
                    .col(ColumnDef::new(Content::Rights).integer().null())
                    .col(ColumnDef::new(Content::Publisher).string_len(255).null())
                    .col(
                        ColumnDef::new(Content::Online)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Content::SubmissionTime)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Content::Counter)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Content::MetaTitle).string_len(255).null())
                    .col(ColumnDef::new(Content::MetaDescription).string_len(255).null())
                    .col(ColumnDef::new(Content::Seo).string_len(255).null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_content_type")
                    .table(Content::Table)
                    .col(Content::Type)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_content_parent")
                    .table(Content::Table)
                    .col(Content::Parent)
                    .to_owned(),
            )
            .await?;

        // Listings filter on visibility and sort by date
        manager
            .create_index(
                Index::create()
                    .name("idx_content_online_date")
                    .table(Content::Table)
                    .col(Content::Online)
                    .col(Content::Date)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Content::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Content {
    Table,
    Id,
    Type,
    Title,
    Teaser,
    Description,
    Media,
    Format,
    FileSize,
    Creator,
    Image,
    Caption,
    Date,
    Parent,
    Language,
    Rights,
    Publisher,
    Online,
    SubmissionTime,
    Counter,
    MetaTitle,
    MetaDescription,
    Seo,
}
