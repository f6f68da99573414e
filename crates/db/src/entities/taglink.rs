//! Taglink entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Joins a content row to a Tag-typed content row.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "taglink")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// The tagged content
    #[sea_orm(indexed)]
    pub content_id: i32,

    /// The Tag-typed content
    #[sea_orm(indexed)]
    pub tag_id: i32,

    /// Type of the tagged content at link time
    pub content_type: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::content::Entity",
        from = "Column::ContentId",
        to = "super::content::Column::Id"
    )]
    Content,

    #[sea_orm(
        belongs_to = "super::content::Entity",
        from = "Column::TagId",
        to = "super::content::Column::Id"
    )]
    Tag,
}

impl Related<super::content::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Content.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
