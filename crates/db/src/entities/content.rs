//! Content entity.
//!
//! Every content subtype shares this one wide table; the `type` column says
//! which subset of the columns is meaningful for a given row.

use std::fmt;
use std::str::FromStr;

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The closed set of content subtypes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ContentType {
    Article,
    Audio,
    Block,
    Collection,
    Download,
    Image,
    Static,
    Tag,
    Video,
}

impl ContentType {
    /// Every permitted subtype, in display order.
    pub const ALL: [Self; 9] = [
        Self::Article,
        Self::Audio,
        Self::Block,
        Self::Collection,
        Self::Download,
        Self::Image,
        Self::Static,
        Self::Tag,
        Self::Video,
    ];

    /// The discriminator as stored in the `type` column.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Article => "Article",
            Self::Audio => "Audio",
            Self::Block => "Block",
            Self::Collection => "Collection",
            Self::Download => "Download",
            Self::Image => "Image",
            Self::Static => "Static",
            Self::Tag => "Tag",
            Self::Video => "Video",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A discriminator outside the permitted set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown content type: {0:?}")]
pub struct UnknownContentType(pub String);

impl From<UnknownContentType> for folio_common::AppError {
    fn from(err: UnknownContentType) -> Self {
        Self::Internal(err.to_string())
    }
}

impl FromStr for ContentType {
    type Err = UnknownContentType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownContentType(s.to_string()))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "content")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Subtype discriminator
    #[sea_orm(column_name = "type", indexed)]
    pub content_type: String,

    pub title: String,

    /// Short HTML summary
    #[sea_orm(column_type = "Text", nullable)]
    pub teaser: Option<String>,

    /// HTML body
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,

    /// Media file name
    #[sea_orm(nullable)]
    pub media: Option<String>,

    /// Media mimetype
    #[sea_orm(nullable)]
    pub format: Option<String>,

    /// Media size in bytes
    #[sea_orm(default_value = 0)]
    pub file_size: i64,

    #[sea_orm(nullable)]
    pub creator: Option<String>,

    /// Image file name
    #[sea_orm(nullable)]
    pub image: Option<String>,

    #[sea_orm(nullable)]
    pub caption: Option<String>,

    #[sea_orm(nullable)]
    pub date: Option<Date>,

    /// Id of the parent collection, 0 for none
    #[sea_orm(default_value = 0, indexed)]
    pub parent: i32,

    #[sea_orm(nullable)]
    pub language: Option<String>,

    /// License id
    #[sea_orm(nullable)]
    pub rights: Option<i32>,

    #[sea_orm(nullable)]
    pub publisher: Option<String>,

    #[sea_orm(default_value = true)]
    pub online: bool,

    pub submission_time: DateTimeWithTimeZone,

    /// Views or downloads
    #[sea_orm(default_value = 0)]
    pub counter: i32,

    #[sea_orm(nullable)]
    pub meta_title: Option<String>,

    #[sea_orm(nullable)]
    pub meta_description: Option<String>,

    /// URL slug
    #[sea_orm(nullable)]
    pub seo: Option<String>,
}

impl Model {
    /// Parse the discriminator against the whitelist.
    pub fn content_type(&self) -> Result<ContentType, UnknownContentType> {
        self.content_type.parse()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_round_trips_through_str() {
        for t in ContentType::ALL {
            assert_eq!(t.as_str().parse::<ContentType>(), Ok(t));
        }
    }

    #[test]
    fn test_unknown_content_type_is_rejected() {
        let err = "Podcast".parse::<ContentType>().unwrap_err();
        assert_eq!(err, UnknownContentType("Podcast".to_string()));
        // Discriminators are case sensitive.
        assert!("article".parse::<ContentType>().is_err());
    }
}
