//! Content field names.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Every field a content object can carry, across all types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
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
    Tags,
    Online,
    SubmissionTime,
    Counter,
    MetaTitle,
    MetaDescription,
    Seo,
    Handler,
    Template,
    Module,
    Icon,
}

impl Field {
    pub const ALL: [Self; 27] = [
        Self::Id,
        Self::Type,
        Self::Title,
        Self::Teaser,
        Self::Description,
        Self::Media,
        Self::Format,
        Self::FileSize,
        Self::Creator,
        Self::Image,
        Self::Caption,
        Self::Date,
        Self::Parent,
        Self::Language,
        Self::Rights,
        Self::Publisher,
        Self::Tags,
        Self::Online,
        Self::SubmissionTime,
        Self::Counter,
        Self::MetaTitle,
        Self::MetaDescription,
        Self::Seo,
        Self::Handler,
        Self::Template,
        Self::Module,
        Self::Icon,
    ];

    /// Computed from the type, never stored.
    pub const DERIVED: [Self; 4] = [Self::Handler, Self::Template, Self::Module, Self::Icon];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Type => "type",
            Self::Title => "title",
            Self::Teaser => "teaser",
            Self::Description => "description",
            Self::Media => "media",
            Self::Format => "format",
            Self::FileSize => "file_size",
            Self::Creator => "creator",
            Self::Image => "image",
            Self::Caption => "caption",
            Self::Date => "date",
            Self::Parent => "parent",
            Self::Language => "language",
            Self::Rights => "rights",
            Self::Publisher => "publisher",
            Self::Tags => "tags",
            Self::Online => "online",
            Self::SubmissionTime => "submission_time",
            Self::Counter => "counter",
            Self::MetaTitle => "meta_title",
            Self::MetaDescription => "meta_description",
            Self::Seo => "seo",
            Self::Handler => "handler",
            Self::Template => "template",
            Self::Module => "module",
            Self::Icon => "icon",
        }
    }

    #[must_use]
    pub fn is_derived(self) -> bool {
        Self::DERIVED.contains(&self)
    }

    /// Stored in a `content` column.
    #[must_use]
    pub fn is_persistent(self) -> bool {
        self != Self::Tags && !self.is_derived()
    }

    /// Holds sanitized HTML rather than plain text.
    #[must_use]
    pub const fn is_html(self) -> bool {
        matches!(self, Self::Teaser | Self::Description | Self::Icon)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Field {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|f| f.as_str() == s).ok_or(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_names_parse_back() {
        for field in Field::ALL {
            assert_eq!(field.as_str().parse::<Field>(), Ok(field));
        }
        assert!("fileSize".parse::<Field>().is_err());
    }

    #[test]
    fn test_tags_and_derived_are_not_persistent() {
        assert!(!Field::Tags.is_persistent());
        assert!(!Field::Icon.is_persistent());
        assert!(Field::SubmissionTime.is_persistent());
    }
}
