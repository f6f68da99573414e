//! Per-type metadata.

use folio_db::entities::ContentType;

use super::Field;

/// Fields each type does not carry.
const ARTICLE_ZEROED: &[Field] = &[Field::Media, Field::Format, Field::FileSize];

const BLOCK_ZEROED: &[Field] = &[
    Field::Teaser,
    Field::Media,
    Field::Format,
    Field::FileSize,
    Field::Creator,
    Field::Date,
    Field::Parent,
    Field::Language,
    Field::Rights,
    Field::Publisher,
    Field::Tags,
    Field::Counter,
    Field::MetaTitle,
    Field::MetaDescription,
    Field::Seo,
];

const STATIC_ZEROED: &[Field] = &[Field::Media, Field::Format, Field::FileSize, Field::Parent];

const TAG_ZEROED: &[Field] = &[
    Field::Media,
    Field::Format,
    Field::FileSize,
    Field::Creator,
    Field::Date,
    Field::Parent,
    Field::Language,
    Field::Rights,
    Field::Publisher,
    Field::Tags,
];

/// Metadata derived from a content type.
pub trait ContentTypeExt {
    /// Fields that are structurally absent for this type.
    fn zeroed_fields(self) -> &'static [Field];

    /// Handler responsible for objects of this type.
    fn handler(self) -> &'static str;

    /// Template used to render one object of this type.
    fn template(self) -> &'static str;

    fn module(self) -> &'static str;

    /// Icon markup shown next to the type in listings.
    fn icon(self) -> &'static str;

    /// Human-readable type name.
    fn display_name(self) -> &'static str;
}

impl ContentTypeExt for ContentType {
    fn zeroed_fields(self) -> &'static [Field] {
        match self {
            Self::Article | Self::Image => ARTICLE_ZEROED,
            Self::Audio | Self::Collection | Self::Download | Self::Video => &[],
            Self::Block => BLOCK_ZEROED,
            Self::Static => STATIC_ZEROED,
            Self::Tag => TAG_ZEROED,
        }
    }

    fn handler(self) -> &'static str {
        match self {
            Self::Tag => "tag",
            Self::Collection => "collection",
            _ => "content",
        }
    }

    fn template(self) -> &'static str {
        match self {
            Self::Article => "article",
            Self::Audio => "audio",
            Self::Block => "block",
            Self::Collection => "collection",
            Self::Download => "download",
            Self::Image => "image",
            Self::Static => "static",
            Self::Tag => "tag",
            Self::Video => "video",
        }
    }

    fn module(self) -> &'static str {
        "content"
    }

    fn icon(self) -> &'static str {
        match self {
            Self::Article => r#"<span class="fa fa-file-text-o" aria-hidden="true"></span>"#,
            Self::Audio => r#"<span class="fa fa-file-audio-o" aria-hidden="true"></span>"#,
            Self::Block => r#"<span class="fa fa-th-large" aria-hidden="true"></span>"#,
            Self::Collection => r#"<span class="fa fa-folder-open-o" aria-hidden="true"></span>"#,
            Self::Download => r#"<span class="fa fa-file-o" aria-hidden="true"></span>"#,
            Self::Image => r#"<span class="fa fa-file-image-o" aria-hidden="true"></span>"#,
            Self::Static => r#"<span class="fa fa-file-o" aria-hidden="true"></span>"#,
            Self::Tag => r#"<span class="fa fa-tag" aria-hidden="true"></span>"#,
            Self::Video => r#"<span class="fa fa-file-video-o" aria-hidden="true"></span>"#,
        }
    }

    fn display_name(self) -> &'static str {
        match self {
            Self::Article => "Article",
            Self::Audio => "Audio",
            Self::Block => "Block",
            Self::Collection => "Collection",
            Self::Download => "Download",
            Self::Image => "Image",
            Self::Static => "Static page",
            Self::Tag => "Tag",
            Self::Video => "Video",
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_handlers() {
        assert_eq!(ContentType::Tag.handler(), "tag");
        assert_eq!(ContentType::Collection.handler(), "collection");
        assert_eq!(ContentType::Video.handler(), "content");
    }

    #[test]
    fn test_template_is_lowercase_type() {
        for t in ContentType::ALL {
            assert_eq!(t.template(), t.as_str().to_lowercase());
        }
    }

    #[test]
    fn test_tag_cannot_hold_tags() {
        assert!(ContentType::Tag.zeroed_fields().contains(&Field::Tags));
        assert!(ContentType::Block.zeroed_fields().contains(&Field::Tags));
        assert!(!ContentType::Static.zeroed_fields().contains(&Field::Tags));
    }
}
