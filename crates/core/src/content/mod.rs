//! Typed content objects.
//!
//! A content object is one of a closed set of types, and each type carries
//! only the facets that apply to it. Conversion to and from the wide
//! `content` row lives in the `mapping` submodule alone.

mod error;
mod field;
mod kind;
mod mapping;
pub mod validate;

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::{Map, Value};

pub use error::ContentError;
pub use field::Field;
pub use folio_db::entities::ContentType;
pub use kind::ContentTypeExt;

/// Listing and SEO fields. Every type but Block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Listing {
    pub(crate) teaser: Option<String>,
    pub(crate) counter: i32,
    pub(crate) meta_title: Option<String>,
    pub(crate) meta_description: Option<String>,
    pub(crate) seo: Option<String>,
}

impl Listing {
    #[must_use]
    pub fn teaser(&self) -> Option<&str> {
        self.teaser.as_deref()
    }

    #[must_use]
    pub const fn counter(&self) -> i32 {
        self.counter
    }

    #[must_use]
    pub fn meta_title(&self) -> Option<&str> {
        self.meta_title.as_deref()
    }

    #[must_use]
    pub fn meta_description(&self) -> Option<&str> {
        self.meta_description.as_deref()
    }

    #[must_use]
    pub fn seo(&self) -> Option<&str> {
        self.seo.as_deref()
    }

    /// Set the teaser, cleaned of disallowed markup.
    pub fn set_teaser(&mut self, value: &str) {
        self.teaser = validate::sanitize_html(value);
    }

    pub fn set_counter(&mut self, value: i64) -> Result<(), ContentError> {
        self.counter = i32::try_from(value)
            .ok()
            .filter(|c| *c >= 0)
            .ok_or_else(|| ContentError::invalid(Field::Counter, "must be a positive number"))?;
        Ok(())
    }

    pub fn set_meta_title(&mut self, value: &str) {
        self.meta_title = validate::plain_text(value);
    }

    pub fn set_meta_description(&mut self, value: &str) {
        self.meta_description = validate::plain_text(value);
    }

    /// Set the URL slug. Runs of whitespace become a single dash.
    pub fn set_seo(&mut self, value: &str) {
        self.seo = validate::slugify(value);
    }

    fn set_field(&mut self, field: Field, value: &Value) -> Result<bool, ContentError> {
        match field {
            Field::Teaser => self.set_teaser(&text(value)),
            Field::Counter => self.set_counter(int(field, value)?)?,
            Field::MetaTitle => self.set_meta_title(&text(value)),
            Field::MetaDescription => self.set_meta_description(&text(value)),
            Field::Seo => self.set_seo(&text(value)),
            _ => return Ok(false),
        }
        Ok(true)
    }
}

/// Authorship and licensing. Every type but Block and Tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Byline {
    pub(crate) creator: Option<String>,
    pub(crate) date: Option<NaiveDate>,
    pub(crate) language: Option<String>,
    pub(crate) rights: i32,
    pub(crate) publisher: Option<String>,
}

impl Default for Byline {
    fn default() -> Self {
        Self {
            creator: None,
            date: Some(validate::today()),
            language: None,
            rights: 1,
            publisher: None,
        }
    }
}

impl Byline {
    #[must_use]
    pub fn creator(&self) -> Option<&str> {
        self.creator.as_deref()
    }

    #[must_use]
    pub const fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    #[must_use]
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    /// License id.
    #[must_use]
    pub const fn rights(&self) -> i32 {
        self.rights
    }

    #[must_use]
    pub fn publisher(&self) -> Option<&str> {
        self.publisher.as_deref()
    }

    pub fn set_creator(&mut self, value: &str) {
        self.creator = validate::plain_text(value);
    }

    /// Parse a `YYYY-MM-DD` date. Anything else falls back to today.
    pub fn set_date(&mut self, value: &str) {
        self.date = Some(validate::parse_date(value));
    }

    pub const fn set_date_value(&mut self, date: NaiveDate) {
        self.date = Some(date);
    }

    pub fn set_language(&mut self, value: &str) -> Result<(), ContentError> {
        self.language = validate::check_language(value)?;
        Ok(())
    }

    pub fn set_rights(&mut self, value: i64) -> Result<(), ContentError> {
        self.rights = validate::check_rights(value)?;
        Ok(())
    }

    pub fn set_publisher(&mut self, value: &str) {
        self.publisher = validate::plain_text(value);
    }

    fn set_field(&mut self, field: Field, value: &Value) -> Result<bool, ContentError> {
        match field {
            Field::Creator => self.set_creator(&text(value)),
            Field::Date => self.set_date(&text(value)),
            Field::Language => self.set_language(&text(value))?,
            Field::Rights => self.set_rights(int(field, value)?)?,
            Field::Publisher => self.set_publisher(&text(value)),
            _ => return Ok(false),
        }
        Ok(true)
    }
}

/// An attached media file. Audio, Collection, Download and Video.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaFile {
    pub(crate) media: Option<String>,
    pub(crate) format: Option<String>,
    pub(crate) file_size: i64,
}

impl MediaFile {
    #[must_use]
    pub fn media(&self) -> Option<&str> {
        self.media.as_deref()
    }

    /// Mimetype of the media file.
    #[must_use]
    pub fn format(&self) -> Option<&str> {
        self.format.as_deref()
    }

    #[must_use]
    pub const fn file_size(&self) -> i64 {
        self.file_size
    }

    /// Set the media file name and derive its mimetype. A rejected name
    /// clears the whole facet.
    pub fn set_media(&mut self, name: &str) -> Result<(), ContentError> {
        let name = name.trim();
        if name.is_empty() {
            self.clear();
            return Ok(());
        }
        match validate::media_mimetype(name) {
            Ok(mimetype) => {
                self.media = Some(name.to_string());
                self.format = Some(mimetype.to_string());
                Ok(())
            }
            Err(err) => {
                self.clear();
                Err(err)
            }
        }
    }

    pub fn set_format(&mut self, value: &str) -> Result<(), ContentError> {
        let value = value.trim();
        if value.is_empty() {
            self.format = None;
        } else if validate::is_media_mimetype(value) {
            self.format = Some(value.to_string());
        } else {
            return Err(ContentError::invalid(
                Field::Format,
                format!("mimetype not allowed: {value}"),
            ));
        }
        Ok(())
    }

    pub fn set_file_size(&mut self, value: i64) -> Result<(), ContentError> {
        if value < 0 {
            return Err(ContentError::invalid(Field::FileSize, "must not be negative"));
        }
        self.file_size = value;
        Ok(())
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    fn set_field(&mut self, field: Field, value: &Value) -> Result<bool, ContentError> {
        match field {
            Field::Media => self.set_media(&text(value))?,
            Field::Format => self.set_format(&text(value))?,
            Field::FileSize => self.set_file_size(int(field, value)?)?,
            _ => return Ok(false),
        }
        Ok(true)
    }
}

/// Article and Image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub(crate) listing: Listing,
    pub(crate) byline: Byline,
    pub(crate) parent: i32,
    pub(crate) tags: BTreeSet<i32>,
}

/// Audio, Collection, Download and Video.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaItem {
    pub(crate) listing: Listing,
    pub(crate) byline: Byline,
    pub(crate) file: MediaFile,
    pub(crate) parent: i32,
    pub(crate) tags: BTreeSet<i32>,
}

/// Static pages sit outside collections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticPage {
    pub(crate) listing: Listing,
    pub(crate) byline: Byline,
    pub(crate) tags: BTreeSet<i32>,
}

/// Tags are listed like content but carry no byline and no tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagPage {
    pub(crate) listing: Listing,
}

/// Type-specific part of a content object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentBody {
    Article(Document),
    Audio(MediaItem),
    /// Blocks keep only the shared fields.
    Block,
    Collection(MediaItem),
    Download(MediaItem),
    Image(Document),
    Static(StaticPage),
    Tag(TagPage),
    Video(MediaItem),
}

/// Facets detached from a body, for rebuilding it as another type.
#[derive(Debug, Default)]
pub(crate) struct Facets {
    pub(crate) listing: Option<Listing>,
    pub(crate) byline: Option<Byline>,
    pub(crate) file: Option<MediaFile>,
    pub(crate) parent: i32,
    pub(crate) tags: BTreeSet<i32>,
}

impl ContentBody {
    /// Build a body of `content_type` from whatever facets are at hand.
    /// Missing facets take their defaults, surplus ones are dropped.
    pub(crate) fn from_facets(content_type: ContentType, facets: Facets) -> Self {
        let Facets {
            listing,
            byline,
            file,
            parent,
            tags,
        } = facets;
        let listing = listing.unwrap_or_default();
        let byline = byline.unwrap_or_default();
        let file = file.unwrap_or_default();

        let document = |listing, byline, parent, tags| Document {
            listing,
            byline,
            parent,
            tags,
        };
        let item = |listing, byline, file, parent, tags| MediaItem {
            listing,
            byline,
            file,
            parent,
            tags,
        };

        match content_type {
            ContentType::Article => Self::Article(document(listing, byline, parent, tags)),
            ContentType::Image => Self::Image(document(listing, byline, parent, tags)),
            ContentType::Audio => Self::Audio(item(listing, byline, file, parent, tags)),
            ContentType::Collection => {
                Self::Collection(item(listing, byline, file, parent, tags))
            }
            ContentType::Download => Self::Download(item(listing, byline, file, parent, tags)),
            ContentType::Video => Self::Video(item(listing, byline, file, parent, tags)),
            ContentType::Static => Self::Static(StaticPage {
                listing,
                byline,
                tags,
            }),
            ContentType::Tag => Self::Tag(TagPage { listing }),
            ContentType::Block => Self::Block,
        }
    }

    pub(crate) fn into_facets(self) -> Facets {
        match self {
            Self::Article(d) | Self::Image(d) => Facets {
                listing: Some(d.listing),
                byline: Some(d.byline),
                file: None,
                parent: d.parent,
                tags: d.tags,
            },
            Self::Audio(m) | Self::Collection(m) | Self::Download(m) | Self::Video(m) => Facets {
                listing: Some(m.listing),
                byline: Some(m.byline),
                file: Some(m.file),
                parent: m.parent,
                tags: m.tags,
            },
            Self::Static(s) => Facets {
                listing: Some(s.listing),
                byline: Some(s.byline),
                tags: s.tags,
                ..Facets::default()
            },
            Self::Tag(t) => Facets {
                listing: Some(t.listing),
                ..Facets::default()
            },
            Self::Block => Facets::default(),
        }
    }

    #[must_use]
    pub const fn content_type(&self) -> ContentType {
        match self {
            Self::Article(_) => ContentType::Article,
            Self::Audio(_) => ContentType::Audio,
            Self::Block => ContentType::Block,
            Self::Collection(_) => ContentType::Collection,
            Self::Download(_) => ContentType::Download,
            Self::Image(_) => ContentType::Image,
            Self::Static(_) => ContentType::Static,
            Self::Tag(_) => ContentType::Tag,
            Self::Video(_) => ContentType::Video,
        }
    }

    const fn listing(&self) -> Option<&Listing> {
        match self {
            Self::Article(d) | Self::Image(d) => Some(&d.listing),
            Self::Audio(m) | Self::Collection(m) | Self::Download(m) | Self::Video(m) => {
                Some(&m.listing)
            }
            Self::Static(s) => Some(&s.listing),
            Self::Tag(t) => Some(&t.listing),
            Self::Block => None,
        }
    }

    const fn listing_mut(&mut self) -> Option<&mut Listing> {
        match self {
            Self::Article(d) | Self::Image(d) => Some(&mut d.listing),
            Self::Audio(m) | Self::Collection(m) | Self::Download(m) | Self::Video(m) => {
                Some(&mut m.listing)
            }
            Self::Static(s) => Some(&mut s.listing),
            Self::Tag(t) => Some(&mut t.listing),
            Self::Block => None,
        }
    }

    const fn byline(&self) -> Option<&Byline> {
        match self {
            Self::Article(d) | Self::Image(d) => Some(&d.byline),
            Self::Audio(m) | Self::Collection(m) | Self::Download(m) | Self::Video(m) => {
                Some(&m.byline)
            }
            Self::Static(s) => Some(&s.byline),
            Self::Tag(_) | Self::Block => None,
        }
    }

    const fn byline_mut(&mut self) -> Option<&mut Byline> {
        match self {
            Self::Article(d) | Self::Image(d) => Some(&mut d.byline),
            Self::Audio(m) | Self::Collection(m) | Self::Download(m) | Self::Video(m) => {
                Some(&mut m.byline)
            }
            Self::Static(s) => Some(&mut s.byline),
            Self::Tag(_) | Self::Block => None,
        }
    }

    const fn file(&self) -> Option<&MediaFile> {
        match self {
            Self::Audio(m) | Self::Collection(m) | Self::Download(m) | Self::Video(m) => {
                Some(&m.file)
            }
            _ => None,
        }
    }

    const fn file_mut(&mut self) -> Option<&mut MediaFile> {
        match self {
            Self::Audio(m) | Self::Collection(m) | Self::Download(m) | Self::Video(m) => {
                Some(&mut m.file)
            }
            _ => None,
        }
    }

    const fn parent(&self) -> Option<i32> {
        match self {
            Self::Article(d) | Self::Image(d) => Some(d.parent),
            Self::Audio(m) | Self::Collection(m) | Self::Download(m) | Self::Video(m) => {
                Some(m.parent)
            }
            _ => None,
        }
    }

    const fn parent_mut(&mut self) -> Option<&mut i32> {
        match self {
            Self::Article(d) | Self::Image(d) => Some(&mut d.parent),
            Self::Audio(m) | Self::Collection(m) | Self::Download(m) | Self::Video(m) => {
                Some(&mut m.parent)
            }
            _ => None,
        }
    }

    const fn tags(&self) -> Option<&BTreeSet<i32>> {
        match self {
            Self::Article(d) | Self::Image(d) => Some(&d.tags),
            Self::Audio(m) | Self::Collection(m) | Self::Download(m) | Self::Video(m) => {
                Some(&m.tags)
            }
            Self::Static(s) => Some(&s.tags),
            Self::Tag(_) | Self::Block => None,
        }
    }

    const fn tags_mut(&mut self) -> Option<&mut BTreeSet<i32>> {
        match self {
            Self::Article(d) | Self::Image(d) => Some(&mut d.tags),
            Self::Audio(m) | Self::Collection(m) | Self::Download(m) | Self::Video(m) => {
                Some(&mut m.tags)
            }
            Self::Static(s) => Some(&mut s.tags),
            Self::Tag(_) | Self::Block => None,
        }
    }
}

/// A content object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Content {
    pub(crate) id: i32,
    pub(crate) title: String,
    pub(crate) description: Option<String>,
    pub(crate) image: Option<String>,
    pub(crate) caption: Option<String>,
    pub(crate) online: bool,
    pub(crate) submission_time: Option<DateTime<Utc>>,
    pub(crate) body: ContentBody,
}

impl Content {
    /// Create an unsaved object of the given type with default values.
    #[must_use]
    pub fn new(content_type: ContentType) -> Self {
        Self {
            id: 0,
            title: String::new(),
            description: None,
            image: None,
            caption: None,
            online: true,
            submission_time: None,
            body: ContentBody::from_facets(content_type, Facets::default()),
        }
    }

    /// Create an unsaved object from a type name.
    pub fn from_type_name(name: &str) -> Result<Self, ContentError> {
        Ok(Self::new(name.parse()?))
    }

    #[must_use]
    pub const fn id(&self) -> i32 {
        self.id
    }

    #[must_use]
    pub const fn content_type(&self) -> ContentType {
        self.body.content_type()
    }

    #[must_use]
    pub const fn body(&self) -> &ContentBody {
        &self.body
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Image file name.
    #[must_use]
    pub fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }

    #[must_use]
    pub fn caption(&self) -> Option<&str> {
        self.caption.as_deref()
    }

    #[must_use]
    pub const fn online(&self) -> bool {
        self.online
    }

    /// Set when the object is first stored.
    #[must_use]
    pub const fn submission_time(&self) -> Option<DateTime<Utc>> {
        self.submission_time
    }

    #[must_use]
    pub const fn listing(&self) -> Option<&Listing> {
        self.body.listing()
    }

    pub const fn listing_mut(&mut self) -> Option<&mut Listing> {
        self.body.listing_mut()
    }

    #[must_use]
    pub const fn byline(&self) -> Option<&Byline> {
        self.body.byline()
    }

    pub const fn byline_mut(&mut self) -> Option<&mut Byline> {
        self.body.byline_mut()
    }

    #[must_use]
    pub const fn media_file(&self) -> Option<&MediaFile> {
        self.body.file()
    }

    pub const fn media_file_mut(&mut self) -> Option<&mut MediaFile> {
        self.body.file_mut()
    }

    /// Id of the parent collection, 0 for none. `None` when the type has no
    /// parent.
    #[must_use]
    pub const fn parent(&self) -> Option<i32> {
        self.body.parent()
    }

    #[must_use]
    pub const fn tags(&self) -> Option<&BTreeSet<i32>> {
        self.body.tags()
    }

    /// Assign the object's id. Storage normally does this.
    pub fn set_id(&mut self, id: i64) -> Result<(), ContentError> {
        let id = i32::try_from(id)
            .ok()
            .filter(|id| *id >= 0)
            .ok_or_else(|| ContentError::invalid(Field::Id, "must be a positive number"))?;
        if id > 0 && self.parent() == Some(id) {
            return Err(ContentError::SelfParent(id));
        }
        self.id = id;
        Ok(())
    }

    pub fn set_title(&mut self, value: &str) -> Result<(), ContentError> {
        let title = value.trim();
        if title.chars().count() > 255 {
            return Err(ContentError::invalid(Field::Title, "longer than 255 characters"));
        }
        self.title = title.to_string();
        Ok(())
    }

    /// Set the body text, cleaned of disallowed markup.
    pub fn set_description(&mut self, value: &str) {
        self.description = validate::sanitize_html(value);
    }

    /// Set the image file name. A rejected name clears the field.
    pub fn set_image(&mut self, name: &str) -> Result<(), ContentError> {
        let name = name.trim();
        if name.is_empty() {
            self.image = None;
            return Ok(());
        }
        match validate::image_mimetype(name) {
            Ok(_) => {
                self.image = Some(name.to_string());
                Ok(())
            }
            Err(err) => {
                self.image = None;
                Err(err)
            }
        }
    }

    pub fn set_caption(&mut self, value: &str) {
        self.caption = validate::plain_text(value);
    }

    pub const fn set_online(&mut self, online: bool) {
        self.online = online;
    }

    /// Place the object in a collection. 0 removes it from any collection.
    pub fn set_parent(&mut self, parent: i64) -> Result<(), ContentError> {
        let content_type = self.content_type();
        let id = self.id;
        let slot = self.body.parent_mut().ok_or(ContentError::NotApplicable {
            field: Field::Parent,
            content_type,
        })?;
        let parent = i32::try_from(parent)
            .ok()
            .filter(|p| *p >= 0)
            .ok_or_else(|| ContentError::invalid(Field::Parent, "must be a content id"))?;
        if parent > 0 && parent == id {
            return Err(ContentError::SelfParent(id));
        }
        *slot = parent;
        Ok(())
    }

    /// Replace the tag set.
    pub fn set_tags(&mut self, tags: impl IntoIterator<Item = i32>) -> Result<(), ContentError> {
        let content_type = self.content_type();
        let slot = match self.body.tags_mut() {
            Some(slot) => slot,
            None if content_type == ContentType::Tag => return Err(ContentError::TagsOnTag),
            None => {
                return Err(ContentError::NotApplicable {
                    field: Field::Tags,
                    content_type,
                });
            }
        };
        let mut next = BTreeSet::new();
        for tag in tags {
            if tag <= 0 {
                return Err(ContentError::invalid(
                    Field::Tags,
                    format!("not a tag id: {tag}"),
                ));
            }
            next.insert(tag);
        }
        *slot = next;
        Ok(())
    }

    /// Change the object's type. Facets both types share are kept, the
    /// rest are dropped or take their defaults.
    pub fn retype(&mut self, content_type: ContentType) {
        if content_type == self.content_type() {
            return;
        }
        let body = std::mem::replace(&mut self.body, ContentBody::Block);
        self.body = ContentBody::from_facets(content_type, body.into_facets());
    }

    /// Fields live on this object, derived ones excluded.
    #[must_use]
    pub fn property_whitelist(&self) -> BTreeSet<Field> {
        let mut fields = BTreeSet::from([
            Field::Id,
            Field::Type,
            Field::Title,
            Field::Description,
            Field::Image,
            Field::Caption,
            Field::Online,
            Field::SubmissionTime,
        ]);
        if self.listing().is_some() {
            fields.extend([
                Field::Teaser,
                Field::Counter,
                Field::MetaTitle,
                Field::MetaDescription,
                Field::Seo,
            ]);
        }
        if self.byline().is_some() {
            fields.extend([
                Field::Creator,
                Field::Date,
                Field::Language,
                Field::Rights,
                Field::Publisher,
            ]);
        }
        if self.media_file().is_some() {
            fields.extend([Field::Media, Field::Format, Field::FileSize]);
        }
        if self.parent().is_some() {
            fields.insert(Field::Parent);
        }
        if self.tags().is_some() {
            fields.insert(Field::Tags);
        }
        fields
    }

    /// Set a field by name. Returns `Ok(false)` when the name is unknown or
    /// the field does not exist on this type.
    pub fn set_property(&mut self, name: &str, value: &Value) -> Result<bool, ContentError> {
        let Ok(field) = name.parse::<Field>() else {
            return Ok(false);
        };
        if !self.property_whitelist().contains(&field) {
            return Ok(false);
        }

        if let Some(listing) = self.body.listing_mut() {
            if listing.set_field(field, value)? {
                return Ok(true);
            }
        }
        if let Some(byline) = self.body.byline_mut() {
            if byline.set_field(field, value)? {
                return Ok(true);
            }
        }
        if let Some(file) = self.body.file_mut() {
            if file.set_field(field, value)? {
                return Ok(true);
            }
        }

        match field {
            Field::Id => self.set_id(int(field, value)?)?,
            Field::Title => self.set_title(&text(value))?,
            Field::Description => self.set_description(&text(value)),
            Field::Image => self.set_image(&text(value))?,
            Field::Caption => self.set_caption(&text(value)),
            Field::Online => self.set_online(boolean(field, value)?),
            Field::Parent => self.set_parent(int(field, value)?)?,
            Field::Tags => self.set_tags(id_list(value)?)?,
            // Managed by storage
            _ => return Ok(false),
        }
        Ok(true)
    }

    /// Apply untrusted input keyed by field name.
    ///
    /// Only fields live on this object are read. Recoverable errors are
    /// collected and returned, an unsafe file path aborts the load.
    pub fn load_properties(
        &mut self,
        input: &Map<String, Value>,
    ) -> Result<Vec<ContentError>, ContentError> {
        let mut errors = Vec::new();
        let mut media_rejected = false;

        for field in self.property_whitelist() {
            let Some(value) = input.get(field.as_str()) else {
                continue;
            };
            // Never pair a rejected file with a supplied mimetype or size
            if media_rejected && matches!(field, Field::Format | Field::FileSize) {
                continue;
            }
            match self.set_property(field.as_str(), value) {
                Ok(_) => {}
                Err(err) if err.is_fatal() => return Err(err),
                Err(err) => {
                    media_rejected |= field == Field::Media;
                    errors.push(err);
                }
            }
        }

        Ok(errors)
    }
}

fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn int(field: Field, value: &Value) -> Result<i64, ContentError> {
    let parsed = match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) if s.trim().is_empty() => Some(0),
        Value::String(s) => s.trim().parse().ok(),
        Value::Bool(b) => Some(i64::from(*b)),
        Value::Null => Some(0),
        _ => None,
    };
    parsed.ok_or_else(|| ContentError::invalid(field, format!("not a number: {value}")))
}

fn boolean(field: Field, value: &Value) -> Result<bool, ContentError> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::Number(n) => Ok(n.as_i64() != Some(0)),
        Value::Null => Ok(false),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "on" | "yes" => Ok(true),
            "" | "0" | "false" | "off" | "no" => Ok(false),
            _ => Err(ContentError::invalid(field, format!("not a boolean: {s}"))),
        },
        Value::Array(_) | Value::Object(_) => {
            Err(ContentError::invalid(field, format!("not a boolean: {value}")))
        }
    }
}

fn id_list(value: &Value) -> Result<Vec<i32>, ContentError> {
    let raw: Vec<i64> = match value {
        Value::Null => Vec::new(),
        Value::Array(items) => items
            .iter()
            .map(|item| int(Field::Tags, item))
            .collect::<Result<_, _>>()?,
        Value::String(s) => s
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse()
                    .map_err(|_| ContentError::invalid(Field::Tags, format!("not a tag id: {s}")))
            })
            .collect::<Result<_, _>>()?,
        other => vec![int(Field::Tags, other)?],
    };
    raw.into_iter()
        .map(|id| {
            i32::try_from(id)
                .map_err(|_| ContentError::invalid(Field::Tags, format!("not a tag id: {id}")))
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_whitelist_matches_zeroed_fields() {
        for content_type in ContentType::ALL {
            let content = Content::new(content_type);
            let expected: BTreeSet<Field> = Field::ALL
                .into_iter()
                .filter(|f| !content_type.zeroed_fields().contains(f))
                .filter(|f| !f.is_derived())
                .collect();
            assert_eq!(content.property_whitelist(), expected, "{content_type}");
        }
    }

    #[test]
    fn test_tag_whitelist_excludes_byline_and_tags() {
        let whitelist = Content::new(ContentType::Tag).property_whitelist();
        for field in [
            Field::Tags,
            Field::Creator,
            Field::Language,
            Field::Rights,
            Field::Publisher,
        ] {
            assert!(!whitelist.contains(&field), "{field}");
        }
    }

    #[test]
    fn test_new_defaults() {
        let content = Content::new(ContentType::Article);
        assert_eq!(content.id(), 0);
        assert!(content.online());
        assert_eq!(content.byline().unwrap().rights(), 1);
        assert_eq!(content.byline().unwrap().date(), Some(validate::today()));
        assert_eq!(content.listing().unwrap().counter(), 0);
        assert!(content.tags().unwrap().is_empty());
        assert!(content.media_file().is_none());
    }

    #[test]
    fn test_self_parent_is_rejected() {
        let mut content = Content::new(ContentType::Article);
        content.set_id(5).unwrap();
        assert_eq!(content.set_parent(5), Err(ContentError::SelfParent(5)));
        assert_eq!(content.parent(), Some(0));
        content.set_parent(6).unwrap();
        assert_eq!(content.parent(), Some(6));

        // Assigning an id equal to the current parent is caught too.
        let mut other = Content::new(ContentType::Video);
        other.set_parent(9).unwrap();
        assert_eq!(other.set_id(9), Err(ContentError::SelfParent(9)));
    }

    #[test]
    fn test_parent_not_applicable_to_static() {
        let mut content = Content::new(ContentType::Static);
        assert!(matches!(
            content.set_parent(3),
            Err(ContentError::NotApplicable {
                field: Field::Parent,
                ..
            })
        ));
    }

    #[test]
    fn test_tags_on_tag_rejected() {
        let mut tag = Content::new(ContentType::Tag);
        assert_eq!(tag.set_tags([1, 2]), Err(ContentError::TagsOnTag));
        // Generic entry point ignores the field.
        assert_eq!(tag.set_property("tags", &json!([1, 2])), Ok(false));
    }

    #[test]
    fn test_set_property_dispatch() {
        let mut content = Content::new(ContentType::Download);
        assert_eq!(content.set_property("title", &json!("  Manual ")), Ok(true));
        assert_eq!(content.set_property("seo", &json!("user  manual")), Ok(true));
        assert_eq!(content.set_property("rights", &json!("3")), Ok(true));
        assert_eq!(content.set_property("tags", &json!("4, 2,4")), Ok(true));
        assert_eq!(content.set_property("nonsense", &json!(1)), Ok(false));
        assert_eq!(content.set_property("handler", &json!("x")), Ok(false));

        assert_eq!(content.title(), "Manual");
        assert_eq!(content.listing().unwrap().seo(), Some("user-manual"));
        assert_eq!(content.byline().unwrap().rights(), 3);
        assert_eq!(content.tags().unwrap(), &BTreeSet::from([2, 4]));
    }

    #[test]
    fn test_block_ignores_listing_fields() {
        let mut block = Content::new(ContentType::Block);
        assert_eq!(block.set_property("teaser", &json!("<p>x</p>")), Ok(false));
        assert_eq!(block.set_property("counter", &json!(5)), Ok(false));
        assert_eq!(block.set_property("caption", &json!("Side")), Ok(true));
        assert!(block.listing().is_none());
    }

    #[test]
    fn test_bad_media_extension_clears_file() {
        let mut content = Content::new(ContentType::Audio);
        content
            .media_file_mut()
            .unwrap()
            .set_media("talk.mp3")
            .unwrap();
        content.media_file_mut().unwrap().set_file_size(1024).unwrap();

        let err = content
            .media_file_mut()
            .unwrap()
            .set_media("talk.exe")
            .unwrap_err();

        assert!(matches!(err, ContentError::DisallowedFile { .. }));
        let file = content.media_file().unwrap();
        assert_eq!(file.media(), None);
        assert_eq!(file.format(), None);
        assert_eq!(file.file_size(), 0);
    }

    #[test]
    fn test_load_properties_collects_errors() {
        let mut content = Content::new(ContentType::Video);
        let input = object(json!({
            "title": "Launch",
            "rights": 99,
            "language": "klingon",
            "media": "launch.exe",
            "format": "video/mp4",
            "file_size": 4096,
            "date": "not a date",
            "online": "0",
        }));

        let errors = content.load_properties(&input).unwrap();

        assert_eq!(errors.len(), 3);
        assert_eq!(content.title(), "Launch");
        assert!(!content.online());
        assert_eq!(content.byline().unwrap().rights(), 1);
        assert_eq!(content.byline().unwrap().date(), Some(validate::today()));
        let file = content.media_file().unwrap();
        assert_eq!(file.media(), None);
        assert_eq!(file.format(), None);
        assert_eq!(file.file_size(), 0);
    }

    #[test]
    fn test_load_properties_aborts_on_unsafe_path() {
        let mut content = Content::new(ContentType::Article);
        let input = object(json!({
            "title": "Hi",
            "image": "../../etc/passwd.png",
        }));

        let err = content.load_properties(&input).unwrap_err();

        assert!(err.is_fatal());
        assert_eq!(content.image(), None);
    }

    #[test]
    fn test_load_properties_skips_zeroed_fields() {
        let mut tag = Content::new(ContentType::Tag);
        let input = object(json!({
            "title": "rust",
            "creator": "someone",
            "rights": 4,
            "tags": [1, 2],
            "teaser": "<b>Systems</b> language",
        }));

        let errors = tag.load_properties(&input).unwrap();

        assert!(errors.is_empty());
        assert_eq!(tag.title(), "rust");
        assert!(tag.byline().is_none());
        assert!(tag.tags().is_none());
        assert_eq!(
            tag.listing().unwrap().teaser(),
            Some("<b>Systems</b> language")
        );
    }

    #[test]
    fn test_retype_keeps_shared_facets() {
        let mut content = Content::new(ContentType::Collection);
        content.set_title("Album").unwrap();
        content.set_parent(2).unwrap();
        content.set_tags([7]).unwrap();
        content
            .media_file_mut()
            .unwrap()
            .set_media("album.zip")
            .unwrap();

        content.retype(ContentType::Article);

        assert_eq!(content.content_type(), ContentType::Article);
        assert_eq!(content.title(), "Album");
        assert_eq!(content.parent(), Some(2));
        assert_eq!(content.tags(), Some(&BTreeSet::from([7])));
        assert!(content.media_file().is_none());

        content.retype(ContentType::Tag);
        assert!(content.tags().is_none());
        assert!(content.listing().is_some());
    }

    #[test]
    fn test_from_type_name_rejects_unknown() {
        assert!(matches!(
            Content::from_type_name("Podcast"),
            Err(ContentError::UnknownType(_))
        ));
        assert_eq!(
            Content::from_type_name("Image").unwrap().content_type(),
            ContentType::Image
        );
    }
}
