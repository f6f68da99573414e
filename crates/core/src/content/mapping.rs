//! Translation between content objects and `content` rows.

use std::collections::{BTreeSet, HashMap};

use chrono::Utc;
use folio_db::entities::{UnknownContentType, content};
use sea_orm::ActiveValue::{NotSet, Set};
use serde_json::{Map, Value, json};

use super::{
    Byline, Content, ContentBody, ContentTypeExt, Facets, Field, Listing, MediaFile,
};

impl Content {
    /// Rebuild an object from its row and tag ids.
    pub fn from_model(
        model: content::Model,
        tags: impl IntoIterator<Item = i32>,
    ) -> Result<Self, UnknownContentType> {
        let content_type = model.content_type()?;
        let facets = Facets {
            listing: Some(Listing {
                teaser: model.teaser,
                counter: model.counter,
                meta_title: model.meta_title,
                meta_description: model.meta_description,
                seo: model.seo,
            }),
            byline: Some(Byline {
                creator: model.creator,
                date: model.date,
                language: model.language,
                rights: model.rights.unwrap_or(1),
                publisher: model.publisher,
            }),
            file: Some(MediaFile {
                media: model.media,
                format: model.format,
                file_size: model.file_size,
            }),
            parent: model.parent,
            tags: tags.into_iter().collect(),
        };

        Ok(Self {
            id: model.id,
            title: model.title,
            description: model.description,
            image: model.image,
            caption: model.caption,
            online: model.online,
            submission_time: Some(model.submission_time.with_timezone(&Utc)),
            body: ContentBody::from_facets(content_type, facets),
        })
    }

    /// Rebuild a page of objects, taking each one's tags from `tags`.
    pub fn from_models(
        models: Vec<content::Model>,
        mut tags: HashMap<i32, BTreeSet<i32>>,
    ) -> Result<Vec<Self>, UnknownContentType> {
        models
            .into_iter()
            .map(|model| {
                let own = tags.remove(&model.id).unwrap_or_default();
                Self::from_model(model, own)
            })
            .collect()
    }

    /// Every column of the row. Columns the type does not carry are written
    /// empty, so a row never keeps values from an earlier type.
    #[must_use]
    pub fn to_active_model(&self) -> content::ActiveModel {
        let listing = self.listing();
        let byline = self.byline();
        let file = self.media_file();

        content::ActiveModel {
            id: if self.id > 0 { Set(self.id) } else { NotSet },
            content_type: Set(self.content_type().as_str().to_string()),
            title: Set(self.title.clone()),
            teaser: Set(listing.and_then(|l| l.teaser.clone())),
            description: Set(self.description.clone()),
            media: Set(file.and_then(|f| f.media.clone())),
            format: Set(file.and_then(|f| f.format.clone())),
            file_size: Set(file.map_or(0, |f| f.file_size)),
            creator: Set(byline.and_then(|b| b.creator.clone())),
            image: Set(self.image.clone()),
            caption: Set(self.caption.clone()),
            date: Set(byline.and_then(|b| b.date)),
            parent: Set(self.parent().unwrap_or(0)),
            language: Set(byline.and_then(|b| b.language.clone())),
            rights: Set(byline.map(|b| b.rights)),
            publisher: Set(byline.and_then(|b| b.publisher.clone())),
            online: Set(self.online),
            submission_time: self.submission_time.map_or(NotSet, |t| Set(t.into())),
            counter: Set(listing.map_or(0, |l| l.counter)),
            meta_title: Set(listing.and_then(|l| l.meta_title.clone())),
            meta_description: Set(listing.and_then(|l| l.meta_description.clone())),
            seo: Set(listing.and_then(|l| l.seo.clone())),
        }
    }

    /// Persistent live fields keyed by name. Tags and derived fields are
    /// left out.
    #[must_use]
    pub fn to_row(&self) -> Map<String, Value> {
        self.property_whitelist()
            .into_iter()
            .filter(|field| field.is_persistent())
            .map(|field| (field.as_str().to_string(), self.value_of(field)))
            .collect()
    }

    /// Current value of any field, `Null` when it is unset or not carried
    /// by this type.
    #[must_use]
    pub fn value_of(&self, field: Field) -> Value {
        let listing = self.listing();
        let byline = self.byline();
        let file = self.media_file();
        let content_type = self.content_type();

        match field {
            Field::Id => json!(self.id),
            Field::Type => json!(content_type.as_str()),
            Field::Title => json!(self.title),
            Field::Teaser => json!(listing.and_then(Listing::teaser)),
            Field::Description => json!(self.description),
            Field::Media => json!(file.and_then(MediaFile::media)),
            Field::Format => json!(file.and_then(MediaFile::format)),
            Field::FileSize => file.map_or(Value::Null, |f| json!(f.file_size)),
            Field::Creator => json!(byline.and_then(Byline::creator)),
            Field::Image => json!(self.image),
            Field::Caption => json!(self.caption),
            Field::Date => json!(
                byline
                    .and_then(Byline::date)
                    .map(|d| d.format("%Y-%m-%d").to_string())
            ),
            Field::Parent => json!(self.parent()),
            Field::Language => json!(byline.and_then(Byline::language)),
            Field::Rights => byline.map_or(Value::Null, |b| json!(b.rights)),
            Field::Publisher => json!(byline.and_then(Byline::publisher)),
            Field::Tags => json!(self.tags()),
            Field::Online => json!(self.online),
            Field::SubmissionTime => json!(self.submission_time.map(|t| t.to_rfc3339())),
            Field::Counter => listing.map_or(Value::Null, |l| json!(l.counter)),
            Field::MetaTitle => json!(listing.and_then(Listing::meta_title)),
            Field::MetaDescription => json!(listing.and_then(Listing::meta_description)),
            Field::Seo => json!(listing.and_then(Listing::seo)),
            Field::Handler => json!(content_type.handler()),
            Field::Template => json!(content_type.template()),
            Field::Module => json!(content_type.module()),
            Field::Icon => json!(content_type.icon()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::content::ContentType;
    use chrono::NaiveDate;

    fn row(content_type: &str) -> content::Model {
        content::Model {
            id: 12,
            content_type: content_type.to_string(),
            title: "Stale".to_string(),
            teaser: Some("<p>Teaser</p>".to_string()),
            description: Some("<p>Body</p>".to_string()),
            media: Some("old.mp3".to_string()),
            format: Some("audio/mpeg".to_string()),
            file_size: 2048,
            creator: Some("Anon".to_string()),
            image: None,
            caption: None,
            date: NaiveDate::from_ymd_opt(2024, 5, 1),
            parent: 3,
            language: Some("en".to_string()),
            rights: Some(2),
            publisher: Some("Press".to_string()),
            online: true,
            submission_time: Utc::now().into(),
            counter: 8,
            meta_title: None,
            meta_description: None,
            seo: Some("stale".to_string()),
        }
    }

    #[test]
    fn test_from_model_drops_columns_the_type_lacks() {
        let content = Content::from_model(row("Tag"), [1, 2]).unwrap();

        assert_eq!(content.content_type(), ContentType::Tag);
        assert!(content.byline().is_none());
        assert!(content.media_file().is_none());
        assert!(content.tags().is_none());
        assert_eq!(content.listing().unwrap().counter(), 8);
    }

    #[test]
    fn test_from_model_rejects_unknown_type() {
        let err = Content::from_model(row("Podcast"), []).unwrap_err();
        assert_eq!(err, UnknownContentType("Podcast".to_string()));
    }

    #[test]
    fn test_active_model_zeroes_absent_columns() {
        let mut content = Content::from_model(row("Audio"), [4]).unwrap();
        content.retype(ContentType::Static);

        let model = content.to_active_model();

        assert_eq!(model.id, Set(12));
        assert_eq!(model.content_type, Set("Static".to_string()));
        assert_eq!(model.media, Set(None));
        assert_eq!(model.format, Set(None));
        assert_eq!(model.file_size, Set(0));
        assert_eq!(model.parent, Set(0));
        assert_eq!(model.creator, Set(Some("Anon".to_string())));
    }

    #[test]
    fn test_active_model_for_block() {
        let content = Content::from_model(row("Block"), []).unwrap();
        let model = content.to_active_model();

        assert_eq!(model.teaser, Set(None));
        assert_eq!(model.rights, Set(None));
        assert_eq!(model.counter, Set(0));
        assert_eq!(model.seo, Set(None));
        assert_eq!(model.description, Set(Some("<p>Body</p>".to_string())));
    }

    #[test]
    fn test_unsaved_object_leaves_id_and_time_unset() {
        let model = Content::new(ContentType::Article).to_active_model();
        assert_eq!(model.id, NotSet);
        assert_eq!(model.submission_time, NotSet);
    }

    #[test]
    fn test_to_row_strips_tags_and_derived_fields() {
        let content = Content::from_model(row("Article"), [5]).unwrap();
        let row = content.to_row();

        assert!(!row.contains_key("tags"));
        assert!(!row.contains_key("handler"));
        assert!(!row.contains_key("media"));
        assert_eq!(row["date"], json!("2024-05-01"));
        assert_eq!(row["rights"], json!(2));
        assert_eq!(row["type"], json!("Article"));
    }

    #[test]
    fn test_from_models_fans_out_tags() {
        let mut second = row("Video");
        second.id = 13;
        let tags = HashMap::from([(12, BTreeSet::from([1])), (13, BTreeSet::from([2, 3]))]);

        let contents = Content::from_models(vec![row("Article"), second], tags).unwrap();

        assert_eq!(contents[0].tags(), Some(&BTreeSet::from([1])));
        assert_eq!(contents[1].tags(), Some(&BTreeSet::from([2, 3])));
    }
}
