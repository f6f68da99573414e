//! Content service.

use std::sync::Arc;

use chrono::Utc;
use folio_common::{AppError, AppResult, FileKind, FileStorage};
use folio_db::{
    criteria::{Criteria, CriteriaItem},
    entities::{ContentType, content},
    repositories::ContentRepository,
};
use sea_orm::{ActiveValue::NotSet, DatabaseTransaction, Order};
use tracing::{debug, info, warn};

use crate::content::{Content, ContentError, ContentTypeExt, validate};
use crate::services::taglink::TaglinkService;

/// A file received with a submission, not yet stored.
#[derive(Debug, Clone)]
pub struct Upload {
    /// Name the client gave the file.
    pub file_name: String,
    pub data: Vec<u8>,
}

impl Upload {
    #[must_use]
    pub fn new(file_name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            data: data.into(),
        }
    }
}

/// Files submitted alongside a content object.
#[derive(Debug, Clone, Default)]
pub struct Uploads {
    pub image: Option<Upload>,
    pub media: Option<Upload>,
}

/// Options for [`ContentService::update`].
#[derive(Debug, Clone, Default)]
pub struct UpdateOptions {
    /// Remove the saved image.
    pub delete_image: bool,
    /// Remove the saved media file.
    pub delete_media: bool,
    /// Files replacing the saved ones.
    pub uploads: Uploads,
}

/// A file reference written by this request or left behind by it.
type StoredRef = (FileKind, String);

/// Content service for business logic.
#[derive(Clone)]
pub struct ContentService {
    content_repo: ContentRepository,
    taglinks: TaglinkService,
    storage: Arc<dyn FileStorage>,
}

impl ContentService {
    /// Create a new content service.
    #[must_use]
    pub fn new(
        content_repo: ContentRepository,
        taglinks: TaglinkService,
        storage: Arc<dyn FileStorage>,
    ) -> Self {
        Self {
            content_repo,
            taglinks,
            storage,
        }
    }

    /// Get one object with its tags. `None` if the id does not exist.
    pub async fn get_object(&self, id: i32) -> AppResult<Option<Content>> {
        let Some(model) = self.content_repo.find_by_id(id).await? else {
            debug!(id, "Content not found");
            return Ok(None);
        };
        let tags = self.taglinks.get_tag_ids(id).await?;
        Ok(Some(Content::from_model(model, tags)?))
    }

    /// Get the objects matching `criteria`. Tags for the whole page are
    /// fetched in one query.
    pub async fn get_objects(&self, criteria: &Criteria) -> AppResult<Vec<Content>> {
        let models = self.content_repo.find_by_criteria(criteria).await?;
        self.hydrate(models).await
    }

    /// Count the objects matching `criteria`.
    pub async fn get_count(&self, criteria: &Criteria) -> AppResult<u64> {
        self.content_repo.count_by_criteria(criteria).await
    }

    /// Id and title of the objects matching `criteria`.
    pub async fn get_list(&self, criteria: &Criteria) -> AppResult<Vec<(i32, String)>> {
        self.content_repo.find_titles(criteria).await
    }

    /// Id and title of every tag, alphabetically.
    pub async fn get_tag_list(&self, online_only: bool) -> AppResult<Vec<(i32, String)>> {
        let mut criteria = Criteria::new().add(CriteriaItem::of_type(ContentType::Tag));
        if online_only {
            criteria = criteria.add(CriteriaItem::online());
        }
        let criteria = criteria.order_by(content::Column::Title, Order::Asc);
        self.content_repo.find_titles(&criteria).await
    }

    /// Objects filed under a collection.
    pub async fn get_collection_members(
        &self,
        parent_id: i32,
        criteria: Criteria,
    ) -> AppResult<Vec<Content>> {
        let criteria = criteria.add(CriteriaItem::eq(content::Column::Parent, parent_id));
        self.get_objects(&criteria).await
    }

    /// Every permitted type with its display name.
    #[must_use]
    pub fn get_types() -> Vec<(ContentType, &'static str)> {
        ContentType::ALL
            .into_iter()
            .map(|t| (t, t.display_name()))
            .collect()
    }

    pub(crate) async fn hydrate(&self, models: Vec<content::Model>) -> AppResult<Vec<Content>> {
        let ids: Vec<i32> = models.iter().map(|m| m.id).collect();
        let tags = self.taglinks.get_tag_map(&ids).await?;
        Ok(Content::from_models(models, tags)?)
    }

    /// Store a new object with its tags and uploads.
    pub async fn insert(&self, mut content: Content, uploads: Uploads) -> AppResult<Content> {
        content.id = 0;
        let content_type = content.content_type();
        let tags = TaglinkService::validate(
            content_type,
            content.tags().into_iter().flatten().copied(),
        )?;

        let stored = self.store_uploads(&mut content, uploads).await?;
        content.submission_time = Some(Utc::now());

        let txn = self.content_repo.begin().await?;
        let result: AppResult<content::Model> = async {
            let model = self
                .content_repo
                .insert(&txn, content.to_active_model())
                .await?;
            if model.id <= 0 {
                return Err(AppError::Internal(
                    "Storage did not return an id for new content".to_string(),
                ));
            }
            self.taglinks
                .insert_taglinks(&txn, model.id, content_type, tags.iter().copied())
                .await?;
            Ok(model)
        }
        .await;

        let model = match finish(txn, result).await {
            Ok(model) => model,
            Err(err) => {
                self.discard(&stored).await;
                return Err(err);
            }
        };

        info!(id = model.id, content_type = %content_type, "Inserted content");
        Ok(Content::from_model(model, tags)?)
    }

    /// Save changes to an existing object.
    pub async fn update(&self, mut content: Content, options: UpdateOptions) -> AppResult<Content> {
        let id = content.id;
        let saved = self.content_repo.get_by_id(id).await?;
        let saved_type = saved.content_type()?;
        let content_type = content.content_type();

        if content.parent() == Some(id) {
            return Err(ContentError::SelfParent(id).into());
        }
        let tags = TaglinkService::validate(
            content_type,
            content.tags().into_iter().flatten().copied(),
        )?;

        let UpdateOptions {
            delete_image,
            delete_media,
            uploads,
        } = options;

        let stored = self.store_uploads(&mut content, uploads).await?;
        let mut orphans: Vec<StoredRef> = Vec::new();

        let new_image = stored.iter().any(|(kind, _)| *kind == FileKind::Image);
        match (saved.image.clone(), new_image, delete_image) {
            (Some(old), true, _) => orphans.push((FileKind::Image, old)),
            (Some(old), false, true) => {
                content.image = None;
                orphans.push((FileKind::Image, old));
            }
            (old, false, _) => content.image = old,
            (None, true, _) => {}
        }

        let new_media = stored.iter().any(|(kind, _)| *kind == FileKind::Media);
        match content.media_file_mut() {
            None => {
                if let Some(old) = saved.media.clone() {
                    orphans.push((FileKind::Media, old));
                }
            }
            Some(file) => match (saved.media.clone(), new_media, delete_media) {
                (Some(old), true, _) => orphans.push((FileKind::Media, old)),
                (Some(old), false, true) => {
                    file.clear();
                    orphans.push((FileKind::Media, old));
                }
                (old, false, _) => {
                    file.media = old;
                    file.format = saved.format.clone();
                    file.file_size = saved.file_size;
                }
                (None, true, _) => {}
            },
        }

        let mut model = content.to_active_model();
        model.submission_time = NotSet;

        let txn = self.content_repo.begin().await?;
        let result: AppResult<content::Model> = async {
            if saved_type == ContentType::Collection && content_type != ContentType::Collection {
                let cleared = self.content_repo.clear_parent(&txn, id).await?;
                debug!(id, cleared, "Detached members of former collection");
            }
            if saved_type == ContentType::Tag && content_type != ContentType::Tag {
                let unlinked = self.taglinks.delete_links_to(&txn, id).await?;
                debug!(id, unlinked, "Removed links to former tag");
            }
            self.taglinks
                .update_taglinks(&txn, id, content_type, tags.iter().copied())
                .await?;
            self.content_repo.update(&txn, model).await
        }
        .await;

        let model = match finish(txn, result).await {
            Ok(model) => model,
            Err(err) => {
                self.discard(&stored).await;
                return Err(err);
            }
        };

        self.discard(&orphans).await;
        info!(id, content_type = %content_type, "Updated content");
        Ok(Content::from_model(model, tags)?)
    }

    /// Delete an object along with its taglinks and files. Members of a
    /// deleted collection are detached, not deleted.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let model = self.content_repo.get_by_id(id).await?;
        let content = Content::from_model(model, [])?;

        let txn = self.content_repo.begin().await?;
        let result: AppResult<()> = async {
            self.taglinks.delete_taglinks(&txn, &content).await?;
            if content.content_type() == ContentType::Collection {
                let cleared = self.content_repo.clear_parent(&txn, id).await?;
                debug!(id, cleared, "Detached collection members");
            }
            if !self.content_repo.delete(&txn, id).await? {
                return Err(AppError::ContentNotFound(id));
            }
            Ok(())
        }
        .await;
        finish(txn, result).await?;

        let mut files: Vec<StoredRef> = Vec::new();
        if let Some(image) = content.image() {
            files.push((FileKind::Image, image.to_string()));
        }
        if let Some(media) = content.media_file().and_then(|f| f.media()) {
            files.push((FileKind::Media, media.to_string()));
        }
        self.discard(&files).await;

        info!(id, content_type = %content.content_type(), "Deleted content");
        Ok(())
    }

    /// Flip the online flag. Returns the new value.
    pub async fn toggle_online(&self, id: i32) -> AppResult<bool> {
        let model = self.content_repo.get_by_id(id).await?;
        let online = !model.online;
        self.content_repo.set_online(id, online).await?;
        info!(id, online, "Toggled content visibility");
        Ok(online)
    }

    /// Count one more view or download.
    pub async fn update_counter(&self, id: i32) -> AppResult<()> {
        if self.content_repo.increment_counter(id).await? {
            Ok(())
        } else {
            Err(AppError::ContentNotFound(id))
        }
    }

    /// Validate and store any uploads, recording them on `content`.
    async fn store_uploads(
        &self,
        content: &mut Content,
        uploads: Uploads,
    ) -> AppResult<Vec<StoredRef>> {
        let Uploads { image, media } = uploads;

        // Check both names before writing anything
        if let Some(upload) = &image {
            validate::image_mimetype(&upload.file_name)?;
        }
        if let Some(upload) = &media {
            if content.media_file().is_none() {
                return Err(AppError::Validation(format!(
                    "{} does not carry a media file",
                    content.content_type()
                )));
            }
            validate::media_mimetype(&upload.file_name)?;
        }

        let mut stored: Vec<StoredRef> = Vec::new();

        if let Some(upload) = image {
            let file = self
                .storage
                .store(FileKind::Image, &upload.file_name, &upload.data)
                .await?;
            stored.push((FileKind::Image, file.name.clone()));
            if let Err(err) = content.set_image(&file.name) {
                self.discard(&stored).await;
                return Err(err.into());
            }
        }

        if let Some(upload) = media {
            let file = match self
                .storage
                .store(FileKind::Media, &upload.file_name, &upload.data)
                .await
            {
                Ok(file) => file,
                Err(err) => {
                    self.discard(&stored).await;
                    return Err(err);
                }
            };
            stored.push((FileKind::Media, file.name.clone()));
            let recorded = content.media_file_mut().map_or(Ok(()), |facet| {
                facet.set_media(&file.name)?;
                facet.set_file_size(file.size as i64)
            });
            if let Err(err) = recorded {
                self.discard(&stored).await;
                return Err(err.into());
            }
        }

        Ok(stored)
    }

    /// Delete files, logging instead of failing. Used once the database
    /// no longer refers to them.
    async fn discard(&self, files: &[StoredRef]) {
        for (kind, name) in files {
            match self.storage.delete(*kind, name).await {
                Ok(true) => debug!(kind = kind.as_str(), name = %name, "Removed file"),
                Ok(false) => warn!(kind = kind.as_str(), name = %name, "File already gone"),
                Err(err) => warn!(kind = kind.as_str(), name = %name, error = %err, "Failed to remove file"),
            }
        }
    }
}

/// Commit on success, roll back on failure.
async fn finish<T>(txn: DatabaseTransaction, result: AppResult<T>) -> AppResult<T> {
    match result {
        Ok(value) => {
            txn.commit()
                .await
                .map_err(|e| AppError::Database(format!("Failed to commit: {e}")))?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback) = txn.rollback().await {
                warn!(error = %rollback, "Rollback failed");
            }
            Err(err)
        }
    }
}
