//! Taglink service.

use std::collections::{BTreeSet, HashMap};

use folio_common::{AppError, AppResult};
use folio_db::{
    entities::{ContentType, taglink},
    repositories::TaglinkRepository,
};
use sea_orm::{ConnectionTrait, Set};
use tracing::debug;

use crate::content::{Content, ContentError, Field};

/// Manages the links between content and tags.
#[derive(Clone)]
pub struct TaglinkService {
    taglink_repo: TaglinkRepository,
}

impl TaglinkService {
    /// Create a new taglink service.
    #[must_use]
    pub const fn new(taglink_repo: TaglinkRepository) -> Self {
        Self { taglink_repo }
    }

    /// Check a batch of tag ids for an owner, before anything is written.
    pub fn validate(
        content_type: ContentType,
        tag_ids: impl IntoIterator<Item = i32>,
    ) -> Result<BTreeSet<i32>, ContentError> {
        let mut ids = BTreeSet::new();
        for tag_id in tag_ids {
            if tag_id <= 0 {
                return Err(ContentError::invalid(
                    Field::Tags,
                    format!("not a tag id: {tag_id}"),
                ));
            }
            ids.insert(tag_id);
        }
        if content_type == ContentType::Tag && !ids.is_empty() {
            return Err(ContentError::TagsOnTag);
        }
        Ok(ids)
    }

    /// Link a piece of content to each of `tag_ids`.
    pub async fn insert_taglinks<C: ConnectionTrait>(
        &self,
        conn: &C,
        content_id: i32,
        content_type: ContentType,
        tag_ids: impl IntoIterator<Item = i32>,
    ) -> AppResult<usize> {
        if content_id <= 0 {
            return Err(AppError::Internal(format!(
                "Cannot link tags to unsaved content {content_id}"
            )));
        }
        let ids = Self::validate(content_type, tag_ids)?;

        let rows = ids
            .into_iter()
            .map(|tag_id| taglink::ActiveModel {
                content_id: Set(content_id),
                tag_id: Set(tag_id),
                content_type: Set(content_type.as_str().to_string()),
                ..Default::default()
            })
            .collect();

        let written = self.taglink_repo.insert_many(conn, rows).await?;
        debug!(content_id, written, "Inserted taglinks");
        Ok(written)
    }

    /// Replace the tag set of a piece of content. A Tag ends up with none.
    pub async fn update_taglinks<C: ConnectionTrait>(
        &self,
        conn: &C,
        content_id: i32,
        content_type: ContentType,
        tag_ids: impl IntoIterator<Item = i32>,
    ) -> AppResult<usize> {
        let ids = if content_type == ContentType::Tag {
            BTreeSet::new()
        } else {
            Self::validate(content_type, tag_ids)?
        };

        self.taglink_repo
            .delete_by_content(conn, content_id)
            .await?;

        if ids.is_empty() {
            return Ok(0);
        }
        self.insert_taglinks(conn, content_id, content_type, ids)
            .await
    }

    /// Remove the links a deleted object takes part in. For a Tag these are
    /// the links pointing at it, otherwise the links it holds.
    pub async fn delete_taglinks<C: ConnectionTrait>(
        &self,
        conn: &C,
        content: &Content,
    ) -> AppResult<u64> {
        if content.content_type() == ContentType::Tag {
            self.taglink_repo.delete_by_tag(conn, content.id()).await
        } else {
            self.taglink_repo
                .delete_by_content(conn, content.id())
                .await
        }
    }

    /// Remove every link pointing at `tag_id`.
    pub async fn delete_links_to<C: ConnectionTrait>(
        &self,
        conn: &C,
        tag_id: i32,
    ) -> AppResult<u64> {
        self.taglink_repo.delete_by_tag(conn, tag_id).await
    }

    /// Tag ids of one piece of content.
    pub async fn get_tag_ids(&self, content_id: i32) -> AppResult<BTreeSet<i32>> {
        Ok(self
            .taglink_repo
            .find_tag_ids(content_id)
            .await?
            .into_iter()
            .collect())
    }

    /// Tag ids for a batch of content, in a single query.
    pub async fn get_tag_map(&self, content_ids: &[i32]) -> AppResult<HashMap<i32, BTreeSet<i32>>> {
        let mut map: HashMap<i32, BTreeSet<i32>> = HashMap::new();
        for link in self.taglink_repo.find_by_content_ids(content_ids).await? {
            map.entry(link.content_id).or_default().insert(link.tag_id);
        }
        Ok(map)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn create_test_taglink(id: i32, content_id: i32, tag_id: i32) -> taglink::Model {
        taglink::Model {
            id,
            content_id,
            tag_id,
            content_type: "Article".to_string(),
        }
    }

    #[test]
    fn test_validate_rejects_bad_ids() {
        assert!(TaglinkService::validate(ContentType::Article, [3, 0]).is_err());
        assert!(TaglinkService::validate(ContentType::Article, [-1]).is_err());
        assert_eq!(
            TaglinkService::validate(ContentType::Article, [7, 3, 7]),
            Ok(BTreeSet::from([3, 7]))
        );
    }

    #[test]
    fn test_validate_rejects_tag_owner() {
        assert_eq!(
            TaglinkService::validate(ContentType::Tag, [3]),
            Err(ContentError::TagsOnTag)
        );
        assert!(TaglinkService::validate(ContentType::Tag, []).is_ok());
    }

    #[tokio::test]
    async fn test_insert_rejects_batch_before_writing() {
        // No exec results queued: any write would fail the test.
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = TaglinkService::new(TaglinkRepository::new(db.clone()));

        let result = service
            .insert_taglinks(db.as_ref(), 1, ContentType::Article, [3, -7])
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_update_for_tag_only_deletes() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 2,
                }])
                .into_connection(),
        );
        let service = TaglinkService::new(TaglinkRepository::new(db.clone()));

        let written = service
            .update_taglinks(db.as_ref(), 5, ContentType::Tag, [1, 2])
            .await
            .unwrap();

        assert_eq!(written, 0);
    }

    #[tokio::test]
    async fn test_get_tag_map_groups_by_content() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[
                    create_test_taglink(1, 10, 3),
                    create_test_taglink(2, 10, 7),
                    create_test_taglink(3, 11, 3),
                ]])
                .into_connection(),
        );
        let service = TaglinkService::new(TaglinkRepository::new(db));

        let map = service.get_tag_map(&[10, 11]).await.unwrap();

        assert_eq!(map[&10], BTreeSet::from([3, 7]));
        assert_eq!(map[&11], BTreeSet::from([3]));
    }
}
