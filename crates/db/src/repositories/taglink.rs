//! Taglink repository.

use std::sync::Arc;

use crate::entities::{Taglink, taglink};
use folio_common::{AppError, AppResult};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect,
};

/// Taglink repository for database operations.
#[derive(Clone)]
pub struct TaglinkRepository {
    db: Arc<DatabaseConnection>,
}

impl TaglinkRepository {
    /// Create a new taglink repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Tag ids attached to one piece of content.
    pub async fn find_tag_ids(&self, content_id: i32) -> AppResult<Vec<i32>> {
        Taglink::find()
            .select_only()
            .column(taglink::Column::TagId)
            .filter(taglink::Column::ContentId.eq(content_id))
            .order_by_asc(taglink::Column::TagId)
            .into_tuple()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All taglinks for a batch of content, in one query.
    pub async fn find_by_content_ids(&self, content_ids: &[i32]) -> AppResult<Vec<taglink::Model>> {
        if content_ids.is_empty() {
            return Ok(Vec::new());
        }
        Taglink::find()
            .filter(taglink::Column::ContentId.is_in(content_ids.to_vec()))
            .order_by_asc(taglink::Column::ContentId)
            .order_by_asc(taglink::Column::TagId)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Ids of the content carrying a tag.
    pub async fn find_content_ids(&self, tag_id: i32) -> AppResult<Vec<i32>> {
        Taglink::find()
            .select_only()
            .column(taglink::Column::ContentId)
            .filter(taglink::Column::TagId.eq(tag_id))
            .order_by_asc(taglink::Column::ContentId)
            .into_tuple()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Write a batch of taglinks.
    pub async fn insert_many<C: ConnectionTrait>(
        &self,
        conn: &C,
        models: Vec<taglink::ActiveModel>,
    ) -> AppResult<usize> {
        let count = models.len();
        if count == 0 {
            return Ok(0);
        }
        Taglink::insert_many(models)
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(count)
    }

    /// Remove the links held by a piece of content.
    pub async fn delete_by_content<C: ConnectionTrait>(
        &self,
        conn: &C,
        content_id: i32,
    ) -> AppResult<u64> {
        let result = Taglink::delete_many()
            .filter(taglink::Column::ContentId.eq(content_id))
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected)
    }

    /// Remove the links that point at a tag.
    pub async fn delete_by_tag<C: ConnectionTrait>(&self, conn: &C, tag_id: i32) -> AppResult<u64> {
        let result = Taglink::delete_many()
            .filter(taglink::Column::TagId.eq(tag_id))
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected)
    }
}
