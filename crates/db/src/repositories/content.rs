//! Content repository.

use std::sync::Arc;

use crate::criteria::Criteria;
use crate::entities::{Content, content};
use crate::search::SearchTerms;
use folio_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
    sea_query::Expr,
};

/// Content repository for database operations.
#[derive(Clone)]
pub struct ContentRepository {
    db: Arc<DatabaseConnection>,
}

impl ContentRepository {
    /// Create a new content repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Start a transaction on the underlying connection.
    pub async fn begin(&self) -> AppResult<DatabaseTransaction> {
        self.db
            .begin()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {e}")))
    }

    /// Find a content row by ID.
    pub async fn find_by_id(&self, id: i32) -> AppResult<Option<content::Model>> {
        Content::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a content row by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: i32) -> AppResult<content::Model> {
        self.find_by_id(id)
            .await?
            .ok_or(AppError::ContentNotFound(id))
    }

    /// Find rows matching the criteria.
    pub async fn find_by_criteria(&self, criteria: &Criteria) -> AppResult<Vec<content::Model>> {
        criteria
            .apply(Content::find())
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count rows matching the criteria, ignoring paging.
    pub async fn count_by_criteria(&self, criteria: &Criteria) -> AppResult<u64> {
        criteria
            .filter(Content::find())
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Id and title of the rows matching the criteria.
    pub async fn find_titles(&self, criteria: &Criteria) -> AppResult<Vec<(i32, String)>> {
        criteria
            .apply(Content::find())
            .select_only()
            .column(content::Column::Id)
            .column(content::Column::Title)
            .into_tuple()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find the direct children of a collection.
    pub async fn find_children(&self, parent_id: i32) -> AppResult<Vec<content::Model>> {
        Content::find()
            .filter(content::Column::Parent.eq(parent_id))
            .order_by_asc(content::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Run a search: total number of matches, then one page of them.
    pub async fn search(
        &self,
        terms: &SearchTerms,
        limit: u64,
        offset: u64,
    ) -> AppResult<(u64, Vec<content::Model>)> {
        let total = Content::find()
            .filter(terms.condition())
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if total == 0 {
            return Ok((0, Vec::new()));
        }

        let rows = Content::find()
            .filter(terms.condition())
            .order_by_desc(content::Column::Date)
            .order_by_desc(content::Column::SubmissionTime)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok((total, rows))
    }

    /// Insert a row. The returned model carries the generated id.
    pub async fn insert<C: ConnectionTrait>(
        &self,
        conn: &C,
        model: content::ActiveModel,
    ) -> AppResult<content::Model> {
        model
            .insert(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Write every set column of an existing row.
    pub async fn update<C: ConnectionTrait>(
        &self,
        conn: &C,
        model: content::ActiveModel,
    ) -> AppResult<content::Model> {
        model
            .update(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a row. Returns whether a row was removed.
    pub async fn delete<C: ConnectionTrait>(&self, conn: &C, id: i32) -> AppResult<bool> {
        let result = Content::delete_by_id(id)
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected > 0)
    }

    /// Detach every row whose parent is `parent_id`.
    pub async fn clear_parent<C: ConnectionTrait>(&self, conn: &C, parent_id: i32) -> AppResult<u64> {
        let result = Content::update_many()
            .col_expr(content::Column::Parent, Expr::value(0))
            .filter(content::Column::Parent.eq(parent_id))
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected)
    }

    /// Set the online flag.
    pub async fn set_online(&self, id: i32, online: bool) -> AppResult<bool> {
        let result = Content::update_many()
            .col_expr(content::Column::Online, Expr::value(online))
            .filter(content::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected > 0)
    }

    /// Increment the view/download counter atomically (single UPDATE query, no fetch).
    pub async fn increment_counter(&self, id: i32) -> AppResult<bool> {
        let result = Content::update_many()
            .col_expr(
                content::Column::Counter,
                Expr::col(content::Column::Counter).add(1),
            )
            .filter(content::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected > 0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn create_test_content(id: i32, content_type: &str, title: &str) -> content::Model {
        content::Model {
            id,
            content_type: content_type.to_string(),
            title: title.to_string(),
            teaser: Some("<p>Teaser</p>".to_string()),
            description: None,
            media: None,
            format: None,
            file_size: 0,
            creator: Some("Anon".to_string()),
            image: None,
            caption: None,
            date: None,
            parent: 0,
            language: Some("en".to_string()),
            rights: Some(1),
            publisher: None,
            online: true,
            submission_time: Utc::now().into(),
            counter: 0,
            meta_title: None,
            meta_description: None,
            seo: None,
        }
    }

    #[tokio::test]
    async fn test_find_by_id() {
        let row = create_test_content(1, "Article", "Hello");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[row.clone()]])
                .into_connection(),
        );

        let repo = ContentRepository::new(db);
        let result = repo.find_by_id(1).await.unwrap();

        assert_eq!(result, Some(row));
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<content::Model>::new()])
                .into_connection(),
        );

        let repo = ContentRepository::new(db);
        let result = repo.get_by_id(42).await;

        assert!(matches!(result, Err(AppError::ContentNotFound(42))));
    }

    #[tokio::test]
    async fn test_find_by_criteria() {
        let a = create_test_content(1, "Article", "First");
        let b = create_test_content(2, "Video", "Second");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[a, b]])
                .into_connection(),
        );

        let repo = ContentRepository::new(db);
        let result = repo
            .find_by_criteria(&Criteria::new().limit(10))
            .await
            .unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[1].title, "Second");
    }

    #[tokio::test]
    async fn test_clear_parent_reports_rows() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 3,
                }])
                .into_connection(),
        );

        let repo = ContentRepository::new(db.clone());
        let cleared = repo.clear_parent(db.as_ref(), 7).await.unwrap();

        assert_eq!(cleared, 3);
    }
}
