//! Free-text search over published content.

use folio_common::{AppResult, config::SiteConfig};
use folio_db::{
    repositories::ContentRepository,
    search::{SearchOperator, SearchTerms},
};
use serde::{Deserialize, Serialize};
use tracing::debug;
use validator::Validate;

use crate::content::Content;
use crate::services::taglink::TaglinkService;

/// Search request as received from a client.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SearchQuery {
    #[validate(length(min = 1, max = 255))]
    pub q: String,
    #[serde(default)]
    pub op: SearchOperator,
    #[validate(range(min = 1))]
    #[serde(default = "first_page")]
    pub page: u64,
}

const fn first_page() -> u64 {
    1
}

impl SearchQuery {
    #[must_use]
    pub fn new(q: impl Into<String>, op: SearchOperator) -> Self {
        Self {
            q: q.into(),
            op,
            page: 1,
        }
    }

    #[must_use]
    pub const fn page(mut self, page: u64) -> Self {
        self.page = page;
        self
    }
}

/// One page of search results.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResults<T> {
    /// Number of matches across all pages.
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
    pub items: Vec<T>,
}

impl<T> SearchResults<T> {
    const fn empty(page: u64, page_size: u64) -> Self {
        Self {
            total: 0,
            page,
            page_size,
            items: Vec::new(),
        }
    }

    /// Number of pages needed for `total`.
    #[must_use]
    pub const fn page_count(&self) -> u64 {
        if self.page_size == 0 {
            0
        } else {
            self.total.div_ceil(self.page_size)
        }
    }

    /// Transform the items, keeping the paging figures.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> SearchResults<U> {
        SearchResults {
            total: self.total,
            page: self.page,
            page_size: self.page_size,
            items: self.items.into_iter().map(f).collect(),
        }
    }
}

/// Search service.
#[derive(Clone)]
pub struct SearchService {
    content_repo: ContentRepository,
    taglinks: TaglinkService,
    min_length: usize,
    page_size: u64,
}

impl SearchService {
    /// Create a new search service.
    #[must_use]
    pub const fn new(
        content_repo: ContentRepository,
        taglinks: TaglinkService,
        site: &SiteConfig,
    ) -> Self {
        Self {
            content_repo,
            taglinks,
            min_length: site.search_min_length,
            page_size: site.search_page_size,
        }
    }

    /// Run a search. A query with no usable terms returns no results
    /// without touching the database.
    pub async fn search(&self, query: &SearchQuery) -> AppResult<SearchResults<Content>> {
        query.validate()?;

        let terms = SearchTerms::parse(&query.q, query.op, self.min_length);
        if terms.is_empty() {
            debug!(query = %query.q, "No search terms long enough");
            return Ok(SearchResults::empty(query.page, self.page_size));
        }

        let offset = (query.page - 1).saturating_mul(self.page_size);
        let (total, models) = self
            .content_repo
            .search(&terms, self.page_size, offset)
            .await?;

        let ids: Vec<i32> = models.iter().map(|m| m.id).collect();
        let tags = self.taglinks.get_tag_map(&ids).await?;
        let items = Content::from_models(models, tags)?;

        debug!(
            query = %query.q,
            total,
            page = query.page,
            returned = items.len(),
            "Search finished"
        );

        Ok(SearchResults {
            total,
            page: query.page,
            page_size: self.page_size,
            items,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use folio_common::AppError;
    use folio_db::{entities::content, repositories::TaglinkRepository};
    use maplit::btreemap;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, Value};
    use std::sync::Arc;

    fn service(db: DatabaseConnection) -> SearchService {
        let db = Arc::new(db);
        SearchService::new(
            ContentRepository::new(db.clone()),
            TaglinkService::new(TaglinkRepository::new(db)),
            &SiteConfig::default(),
        )
    }

    fn article(id: i32, title: &str) -> content::Model {
        content::Model {
            id,
            content_type: "Article".to_string(),
            title: title.to_string(),
            teaser: None,
            description: None,
            media: None,
            format: None,
            file_size: 0,
            creator: None,
            image: None,
            caption: None,
            date: None,
            parent: 0,
            language: None,
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
    async fn test_short_terms_skip_the_database() {
        // No query results queued: any statement would fail.
        let service = service(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let results = service
            .search(&SearchQuery::new("a be", SearchOperator::And))
            .await
            .unwrap();

        assert_eq!(results.total, 0);
        assert!(results.items.is_empty());
    }

    #[tokio::test]
    async fn test_rejects_page_zero() {
        let service = service(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let result = service
            .search(&SearchQuery::new("rust", SearchOperator::And).page(0))
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_returns_page_with_tags() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[btreemap! {
                "num_items" => Value::BigInt(Some(2)),
            }]])
            .append_query_results([[article(1, "Rust in practice"), article(2, "Rusty tools")]])
            .append_query_results([[folio_db::entities::taglink::Model {
                id: 1,
                content_id: 2,
                tag_id: 9,
                content_type: "Article".to_string(),
            }]])
            .into_connection();
        let service = service(db);

        let results = service
            .search(&SearchQuery::new("rust", SearchOperator::Or))
            .await
            .unwrap();

        assert_eq!(results.total, 2);
        assert_eq!(results.page_count(), 1);
        assert_eq!(results.items.len(), 2);
        assert_eq!(results.items[1].tags().map(|t| t.len()), Some(1));
    }

    #[test]
    fn test_page_count_rounds_up() {
        let results = SearchResults::<()> {
            total: 41,
            page: 1,
            page_size: 20,
            items: Vec::new(),
        };
        assert_eq!(results.page_count(), 3);
    }
}
