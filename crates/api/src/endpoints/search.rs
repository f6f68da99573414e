//! Search endpoints.

use axum::{
    Router,
    extract::{Query, State},
    routing::get,
};
use folio_common::AppResult;
use folio_core::SearchQuery;

use crate::{
    endpoints::ContentResponse,
    middleware::AppState,
    response::{ApiResponse, PageMeta},
};

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(search))
}

/// Search published content.
async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<ApiResponse<Vec<ContentResponse>>> {
    let results = state.search_service.search(&query).await?;
    let meta = PageMeta::new(results.total, results.page, results.page_size);
    let results = results.map(|content| ContentResponse::from_content(&content, &state));
    Ok(ApiResponse::page(results.items, meta))
}
