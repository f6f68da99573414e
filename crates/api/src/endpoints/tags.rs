//! Tag endpoints.

use axum::{Router, extract::State, routing::get};
use folio_common::AppResult;
use serde::Serialize;

use crate::{middleware::AppState, response::ApiResponse};

/// Tag summary.
#[derive(Debug, Serialize)]
pub struct TagResponse {
    pub id: i32,
    pub title: String,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list))
}

/// List published tags alphabetically.
async fn list(State(state): State<AppState>) -> AppResult<ApiResponse<Vec<TagResponse>>> {
    let tags = state.content_service.get_tag_list(true).await?;
    Ok(ApiResponse::ok(
        tags.into_iter()
            .map(|(id, title)| TagResponse { id, title })
            .collect(),
    ))
}
