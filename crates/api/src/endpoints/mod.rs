//! API endpoints.

mod content;
mod search;
mod tags;

use axum::{Router, routing::get};

use crate::middleware::AppState;

pub use content::ContentResponse;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/types", get(content::types))
        .nest("/content", content::router())
        .nest("/tags", tags::router())
        .nest("/search", search::router())
}
