//! API middleware.

use std::sync::Arc;

use axum::{body::Body, http::Request, middleware::Next, response::Response};
use folio_common::{FileStorage, config::SiteConfig};
use folio_core::{ContentService, SearchService};
use tracing::debug;

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub content_service: ContentService,
    pub search_service: SearchService,
    /// Used to build public URLs for images and media.
    pub storage: Arc<dyn FileStorage>,
    pub site: SiteConfig,
}

/// Log the method and path of every request, then the response status.
pub async fn log_request(req: Request<Body>, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let response = next.run(req).await;

    debug!(%method, %path, status = response.status().as_u16(), "Handled request");
    response
}
