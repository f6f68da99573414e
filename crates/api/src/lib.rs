//! HTTP API layer for folio.
//!
//! Read-only JSON endpoints over published content:
//!
//! - **Content**: single objects and paged listings
//! - **Tags**: the tag index
//! - **Search**: free-text search
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod middleware;
pub mod response;

pub use endpoints::router;
pub use middleware::AppState;
