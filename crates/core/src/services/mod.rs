//! Business logic services.

pub mod content;
pub mod search;
pub mod taglink;

pub use content::{ContentService, UpdateOptions, Upload, Uploads};
pub use search::{SearchQuery, SearchResults, SearchService};
pub use taglink::TaglinkService;
