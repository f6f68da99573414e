//! Repository layer.

mod content;
mod taglink;

pub use content::ContentRepository;
pub use taglink::TaglinkRepository;
