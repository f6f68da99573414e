//! Database entities.

#![allow(missing_docs)]

pub mod content;
pub mod taglink;

pub use content::{ContentType, Entity as Content, UnknownContentType};
pub use taglink::Entity as Taglink;
