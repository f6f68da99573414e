//! Core business logic for folio.
//!
//! - [`content`]: the typed content model, its validation and row mapping
//! - [`display`]: output escaping and human readable field values
//! - [`services`]: content, taglink and search services

pub mod content;
pub mod display;
pub mod services;

pub use services::*;
