//! Content validation errors.

use folio_common::AppError;
use folio_db::entities::{ContentType, UnknownContentType};
use thiserror::Error;

use super::Field;

/// A rejected content value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContentError {
    #[error(transparent)]
    UnknownType(#[from] UnknownContentType),

    #[error("invalid {field}: {reason}")]
    InvalidField { field: Field, reason: String },

    #[error("{field} does not apply to {content_type}")]
    NotApplicable {
        field: Field,
        content_type: ContentType,
    },

    #[error("content {0} cannot be its own parent")]
    SelfParent(i32),

    #[error("file type not allowed for {field}: {name}")]
    DisallowedFile { field: Field, name: String },

    /// Traversal sequence or NUL byte in a file reference. Never recoverable.
    #[error("unsafe file path for {field}")]
    UnsafePath { field: Field },

    #[error("tags cannot be attached to a tag")]
    TagsOnTag,
}

impl ContentError {
    pub(crate) fn invalid(field: Field, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            reason: reason.into(),
        }
    }

    /// Whether ingestion must stop instead of collecting this error.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::UnsafePath { .. })
    }
}

impl From<ContentError> for AppError {
    fn from(err: ContentError) -> Self {
        match err {
            ContentError::UnsafePath { .. } => Self::Forbidden(err.to_string()),
            other => Self::Validation(other.to_string()),
        }
    }
}
