//! File storage for uploaded images and media.
//!
//! Content entities only ever hold a bare file name; the storage backend
//! decides where that name lives on disk and how it is served.

use std::path::PathBuf;

use crate::config::StorageConfig;
use crate::{AppError, AppResult};

/// Which upload area a file belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    /// Screenshots, covers and other displayable images.
    Image,
    /// Audio, video and downloadable attachments.
    Media,
}

impl FileKind {
    /// Directory name used under the public base URL.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Media => "media",
        }
    }
}

/// Stored file metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    /// Sanitized, unique file name as written to storage.
    pub name: String,
    /// Public URL to access the file.
    pub url: String,
    /// File size in bytes.
    pub size: u64,
}

/// Storage backend trait.
#[async_trait::async_trait]
pub trait FileStorage: Send + Sync {
    /// Store an uploaded file under a sanitized, unique name derived from
    /// `original_name`.
    async fn store(&self, kind: FileKind, original_name: &str, data: &[u8])
    -> AppResult<StoredFile>;

    /// Delete a stored file. Returns `false` if there was nothing to delete.
    async fn delete(&self, kind: FileKind, name: &str) -> AppResult<bool>;

    /// Get the public URL for a stored file.
    fn public_url(&self, kind: FileKind, name: &str) -> String;

    /// Check if a file exists.
    async fn exists(&self, kind: FileKind, name: &str) -> AppResult<bool>;
}

/// Local filesystem storage backend.
pub struct LocalStorage {
    image_dir: PathBuf,
    media_dir: PathBuf,
    base_url: String,
}

impl LocalStorage {
    /// Create a new local storage backend.
    #[must_use]
    pub const fn new(image_dir: PathBuf, media_dir: PathBuf, base_url: String) -> Self {
        Self {
            image_dir,
            media_dir,
            base_url,
        }
    }

    /// Create a local storage backend from configuration.
    #[must_use]
    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(
            config.image_dir.clone(),
            config.media_dir.clone(),
            config.base_url.clone(),
        )
    }

    fn dir(&self, kind: FileKind) -> &PathBuf {
        match kind {
            FileKind::Image => &self.image_dir,
            FileKind::Media => &self.media_dir,
        }
    }

    fn path_for(&self, kind: FileKind, name: &str) -> AppResult<PathBuf> {
        if name.is_empty()
            || name.contains(['/', '\\', '\0'])
            || name == "."
            || name.contains("..")
        {
            return Err(AppError::Forbidden(format!("Illegal file name: {name:?}")));
        }
        Ok(self.dir(kind).join(name))
    }
}

#[async_trait::async_trait]
impl FileStorage for LocalStorage {
    async fn store(
        &self,
        kind: FileKind,
        original_name: &str,
        data: &[u8],
    ) -> AppResult<StoredFile> {
        let name = sanitize_file_name(original_name);
        let path = self.path_for(kind, &name)?;

        // Create parent directories if needed
        tokio::fs::create_dir_all(self.dir(kind))
            .await
            .map_err(|e| AppError::Storage(format!("Failed to create directory: {e}")))?;

        tokio::fs::write(&path, data)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to write file: {e}")))?;

        tracing::info!(kind = kind.as_str(), name = %name, size = data.len(), "Stored upload");

        Ok(StoredFile {
            url: self.public_url(kind, &name),
            name,
            size: data.len() as u64,
        })
    }

    async fn delete(&self, kind: FileKind, name: &str) -> AppResult<bool> {
        let path = self.path_for(kind, name)?;
        if !path.exists() {
            tracing::warn!(kind = kind.as_str(), name = %name, "File to delete does not exist");
            return Ok(false);
        }
        tokio::fs::remove_file(&path)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to delete file: {e}")))?;
        tracing::info!(kind = kind.as_str(), name = %name, "Deleted upload");
        Ok(true)
    }

    fn public_url(&self, kind: FileKind, name: &str) -> String {
        format!(
            "{}/{}/{}",
            self.base_url.trim_end_matches('/'),
            kind.as_str(),
            name
        )
    }

    async fn exists(&self, kind: FileKind, name: &str) -> AppResult<bool> {
        Ok(self.path_for(kind, name)?.exists())
    }
}

/// Turn an uploaded file name into a unique, filesystem-safe one.
///
/// Directory components are discarded, characters outside `[A-Za-z0-9_-]`
/// are replaced in the stem, and a short random suffix keeps repeated
/// uploads of the same file from colliding.
#[must_use]
pub fn sanitize_file_name(original_name: &str) -> String {
    let base = original_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(original_name);

    // Extract extension from original name
    let (stem, extension) = match base.rfind('.') {
        Some(pos) if pos > 0 && pos < base.len() - 1 => (&base[..pos], &base[pos + 1..]),
        _ => (base, "bin"),
    };

    let clean_stem: String = stem
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let clean_stem = if clean_stem.trim_matches('_').is_empty() {
        "upload".to_string()
    } else {
        clean_stem
    };

    let clean_ext: String = extension
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .take(10)
        .collect::<String>()
        .to_lowercase();
    let clean_ext = if clean_ext.is_empty() {
        "bin".to_string()
    } else {
        clean_ext
    };

    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("{clean_stem}_{}.{clean_ext}", &suffix[..8])
}
