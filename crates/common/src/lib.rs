//! Common utilities and shared types for folio.
//!
//! This crate provides foundational components used across all folio crates:
//!
//! - **Configuration**: Application settings via [`Config`]
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`]
//! - **Storage**: File storage for uploaded images and media via [`FileStorage`]
//!
//! # Example
//!
//! ```no_run
//! use folio_common::{AppResult, Config};
//!
//! fn example() -> AppResult<()> {
//!     let config = Config::load()?;
//!     println!("Images are stored in {}", config.storage.image_dir.display());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod storage;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use storage::{FileKind, FileStorage, LocalStorage, StoredFile, sanitize_file_name};
