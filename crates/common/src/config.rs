//! Application configuration.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Upload storage configuration.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Site preferences.
    #[serde(default)]
    pub site: SiteConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Connection URL (`postgres://` or `sqlite://`).
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Where uploaded images and media files live.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory for image uploads.
    #[serde(default = "default_image_dir")]
    pub image_dir: PathBuf,
    /// Directory for media uploads.
    #[serde(default = "default_media_dir")]
    pub media_dir: PathBuf,
    /// Base URL uploads are served from.
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            image_dir: default_image_dir(),
            media_dir: default_media_dir(),
            base_url: default_base_url(),
        }
    }
}

/// Site preferences that shape listing and search behaviour.
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Search terms shorter than this are ignored.
    #[serde(default = "default_search_min_length")]
    pub search_min_length: usize,
    /// Results per search page.
    #[serde(default = "default_search_page_size")]
    pub search_page_size: u64,
    /// Items per listing page.
    #[serde(default = "default_page_size")]
    pub page_size: u64,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            search_min_length: default_search_min_length(),
            search_page_size: default_search_page_size(),
            page_size: default_page_size(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    3000
}

const fn default_max_connections() -> u32 {
    20
}

const fn default_min_connections() -> u32 {
    1
}

fn default_image_dir() -> PathBuf {
    PathBuf::from("./uploads/image")
}

fn default_media_dir() -> PathBuf {
    PathBuf::from("./uploads/media")
}

fn default_base_url() -> String {
    "/uploads".to_string()
}

const fn default_search_min_length() -> usize {
    3
}

const fn default_search_page_size() -> u64 {
    20
}

const fn default_page_size() -> u64 {
    10
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `config/default.toml`
    /// 2. `config/{environment}.toml` (based on `FOLIO_ENV`)
    /// 3. Environment variables with `FOLIO__` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let env = std::env::var("FOLIO_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("FOLIO")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("FOLIO")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_from_file_applies_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[server]\nport = 8080\n\n[database]\nurl = \"sqlite::memory:\"\n"
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.database.max_connections, 20);
        assert_eq!(config.site.search_min_length, 3);
        assert_eq!(config.site.search_page_size, 20);
        assert_eq!(config.storage.image_dir, PathBuf::from("./uploads/image"));
    }
}
