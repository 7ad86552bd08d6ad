use std::fs;
use std::time::Duration;

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

use crate::error::MetaError;

pub const DEFAULT_BASE_URL: &str = "https://v3-cinemeta.strem.io/meta/movie";
pub const DEFAULT_ID_COLUMN: &str = "IMDb ID";
pub const DEFAULT_CACHE_DIR: &str = "metas";
pub const DEFAULT_EXTENSION: &str = "json";
pub const DEFAULT_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_DELAY_MS: u64 = 100;

/// On-disk shape of the optional JSON config file. Every field may be omitted.
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub id_column: Option<String>,
    #[serde(default)]
    pub cache_dir: Option<String>,
    #[serde(default)]
    pub extension: Option<String>,
    #[serde(default)]
    pub timeout_ms: Option<u64>,
    #[serde(default)]
    pub delay_ms: Option<u64>,
    #[serde(default)]
    pub cache_buster: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    pub base_url: String,
    pub id_column: String,
    pub cache_dir: String,
    pub extension: String,
    pub timeout: Duration,
    pub delay: Duration,
    /// Appended verbatim as a query string to bypass the server-side cache.
    pub cache_buster: Option<String>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            id_column: DEFAULT_ID_COLUMN.to_string(),
            cache_dir: DEFAULT_CACHE_DIR.to_string(),
            extension: DEFAULT_EXTENSION.to_string(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            delay: Duration::from_millis(DEFAULT_DELAY_MS),
            cache_buster: None,
        }
    }
}

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn resolve(path: Option<&str>) -> Result<SyncConfig, MetaError> {
        let Some(path) = path else {
            return Ok(SyncConfig::default());
        };
        let config_path = Utf8PathBuf::from(path);
        let content = fs::read_to_string(config_path.as_std_path())
            .map_err(|_| MetaError::ConfigRead(config_path.clone()))?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|err| MetaError::ConfigParse(err.to_string()))?;

        Self::resolve_config(config)
    }

    pub fn resolve_config(config: Config) -> Result<SyncConfig, MetaError> {
        let defaults = SyncConfig::default();

        let base_url = config
            .base_url
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or(defaults.base_url);
        if base_url.is_empty() {
            return Err(MetaError::ConfigValue("base_url must not be empty".to_string()));
        }

        let id_column = config.id_column.unwrap_or(defaults.id_column);
        if id_column.is_empty() {
            return Err(MetaError::ConfigValue("id_column must not be empty".to_string()));
        }

        let cache_dir = config.cache_dir.unwrap_or(defaults.cache_dir);
        if cache_dir.is_empty() || cache_dir.contains(['/', '\\']) {
            return Err(MetaError::ConfigValue(format!(
                "cache_dir must be a plain directory name: {cache_dir:?}"
            )));
        }

        let extension = config
            .extension
            .map(|ext| ext.trim_start_matches('.').to_string())
            .unwrap_or(defaults.extension);
        if extension.is_empty() {
            return Err(MetaError::ConfigValue("extension must not be empty".to_string()));
        }

        let timeout = config
            .timeout_ms
            .map(Duration::from_millis)
            .unwrap_or(defaults.timeout);
        if timeout.is_zero() {
            return Err(MetaError::ConfigValue("timeout_ms must be positive".to_string()));
        }

        Ok(SyncConfig {
            base_url,
            id_column,
            cache_dir,
            extension,
            timeout,
            delay: config
                .delay_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.delay),
            cache_buster: config.cache_buster.filter(|value| !value.is_empty()),
        })
    }
}
