use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;
use url::Url;

use crate::endpoint::{FeedEndpoint, DEFAULT_PAGE_SIZE};
use crate::policy::{CachePolicy, DEFAULT_MAX_CACHE_AGE_DAYS};

const APP_DIR: &str = "imagefeed";
const DEFAULT_BASE_URL: &str = "https://ile-api.essentialdeveloper.com/essential-feed";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub remote: RemoteConfig,
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RemoteConfig {
    pub base_url: Url,
    pub request_timeout_seconds: u64,
    pub user_agent: String,
    pub page_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CacheConfig {
    pub max_age_days: u64,
    /// Overrides the platform cache directory.
    pub directory: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            remote: RemoteConfig::default(),
            cache: CacheConfig::default(),
        }
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base url is valid"),
            request_timeout_seconds: 10,
            user_agent: format!("imagefeed/{}", env!("CARGO_PKG_VERSION")),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_age_days: DEFAULT_MAX_CACHE_AGE_DAYS,
            directory: None,
        }
    }
}

impl AppConfig {
    /// `<config dir>/imagefeed/config.json`, or a relative path when the
    /// platform has no config directory.
    pub fn config_file_path() -> PathBuf {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .unwrap_or_else(|| PathBuf::from(APP_DIR))
            .join("config.json")
    }

    /// Missing file gives the defaults; an unreadable one is logged and ignored.
    pub fn load_from(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read(path) {
            Ok(bytes) => match serde_json::from_slice(&bytes) {
                Ok(config) => config,
                Err(err) => {
                    warn!(error = %err, path = %path.display(), "invalid config file, using defaults");
                    Self::default()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(err) => {
                warn!(error = %err, path = %path.display(), "failed to read config file, using defaults");
                Self::default()
            }
        }
    }

    pub fn save_to(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_vec_pretty(self)?;
        std::fs::write(path, json)
    }

    pub fn cache_policy(&self) -> CachePolicy {
        CachePolicy::new(self.cache.max_age_days)
    }

    pub fn feed_endpoint(&self) -> FeedEndpoint {
        FeedEndpoint {
            page_size: self.remote.page_size,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.remote.request_timeout_seconds)
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.cache.directory.clone().unwrap_or_else(|| {
            dirs::cache_dir()
                .map(|dir| dir.join(APP_DIR))
                .unwrap_or_else(|| PathBuf::from(APP_DIR).join("cache"))
        })
    }

    pub fn feed_store_path(&self) -> PathBuf {
        self.cache_dir().join("feed-store.json")
    }

    pub fn image_store_dir(&self) -> PathBuf {
        self.cache_dir().join("images")
    }
}
