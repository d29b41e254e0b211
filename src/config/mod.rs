//! Configuration management for Catalogop

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{ConfigError, Result};

/// Default hosted catalog service
pub const DEFAULT_API_BASE: &str = "https://dummyjson.com";

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the catalog service
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Products per page for list and browse
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Simulated latency requested from the service
    #[serde(default)]
    pub delay: DelayConfig,

    /// Query cache tuning
    #[serde(default)]
    pub cache: CacheConfig,
}

/// Values for the `delay` query parameter, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelayConfig {
    /// Product list, search and category reads
    #[serde(default = "default_read_delay")]
    pub read_ms: u64,

    /// Single product and category list reads
    #[serde(default = "default_detail_delay")]
    pub detail_ms: u64,

    /// Create, update and delete
    #[serde(default = "default_write_delay")]
    pub write_ms: u64,
}

impl DelayConfig {
    /// Use the same delay everywhere (the `--delay` override)
    pub fn uniform(ms: u64) -> Self {
        Self {
            read_ms: ms,
            detail_ms: ms,
            write_ms: ms,
        }
    }
}

impl Default for DelayConfig {
    fn default() -> Self {
        Self {
            read_ms: default_read_delay(),
            detail_ms: default_detail_delay(),
            write_ms: default_write_delay(),
        }
    }
}

/// Staleness, eviction and retry settings for the query cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_product_list_stale")]
    pub product_list_stale_secs: u64,

    #[serde(default = "default_categories_stale")]
    pub categories_stale_secs: u64,

    #[serde(default)]
    pub product_stale_secs: u64,

    /// Unobserved entries older than this are evicted
    #[serde(default = "default_gc")]
    pub gc_secs: u64,

    /// Total attempts for a read, including the first
    #[serde(default = "default_read_attempts")]
    pub read_attempts: u32,

    #[serde(default = "default_retry_delay")]
    pub retry_delay_ms: u64,
}

impl CacheConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            product_list_stale_secs: default_product_list_stale(),
            categories_stale_secs: default_categories_stale(),
            product_stale_secs: 0,
            gc_secs: default_gc(),
            read_attempts: default_read_attempts(),
            retry_delay_ms: default_retry_delay(),
        }
    }
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_page_size() -> usize {
    10
}

fn default_read_delay() -> u64 {
    1000
}

fn default_detail_delay() -> u64 {
    500
}

fn default_write_delay() -> u64 {
    1000
}

fn default_product_list_stale() -> u64 {
    5 * 60
}

fn default_categories_stale() -> u64 {
    10 * 60
}

fn default_gc() -> u64 {
    5 * 60
}

fn default_read_attempts() -> u32 {
    2
}

fn default_retry_delay() -> u64 {
    1000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            page_size: default_page_size(),
            delay: DelayConfig::default(),
            cache: CacheConfig::default(),
        }
    }
}

impl Config {
    /// Get the default config file path
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::Invalid(
            "Could not determine home directory".to_string(),
        ))?;

        Ok(home.join(".catalogop").join("config.yaml"))
    }

    /// Resolve an optional override to a concrete path
    pub fn resolve_path(path: Option<&str>) -> Result<PathBuf> {
        match path {
            Some(p) => Ok(PathBuf::from(p)),
            None => Self::default_path(),
        }
    }

    /// Load configuration, falling back to defaults when no file exists
    pub fn load_at(path: Option<&str>) -> Result<Self> {
        Self::load_from(Self::resolve_path(path)?)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: PathBuf) -> Result<Self> {
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&path)?;
        let config: Config = serde_yaml::from_str(&contents).map_err(ConfigError::from)?;
        config.validate()?;

        Ok(config)
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: &PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents =
            serde_yaml::to_string(self).map_err(|e| ConfigError::SaveError(e.to_string()))?;

        std::fs::write(path, contents)?;

        // Set file permissions to 600 on Unix systems
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = std::fs::metadata(path)?.permissions();
            perms.set_mode(0o600);
            std::fs::set_permissions(path, perms)?;
        }

        Ok(())
    }

    /// Apply runtime overrides (flags and environment)
    pub fn apply_overrides(&mut self, api_base: Option<&str>, delay_ms: Option<u64>) {
        if let Some(base) = api_base {
            self.api_base = base.trim_end_matches('/').to_string();
        }
        if let Some(ms) = delay_ms {
            self.delay = DelayConfig::uniform(ms);
        }
    }

    /// Reject values that would make the client unusable
    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(ConfigError::Invalid("page_size must be at least 1".to_string()).into());
        }
        if self.cache.read_attempts == 0 {
            return Err(
                ConfigError::Invalid("cache.read_attempts must be at least 1".to_string()).into(),
            );
        }
        if !self.api_base.starts_with("http://") && !self.api_base.starts_with("https://") {
            return Err(ConfigError::Invalid(format!(
                "api_base must be an http(s) URL, got '{}'",
                self.api_base
            ))
            .into());
        }
        Ok(())
    }
}
