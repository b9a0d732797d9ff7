//! Application configuration structures.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Code classification strategy
    #[serde(default)]
    pub classifier: ClassifierConfig,

    /// Suppression store location and append policy
    #[serde(default)]
    pub store: StoreConfig,

    /// Alert delivery settings
    #[serde(default)]
    pub alert: AlertConfig,

    /// Cycle timing and pause handling
    #[serde(default)]
    pub scheduler: SchedulerConfig,

    /// Log output settings
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Independently tracked listing categories
    #[serde(default = "defaults::categories")]
    pub categories: Vec<CategoryConfig>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Serialize to pretty TOML.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Look up a category by name.
    pub fn category(&self, name: &str) -> Option<&CategoryConfig> {
        self.categories.iter().find(|c| c.name == name)
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.categories.is_empty() {
            return Err(AppError::validation("No categories defined"));
        }

        let mut seen = HashSet::new();
        for category in &self.categories {
            if !is_valid_category_name(&category.name) {
                return Err(AppError::validation(format!(
                    "category name '{}' must be non-empty and use only letters, digits, '-' or '_'",
                    category.name
                )));
            }
            if !seen.insert(category.name.as_str()) {
                return Err(AppError::validation(format!(
                    "category '{}' is defined more than once",
                    category.name
                )));
            }
        }

        if self.store.append_attempts == 0 {
            return Err(AppError::validation("store.append_attempts must be > 0"));
        }
        if self.scheduler.pause_poll_ms == 0 {
            return Err(AppError::validation("scheduler.pause_poll_ms must be > 0"));
        }
        if self.scheduler.interval_secs == 0 {
            return Err(AppError::validation("scheduler.interval_secs must be > 0"));
        }
        if self.alert.timeout_secs == 0 {
            return Err(AppError::validation("alert.timeout_secs must be > 0"));
        }

        if let Some(raw) = self.alert.webhook() {
            let url = Url::parse(raw)?;
            if url.scheme() != "http" && url.scheme() != "https" {
                return Err(AppError::validation(format!(
                    "alert.webhook_url must be http(s), got '{}'",
                    url.scheme()
                )));
            }
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            classifier: ClassifierConfig::default(),
            store: StoreConfig::default(),
            alert: AlertConfig::default(),
            scheduler: SchedulerConfig::default(),
            logging: LoggingConfig::default(),
            categories: defaults::categories(),
        }
    }
}

fn is_valid_category_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Which code classifier to use.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierStrategy {
    /// Ordered token cascade
    #[default]
    Standard,
    /// Single-regex classifier kept for compatibility
    Legacy,
}

/// Code classification settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ClassifierConfig {
    #[serde(default)]
    pub strategy: ClassifierStrategy,
}

/// Suppression store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Directory holding one suppression file per category
    #[serde(default = "defaults::store_dir")]
    pub dir: PathBuf,

    /// Total append attempts before giving up on a batch's entries
    #[serde(default = "defaults::append_attempts")]
    pub append_attempts: u32,

    /// Delay between append attempts in milliseconds
    #[serde(default = "defaults::retry_delay")]
    pub retry_delay_ms: u64,
}

impl StoreConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            dir: defaults::store_dir(),
            append_attempts: defaults::append_attempts(),
            retry_delay_ms: defaults::retry_delay(),
        }
    }
}

/// Alert delivery settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertConfig {
    /// Chat webhook receiving `{"text": ...}` payloads
    #[serde(default)]
    pub webhook_url: String,

    /// When false, alerts are printed instead of delivered
    #[serde(default = "defaults::send")]
    pub send: bool,

    /// Webhook request timeout in seconds
    #[serde(default = "defaults::alert_timeout")]
    pub timeout_secs: u64,

    /// Also alert on codes that fit no recognized shape
    #[serde(default)]
    pub report_malformed: bool,
}

impl AlertConfig {
    /// The webhook URL, if one is configured.
    pub fn webhook(&self) -> Option<&str> {
        let url = self.webhook_url.trim();
        (!url.is_empty()).then_some(url)
    }
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            webhook_url: String::new(),
            send: defaults::send(),
            timeout_secs: defaults::alert_timeout(),
            report_malformed: false,
        }
    }
}

/// Cycle timing and pause handling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Seconds between the start of consecutive cycles in watch mode
    #[serde(default = "defaults::interval")]
    pub interval_secs: u64,

    /// Poll interval while paused, in milliseconds
    #[serde(default = "defaults::pause_poll")]
    pub pause_poll_ms: u64,

    /// Pausing is engaged while this file exists
    #[serde(default)]
    pub pause_file: Option<PathBuf>,
}

impl SchedulerConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn pause_poll(&self) -> Duration {
        Duration::from_millis(self.pause_poll_ms)
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval_secs: defaults::interval(),
            pause_poll_ms: defaults::pause_poll(),
            pause_file: None,
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default log filter when `RUST_LOG` is unset
    #[serde(default = "defaults::log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
        }
    }
}

/// One independently tracked listing category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryConfig {
    /// Category name, also used for the suppression file name
    pub name: String,

    /// Captured text file, one listing per line
    pub input: PathBuf,
}

mod defaults {
    use std::path::PathBuf;

    use super::CategoryConfig;

    // Store defaults
    pub fn store_dir() -> PathBuf {
        PathBuf::from("state")
    }
    pub fn append_attempts() -> u32 {
        3
    }
    pub fn retry_delay() -> u64 {
        250
    }

    // Alert defaults
    pub fn send() -> bool {
        true
    }
    pub fn alert_timeout() -> u64 {
        30
    }

    // Scheduler defaults
    pub fn interval() -> u64 {
        300
    }
    pub fn pause_poll() -> u64 {
        500
    }

    pub fn log_level() -> String {
        "info".into()
    }

    // Category defaults
    pub fn categories() -> Vec<CategoryConfig> {
        vec![
            CategoryConfig {
                name: "active".to_string(),
                input: PathBuf::from("data/active.txt"),
            },
            CategoryConfig {
                name: "scheduled".to_string(),
                input: PathBuf::from("data/scheduled.txt"),
            },
        ]
    }
}
