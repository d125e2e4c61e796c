//! Settings structures for Tanker configuration

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Main settings structure matching tanker.yml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub api: ApiSettings,
    pub index: IndexSettings,
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings: Settings = serde_yaml::from_str(&content)?;
        Ok(settings)
    }

    /// Merge with environment variables (TANKER_* prefix)
    pub fn merge_env(&mut self) {
        if let Ok(val) = std::env::var("TANKER_URL") {
            self.api.url = Some(val);
        }
        if let Ok(val) = std::env::var("TANKER_INDEX") {
            self.index.default_name = Some(val);
        }
        if let Ok(val) = std::env::var("TANKER_ENV") {
            self.general.environment = Some(val);
        }
        if let Ok(val) = std::env::var("TANKER_PER_PAGE") {
            if let Ok(per_page) = val.parse() {
                self.index.per_page = per_page;
            }
        }
        if let Ok(val) = std::env::var("TANKER_BATCH_SIZE") {
            if let Ok(batch_size) = val.parse() {
                self.index.batch_size = batch_size;
            }
        }
        if let Ok(val) = std::env::var("TANKER_READY_TIMEOUT") {
            if let Ok(secs) = val.parse() {
                self.index.ready_timeout_secs = secs;
            }
        }
    }

    /// Settings pointing at a service URL, everything else defaulted
    pub fn with_url(url: impl Into<String>) -> Self {
        let mut settings = Self::default();
        settings.api.url = Some(url.into());
        settings
    }

    /// Index name used when a declaration does not supply one.
    ///
    /// An explicit `index.default_name` wins; otherwise the name is derived
    /// from the application name and environment as `<app>_<env>`.
    pub fn default_index_name(&self) -> Option<String> {
        if let Some(ref name) = self.index.default_name {
            return Some(name.clone());
        }
        match (&self.general.app_name, &self.general.environment) {
            (Some(app), Some(env)) => Some(format!("{}_{}", app.to_lowercase(), env)),
            _ => None,
        }
    }
}

/// General settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Application name, used to derive a default index name
    pub app_name: Option<String>,
    /// Deployment environment (development, production, ...)
    pub environment: Option<String>,
}

/// Search service connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    /// Private API URL, credentials included (http://:secret@host)
    pub url: Option<String>,
    /// Request timeout in seconds
    pub request_timeout: f64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            url: None,
            request_timeout: 10.0,
        }
    }
}

/// Index behaviour settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexSettings {
    /// Index name for declarations that do not name one
    pub default_name: Option<String>,
    /// Results per page when neither the request nor the model says otherwise
    pub per_page: u32,
    /// Records per bulk upsert while reindexing
    pub batch_size: usize,
    /// Interval between readiness checks after creating an index
    pub poll_interval_ms: u64,
    /// Give up waiting for a new index after this many seconds
    pub ready_timeout_secs: u64,
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self {
            default_name: None,
            per_page: crate::DEFAULT_PER_PAGE,
            batch_size: crate::DEFAULT_BATCH_SIZE,
            poll_interval_ms: 500,
            ready_timeout_secs: 300,
        }
    }
}

impl IndexSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn ready_timeout(&self) -> Duration {
        Duration::from_secs(self.ready_timeout_secs)
    }
}
