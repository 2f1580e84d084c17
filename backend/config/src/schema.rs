//! SimpleDo runtime configuration schema.
//!
//! Every field is optional on disk; [`crate::defaults`] fills the gaps and
//! the accessors below fall back to the same constants.

use serde::{Deserialize, Serialize};

use crate::defaults::{
    DEFAULT_BACKOFF_FACTOR, DEFAULT_BASE_DELAY_MS, DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL,
    DEFAULT_LOG_DIR, DEFAULT_LOG_LEVEL, DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_DELAY_MS, DEFAULT_MAX_DUE_DAYS,
    DEFAULT_STORAGE_DIR, DEFAULT_STORAGE_KEY, DEFAULT_TIMEOUT_SECS,
};

/// Root configuration, as read from `config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimpleDoConfig {
    /// Gemini endpoint used for OCR and grounded search
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gemini: Option<GeminiConfig>,

    /// Backoff shared by both remote calls
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry: Option<RetryConfig>,

    /// Where the to-do slot lives
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage: Option<StorageConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub todos: Option<TodosConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Per-request timeout
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetryConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_attempts: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_delay_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backoff_factor: Option<f64>,
    /// Upper bound on a single backoff wait
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_delay_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageConfig {
    /// Relative paths resolve against the config directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggingConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    /// Relative paths resolve against the config directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodosConfig {
    /// Length of the due-date window, in days after today
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_due_days: Option<u32>,
}

impl SimpleDoConfig {
    pub fn gemini_api_key(&self) -> Option<&str> {
        self.gemini
            .as_ref()
            .and_then(|g| g.api_key.as_deref())
            .filter(|k| !k.trim().is_empty())
    }

    pub fn gemini_model(&self) -> &str {
        self.gemini.as_ref().and_then(|g| g.model.as_deref()).unwrap_or(DEFAULT_GEMINI_MODEL)
    }

    pub fn gemini_base_url(&self) -> &str {
        self.gemini.as_ref().and_then(|g| g.base_url.as_deref()).unwrap_or(DEFAULT_GEMINI_BASE_URL)
    }

    pub fn gemini_timeout_secs(&self) -> u64 {
        self.gemini.as_ref().and_then(|g| g.timeout_secs).unwrap_or(DEFAULT_TIMEOUT_SECS)
    }

    pub fn retry_max_attempts(&self) -> u32 {
        self.retry.as_ref().and_then(|r| r.max_attempts).unwrap_or(DEFAULT_MAX_ATTEMPTS)
    }

    pub fn retry_base_delay_ms(&self) -> u64 {
        self.retry.as_ref().and_then(|r| r.base_delay_ms).unwrap_or(DEFAULT_BASE_DELAY_MS)
    }

    pub fn retry_backoff_factor(&self) -> f64 {
        self.retry.as_ref().and_then(|r| r.backoff_factor).unwrap_or(DEFAULT_BACKOFF_FACTOR)
    }

    pub fn retry_max_delay_ms(&self) -> u64 {
        self.retry.as_ref().and_then(|r| r.max_delay_ms).unwrap_or(DEFAULT_MAX_DELAY_MS)
    }

    pub fn storage_dir(&self) -> &str {
        self.storage.as_ref().and_then(|s| s.data_dir.as_deref()).unwrap_or(DEFAULT_STORAGE_DIR)
    }

    pub fn storage_key(&self) -> &str {
        self.storage.as_ref().and_then(|s| s.key.as_deref()).unwrap_or(DEFAULT_STORAGE_KEY)
    }

    pub fn log_level(&self) -> &str {
        self.logging.as_ref().and_then(|l| l.level.as_deref()).unwrap_or(DEFAULT_LOG_LEVEL)
    }

    pub fn log_dir(&self) -> &str {
        self.logging.as_ref().and_then(|l| l.dir.as_deref()).unwrap_or(DEFAULT_LOG_DIR)
    }

    pub fn max_due_days(&self) -> u32 {
        self.todos.as_ref().and_then(|t| t.max_due_days).unwrap_or(DEFAULT_MAX_DUE_DAYS)
    }
}
