//! Config validation: field checks with user-friendly messages.

use crate::schema::SimpleDoConfig;
use thiserror::Error;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// A config validation error with field path and message.
#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

/// Everything found in one validation pass.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError { path: path.into(), message: message.into() });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError { path: path.into(), message: message.into() });
    }
}

pub fn validate(config: &SimpleDoConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_gemini(config, &mut report);
    validate_retry(config, &mut report);
    validate_storage(config, &mut report);
    validate_logging(config, &mut report);
    validate_todos(config, &mut report);
    report
}

fn validate_gemini(config: &SimpleDoConfig, report: &mut ValidationReport) {
    if config.gemini_api_key().is_none() {
        report.warn(
            "gemini.apiKey",
            "No Gemini API key configured; set gemini.apiKey or GEMINI_API_KEY",
        );
    }
    let base_url = config.gemini_base_url();
    if !(base_url.starts_with("https://") || base_url.starts_with("http://")) {
        report.error("gemini.baseUrl", format!("'{base_url}' is not an http(s) URL"));
    }
    if config.gemini_model().trim().is_empty() {
        report.error("gemini.model", "Model name cannot be empty");
    }
    if config.gemini_timeout_secs() == 0 {
        report.error("gemini.timeoutSecs", "timeoutSecs must be > 0");
    }
}

fn validate_retry(config: &SimpleDoConfig, report: &mut ValidationReport) {
    if config.retry_max_attempts() == 0 {
        report.error("retry.maxAttempts", "maxAttempts must be at least 1");
    }
    let factor = config.retry_backoff_factor();
    if !factor.is_finite() || factor < 1.0 {
        report.error("retry.backoffFactor", "backoffFactor must be a finite number >= 1.0");
    }
    if config.retry_base_delay_ms() == 0 {
        report.warn("retry.baseDelayMs", "baseDelayMs of 0 retries without waiting");
    }
    if config.retry_max_delay_ms() < config.retry_base_delay_ms() {
        report.warn("retry.maxDelayMs", "maxDelayMs is below baseDelayMs, every wait is capped");
    }
}

fn validate_storage(config: &SimpleDoConfig, report: &mut ValidationReport) {
    let key = config.storage_key();
    if key.trim().is_empty() {
        report.error("storage.key", "Storage key cannot be empty");
    } else if key.contains(['/', '\\']) {
        report.error("storage.key", "Storage key cannot contain path separators");
    }
}

fn validate_logging(config: &SimpleDoConfig, report: &mut ValidationReport) {
    let level = config.log_level();
    if !LOG_LEVELS.contains(&level.to_ascii_lowercase().as_str()) {
        report.warn("logging.level", format!("Unknown log level '{level}'; expected one of {LOG_LEVELS:?}"));
    }
}

fn validate_todos(config: &SimpleDoConfig, report: &mut ValidationReport) {
    if config.max_due_days() > 366 {
        report.warn("todos.maxDueDays", "Due window longer than a year");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{GeminiConfig, RetryConfig, StorageConfig};

    #[test]
    fn default_config_only_warns_about_key() {
        let report = validate(&SimpleDoConfig::default());
        assert!(report.is_valid());
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].path, "gemini.apiKey");
    }

    #[test]
    fn zero_attempts_is_error() {
        let config = SimpleDoConfig {
            retry: Some(RetryConfig { max_attempts: Some(0), ..Default::default() }),
            ..Default::default()
        };
        let report = validate(&config);
        assert!(!report.is_valid());
        assert_eq!(report.errors[0].path, "retry.maxAttempts");
    }

    #[test]
    fn shrinking_backoff_is_error() {
        let config = SimpleDoConfig {
            retry: Some(RetryConfig { backoff_factor: Some(0.5), ..Default::default() }),
            ..Default::default()
        };
        assert!(!validate(&config).is_valid());
    }

    #[test]
    fn max_delay_below_base_delay_warns() {
        let config = SimpleDoConfig {
            retry: Some(RetryConfig {
                base_delay_ms: Some(2_000),
                max_delay_ms: Some(500),
                ..Default::default()
            }),
            ..Default::default()
        };
        let report = validate(&config);
        assert!(report.is_valid());
        assert!(report.warnings.iter().any(|w| w.path == "retry.maxDelayMs"));
    }

    #[test]
    fn storage_key_must_not_escape_data_dir() {
        let config = SimpleDoConfig {
            storage: Some(StorageConfig { key: Some("../todos".into()), ..Default::default() }),
            ..Default::default()
        };
        assert!(!validate(&config).is_valid());
    }

    #[test]
    fn non_http_base_url_is_error() {
        let config = SimpleDoConfig {
            gemini: Some(GeminiConfig {
                api_key: Some("k".into()),
                base_url: Some("ftp://example".into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let report = validate(&config);
        assert_eq!(report.errors.len(), 1);
        assert!(report.warnings.is_empty());
    }
}
