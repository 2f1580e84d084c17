//! Config defaults: applies sensible default values to parsed config.

use crate::schema::{
    GeminiConfig, LoggingConfig, RetryConfig, SimpleDoConfig, StorageConfig, TodosConfig,
};

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash-preview-09-2025";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
pub const DEFAULT_BASE_DELAY_MS: u64 = 1_000;
pub const DEFAULT_BACKOFF_FACTOR: f64 = 2.0;
pub const DEFAULT_MAX_DELAY_MS: u64 = 60_000;

pub const DEFAULT_STORAGE_DIR: &str = "data";
pub const DEFAULT_STORAGE_KEY: &str = "simpleDo.todos";

pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_LOG_DIR: &str = "logs";

pub const DEFAULT_MAX_DUE_DAYS: u32 = 30;

/// Apply all defaults to a freshly loaded config.
pub fn apply_all_defaults(config: SimpleDoConfig) -> SimpleDoConfig {
    let config = apply_gemini_defaults(config);
    let config = apply_retry_defaults(config);
    let config = apply_storage_defaults(config);
    let config = apply_logging_defaults(config);
    apply_todo_defaults(config)
}

/// Model, endpoint and timeout. The API key has no default.
fn apply_gemini_defaults(mut config: SimpleDoConfig) -> SimpleDoConfig {
    let gemini = config.gemini.get_or_insert_with(GeminiConfig::default);
    gemini.model.get_or_insert_with(|| DEFAULT_GEMINI_MODEL.to_string());
    gemini.base_url.get_or_insert_with(|| DEFAULT_GEMINI_BASE_URL.to_string());
    gemini.timeout_secs.get_or_insert(DEFAULT_TIMEOUT_SECS);
    config
}

fn apply_retry_defaults(mut config: SimpleDoConfig) -> SimpleDoConfig {
    let retry = config.retry.get_or_insert_with(RetryConfig::default);
    retry.max_attempts.get_or_insert(DEFAULT_MAX_ATTEMPTS);
    retry.base_delay_ms.get_or_insert(DEFAULT_BASE_DELAY_MS);
    retry.backoff_factor.get_or_insert(DEFAULT_BACKOFF_FACTOR);
    retry.max_delay_ms.get_or_insert(DEFAULT_MAX_DELAY_MS);
    config
}

fn apply_storage_defaults(mut config: SimpleDoConfig) -> SimpleDoConfig {
    let storage = config.storage.get_or_insert_with(StorageConfig::default);
    storage.data_dir.get_or_insert_with(|| DEFAULT_STORAGE_DIR.to_string());
    storage.key.get_or_insert_with(|| DEFAULT_STORAGE_KEY.to_string());
    config
}

fn apply_logging_defaults(mut config: SimpleDoConfig) -> SimpleDoConfig {
    let logging = config.logging.get_or_insert_with(LoggingConfig::default);
    logging.level.get_or_insert_with(|| DEFAULT_LOG_LEVEL.to_string());
    logging.dir.get_or_insert_with(|| DEFAULT_LOG_DIR.to_string());
    config
}

fn apply_todo_defaults(mut config: SimpleDoConfig) -> SimpleDoConfig {
    let todos = config.todos.get_or_insert_with(TodosConfig::default);
    todos.max_due_days.get_or_insert(DEFAULT_MAX_DUE_DAYS);
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fills_every_section() {
        let config = apply_all_defaults(SimpleDoConfig::default());
        let gemini = config.gemini.as_ref().unwrap();
        assert_eq!(gemini.model.as_deref(), Some(DEFAULT_GEMINI_MODEL));
        assert_eq!(gemini.api_key, None);
        assert_eq!(config.retry.as_ref().unwrap().max_attempts, Some(5));
        assert_eq!(config.storage.as_ref().unwrap().key.as_deref(), Some("simpleDo.todos"));
        assert_eq!(config.logging.as_ref().unwrap().level.as_deref(), Some("info"));
        assert_eq!(config.todos.as_ref().unwrap().max_due_days, Some(30));
    }

    #[test]
    fn keeps_explicit_values() {
        let config = SimpleDoConfig {
            retry: Some(RetryConfig { max_attempts: Some(2), ..Default::default() }),
            ..Default::default()
        };
        let config = apply_all_defaults(config);
        let retry = config.retry.unwrap();
        assert_eq!(retry.max_attempts, Some(2));
        assert_eq!(retry.base_delay_ms, Some(DEFAULT_BASE_DELAY_MS));
        assert_eq!(retry.max_delay_ms, Some(DEFAULT_MAX_DELAY_MS));
    }
}
