//! `simpledo-config`: SimpleDo runtime configuration.
//!
//! Provides:
//! - Typed config schema (Gemini endpoint, retry policy, storage, logging, to-dos)
//! - YAML read/write with atomic backup rotation
//! - `${ENV_VAR}` substitution and the `GEMINI_API_KEY` fallback
//! - Config redaction for safe display
//! - Default value application
//! - Validation

pub mod defaults;
pub mod env;
pub mod io;
pub mod redact;
pub mod schema;
pub mod validation;

pub use defaults::apply_all_defaults;
pub use env::{
    apply_env_fallbacks, resolve_env_vars, resolve_env_vars_with,
    MissingEnvVarError, GEMINI_API_KEY_VAR,
};
pub use io::{
    apply_merge_patch, config_dir, config_file_path, load_config, load_raw, resolve_path,
    set_field, write_config, CONFIG_DIR_VAR,
};
pub use redact::{collect_redacted_paths, redact};
pub use schema::SimpleDoConfig;
pub use validation::{validate, ConfigValidationError, ValidationReport};

use anyhow::{bail, Context, Result};
use std::collections::HashMap;
use std::path::Path;

/// Load, substitute env vars, apply fallbacks and defaults, then validate.
///
/// This is the main entry point for loading a config at runtime.
pub async fn load_and_prepare(path: &Path) -> Result<SimpleDoConfig> {
    load_and_prepare_with(path, &std::env::vars().collect()).await
}

/// [`load_and_prepare`] against an explicit environment.
pub async fn load_and_prepare_with(path: &Path, env: &HashMap<String, String>) -> Result<SimpleDoConfig> {
    let raw = load_raw(path).await?;

    let value = resolve_env_vars_with(&raw, env).context("Failed to resolve env vars in config")?;

    let config: SimpleDoConfig = serde_json::from_value(value)
        .with_context(|| format!("Invalid config structure in: {}", path.display()))?;

    let config = apply_all_defaults(apply_env_fallbacks(config, env));

    let report = validate(&config);
    for warning in &report.warnings {
        tracing::warn!(path = %warning.path, message = %warning.message, "Config warning");
    }
    for error in &report.errors {
        tracing::error!(path = %error.path, message = %error.message, "Config error");
    }
    if let Some(first) = report.errors.first() {
        match report.errors.len() {
            1 => bail!("{first}"),
            n => bail!("{first} (and {} more)", n - 1),
        }
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[tokio::test]
    async fn prepares_file_with_env_reference() {
        let dir = tempfile::tempdir().unwrap();
        let path = config_file_path(dir.path());
        std::fs::write(&path, "gemini:\n  apiKey: ${MY_GEMINI}\nretry:\n  maxAttempts: 3\n").unwrap();

        let config = load_and_prepare_with(&path, &env(&[("MY_GEMINI", "secret")])).await.unwrap();

        assert_eq!(config.gemini_api_key(), Some("secret"));
        assert_eq!(config.retry_max_attempts(), 3);
        assert_eq!(config.retry.as_ref().unwrap().base_delay_ms, Some(1_000));
        assert_eq!(config.storage_key(), "simpleDo.todos");
    }

    #[tokio::test]
    async fn missing_file_uses_env_key_and_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_and_prepare_with(
            &config_file_path(dir.path()),
            &env(&[(GEMINI_API_KEY_VAR, "from-env")]),
        )
        .await
        .unwrap();
        assert_eq!(config.gemini_api_key(), Some("from-env"));
        assert_eq!(config.max_due_days(), 30);
    }

    #[tokio::test]
    async fn unresolved_reference_fails_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = config_file_path(dir.path());
        std::fs::write(&path, "gemini:\n  apiKey: ${NOPE}\n").unwrap();
        let err = load_and_prepare_with(&path, &HashMap::new()).await.unwrap_err();
        assert!(format!("{err:#}").contains("NOPE"));
    }

    #[tokio::test]
    async fn invalid_values_fail_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = config_file_path(dir.path());
        std::fs::write(&path, "retry:\n  maxAttempts: 0\n").unwrap();
        let err = load_and_prepare_with(&path, &HashMap::new()).await.unwrap_err();
        assert!(err.to_string().contains("retry.maxAttempts"));
    }
}
