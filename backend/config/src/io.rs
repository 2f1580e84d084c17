//! Config file read/write with atomic backup rotation.

use crate::schema::SimpleDoConfig;
use anyhow::{Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

const CONFIG_FILE_NAME: &str = "config.yaml";

/// Env var overriding the config directory.
pub const CONFIG_DIR_VAR: &str = "SIMPLEDO_CONFIG_DIR";

/// Number of rolling backups to keep.
const MAX_BACKUPS: usize = 5;

/// Resolve the SimpleDo config directory.
/// Priority: `SIMPLEDO_CONFIG_DIR` env > `~/.simpledo/` > `./.simpledo`
pub fn config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(CONFIG_DIR_VAR) {
        if !dir.trim().is_empty() {
            return PathBuf::from(dir);
        }
    }
    dirs::home_dir()
        .map(|home| home.join(".simpledo"))
        .unwrap_or_else(|| PathBuf::from(".simpledo"))
}

pub fn config_file_path(config_dir: &Path) -> PathBuf {
    config_dir.join(CONFIG_FILE_NAME)
}

/// Resolve a configured path: absolute paths are kept, relative ones are
/// taken relative to `config_dir`.
pub fn resolve_path(config_dir: &Path, configured: &str) -> PathBuf {
    let path = Path::new(configured);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        config_dir.join(path)
    }
}

/// Read the raw YAML as a JSON value tree, before any substitution.
///
/// A missing file reads as an empty object (first run).
pub async fn load_raw(path: &Path) -> Result<Value> {
    if !fs::try_exists(path).await.unwrap_or(false) {
        debug!(path = %path.display(), "Config file does not exist; using defaults");
        return Ok(Value::Object(Default::default()));
    }

    let raw = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let value: Option<Value> = serde_yaml::from_str(&raw)
        .with_context(|| format!("Failed to parse config YAML at: {}", path.display()))?;

    info!(path = %path.display(), "Loaded config");
    Ok(value.unwrap_or_else(|| Value::Object(Default::default())))
}

/// Load and parse the config without env substitution or defaults.
pub async fn load_config(path: &Path) -> Result<SimpleDoConfig> {
    let value = load_raw(path).await?;
    serde_json::from_value(value)
        .with_context(|| format!("Invalid config structure in: {}", path.display()))
}

/// Write config to disk atomically (write to temp file, rename).
///
/// The previous file, if any, becomes `config.yaml.bak.1`.
pub async fn write_config(config: &SimpleDoConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await.with_context(|| {
            format!("Failed to create config directory: {}", parent.display())
        })?;
    }

    if fs::try_exists(path).await.unwrap_or(false) {
        rotate_backups(path).await;
    }

    let yaml = serde_yaml::to_string(config).context("Failed to serialize config to YAML")?;

    let tmp_path = path.with_extension("yaml.tmp");
    fs::write(&tmp_path, yaml.as_bytes())
        .await
        .with_context(|| format!("Failed to write temp config: {}", tmp_path.display()))?;

    fs::rename(&tmp_path, path)
        .await
        .with_context(|| format!("Failed to rename temp config to: {}", path.display()))?;

    info!(path = %path.display(), "Wrote config");
    Ok(())
}

/// Shift `config.yaml.bak.N` up by one and copy the current file to `.bak.1`.
/// Backup failures are logged, never fatal.
async fn rotate_backups(path: &Path) {
    for i in (1..MAX_BACKUPS).rev() {
        let old = path.with_extension(format!("yaml.bak.{i}"));
        let new = path.with_extension(format!("yaml.bak.{}", i + 1));
        if fs::try_exists(&old).await.unwrap_or(false) {
            if let Err(e) = fs::rename(&old, &new).await {
                warn!("Failed to rotate backup {}: {}", old.display(), e);
            }
        }
    }

    let bak = path.with_extension("yaml.bak.1");
    if let Err(e) = fs::copy(path, &bak).await {
        warn!("Failed to create backup {}: {}", bak.display(), e);
    }
}

/// Set one dotted camelCase field (`retry.maxAttempts`) through an
/// RFC 7396 merge patch, so unrelated fields survive untouched.
pub fn set_field(config: &SimpleDoConfig, dotted_path: &str, value: Value) -> Result<SimpleDoConfig> {
    let patch = dotted_path
        .split('.')
        .rev()
        .try_fold(value, |inner, key| {
            if key.is_empty() {
                anyhow::bail!("Invalid config path '{dotted_path}'");
            }
            let mut map = serde_json::Map::new();
            map.insert(key.to_string(), inner);
            Ok(Value::Object(map))
        })?;
    apply_merge_patch(config, &patch)
}

/// Patch config with a JSON Merge Patch (RFC 7396).
pub fn apply_merge_patch(config: &SimpleDoConfig, patch: &Value) -> Result<SimpleDoConfig> {
    let mut value = serde_json::to_value(config).context("Failed to serialize config for merge patch")?;
    json_merge_patch(&mut value, patch);
    serde_json::from_value(value).context("Patched config does not match the schema")
}

fn json_merge_patch(target: &mut Value, patch: &Value) {
    match (target, patch) {
        (Value::Object(target_map), Value::Object(patch_map)) => {
            for (key, patch_val) in patch_map {
                if patch_val.is_null() {
                    target_map.remove(key);
                } else {
                    json_merge_patch(target_map.entry(key.clone()).or_insert(Value::Null), patch_val);
                }
            }
        }
        (target, Value::Object(_)) => {
            *target = Value::Object(Default::default());
            json_merge_patch(target, patch);
        }
        (target, patch) => *target = patch.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{LoggingConfig, RetryConfig};

    #[tokio::test]
    async fn missing_file_loads_as_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&config_file_path(dir.path())).await.unwrap();
        assert_eq!(config, SimpleDoConfig::default());
    }

    #[tokio::test]
    async fn empty_file_loads_as_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = config_file_path(dir.path());
        std::fs::write(&path, "").unwrap();
        assert_eq!(load_config(&path).await.unwrap(), SimpleDoConfig::default());
    }

    #[tokio::test]
    async fn write_then_load_round_trips_with_backup() {
        let dir = tempfile::tempdir().unwrap();
        let path = config_file_path(&dir.path().join("nested"));

        let first = SimpleDoConfig {
            retry: Some(RetryConfig { max_attempts: Some(3), ..Default::default() }),
            ..Default::default()
        };
        write_config(&first, &path).await.unwrap();
        assert_eq!(load_config(&path).await.unwrap(), first);

        let second = set_field(&first, "logging.level", Value::String("debug".into())).unwrap();
        write_config(&second, &path).await.unwrap();

        assert_eq!(load_config(&path).await.unwrap(), second);
        let backup = std::fs::read_to_string(path.with_extension("yaml.bak.1")).unwrap();
        assert!(backup.contains("maxAttempts: 3"));
        assert!(!backup.contains("debug"));
        assert!(!path.with_extension("yaml.tmp").exists());
    }

    #[test]
    fn set_field_keeps_siblings() {
        let base = SimpleDoConfig {
            logging: Some(LoggingConfig { level: Some("info".into()), dir: Some("logs".into()) }),
            ..Default::default()
        };
        let updated = set_field(&base, "logging.level", Value::String("warn".into())).unwrap();
        let logging = updated.logging.unwrap();
        assert_eq!(logging.level.as_deref(), Some("warn"));
        assert_eq!(logging.dir.as_deref(), Some("logs"));
    }

    #[test]
    fn set_field_rejects_wrong_types_and_bad_paths() {
        let base = SimpleDoConfig::default();
        assert!(set_field(&base, "retry.maxAttempts", Value::String("many".into())).is_err());
        assert!(set_field(&base, "retry..maxAttempts", Value::from(3)).is_err());
    }

    #[test]
    fn null_patch_removes_section() {
        let base = SimpleDoConfig {
            logging: Some(LoggingConfig { level: Some("info".into()), ..Default::default() }),
            ..Default::default()
        };
        let result = apply_merge_patch(&base, &serde_json::json!({ "logging": null })).unwrap();
        assert!(result.logging.is_none());
    }

    #[test]
    fn relative_paths_resolve_under_config_dir() {
        let base = Path::new("/etc/simpledo");
        assert_eq!(resolve_path(base, "data"), PathBuf::from("/etc/simpledo/data"));
        assert_eq!(resolve_path(base, "/var/lib/simpledo"), PathBuf::from("/var/lib/simpledo"));
    }
}
