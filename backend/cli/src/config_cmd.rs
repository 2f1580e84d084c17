//! `simpledo config …`: inspect and edit `config.yaml`.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Subcommand;
use serde_json::Value;
use simpledo_config::{config_file_path, load_and_prepare, load_config, redact, set_field, write_config};

use crate::terminal_output::note_success;

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective config, secrets masked
    Show,
    /// Print the config file location
    Path,
    /// Set one field, e.g. `retry.maxAttempts 3`
    Set { key: String, value: String },
}

pub async fn run(config_dir: &Path, cmd: ConfigCommands) -> Result<()> {
    let path = config_file_path(config_dir);
    match cmd {
        ConfigCommands::Path => println!("{}", path.display()),
        ConfigCommands::Show => {
            let config = load_and_prepare(&path).await?;
            let value = serde_json::to_value(&config).context("Failed to serialize config")?;
            print!("{}", serde_yaml::to_string(&redact(&value))?);
        }
        ConfigCommands::Set { key, value } => {
            // edit the file as written, so ${VAR} references survive
            let config = load_config(&path).await?;
            let updated = set_field(&config, &key, parse_value(&value))
                .with_context(|| format!("Cannot set '{key}' to '{value}'"))?;
            write_config(&updated, &path).await?;
            note_success(&format!("Set {key} in {}", path.display()));
        }
    }
    Ok(())
}

/// YAML scalar syntax, so `3` is a number and `true` a bool; anything
/// unparseable is kept as a string.
fn parse_value(raw: &str) -> Value {
    serde_yaml::from_str::<Value>(raw)
        .ok()
        .filter(|v| !v.is_null() || raw.trim() == "null")
        .unwrap_or_else(|| Value::String(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_parse_as_yaml_scalars() {
        assert_eq!(parse_value("3"), Value::from(3));
        assert_eq!(parse_value("true"), Value::Bool(true));
        assert_eq!(parse_value("gemini-pro"), Value::String("gemini-pro".into()));
        assert_eq!(parse_value("null"), Value::Null);
        assert_eq!(parse_value(""), Value::String(String::new()));
    }

    #[tokio::test]
    async fn set_writes_field_and_keeps_env_reference() {
        let dir = tempfile::tempdir().unwrap();
        let path = config_file_path(dir.path());
        std::fs::write(&path, "gemini:\n  apiKey: ${GEMINI_API_KEY}\n").unwrap();

        run(dir.path(), ConfigCommands::Set { key: "retry.maxAttempts".into(), value: "3".into() })
            .await
            .unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("maxAttempts: 3"));
        assert!(written.contains("${GEMINI_API_KEY}"));
    }

    #[tokio::test]
    async fn set_rejects_mistyped_value() {
        let dir = tempfile::tempdir().unwrap();
        let result = run(
            dir.path(),
            ConfigCommands::Set { key: "retry.maxAttempts".into(), value: "lots".into() },
        )
        .await;
        assert!(result.is_err());
        assert!(!config_file_path(dir.path()).exists());
    }
}
