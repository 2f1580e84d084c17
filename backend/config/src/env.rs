//! Environment variable substitution for config values.
//!
//! String leaves may reference `${VAR_NAME}` (uppercase names only); `$${VAR}`
//! is an escape that yields a literal `${VAR}`.

use std::collections::HashMap;

use anyhow::{bail, Result};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::Value;

use crate::schema::{GeminiConfig, SimpleDoConfig};

/// Env var consulted when `gemini.apiKey` is not configured.
pub const GEMINI_API_KEY_VAR: &str = "GEMINI_API_KEY";

/// `${VAR}` with an optional leading `$` marking an escape.
static REFERENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\$?)\$\{([A-Z_][A-Z0-9_]*)\}").expect("valid regex"));

#[derive(Debug, thiserror::Error)]
#[error("Missing env var \"{var_name}\" referenced at config path: {config_path}")]
pub struct MissingEnvVarError {
    pub var_name: String,
    pub config_path: String,
}

/// Substitute `${VAR}` references from the process environment.
pub fn resolve_env_vars(value: &Value) -> Result<Value> {
    resolve_env_vars_with(value, &std::env::vars().collect())
}

/// Substitute `${VAR}` references from `env`. Unset or empty vars are errors.
pub fn resolve_env_vars_with(value: &Value, env: &HashMap<String, String>) -> Result<Value> {
    substitute_value(value, env, "")
}

fn substitute_value(value: &Value, env: &HashMap<String, String>, path: &str) -> Result<Value> {
    match value {
        Value::String(s) => Ok(Value::String(substitute_string(s, env, path)?)),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, v)| substitute_value(v, env, &format!("{path}[{i}]")))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        Value::Object(map) => {
            let mut out = serde_json::Map::with_capacity(map.len());
            for (k, v) in map {
                let child = if path.is_empty() { k.clone() } else { format!("{path}.{k}") };
                out.insert(k.clone(), substitute_value(v, env, &child)?);
            }
            Ok(Value::Object(out))
        }
        other => Ok(other.clone()),
    }
}

fn substitute_string(s: &str, env: &HashMap<String, String>, path: &str) -> Result<String> {
    if !s.contains("${") {
        return Ok(s.to_string());
    }

    let mut missing = None;
    let out = REFERENCE.replace_all(s, |caps: &Captures| {
        let name = &caps[2];
        if !caps[1].is_empty() {
            return format!("${{{name}}}");
        }
        match env.get(name).filter(|v| !v.is_empty()) {
            Some(val) => val.clone(),
            None => {
                missing.get_or_insert_with(|| name.to_string());
                String::new()
            }
        }
    });

    if let Some(var_name) = missing {
        bail!(MissingEnvVarError { var_name, config_path: path.to_string() });
    }
    Ok(out.into_owned())
}

/// Fill settings that have a conventional env var when the file leaves them unset.
pub fn apply_env_fallbacks(mut config: SimpleDoConfig, env: &HashMap<String, String>) -> SimpleDoConfig {
    if config.gemini_api_key().is_none() {
        if let Some(key) = env.get(GEMINI_API_KEY_VAR).filter(|k| !k.trim().is_empty()) {
            config.gemini.get_or_insert_with(GeminiConfig::default).api_key = Some(key.clone());
        }
    }
    config
}
