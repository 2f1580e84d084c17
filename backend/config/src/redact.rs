//! Config redaction: masks secrets so a config can be displayed or logged.

use serde_json::Value;

/// Field names whose string values are secrets.
static SECRET_KEYS: &[&str] = &["apiKey", "api_key", "token", "secret", "password"];

/// Redact a config JSON value, masking every secret field.
///
/// Only the first four characters of a secret survive, followed by `***`.
pub fn redact(value: &Value) -> Value {
    redact_recursive(value, "")
}

fn is_secret_key(key: &str) -> bool {
    SECRET_KEYS.iter().any(|k| k.eq_ignore_ascii_case(key))
}

fn mask(secret: &str) -> String {
    if secret.chars().count() > 8 {
        format!("{}***", secret.chars().take(4).collect::<String>())
    } else {
        "***".to_string()
    }
}

fn redact_recursive(value: &Value, key: &str) -> Value {
    match value {
        Value::String(s) if is_secret_key(key) && !s.is_empty() => Value::String(mask(s)),
        Value::Array(items) => Value::Array(items.iter().map(|v| redact_recursive(v, key)).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), redact_recursive(v, k)))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Dotted paths of the fields [`redact`] would mask.
pub fn collect_redacted_paths(value: &Value) -> Vec<String> {
    let mut paths = Vec::new();
    collect_paths(value, "", &mut paths);
    paths
}

fn collect_paths(value: &Value, path: &str, out: &mut Vec<String>) {
    match value {
        Value::String(s) if !s.is_empty() => {
            let key = path.rsplit('.').next().unwrap_or("");
            if is_secret_key(key) {
                out.push(path.to_string());
            }
        }
        Value::Object(map) => {
            for (k, v) in map {
                let child = if path.is_empty() { k.clone() } else { format!("{path}.{k}") };
                collect_paths(v, &child, out);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn masks_gemini_key() {
        let v = json!({ "gemini": { "apiKey": "AIzaSyD-secret-value", "model": "m" } });
        let redacted = redact(&v);
        assert_eq!(redacted["gemini"]["apiKey"], "AIza***");
        assert_eq!(redacted["gemini"]["model"], "m");
    }

    #[test]
    fn short_secrets_are_fully_hidden() {
        let redacted = redact(&json!({ "apiKey": "abc" }));
        assert_eq!(redacted["apiKey"], "***");
    }

    #[test]
    fn reports_redacted_paths() {
        let v = json!({ "gemini": { "apiKey": "x" }, "logging": { "level": "debug" } });
        assert_eq!(collect_redacted_paths(&v), vec!["gemini.apiKey".to_string()]);
    }
}
