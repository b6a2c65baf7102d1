use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

const DEFAULT_REDACTION: &str = "[REDACTED]";
const INLINE_REDACTION: &str = "***REDACTED***";

const SENSITIVE_NAME_PARTS: &[&str] = &[
    "password",
    "passwd",
    "passphrase",
    "secret",
    "token",
    "api_key",
    "apikey",
    "private_key",
    "credential",
];

static INLINE_REDACTION_PATTERNS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    vec![
        (
            Regex::new(r"\b(Bearer)\s+([A-Za-z0-9._~+/=-]{10,})").expect("inline redaction regex"),
            "$1 ***REDACTED***",
        ),
        (
            Regex::new(r"\beyJ[a-zA-Z0-9_-]{10,}\.[a-zA-Z0-9_-]{10,}\.[a-zA-Z0-9_-]{10,}\b")
                .expect("inline redaction regex"),
            INLINE_REDACTION,
        ),
        (
            Regex::new(r"\bghp_[A-Za-z0-9]{20,}\b").expect("inline redaction regex"),
            "ghp_***REDACTED***",
        ),
    ]
});

/// True for environment variable or field names that usually carry secrets.
pub fn is_sensitive_name(name: &str) -> bool {
    let normalized = name.trim().to_lowercase().replace('-', "_");
    if normalized.is_empty() {
        return false;
    }
    SENSITIVE_NAME_PARTS
        .iter()
        .any(|part| normalized.contains(part))
}

fn truncate_utf8(value: &str, max_bytes: usize) -> String {
    if value.len() <= max_bytes {
        return value.to_string();
    }
    let mut end = max_bytes;
    while end > 0 && !value.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &value[..end])
}

/// Masks bearer tokens, JWTs and any of `extra_secrets` in free text, then
/// caps the result at `max_bytes`.
pub fn redact_text(value: &str, max_bytes: usize, extra_secrets: &[&str]) -> String {
    let mut out = value.to_string();
    for (re, replacement) in INLINE_REDACTION_PATTERNS.iter() {
        if re.is_match(&out) {
            out = re.replace_all(&out, *replacement).to_string();
        }
    }
    for raw in extra_secrets {
        let needle = raw.trim();
        if needle.len() < 6 {
            continue;
        }
        out = out.replace(needle, INLINE_REDACTION);
    }
    truncate_utf8(&out, max_bytes)
}

fn redact_env_entry(entry: &Map<String, Value>) -> Map<String, Value> {
    let sensitive = entry
        .get("name")
        .and_then(Value::as_str)
        .map(is_sensitive_name)
        .unwrap_or(false);
    let mut out = entry.clone();
    if sensitive && out.get("value").map(|v| !v.is_null()).unwrap_or(false) {
        out.insert(
            "value".to_string(),
            Value::String(DEFAULT_REDACTION.to_string()),
        );
    }
    out
}

/// Copy of a service input safe to print: values of secret-looking `env`
/// entries are masked, everything else is kept as-is.
pub fn redact_service_input(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut out = Map::new();
            for (key, entry) in map {
                let redacted = match (key.as_str(), entry) {
                    ("env", Value::Array(items)) => Value::Array(
                        items
                            .iter()
                            .map(|item| match item {
                                Value::Object(obj) => Value::Object(redact_env_entry(obj)),
                                other => other.clone(),
                            })
                            .collect(),
                    ),
                    _ => redact_service_input(entry),
                };
                out.insert(key.clone(), redacted);
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.iter().map(redact_service_input).collect()),
        other => other.clone(),
    }
}
