//! Settings loading with deep merge and environment variable overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`StrandSettings::default()`]
//! 2. If `~/.strand/settings.json` exists, deep-merge user values over
//!    defaults
//! 3. Apply environment variable overrides (highest priority)
//!
//! Deep merge rules:
//! - Objects are merged recursively (source overrides target per-key)
//! - Arrays and primitives are replaced entirely by source
//! - Null values in source are skipped (preserving target)

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::errors::Result;
use crate::types::StrandSettings;

/// Resolve the path to the settings file (`~/.strand/settings.json`).
pub fn settings_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".strand").join("settings.json")
}

/// Load settings from the default path with env var overrides.
pub fn load_settings() -> Result<StrandSettings> {
    load_settings_from_path(&settings_path())
}

/// Load settings from a specific path with env var overrides.
///
/// If the file does not exist, returns defaults. If the file contains
/// invalid JSON, returns an error.
pub fn load_settings_from_path(path: &Path) -> Result<StrandSettings> {
    let defaults = serde_json::to_value(StrandSettings::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path)?;
        let user: Value = serde_json::from_str(&content)?;
        deep_merge(defaults, user)
    } else {
        debug!(?path, "settings file not found, using defaults");
        defaults
    };

    let mut settings: StrandSettings = serde_json::from_value(merged)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Recursive deep merge of two JSON values.
///
/// - Objects are merged recursively (source overrides target per-key)
/// - Arrays and primitives are replaced entirely by source
/// - Null values in source are skipped (preserving target)
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let merged = if let Some(target_val) = target_map.remove(&key) {
                    deep_merge(target_val, source_val)
                } else {
                    source_val
                };
                let _ = target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

/// Apply environment variable overrides to loaded settings.
///
/// Each env var has strict parsing rules:
/// - Integers and floats must be valid and within the specified range
/// - Booleans accept: `true`/`1`/`yes`/`on` or `false`/`0`/`no`/`off`
/// - Invalid values are silently ignored (fall back to file/default)
pub fn apply_env_overrides(settings: &mut StrandSettings) {
    // ── Context settings ────────────────────────────────────────────
    if let Some(v) = read_env_u32("STRAND_MAX_CONTEXT_TOKENS", 1_000, 10_000_000) {
        settings.context.max_context_tokens = v;
    }
    if let Some(v) = read_env_f64("STRAND_WARNING_THRESHOLD", 0.0, 1.0) {
        settings.context.warning_threshold = v;
    }
    if let Some(v) = read_env_f64("STRAND_CRITICAL_THRESHOLD", 0.0, 1.0) {
        settings.context.critical_threshold = v;
    }
    if let Some(v) = read_env_usize("STRAND_ANCHOR_RECENT_MESSAGES", 1, 100) {
        settings.context.anchor_recent_messages = v;
    }
    if let Some(v) = read_env_usize("STRAND_MAX_FILE_CONTEXT_ENTRIES", 0, 1_000) {
        settings.context.max_file_context_entries = v;
    }

    // ── Matching settings ───────────────────────────────────────────
    if let Some(v) = read_env_bool("STRAND_FUZZY_ENABLED") {
        settings.matching.fuzzy_enabled = v;
    }
    if let Some(v) = read_env_f64("STRAND_MIN_PATH_SCORE", 0.0, 1.0) {
        settings.matching.min_path_score = v;
    }
    if let Some(v) = read_env_f64("STRAND_MIN_SNIPPET_SCORE", 0.0, 1.0) {
        settings.matching.min_snippet_score = v;
    }

    // ── Workspace settings ──────────────────────────────────────────
    if let Some(v) = read_env_string("STRAND_BASE_DIRECTORY") {
        settings.workspace.base_directory = v;
    }
}

// ── Pure parsing functions (testable without env vars) ──────────────────────

/// Parse a string as a boolean.
///
/// Accepts (case-insensitive): `true`/`1`/`yes`/`on` or `false`/`0`/`no`/`off`.
pub fn parse_bool(val: &str) -> Option<bool> {
    match val.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parse a string as a `u32` within a range.
pub fn parse_u32_range(val: &str, min: u32, max: u32) -> Option<u32> {
    let n: u32 = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

/// Parse a string as a `usize` within a range.
pub fn parse_usize_range(val: &str, min: usize, max: usize) -> Option<usize> {
    let n: usize = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

/// Parse a string as an `f64` within a range.
pub fn parse_f64_range(val: &str, min: f64, max: f64) -> Option<f64> {
    let n: f64 = val.parse().ok()?;
    (n.is_finite() && n >= min && n <= max).then_some(n)
}

// ── Env var readers (thin wrappers) ─────────────────────────────────────────

fn read_env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn read_env_bool(name: &str) -> Option<bool> {
    let val = std::env::var(name).ok()?;
    let result = parse_bool(&val);
    if result.is_none() {
        tracing::warn!(key = name, value = %val, "invalid boolean env var, ignoring");
    }
    result
}

fn read_env_u32(name: &str, min: u32, max: u32) -> Option<u32> {
    let val = std::env::var(name).ok()?;
    let result = parse_u32_range(&val, min, max);
    if result.is_none() {
        tracing::warn!(key = name, value = %val, "invalid u32 env var, ignoring");
    }
    result
}

fn read_env_usize(name: &str, min: usize, max: usize) -> Option<usize> {
    let val = std::env::var(name).ok()?;
    let result = parse_usize_range(&val, min, max);
    if result.is_none() {
        tracing::warn!(key = name, value = %val, "invalid usize env var, ignoring");
    }
    result
}

fn read_env_f64(name: &str, min: f64, max: f64) -> Option<f64> {
    let val = std::env::var(name).ok()?;
    let result = parse_f64_range(&val, min, max);
    if result.is_none() {
        tracing::warn!(key = name, value = %val, "invalid f64 env var, ignoring");
    }
    result
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::SettingsError;

    // ── deep_merge ──────────────────────────────────────────────────

    #[test]
    fn merge_simple_override() {
        let target = serde_json::json!({"a": 1, "b": 2});
        let source = serde_json::json!({"a": 10});
        let merged = deep_merge(target, source);
        assert_eq!(merged["a"], 10);
        assert_eq!(merged["b"], 2);
    }

    #[test]
    fn merge_nested_override() {
        let target = serde_json::json!({
            "context": {"maxContextTokens": 100_000, "warningThreshold": 0.7}
        });
        let source = serde_json::json!({
            "context": {"maxContextTokens": 50_000}
        });
        let merged = deep_merge(target, source);
        assert_eq!(merged["context"]["maxContextTokens"], 50_000);
        assert_eq!(merged["context"]["warningThreshold"], 0.7);
    }

    #[test]
    fn merge_array_replace() {
        let target = serde_json::json!({"items": [1, 2, 3]});
        let source = serde_json::json!({"items": [4, 5]});
        let merged = deep_merge(target, source);
        assert_eq!(merged["items"], serde_json::json!([4, 5]));
    }

    #[test]
    fn merge_null_preserves_target() {
        let target = serde_json::json!({"a": 1, "b": 2});
        let source = serde_json::json!({"a": null});
        let merged = deep_merge(target, source);
        assert_eq!(merged["a"], 1);
        assert_eq!(merged["b"], 2);
    }

    #[test]
    fn merge_new_keys_added() {
        let target = serde_json::json!({"a": 1});
        let source = serde_json::json!({"b": 2});
        let merged = deep_merge(target, source);
        assert_eq!(merged["a"], 1);
        assert_eq!(merged["b"], 2);
    }

    #[test]
    fn merge_primitive_replaces_object() {
        let target = serde_json::json!({"a": {"nested": true}});
        let source = serde_json::json!({"a": 42});
        let merged = deep_merge(target, source);
        assert_eq!(merged["a"], 42);
    }

    #[test]
    fn merge_empty_source() {
        let target = serde_json::json!({"a": 1, "b": {"c": 2}});
        let source = serde_json::json!({});
        let merged = deep_merge(target.clone(), source);
        assert_eq!(merged, target);
    }

    // ── load_settings_from_path ─────────────────────────────────────

    #[test]
    fn load_missing_file_returns_defaults() {
        let path = Path::new("/nonexistent/settings.json");
        let settings = load_settings_from_path(path).unwrap();
        let defaults = StrandSettings::default();
        assert_eq!(settings.version, defaults.version);
        assert_eq!(
            settings.context.max_context_tokens,
            defaults.context.max_context_tokens
        );
    }

    #[test]
    fn load_empty_json_returns_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{}").unwrap();

        let settings = load_settings_from_path(&path).unwrap();
        assert_eq!(settings.matching, StrandSettings::default().matching);
    }

    #[test]
    fn load_partial_json_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{"context": {"maxContextTokens": 200000}, "matching": {"fuzzyEnabled": false}}"#,
        )
        .unwrap();

        let settings = load_settings_from_path(&path).unwrap();
        assert_eq!(settings.context.max_context_tokens, 200_000);
        assert!(!settings.matching.fuzzy_enabled);
        // Untouched values keep their defaults
        assert_eq!(settings.context.anchor_recent_messages, 4);
        assert!((settings.matching.min_snippet_score - 0.80).abs() < f64::EPSILON);
    }

    #[test]
    fn load_invalid_json_returns_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "not valid json").unwrap();

        let result = load_settings_from_path(&path);
        assert!(result.is_err());
        assert!(matches!(result.unwrap_err(), SettingsError::Json(_)));
    }

    // ── parse_bool ──────────────────────────────────────────────────

    #[test]
    fn parse_bool_true_variants() {
        for val in &["true", "1", "yes", "on", "TRUE", "Yes", "ON"] {
            assert_eq!(parse_bool(val), Some(true), "failed for {val}");
        }
    }

    #[test]
    fn parse_bool_false_variants() {
        for val in &["false", "0", "no", "off", "FALSE", "No", "OFF"] {
            assert_eq!(parse_bool(val), Some(false), "failed for {val}");
        }
    }

    #[test]
    fn parse_bool_invalid() {
        assert_eq!(parse_bool("maybe"), None);
        assert_eq!(parse_bool(""), None);
        assert_eq!(parse_bool("2"), None);
    }

    // ── parse_u32_range ─────────────────────────────────────────────

    #[test]
    fn parse_u32_valid() {
        assert_eq!(parse_u32_range("100000", 1_000, 10_000_000), Some(100_000));
        assert_eq!(parse_u32_range("1000", 1_000, 10_000_000), Some(1_000));
    }

    #[test]
    fn parse_u32_out_of_range() {
        assert_eq!(parse_u32_range("999", 1_000, 10_000_000), None);
        assert_eq!(parse_u32_range("10000001", 1_000, 10_000_000), None);
    }

    #[test]
    fn parse_u32_invalid() {
        assert_eq!(parse_u32_range("not_a_number", 1, 100), None);
        assert_eq!(parse_u32_range("", 1, 100), None);
    }

    // ── parse_usize_range ───────────────────────────────────────────

    #[test]
    fn parse_usize_valid() {
        assert_eq!(parse_usize_range("8", 0, 1_000), Some(8));
    }

    #[test]
    fn parse_usize_out_of_range() {
        assert_eq!(parse_usize_range("2000", 0, 1_000), None);
    }

    // ── parse_f64_range ─────────────────────────────────────────────

    #[test]
    fn parse_f64_valid() {
        assert_eq!(parse_f64_range("0.85", 0.0, 1.0), Some(0.85));
        assert_eq!(parse_f64_range("0", 0.0, 1.0), Some(0.0));
        assert_eq!(parse_f64_range("1", 0.0, 1.0), Some(1.0));
    }

    #[test]
    fn parse_f64_out_of_range() {
        assert_eq!(parse_f64_range("1.5", 0.0, 1.0), None);
        assert_eq!(parse_f64_range("-0.1", 0.0, 1.0), None);
    }

    #[test]
    fn parse_f64_rejects_non_finite() {
        assert_eq!(parse_f64_range("NaN", 0.0, 1.0), None);
        assert_eq!(parse_f64_range("inf", 0.0, 1.0), None);
    }

    #[test]
    fn parse_f64_invalid() {
        assert_eq!(parse_f64_range("threshold", 0.0, 1.0), None);
    }
}
