//! Settings type definitions with compiled defaults.
//!
//! Every tunable the context core consumes lives here: token limits,
//! health thresholds, the anchor window size, file-context caps, and
//! matcher thresholds. The constants are product tuning, not correctness —
//! components take them as explicit values so tests can pin them.

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Context settings
// ─────────────────────────────────────────────────────────────────────────────

/// Token budget and truncation settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContextSettings {
    /// Hard token ceiling for a model request.
    pub max_context_tokens: u32,
    /// Usage ratio at which health degrades to warning and truncation is
    /// triggered proactively.
    pub warning_threshold: f64,
    /// Usage ratio at which health degrades to critical.
    pub critical_threshold: f64,
    /// Most-recent messages always retained in full by the truncator.
    /// Sized so the active exchange, including an in-flight tool-call/result
    /// pair, is never split.
    pub anchor_recent_messages: usize,
    /// Maximum retained file-context entries; oldest beyond this drop first.
    pub max_file_context_entries: usize,
    /// Approximate characters per token for estimation.
    pub chars_per_token: u32,
    /// Fixed per-message framing overhead, in characters, on top of the
    /// role tag.
    pub frame_overhead_chars: u32,
}

impl Default for ContextSettings {
    fn default() -> Self {
        Self {
            max_context_tokens: 100_000,
            warning_threshold: 0.70,
            critical_threshold: 0.85,
            anchor_recent_messages: 4,
            max_file_context_entries: 8,
            chars_per_token: 4,
            frame_overhead_chars: 10,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Matching settings
// ─────────────────────────────────────────────────────────────────────────────

/// Approximate-matching settings shared by path resolution and the patch
/// engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MatchingSettings {
    /// Whether approximate snippet matching is available to the patch
    /// engine. When false, patching is exact-match only.
    pub fuzzy_enabled: bool,
    /// Minimum score for a path suggestion.
    pub min_path_score: f64,
    /// Minimum score for a snippet replacement. Stricter than the path
    /// threshold: a wrong silent edit costs more than a wrong suggestion.
    pub min_snippet_score: f64,
    /// Upper bound on window anchors scanned per snippet search; the scan
    /// stride grows past this so large files stay cheap.
    pub max_scan_anchors: usize,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            fuzzy_enabled: true,
            min_path_score: 0.60,
            min_snippet_score: 0.80,
            max_scan_anchors: 512,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Workspace settings
// ─────────────────────────────────────────────────────────────────────────────

/// Workspace-level settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkspaceSettings {
    /// Base directory that relative tool paths resolve against.
    pub base_directory: String,
}

impl Default for WorkspaceSettings {
    fn default() -> Self {
        Self {
            base_directory: ".".into(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Top-level settings
// ─────────────────────────────────────────────────────────────────────────────

/// Top-level Strand settings.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StrandSettings {
    /// Settings schema version.
    pub version: u32,
    /// Token budget and truncation settings.
    pub context: ContextSettings,
    /// Approximate-matching settings.
    pub matching: MatchingSettings,
    /// Workspace-level settings.
    pub workspace: WorkspaceSettings,
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_thresholds_are_ordered() {
        let ctx = ContextSettings::default();
        assert!(ctx.warning_threshold < ctx.critical_threshold);
        assert!(ctx.critical_threshold < 1.0);
    }

    #[test]
    fn snippet_threshold_stricter_than_path() {
        let m = MatchingSettings::default();
        assert!(m.min_snippet_score > m.min_path_score);
    }

    #[test]
    fn defaults_roundtrip_through_json() {
        let settings = StrandSettings::default();
        let json = serde_json::to_string(&settings).unwrap();
        let back: StrandSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(settings, back);
    }

    #[test]
    fn camel_case_wire_names() {
        let json = serde_json::to_value(StrandSettings::default()).unwrap();
        assert!(json["context"].get("maxContextTokens").is_some());
        assert!(json["matching"].get("minSnippetScore").is_some());
        assert!(json["workspace"].get("baseDirectory").is_some());
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let settings: StrandSettings =
            serde_json::from_str(r#"{"context": {"maxContextTokens": 200000}}"#).unwrap();
        assert_eq!(settings.context.max_context_tokens, 200_000);
        assert_eq!(
            settings.context.anchor_recent_messages,
            ContextSettings::default().anchor_recent_messages
        );
        assert_eq!(settings.matching, MatchingSettings::default());
    }

    #[test]
    fn fuzzy_enabled_by_default() {
        assert!(MatchingSettings::default().fuzzy_enabled);
    }
}
