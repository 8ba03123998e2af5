//! Patch application — exact string replacement with approximate fallback.
//!
//! Finds the original snippet in the target content and replaces it.
//! Exactly one exact occurrence is required; multiple occurrences are
//! refused rather than guessed at. When no exact occurrence exists and
//! approximate matching is enabled, the best content window at or above the
//! snippet threshold is replaced instead, and the result is flagged so
//! callers can log or confirm the inexact edit.
//!
//! The engine returns new content only; reading, writing, and any
//! diff-review step belong to the caller.

use similar::TextDiff;
use strand_settings::MatchingSettings;
use tracing::{debug, trace};

use crate::errors::PatchError;
use crate::matcher::best_snippet;

// ─────────────────────────────────────────────────────────────────────────────
// Outcome
// ─────────────────────────────────────────────────────────────────────────────

/// How the original snippet was located.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MatchKind {
    /// Unique exact substring match.
    Exact,
    /// Approximate window match at or above the configured threshold.
    Approximate {
        /// Similarity score of the replaced window.
        score: f64,
    },
}

/// A successfully applied patch.
#[derive(Clone, Debug, PartialEq)]
pub struct PatchOutcome {
    /// The full new content.
    pub content: String,
    /// Whether the match was exact or approximate.
    pub kind: MatchKind,
}

impl PatchOutcome {
    /// Returns `true` if the snippet was located approximately.
    #[must_use]
    pub fn is_approximate(&self) -> bool {
        matches!(self.kind, MatchKind::Approximate { .. })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Application
// ─────────────────────────────────────────────────────────────────────────────

/// Apply a targeted replacement to `content`.
///
/// 1. Exact, case-sensitive substring search for `original_snippet`.
///    Exactly one occurrence replaces and succeeds; more than one fails
///    with [`PatchError::AmbiguousMatch`].
/// 2. No exact occurrence and `fuzzy_enabled` → snippet-mode approximate
///    match; the best window at or above `min_score` is replaced and the
///    outcome flagged [`MatchKind::Approximate`].
/// 3. Otherwise [`PatchError::NoMatchFound`].
pub fn apply_patch(
    content: &str,
    original_snippet: &str,
    new_snippet: &str,
    fuzzy_enabled: bool,
    min_score: f64,
) -> Result<PatchOutcome, PatchError> {
    apply(
        content,
        original_snippet,
        new_snippet,
        fuzzy_enabled,
        min_score,
        MatchingSettings::default().max_scan_anchors,
    )
}

/// [`apply_patch`] driven entirely by [`MatchingSettings`].
pub fn apply_patch_with(
    content: &str,
    original_snippet: &str,
    new_snippet: &str,
    matching: &MatchingSettings,
) -> Result<PatchOutcome, PatchError> {
    apply(
        content,
        original_snippet,
        new_snippet,
        matching.fuzzy_enabled,
        matching.min_snippet_score,
        matching.max_scan_anchors,
    )
}

fn apply(
    content: &str,
    original_snippet: &str,
    new_snippet: &str,
    fuzzy_enabled: bool,
    min_score: f64,
    max_scan_anchors: usize,
) -> Result<PatchOutcome, PatchError> {
    if original_snippet.is_empty() {
        return Err(PatchError::EmptySnippet);
    }
    if original_snippet == new_snippet {
        return Err(PatchError::IdenticalSnippets);
    }

    let occurrences = content.matches(original_snippet).count();
    match occurrences {
        1 => {
            trace!(snippet_len = original_snippet.len(), "exact patch applied");
            return Ok(PatchOutcome {
                content: content.replacen(original_snippet, new_snippet, 1),
                kind: MatchKind::Exact,
            });
        }
        0 => {}
        many => return Err(PatchError::AmbiguousMatch { occurrences: many }),
    }

    if !fuzzy_enabled {
        return Err(PatchError::NoMatchFound);
    }

    let Some(window) = best_snippet(original_snippet, content, min_score, max_scan_anchors) else {
        return Err(PatchError::NoMatchFound);
    };

    debug!(
        start = window.start,
        end = window.end,
        score = window.score,
        "approximate patch applied"
    );
    let mut patched = String::with_capacity(content.len() + new_snippet.len());
    patched.push_str(&content[..window.start]);
    patched.push_str(new_snippet);
    patched.push_str(&content[window.end..]);
    Ok(PatchOutcome {
        content: patched,
        kind: MatchKind::Approximate {
            score: window.score,
        },
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Diff rendering
// ─────────────────────────────────────────────────────────────────────────────

/// Render a unified diff of a patch for the caller's confirmation or log
/// output.
#[must_use]
pub fn unified_diff(old: &str, new: &str) -> String {
    TextDiff::from_lines(old, new)
        .unified_diff()
        .context_radius(3)
        .to_string()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
