//! Patch engine error types.

use thiserror::Error;

/// Why a patch could not be applied.
///
/// These are returned values, not failures: the calling shell renders them
/// back to the model as explicit error text so it can retry with a more
/// specific snippet.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PatchError {
    /// The original snippet matched more than one location. The engine
    /// never guesses between occurrences.
    #[error(
        "original snippet matches {occurrences} locations; add surrounding context to make it unique"
    )]
    AmbiguousMatch {
        /// Number of exact occurrences found.
        occurrences: usize,
    },
    /// No exact occurrence, and approximate matching was disabled or found
    /// nothing above the threshold.
    #[error("original snippet not found in the target content")]
    NoMatchFound,
    /// The original snippet was empty.
    #[error("original snippet must not be empty")]
    EmptySnippet,
    /// Original and replacement snippets are identical.
    #[error("original and replacement snippets are identical; no change would be made")]
    IdenticalSnippets,
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
