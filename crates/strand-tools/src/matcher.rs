//! Approximate text matching.
//!
//! Shared by path resolution and the patch engine. Scores are normalized
//! edit similarity in `[0, 1]` computed from character-level diffs.
//!
//! Two modes:
//!
//! - **path mode** — candidates are file paths; the basename dominates the
//!   score, and ties break toward shallower paths.
//! - **snippet mode** — candidates are windows of file content the length
//!   of the query, anchored at line starts. The scan stride grows once a
//!   file exceeds the anchor budget, so cost stays bounded on large files;
//!   this is an approximation, not an exhaustive search.
//!
//! A candidate scoring exactly the minimum threshold is accepted.

use std::path::Path;

use similar::TextDiff;

/// Weight of basename similarity in path-mode scoring; the remainder goes
/// to the full path.
const BASENAME_WEIGHT: f64 = 0.7;

/// Score comparisons within this distance count as ties.
const SCORE_EPSILON: f64 = 1e-9;

// ─────────────────────────────────────────────────────────────────────────────
// Similarity
// ─────────────────────────────────────────────────────────────────────────────

/// Normalized edit similarity of two strings in `[0, 1]`.
///
/// 1.0 means identical; 0.0 means nothing in common.
#[must_use]
pub fn similarity(a: &str, b: &str) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    f64::from(TextDiff::from_chars(a, b).ratio())
}

// ─────────────────────────────────────────────────────────────────────────────
// Path mode
// ─────────────────────────────────────────────────────────────────────────────

/// A path candidate accepted by [`best_path`] or [`resolve_path`].
#[derive(Clone, Debug, PartialEq)]
pub struct PathMatch {
    /// The matched candidate path, as given.
    pub path: String,
    /// Similarity score in `[0, 1]`.
    pub score: f64,
}

fn basename(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

fn depth(path: &str) -> usize {
    path.matches(['/', '\\']).count()
}

/// Score a path candidate against a query.
///
/// Basename similarity dominates; the full path contributes the rest so
/// that directory hints in the query still matter.
#[must_use]
pub fn score_path(query: &str, candidate: &str) -> f64 {
    let base = similarity(basename(query), basename(candidate));
    let full = similarity(query, candidate);
    BASENAME_WEIGHT * base + (1.0 - BASENAME_WEIGHT) * full
}

/// Best path candidate at or above `min_score`.
///
/// Ties break toward shallower paths, then toward the earlier candidate.
#[must_use]
pub fn best_path(query: &str, candidates: &[String], min_score: f64) -> Option<PathMatch> {
    let mut best: Option<(f64, usize, &String)> = None;
    for candidate in candidates {
        let score = score_path(query, candidate);
        let candidate_depth = depth(candidate);
        let better = match &best {
            None => true,
            Some((best_score, best_depth, _)) => {
                score > best_score + SCORE_EPSILON
                    || ((score - best_score).abs() <= SCORE_EPSILON
                        && candidate_depth < *best_depth)
            }
        };
        if better {
            best = Some((score, candidate_depth, candidate));
        }
    }
    best.filter(|(score, _, _)| *score >= min_score)
        .map(|(score, _, path)| PathMatch {
            path: path.clone(),
            score,
        })
}

/// Resolve a possibly-misspelled path query against candidate paths.
///
/// Candidates under `root_dir` are scored on their root-relative form so a
/// deep workspace prefix does not drown the basename signal; the returned
/// match keeps the candidate exactly as given.
#[must_use]
pub fn resolve_path(
    query: &str,
    root_dir: &Path,
    candidates: &[String],
    min_score: f64,
) -> Option<PathMatch> {
    let root = root_dir.to_string_lossy();
    let relative: Vec<String> = candidates
        .iter()
        .map(|c| {
            c.strip_prefix(root.as_ref())
                .map_or_else(|| c.clone(), |s| s.trim_start_matches('/').to_owned())
        })
        .collect();
    let found = best_path(query, &relative, min_score)?;
    let index = relative.iter().position(|c| *c == found.path)?;
    Some(PathMatch {
        path: candidates[index].clone(),
        score: found.score,
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Snippet mode
// ─────────────────────────────────────────────────────────────────────────────

/// A content window accepted by [`best_snippet`].
#[derive(Clone, Debug, PartialEq)]
pub struct SnippetMatch {
    /// Byte offset of the window start.
    pub start: usize,
    /// Byte offset one past the window end.
    pub end: usize,
    /// Similarity score in `[0, 1]`.
    pub score: f64,
}

/// Walk an index back to the nearest char boundary.
fn floor_char_boundary(s: &str, mut index: usize) -> usize {
    if index >= s.len() {
        return s.len();
    }
    while !s.is_char_boundary(index) {
        index -= 1;
    }
    index
}

/// Best window of `content` matching `query`, at or above `min_score`.
///
/// Windows are `query.len()` bytes long and anchored at line starts. At
/// most `max_scan_anchors` anchors are scored; beyond that the stride
/// widens, trading recall for bounded cost. Earlier windows win ties.
#[must_use]
pub fn best_snippet(
    query: &str,
    content: &str,
    min_score: f64,
    max_scan_anchors: usize,
) -> Option<SnippetMatch> {
    if query.is_empty() || content.is_empty() {
        return None;
    }

    // Line-start anchors: offset 0 plus every position after a newline.
    let mut anchors = vec![0usize];
    anchors.extend(
        content
            .char_indices()
            .filter(|&(_, c)| c == '\n')
            .map(|(i, _)| i + 1)
            .filter(|&i| i < content.len()),
    );

    let stride = anchors.len().div_ceil(max_scan_anchors.max(1)).max(1);

    let mut best: Option<SnippetMatch> = None;
    for &start in anchors.iter().step_by(stride) {
        let end = floor_char_boundary(content, start + query.len());
        if end <= start {
            continue;
        }
        let score = similarity(query, &content[start..end]);
        let better = best
            .as_ref()
            .is_none_or(|b| score > b.score + SCORE_EPSILON);
        if better {
            best = Some(SnippetMatch { start, end, score });
        }
    }

    best.filter(|m| m.score >= min_score)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
