//! # strand-tools
//!
//! The tool-facing half of the Strand context core:
//!
//! - [`validator`] — structural validation of model-issued tool calls
//!   before dispatch; invalid calls become explicit error tool results,
//!   never silent successes.
//! - [`matcher`] — approximate text matching shared by path resolution and
//!   the patch engine: path mode weights basename similarity, snippet mode
//!   scores bounded content windows by normalized edit similarity.
//! - [`patch`] — targeted text replacement: exact match first, approximate
//!   fallback behind a capability flag, ambiguity refused outright.
//!
//! Everything here is pure and synchronous; file persistence and
//! confirmation flows belong to the caller.

#![deny(unsafe_code)]

pub mod errors;
pub mod matcher;
pub mod patch;
pub mod validator;

pub use errors::PatchError;
pub use matcher::{PathMatch, SnippetMatch, best_path, best_snippet, resolve_path, similarity};
pub use patch::{MatchKind, PatchOutcome, apply_patch, apply_patch_with, unified_diff};
pub use validator::{ValidationOutcome, ValidationRejection, validate_tool_calls};
