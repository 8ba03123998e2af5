//! # strand-context
//!
//! Conversation history management for the Strand agent.
//!
//! Three pieces:
//!
//! - [`history::ConversationHistory`] — append-only message store with a
//!   parallel per-message token cache and duplicate file-context detection.
//! - [`relation::ToolCallRelation`] — on-demand structural index pairing
//!   assistant tool invocations with the tool-role messages resolving them.
//! - [`truncator`] — rewrites a history to fit a token budget while
//!   preserving the system prompt, the most-recent anchor window, and
//!   tool-call/result atomicity.

#![deny(unsafe_code)]

pub mod history;
pub mod relation;
pub mod truncator;

pub use history::ConversationHistory;
pub use relation::ToolCallRelation;
pub use truncator::{TruncationLimits, TruncationOutcome, truncate};
