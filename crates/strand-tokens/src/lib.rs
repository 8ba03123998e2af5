//! # strand-tokens
//!
//! Token estimation and context budget health for the Strand agent.
//!
//! Two pieces:
//!
//! 1. **Estimator** — pure character-count approximation of a history's
//!    wire-format token cost, with a per-role breakdown. Strictly monotonic:
//!    appending any message increases the total.
//! 2. **Budget monitor** — turns a total against configured limits into a
//!    usage percentage and an ok/warning/critical health tier, and says when
//!    truncation should run proactively.
//!
//! Both are deterministic functions of their inputs; nothing here performs
//! I/O or holds state.

#![deny(unsafe_code)]

pub mod budget;
pub mod estimator;

pub use budget::{BudgetStatus, HealthTier, assess};
pub use estimator::{
    BudgetReport, CostModel, RoleBreakdown, estimate_history, estimate_history_with,
    estimate_message_chars, estimate_message_tokens, estimate_message_tokens_with,
};
