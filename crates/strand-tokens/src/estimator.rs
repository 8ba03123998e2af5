//! Token estimation.
//!
//! Pure functions for estimating token counts from messages. Uses a chars/4
//! approximation plus a fixed per-message framing overhead on top of the
//! role tag, approximating the wire-format cost of message structure.
//!
//! Tool-call arguments are counted at their serialized length; arguments
//! that fail to serialize count as zero-length rather than failing the
//! estimate.

use serde::{Deserialize, Serialize};
use strand_core::Message;
use strand_settings::ContextSettings;

// ─────────────────────────────────────────────────────────────────────────────
// Cost model
// ─────────────────────────────────────────────────────────────────────────────

/// Tunable constants for the character-count approximation.
///
/// These are product tuning, not correctness: any positive values keep the
/// estimator strictly monotonic, since the role tag plus framing overhead
/// guarantee at least one token per message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostModel {
    /// Approximate characters per token.
    pub chars_per_token: u32,
    /// Fixed per-message framing overhead in characters, on top of the
    /// role tag.
    pub frame_overhead_chars: u32,
}

impl Default for CostModel {
    fn default() -> Self {
        Self {
            chars_per_token: 4,
            frame_overhead_chars: 10,
        }
    }
}

impl CostModel {
    /// Build a cost model from context settings.
    #[must_use]
    pub fn from_settings(context: &ContextSettings) -> Self {
        Self {
            chars_per_token: context.chars_per_token.max(1),
            frame_overhead_chars: context.frame_overhead_chars,
        }
    }

    /// Convert a character count to tokens, rounding up.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn chars_to_tokens(&self, chars: usize) -> u32 {
        chars.div_ceil(self.chars_per_token.max(1) as usize) as u32
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Budget report
// ─────────────────────────────────────────────────────────────────────────────

/// Per-role token breakdown.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleBreakdown {
    /// Tokens attributed to system messages (file context included).
    pub system: u32,
    /// Tokens attributed to user messages.
    pub user: u32,
    /// Tokens attributed to assistant messages (tool calls included).
    pub assistant: u32,
    /// Tokens attributed to tool result messages.
    pub tool: u32,
}

/// Estimated token cost of a message history.
///
/// Transient: computed per turn and never persisted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetReport {
    /// Total estimated tokens.
    pub total: u32,
    /// Breakdown by message role.
    pub per_role: RoleBreakdown,
}

// ─────────────────────────────────────────────────────────────────────────────
// Estimation
// ─────────────────────────────────────────────────────────────────────────────

/// Estimate character count for a single message, framing included.
///
/// This is the raw quantity behind [`estimate_message_tokens_with`]; the
/// truncator uses it to apportion character budgets when clipping content.
#[must_use]
pub fn estimate_message_chars(message: &Message, model: &CostModel) -> usize {
    let mut chars = message.role().len() + model.frame_overhead_chars as usize;
    chars += message.content().len();

    match message {
        Message::Assistant { tool_calls, .. } => {
            for call in tool_calls {
                chars += call.id.len() + call.name.len();
                // Zero-length fallback keeps degenerate arguments from
                // failing the estimate.
                chars += serde_json::to_string(&call.arguments).map_or(0, |s| s.len());
            }
        }
        Message::Tool {
            tool_call_id, name, ..
        } => {
            chars += tool_call_id.len() + name.len();
        }
        Message::System { .. } | Message::User { .. } => {}
    }

    chars
}

/// Estimate tokens for a single message with an explicit cost model.
#[must_use]
pub fn estimate_message_tokens_with(message: &Message, model: &CostModel) -> u32 {
    model.chars_to_tokens(estimate_message_chars(message, model))
}

/// Estimate tokens for a single message with the default cost model.
#[must_use]
pub fn estimate_message_tokens(message: &Message) -> u32 {
    estimate_message_tokens_with(message, &CostModel::default())
}

/// Estimate the token cost of a history with an explicit cost model,
/// broken down by role.
#[must_use]
pub fn estimate_history_with(history: &[Message], model: &CostModel) -> BudgetReport {
    let mut report = BudgetReport::default();
    for message in history {
        let tokens = estimate_message_tokens_with(message, model);
        report.total += tokens;
        match message {
            Message::System { .. } => report.per_role.system += tokens,
            Message::User { .. } => report.per_role.user += tokens,
            Message::Assistant { .. } => report.per_role.assistant += tokens,
            Message::Tool { .. } => report.per_role.tool += tokens,
        }
    }
    report
}

/// Estimate the token cost of a history with the default cost model.
#[must_use]
pub fn estimate_history(history: &[Message]) -> BudgetReport {
    estimate_history_with(history, &CostModel::default())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
