//! Budget-driven history truncation.
//!
//! [`truncate`] rewrites a message sequence to fit a token budget while
//! preserving the structural invariants of the conversation. Keep-priority
//! order, highest first:
//!
//! 1. The system prompt (first message), retained verbatim.
//! 2. The most-recent anchor window, snapped backward so an in-flight
//!    tool-call/result exchange is never split.
//! 3. File-context entries, most-recent-first up to a configured cap;
//!    oldest file-context entries drop before any ordinary turn.
//! 4. Remaining budget filled newest→oldest with whole units — an assistant
//!    message carrying tool invocations and the tool-role messages that
//!    resolve them move together or not at all.
//! 5. If the protected content alone exceeds the budget, message content is
//!    clipped proportionally and the result is flagged `degraded`. The
//!    function never fails.
//!
//! The input is never modified; the output is a new list in strict
//! chronological order. A history already within budget is returned
//! unchanged, orphans and all.

use std::collections::HashSet;

use strand_core::Message;
use strand_settings::ContextSettings;
use strand_tokens::{
    CostModel, estimate_history_with, estimate_message_chars, estimate_message_tokens_with,
};
use tracing::{debug, trace, warn};

use crate::relation::ToolCallRelation;

// =============================================================================
// Limits and outcome
// =============================================================================

/// Immutable per-call truncation limits.
#[derive(Clone, Debug)]
pub struct TruncationLimits {
    /// Most-recent messages always retained in full.
    pub anchor_recent_messages: usize,
    /// Maximum retained file-context entries.
    pub max_file_context_entries: usize,
    /// Cost model used for all token math.
    pub cost: CostModel,
}

impl TruncationLimits {
    /// Build limits from context settings.
    #[must_use]
    pub fn from_settings(context: &ContextSettings) -> Self {
        Self {
            anchor_recent_messages: context.anchor_recent_messages,
            max_file_context_entries: context.max_file_context_entries,
            cost: CostModel::from_settings(context),
        }
    }
}

impl Default for TruncationLimits {
    fn default() -> Self {
        Self::from_settings(&ContextSettings::default())
    }
}

/// Result of a truncation pass.
#[derive(Clone, Debug)]
pub struct TruncationOutcome {
    /// The new message sequence, chronological.
    pub messages: Vec<Message>,
    /// True when the budget was unsatisfiable and content was clipped as a
    /// last resort.
    pub degraded: bool,
    /// Number of input messages not carried into the output.
    pub dropped: usize,
}

// =============================================================================
// Truncation
// =============================================================================

/// A droppable granule: a standalone message, or an assistant message plus
/// the tool-role messages resolving its invocations.
#[derive(Debug)]
struct Unit {
    indices: Vec<usize>,
    tokens: u32,
    newest: usize,
    is_file_context: bool,
}

/// Rewrite `history` to fit `budget_tokens`.
///
/// Pure transformation: the input is unmodified and the output is a new
/// list. See the module docs for the priority order.
#[must_use]
pub fn truncate(
    history: &[Message],
    budget_tokens: u32,
    limits: &TruncationLimits,
) -> TruncationOutcome {
    let total = estimate_history_with(history, &limits.cost).total;
    if total <= budget_tokens {
        // Within budget: the history is returned unchanged.
        return TruncationOutcome {
            messages: history.to_vec(),
            degraded: false,
            dropped: 0,
        };
    }

    let len = history.len();
    let relation = ToolCallRelation::build(history);
    let orphans: HashSet<usize> = relation.orphan_indices().iter().copied().collect();
    let tokens: Vec<u32> = history
        .iter()
        .map(|m| estimate_message_tokens_with(m, &limits.cost))
        .collect();

    // Rule 1: the system prompt is always retained.
    let head_end = 1;

    // Rule 2: anchor window, snapped backward so every tool result in the
    // window has its issuing assistant message in the window too.
    let window_start = snap_window_start(
        history,
        &relation,
        len.saturating_sub(limits.anchor_recent_messages).max(head_end),
        head_end,
    );

    let mut keep = vec![false; len];
    keep[0] = true;
    for index in window_start..len {
        keep[index] = !orphans.contains(&index);
    }

    // Rule 4 preparation: group the middle into atomic units. Incomplete
    // assistant invocations and orphan tool results are excluded outright.
    let units = build_units(history, &relation, &tokens, &orphans, head_end, window_start);

    let kept_tokens: u32 = (0..len).filter(|&i| keep[i]).map(|i| tokens[i]).sum();
    if kept_tokens > budget_tokens {
        // Rule 5: even the protected content does not fit.
        return degrade(history, &keep, budget_tokens, &limits.cost, len);
    }
    let budget_remaining = budget_tokens - kept_tokens;

    let mut alive = vec![true; units.len()];

    // Rule 3a: cap on file-context entries, most-recent-first. Entries in
    // the protected region count against the cap.
    let kept_file_contexts = (0..len)
        .filter(|&i| keep[i] && history[i].is_file_context())
        .count();
    let mut cap = limits
        .max_file_context_entries
        .saturating_sub(kept_file_contexts);
    let mut newest_first: Vec<usize> = (0..units.len())
        .filter(|&u| units[u].is_file_context)
        .collect();
    newest_first.sort_by_key(|&u| std::cmp::Reverse(units[u].newest));
    for &u in &newest_first {
        if cap > 0 {
            cap -= 1;
        } else {
            alive[u] = false;
            trace!(index = units[u].newest, "file-context entry over cap, dropping");
        }
    }

    // Rule 3b: while the surviving candidates overflow the budget, oldest
    // file-context entries go before any ordinary conversational turn.
    let mut candidate_total: u32 = (0..units.len())
        .filter(|&u| alive[u])
        .map(|u| units[u].tokens)
        .sum();
    while candidate_total > budget_remaining {
        let Some(oldest) = (0..units.len())
            .filter(|&u| alive[u] && units[u].is_file_context)
            .min_by_key(|&u| units[u].newest)
        else {
            break;
        };
        alive[oldest] = false;
        candidate_total -= units[oldest].tokens;
        trace!(index = units[oldest].newest, "budget overflow, dropping file-context entry");
    }

    // Rule 4: fill the remaining budget newest→oldest with whole units.
    if candidate_total > budget_remaining {
        let mut order: Vec<usize> = (0..units.len()).filter(|&u| alive[u]).collect();
        order.sort_by_key(|&u| std::cmp::Reverse(units[u].newest));
        let mut left = budget_remaining;
        for &u in &order {
            if units[u].tokens <= left {
                left -= units[u].tokens;
            } else {
                alive[u] = false;
            }
        }
    }

    for (u, unit) in units.iter().enumerate() {
        if alive[u] {
            for &index in &unit.indices {
                keep[index] = true;
            }
        }
    }

    // Reassemble chronologically regardless of selection order.
    let messages: Vec<Message> = (0..len)
        .filter(|&i| keep[i])
        .map(|i| history[i].clone())
        .collect();
    let dropped = len - messages.len();
    debug!(
        input = len,
        kept = messages.len(),
        dropped,
        budget = budget_tokens,
        "history truncated"
    );

    TruncationOutcome {
        messages,
        degraded: false,
        dropped,
    }
}

/// Move the anchor window start backward until every tool result inside it
/// has its issuing assistant message inside it as well.
fn snap_window_start(
    history: &[Message],
    relation: &ToolCallRelation,
    mut window_start: usize,
    head_end: usize,
) -> usize {
    loop {
        let mut new_start = window_start;
        for message in &history[window_start..] {
            if let Message::Tool { tool_call_id, .. } = message {
                if let Some(issuer) = relation.issuer_of(tool_call_id) {
                    if issuer >= head_end && issuer < new_start {
                        new_start = issuer;
                    }
                }
            }
        }
        if new_start == window_start {
            return window_start;
        }
        window_start = new_start;
    }
}

/// Group the droppable middle of the history into atomic units.
fn build_units(
    history: &[Message],
    relation: &ToolCallRelation,
    tokens: &[u32],
    orphans: &HashSet<usize>,
    head_end: usize,
    window_start: usize,
) -> Vec<Unit> {
    let mut units = Vec::new();
    let mut claimed = vec![false; history.len()];

    for index in head_end..window_start {
        if claimed[index] || orphans.contains(&index) {
            continue;
        }
        match &history[index] {
            Message::Assistant { tool_calls, .. } if !tool_calls.is_empty() => {
                let mut indices = vec![index];
                let mut complete = true;
                for call in tool_calls {
                    match relation.resolver_of(&call.id) {
                        Some(resolver) if resolver < window_start => indices.push(resolver),
                        // Resolver inside the anchor window is impossible
                        // once the window start is snapped to the issuer.
                        Some(_) => complete = false,
                        None => complete = false,
                    }
                }
                for &i in &indices {
                    claimed[i] = true;
                }
                if complete {
                    indices.sort_unstable();
                    let unit_tokens = indices.iter().map(|&i| tokens[i]).sum();
                    units.push(Unit {
                        newest: *indices.last().unwrap_or(&index),
                        tokens: unit_tokens,
                        indices,
                        is_file_context: false,
                    });
                } else {
                    trace!(index, "incomplete tool exchange excluded from truncated view");
                }
            }
            message => {
                // Non-orphan tool results reaching this arm were issued by
                // the always-kept first message; they stand alone safely.
                claimed[index] = true;
                units.push(Unit {
                    indices: vec![index],
                    tokens: tokens[index],
                    newest: index,
                    is_file_context: message.is_file_context(),
                });
            }
        }
    }

    units
}

/// Last resort: keep only the protected messages and clip their content
/// proportionally toward the character budget. Never fails.
fn degrade(
    history: &[Message],
    keep: &[bool],
    budget_tokens: u32,
    cost: &CostModel,
    input_len: usize,
) -> TruncationOutcome {
    let mut kept: Vec<Message> = (0..history.len())
        .filter(|&i| keep[i])
        .map(|i| history[i].clone())
        .collect();

    let chars_per_token = cost.chars_per_token.max(1) as usize;
    let budget_chars = budget_tokens as usize * chars_per_token;
    // One token of slack per message absorbs per-message ceil rounding.
    let margin = kept.len() * chars_per_token;
    let fixed_total: usize = kept
        .iter()
        .map(|m| estimate_message_chars(m, cost) - m.content().len())
        .sum::<usize>()
        + margin;

    let system_is_first = kept.first().is_some_and(Message::is_system);
    let system_chars = if system_is_first {
        kept[0].content().len()
    } else {
        0
    };

    let avail_non_system = budget_chars.saturating_sub(fixed_total + system_chars);
    if avail_non_system > 0 {
        // The system prompt survives verbatim; everything else shares the
        // remaining character budget.
        let clippable: Vec<usize> = (usize::from(system_is_first)..kept.len()).collect();
        scale_contents(&mut kept, &clippable, avail_non_system);
    } else {
        let clippable: Vec<usize> = (0..kept.len()).collect();
        scale_contents(&mut kept, &clippable, budget_chars.saturating_sub(fixed_total));
    }

    let dropped = input_len - kept.len();
    warn!(
        budget = budget_tokens,
        kept = kept.len(),
        dropped,
        "budget unsatisfiable, clipping retained content"
    );

    TruncationOutcome {
        messages: kept,
        degraded: true,
        dropped,
    }
}

/// Clip the content of `clippable` messages so their combined length fits
/// `avail` characters, scaling each proportionally.
fn scale_contents(messages: &mut [Message], clippable: &[usize], avail: usize) {
    let pool: usize = clippable.iter().map(|&i| messages[i].content().len()).sum();
    if pool <= avail || pool == 0 {
        return;
    }
    for &i in clippable {
        let length = messages[i].content().len();
        let allowed = length * avail / pool;
        if allowed < length {
            messages[i] = messages[i].with_clipped_content(allowed);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
