//! Tool-call pairing as an explicit relation.
//!
//! The conversation invariants hinge on pairing: every tool-role message
//! must reference an invocation issued by an earlier assistant message, and
//! every invocation is resolved by at most one tool-role message. Rather
//! than tracking "pending" calls with ad hoc flags, the relation is built
//! on demand from the message list and queried structurally.

use std::collections::HashMap;

use strand_core::Message;

/// Index pairing tool invocation ids with the messages that issue and
/// resolve them.
///
/// Built from a message slice; indices refer to positions in that slice.
#[derive(Clone, Debug, Default)]
pub struct ToolCallRelation {
    /// Invocation id → index of the assistant message that issued it.
    issuers: HashMap<String, usize>,
    /// Invocation id → index of the tool-role message that resolved it.
    resolvers: HashMap<String, usize>,
    /// Indices of tool-role messages with no matching issued invocation.
    orphans: Vec<usize>,
}

impl ToolCallRelation {
    /// Build the relation for a message slice.
    ///
    /// A tool-role message only counts as a resolver when an assistant
    /// message at a lower index issued its id; otherwise it is an orphan.
    /// If several tool messages claim the same id, the first wins and the
    /// rest are orphans.
    #[must_use]
    pub fn build(messages: &[Message]) -> Self {
        let mut relation = Self::default();

        for (index, message) in messages.iter().enumerate() {
            match message {
                Message::Assistant { tool_calls, .. } => {
                    for call in tool_calls {
                        let _ = relation.issuers.entry(call.id.clone()).or_insert(index);
                    }
                }
                Message::Tool { tool_call_id, .. } => {
                    let issued_earlier = relation
                        .issuers
                        .get(tool_call_id)
                        .is_some_and(|&issuer| issuer < index);
                    if issued_earlier && !relation.resolvers.contains_key(tool_call_id) {
                        let _ = relation.resolvers.insert(tool_call_id.clone(), index);
                    } else {
                        relation.orphans.push(index);
                    }
                }
                Message::System { .. } | Message::User { .. } => {}
            }
        }

        relation
    }

    /// Index of the assistant message that issued this invocation id.
    #[must_use]
    pub fn issuer_of(&self, id: &str) -> Option<usize> {
        self.issuers.get(id).copied()
    }

    /// Index of the tool-role message that resolved this invocation id.
    #[must_use]
    pub fn resolver_of(&self, id: &str) -> Option<usize> {
        self.resolvers.get(id).copied()
    }

    /// Whether this invocation id has been resolved.
    #[must_use]
    pub fn is_resolved(&self, id: &str) -> bool {
        self.resolvers.contains_key(id)
    }

    /// Indices of tool-role messages with no matching invocation.
    #[must_use]
    pub fn orphan_indices(&self) -> &[usize] {
        &self.orphans
    }

    /// Ids issued but not yet resolved, in no particular order.
    #[must_use]
    pub fn pending_ids(&self) -> Vec<&str> {
        self.issuers
            .keys()
            .filter(|id| !self.resolvers.contains_key(*id))
            .map(String::as_str)
            .collect()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
