//! In-memory conversation history with token caching.
//!
//! [`ConversationHistory`] holds the message sequence for an active session
//! and maintains a parallel token-count cache so budget checks are O(n)
//! additions rather than repeated re-estimation. The sequence is
//! append-only; it is replaced wholesale only by an explicit reset (which
//! is how a truncated view is installed).

use strand_core::{FileContext, Message};
use strand_tokens::{BudgetReport, CostModel, estimate_history_with, estimate_message_tokens_with};

/// Append-only message store with per-message token caching.
#[derive(Clone, Debug, Default)]
pub struct ConversationHistory {
    messages: Vec<Message>,
    token_cache: Vec<u32>,
    cost: CostModel,
}

impl ConversationHistory {
    /// Create an empty history with the default cost model.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty history with an explicit cost model.
    #[must_use]
    pub fn with_cost_model(cost: CostModel) -> Self {
        Self {
            messages: Vec::new(),
            token_cache: Vec::new(),
            cost,
        }
    }

    /// Append a message.
    ///
    /// The token estimate is computed and cached immediately.
    pub fn append(&mut self, message: Message) {
        let tokens = estimate_message_tokens_with(&message, &self.cost);
        self.messages.push(message);
        self.token_cache.push(tokens);
    }

    /// Append a file-context message unless the same file state is already
    /// present.
    ///
    /// Duplicates are detected by source path and content hash. Returns
    /// `true` if the message was appended.
    pub fn append_file_context(&mut self, path: impl Into<String>, content: &str) -> bool {
        let tag = FileContext::for_content(path, content);
        if self.contains_file_context(&tag) {
            return false;
        }
        self.append(Message::System {
            content: content.to_owned(),
            file_context: Some(tag),
        });
        true
    }

    /// Whether a file-context entry with this path and content hash is
    /// already present.
    #[must_use]
    pub fn contains_file_context(&self, tag: &FileContext) -> bool {
        self.messages.iter().any(|m| {
            m.file_context_tag()
                .is_some_and(|t| t.path == tag.path && t.content_hash == tag.content_hash)
        })
    }

    /// Replace the entire sequence (explicit reset, e.g. installing a
    /// truncated view).
    ///
    /// The token cache is rebuilt for the new messages.
    pub fn reset_to(&mut self, messages: Vec<Message>) {
        self.token_cache = messages
            .iter()
            .map(|m| estimate_message_tokens_with(m, &self.cost))
            .collect();
        self.messages = messages;
    }

    /// Clear all messages.
    pub fn reset(&mut self) {
        self.messages.clear();
        self.token_cache.clear();
    }

    /// The message sequence (no allocation).
    #[must_use]
    pub fn as_slice(&self) -> &[Message] {
        &self.messages
    }

    /// Total cached token count.
    #[must_use]
    pub fn total_tokens(&self) -> u32 {
        self.token_cache.iter().copied().sum()
    }

    /// Cached token count for the message at `index`.
    #[must_use]
    pub fn cached_tokens(&self, index: usize) -> Option<u32> {
        self.token_cache.get(index).copied()
    }

    /// Full budget report with per-role breakdown (re-walks the history).
    #[must_use]
    pub fn report(&self) -> BudgetReport {
        estimate_history_with(&self.messages, &self.cost)
    }

    /// Message count.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns `true` if the history contains no messages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
