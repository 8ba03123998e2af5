//! Message types for the Strand conversation model.
//!
//! Messages form the conversation history passed to the model client.
//! Four roles: system, user, assistant, and tool result. The history is
//! append-only; truncation produces a new list rather than editing in place.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

// ─────────────────────────────────────────────────────────────────────────────
// Tool invocation
// ─────────────────────────────────────────────────────────────────────────────

/// A validated tool invocation emitted by the assistant.
///
/// Produced by the tool-call validator from a [`crate::tools::RawToolCall`].
/// The id is unique within a conversation; every invocation is eventually
/// resolved by exactly one tool-role message carrying the same id.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolInvocation {
    /// Unique tool call ID.
    pub id: String,
    /// Tool name.
    pub name: String,
    /// Tool arguments (JSON object).
    pub arguments: Map<String, Value>,
}

// ─────────────────────────────────────────────────────────────────────────────
// File context tag
// ─────────────────────────────────────────────────────────────────────────────

/// Provenance tag for a system message that injects file content.
///
/// The hash and size let the history skip duplicate insertions of the same
/// file state without comparing full content.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileContext {
    /// Source path the content was read from.
    pub path: String,
    /// Hex-encoded SHA-256 of the injected content.
    pub content_hash: String,
    /// Content length in bytes.
    pub size_bytes: u64,
}

impl FileContext {
    /// Build a tag for the given path and content.
    #[must_use]
    pub fn for_content(path: impl Into<String>, content: &str) -> Self {
        let digest = Sha256::digest(content.as_bytes());
        Self {
            path: path.into(),
            content_hash: format!("{digest:x}"),
            size_bytes: content.len() as u64,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Message
// ─────────────────────────────────────────────────────────────────────────────

/// A conversation message (discriminated by `role`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role")]
pub enum Message {
    /// System message. The first message of a history is the system prompt;
    /// later system messages carry injected context such as file snippets.
    #[serde(rename = "system")]
    System {
        /// Message content.
        content: String,
        /// Present when this message injects file content.
        #[serde(rename = "fileContext", skip_serializing_if = "Option::is_none")]
        file_context: Option<FileContext>,
    },
    /// User message.
    #[serde(rename = "user")]
    User {
        /// Message content.
        content: String,
    },
    /// Assistant message, optionally carrying tool invocations.
    #[serde(rename = "assistant")]
    Assistant {
        /// Message content (may be empty when the reply is tool calls only).
        content: String,
        /// Tool invocations issued by this message, in dispatch order.
        #[serde(rename = "toolCalls", default, skip_serializing_if = "Vec::is_empty")]
        tool_calls: Vec<ToolInvocation>,
    },
    /// Tool result message resolving one assistant invocation.
    #[serde(rename = "tool")]
    Tool {
        /// ID of the invocation this result resolves.
        #[serde(rename = "toolCallId")]
        tool_call_id: String,
        /// Tool name, echoed for the model's benefit.
        name: String,
        /// Result content.
        content: String,
        /// Whether the tool execution errored.
        #[serde(rename = "isError", skip_serializing_if = "Option::is_none")]
        is_error: Option<bool>,
    },
}

impl Message {
    /// Create a system message.
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self::System {
            content: content.into(),
            file_context: None,
        }
    }

    /// Create a system message injecting file content, tagged for
    /// duplicate detection.
    #[must_use]
    pub fn file_context(path: impl Into<String>, content: impl Into<String>) -> Self {
        let content = content.into();
        let tag = FileContext::for_content(path, &content);
        Self::System {
            content,
            file_context: Some(tag),
        }
    }

    /// Create a user message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::User {
            content: content.into(),
        }
    }

    /// Create an assistant message with no tool calls.
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::Assistant {
            content: content.into(),
            tool_calls: Vec::new(),
        }
    }

    /// Create an assistant message carrying tool invocations.
    #[must_use]
    pub fn assistant_with_calls(
        content: impl Into<String>,
        tool_calls: Vec<ToolInvocation>,
    ) -> Self {
        Self::Assistant {
            content: content.into(),
            tool_calls,
        }
    }

    /// Create a successful tool result message.
    #[must_use]
    pub fn tool_result(
        tool_call_id: impl Into<String>,
        name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self::Tool {
            tool_call_id: tool_call_id.into(),
            name: name.into(),
            content: content.into(),
            is_error: None,
        }
    }

    /// Create an error tool result message.
    #[must_use]
    pub fn tool_error(
        tool_call_id: impl Into<String>,
        name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self::Tool {
            tool_call_id: tool_call_id.into(),
            name: name.into(),
            content: content.into(),
            is_error: Some(true),
        }
    }

    /// Returns `true` if this is a system message.
    #[must_use]
    pub fn is_system(&self) -> bool {
        matches!(self, Self::System { .. })
    }

    /// Returns `true` if this is a user message.
    #[must_use]
    pub fn is_user(&self) -> bool {
        matches!(self, Self::User { .. })
    }

    /// Returns `true` if this is an assistant message.
    #[must_use]
    pub fn is_assistant(&self) -> bool {
        matches!(self, Self::Assistant { .. })
    }

    /// Returns `true` if this is a tool result message.
    #[must_use]
    pub fn is_tool(&self) -> bool {
        matches!(self, Self::Tool { .. })
    }

    /// Returns `true` if this is a file-context system message.
    #[must_use]
    pub fn is_file_context(&self) -> bool {
        matches!(
            self,
            Self::System {
                file_context: Some(_),
                ..
            }
        )
    }

    /// The wire role tag for this message.
    #[must_use]
    pub fn role(&self) -> &'static str {
        match self {
            Self::System { .. } => "system",
            Self::User { .. } => "user",
            Self::Assistant { .. } => "assistant",
            Self::Tool { .. } => "tool",
        }
    }

    /// The message content text.
    #[must_use]
    pub fn content(&self) -> &str {
        match self {
            Self::System { content, .. }
            | Self::User { content }
            | Self::Assistant { content, .. }
            | Self::Tool { content, .. } => content,
        }
    }

    /// Tool invocations carried by this message (empty for non-assistant
    /// messages and assistant messages without calls).
    #[must_use]
    pub fn tool_calls(&self) -> &[ToolInvocation] {
        match self {
            Self::Assistant { tool_calls, .. } => tool_calls,
            _ => &[],
        }
    }

    /// The file-context tag, if this message carries one.
    #[must_use]
    pub fn file_context_tag(&self) -> Option<&FileContext> {
        match self {
            Self::System { file_context, .. } => file_context.as_ref(),
            _ => None,
        }
    }

    /// A copy of this message with content clipped to at most `max_chars`
    /// characters. Role, ids, and tool calls are preserved.
    #[must_use]
    pub fn with_clipped_content(&self, max_chars: usize) -> Self {
        let clip = |s: &str| -> String {
            if s.chars().count() <= max_chars {
                s.to_owned()
            } else {
                s.chars().take(max_chars).collect()
            }
        };
        match self {
            Self::System {
                content,
                file_context,
            } => Self::System {
                content: clip(content),
                file_context: file_context.clone(),
            },
            Self::User { content } => Self::User {
                content: clip(content),
            },
            Self::Assistant {
                content,
                tool_calls,
            } => Self::Assistant {
                content: clip(content),
                tool_calls: tool_calls.clone(),
            },
            Self::Tool {
                tool_call_id,
                name,
                content,
                is_error,
            } => Self::Tool {
                tool_call_id: tool_call_id.clone(),
                name: name.clone(),
                content: clip(content),
                is_error: *is_error,
            },
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
