//! Structural validation of model-issued tool calls.
//!
//! Every raw call is checked before dispatch: id present and unique within
//! the batch, name matching a known tool, arguments parsing as a JSON
//! object with the tool's required fields present. Invalid calls are
//! dropped from dispatch and reported as explicit error tool results —
//! never as silent successes — so the model's view of its own actions
//! stays truthful and downstream components never see a missing-field
//! invocation.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use strand_core::{Message, RawToolCall, Tool, ToolInvocation};
use tracing::debug;

// ─────────────────────────────────────────────────────────────────────────────
// Rejection
// ─────────────────────────────────────────────────────────────────────────────

/// A tool call refused by validation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationRejection {
    /// The id the model reported (possibly empty).
    pub id: String,
    /// The tool name the model reported (possibly empty).
    pub name: String,
    /// Human-readable reason, phrased for the model.
    pub reason: String,
}

impl ValidationRejection {
    /// Render this rejection as an error tool-result message for the
    /// conversation, so the model sees the failure instead of a phantom
    /// success.
    #[must_use]
    pub fn to_message(&self) -> Message {
        Message::tool_error(
            self.id.clone(),
            self.name.clone(),
            format!("Validation error: {}", self.reason),
        )
    }
}

/// Result of validating a batch of raw tool calls.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ValidationOutcome {
    /// Calls that passed every check, in the model's emission order.
    pub valid: Vec<ToolInvocation>,
    /// Calls that were refused, with reasons.
    pub rejections: Vec<ValidationRejection>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Validation
// ─────────────────────────────────────────────────────────────────────────────

/// Validate a batch of raw tool calls against the known tool set.
///
/// Checks, in order: non-empty id; id not already used in this batch; name
/// matching a known tool; arguments parsing as a JSON object (a
/// JSON-encoded string body is accepted); every required field of the
/// tool's schema present.
#[must_use]
pub fn validate_tool_calls(raw_calls: &[RawToolCall], known_tools: &[Tool]) -> ValidationOutcome {
    let mut outcome = ValidationOutcome::default();
    let mut seen_ids: HashSet<&str> = HashSet::new();

    for call in raw_calls {
        if let Some(reason) = check(call, known_tools, &seen_ids) {
            debug!(id = %call.id, name = %call.name, %reason, "tool call rejected");
            outcome.rejections.push(ValidationRejection {
                id: call.id.clone(),
                name: call.name.clone(),
                reason,
            });
            continue;
        }
        let _ = seen_ids.insert(call.id.as_str());
        outcome.valid.push(ToolInvocation {
            id: call.id.clone(),
            name: call.name.clone(),
            // check() verified this parses
            arguments: call.arguments_object().unwrap_or_default(),
        });
    }

    outcome
}

/// Reason a call fails validation, or `None` if it passes.
fn check(call: &RawToolCall, known_tools: &[Tool], seen_ids: &HashSet<&str>) -> Option<String> {
    if call.id.is_empty() {
        return Some("tool call is missing an id".to_owned());
    }
    if seen_ids.contains(call.id.as_str()) {
        return Some(format!("duplicate tool call id \"{}\"", call.id));
    }

    let Some(tool) = known_tools.iter().find(|t| t.name == call.name) else {
        return Some(format!("unknown tool \"{}\"", call.name));
    };

    let Some(arguments) = call.arguments_object() else {
        return Some("arguments are not a well-formed JSON object".to_owned());
    };

    let missing: Vec<&str> = tool
        .required_fields()
        .iter()
        .filter(|field| !arguments.contains_key(*field))
        .map(String::as_str)
        .collect();
    if !missing.is_empty() {
        return Some(format!(
            "missing required argument(s): {}",
            missing.join(", ")
        ));
    }

    None
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Map, Value, json};
    use strand_core::ToolParameterSchema;

    fn tool(name: &str, required: &[&str]) -> Tool {
        Tool {
            name: name.into(),
            description: format!("The {name} tool"),
            parameters: ToolParameterSchema {
                schema_type: "object".into(),
                properties: None,
                required: Some(required.iter().map(|s| (*s).to_owned()).collect()),
                description: None,
                extra: Map::new(),
            },
        }
    }

    fn known() -> Vec<Tool> {
        vec![tool("read", &["path"]), tool("patch", &["path", "original", "replacement"])]
    }

    fn raw(id: &str, name: &str, arguments: Value) -> RawToolCall {
        RawToolCall {
            id: id.into(),
            name: name.into(),
            arguments,
        }
    }

    // -- Valid calls --

    #[test]
    fn well_formed_call_passes() {
        let calls = vec![raw("tc-1", "read", json!({"path": "src/lib.rs"}))];
        let outcome = validate_tool_calls(&calls, &known());
        assert_eq!(outcome.valid.len(), 1);
        assert!(outcome.rejections.is_empty());
        assert_eq!(outcome.valid[0].id, "tc-1");
        assert_eq!(outcome.valid[0].arguments["path"], "src/lib.rs");
    }

    #[test]
    fn string_encoded_arguments_accepted() {
        let calls = vec![raw("tc-1", "read", json!("{\"path\": \"a.rs\"}"))];
        let outcome = validate_tool_calls(&calls, &known());
        assert_eq!(outcome.valid.len(), 1);
        assert_eq!(outcome.valid[0].arguments["path"], "a.rs");
    }

    #[test]
    fn extra_arguments_are_allowed() {
        let calls = vec![raw(
            "tc-1",
            "read",
            json!({"path": "a.rs", "offset": 10}),
        )];
        let outcome = validate_tool_calls(&calls, &known());
        assert_eq!(outcome.valid.len(), 1);
    }

    #[test]
    fn emission_order_preserved() {
        let calls = vec![
            raw("tc-1", "read", json!({"path": "a.rs"})),
            raw("tc-2", "read", json!({"path": "b.rs"})),
        ];
        let outcome = validate_tool_calls(&calls, &known());
        assert_eq!(outcome.valid[0].id, "tc-1");
        assert_eq!(outcome.valid[1].id, "tc-2");
    }

    // -- Rejections --

    #[test]
    fn missing_id_rejected() {
        let calls = vec![raw("", "read", json!({"path": "a.rs"}))];
        let outcome = validate_tool_calls(&calls, &known());
        assert!(outcome.valid.is_empty());
        assert_eq!(outcome.rejections.len(), 1);
        assert!(outcome.rejections[0].reason.contains("missing an id"));
    }

    #[test]
    fn unknown_tool_rejected() {
        let calls = vec![raw("tc-1", "teleport", json!({}))];
        let outcome = validate_tool_calls(&calls, &known());
        assert!(outcome.valid.is_empty());
        assert!(outcome.rejections[0].reason.contains("unknown tool"));
        assert!(outcome.rejections[0].reason.contains("teleport"));
    }

    #[test]
    fn malformed_arguments_rejected() {
        let calls = vec![raw("tc-1", "read", json!("{not valid json"))];
        let outcome = validate_tool_calls(&calls, &known());
        assert!(outcome.valid.is_empty());
        assert!(outcome.rejections[0].reason.contains("JSON object"));
    }

    #[test]
    fn non_object_arguments_rejected() {
        let calls = vec![raw("tc-1", "read", json!([1, 2, 3]))];
        let outcome = validate_tool_calls(&calls, &known());
        assert!(outcome.valid.is_empty());
    }

    #[test]
    fn missing_required_field_rejected() {
        let calls = vec![raw("tc-1", "patch", json!({"path": "a.rs"}))];
        let outcome = validate_tool_calls(&calls, &known());
        assert!(outcome.valid.is_empty());
        let reason = &outcome.rejections[0].reason;
        assert!(reason.contains("original"));
        assert!(reason.contains("replacement"));
        assert!(!reason.contains("path,"));
    }

    #[test]
    fn duplicate_id_second_rejected() {
        let calls = vec![
            raw("tc-1", "read", json!({"path": "a.rs"})),
            raw("tc-1", "read", json!({"path": "b.rs"})),
        ];
        let outcome = validate_tool_calls(&calls, &known());
        assert_eq!(outcome.valid.len(), 1);
        assert_eq!(outcome.valid[0].arguments["path"], "a.rs");
        assert_eq!(outcome.rejections.len(), 1);
        assert!(outcome.rejections[0].reason.contains("duplicate"));
    }

    #[test]
    fn rejected_id_does_not_block_reuse() {
        // A rejected call never claimed its id; a later well-formed call
        // may use it.
        let calls = vec![
            raw("tc-1", "teleport", json!({})),
            raw("tc-1", "read", json!({"path": "a.rs"})),
        ];
        let outcome = validate_tool_calls(&calls, &known());
        assert_eq!(outcome.valid.len(), 1);
        assert_eq!(outcome.rejections.len(), 1);
    }

    #[test]
    fn mixed_batch_splits_cleanly() {
        let calls = vec![
            raw("tc-1", "read", json!({"path": "a.rs"})),
            raw("tc-2", "teleport", json!({})),
            raw("tc-3", "read", json!({})),
        ];
        let outcome = validate_tool_calls(&calls, &known());
        assert_eq!(outcome.valid.len(), 1);
        assert_eq!(outcome.rejections.len(), 2);
    }

    #[test]
    fn empty_batch_is_empty_outcome() {
        let outcome = validate_tool_calls(&[], &known());
        assert!(outcome.valid.is_empty());
        assert!(outcome.rejections.is_empty());
    }

    // -- Rejection rendering --

    #[test]
    fn rejection_renders_as_error_tool_result() {
        let calls = vec![raw("tc-1", "teleport", json!({}))];
        let outcome = validate_tool_calls(&calls, &known());
        let message = outcome.rejections[0].to_message();
        assert!(message.is_tool());
        match &message {
            Message::Tool {
                tool_call_id,
                content,
                is_error,
                ..
            } => {
                assert_eq!(tool_call_id, "tc-1");
                assert_eq!(*is_error, Some(true));
                assert!(content.starts_with("Validation error:"));
            }
            _ => panic!("expected tool message"),
        }
    }
}
