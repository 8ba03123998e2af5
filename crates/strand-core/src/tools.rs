//! Tool schema and raw tool-call types.
//!
//! [`Tool`] describes a capability offered to the model. [`RawToolCall`] is
//! a tool invocation exactly as the model emitted it, before validation —
//! its arguments may be any JSON shape, including a JSON-encoded string.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ─────────────────────────────────────────────────────────────────────────────
// Tool schema
// ─────────────────────────────────────────────────────────────────────────────

/// JSON Schema-compatible parameter definition for a tool.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolParameterSchema {
    /// Top-level JSON Schema type.
    #[serde(rename = "type")]
    pub schema_type: String,
    /// Property definitions (when type is `object`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<Map<String, Value>>,
    /// Required property names.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
    /// Description of the schema.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Catch-all for additional JSON Schema properties.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ToolParameterSchema {
    /// An empty object schema with no properties.
    #[must_use]
    pub fn empty_object() -> Self {
        Self {
            schema_type: "object".into(),
            properties: None,
            required: None,
            description: None,
            extra: Map::new(),
        }
    }
}

/// A tool definition that can be sent to the model.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tool {
    /// Tool name (unique identifier).
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// JSON Schema for the tool's parameters.
    pub parameters: ToolParameterSchema,
}

impl Tool {
    /// The schema's required parameter names (empty when unspecified).
    #[must_use]
    pub fn required_fields(&self) -> &[String] {
        self.parameters.required.as_deref().unwrap_or(&[])
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Raw tool call
// ─────────────────────────────────────────────────────────────────────────────

/// A tool call as emitted by the model, before validation.
///
/// Arguments are kept as an arbitrary [`Value`]: providers variously send a
/// JSON object or a JSON-encoded string, and either may be malformed. The
/// validator turns this into a typed [`crate::messages::ToolInvocation`] or
/// a rejection — malformed input is a value, not a crash.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawToolCall {
    /// Tool call ID as reported by the model.
    #[serde(default)]
    pub id: String,
    /// Tool name as reported by the model.
    #[serde(default)]
    pub name: String,
    /// Unparsed arguments.
    #[serde(default)]
    pub arguments: Value,
}

impl RawToolCall {
    /// Interpret the arguments as a JSON object.
    ///
    /// Accepts either an object value or a string containing a JSON object.
    /// Returns `None` for anything else, including strings that fail to
    /// parse.
    #[must_use]
    pub fn arguments_object(&self) -> Option<Map<String, Value>> {
        match &self.arguments {
            Value::Object(map) => Some(map.clone()),
            Value::String(s) => match serde_json::from_str::<Value>(s) {
                Ok(Value::Object(map)) => Some(map),
                _ => None,
            },
            _ => None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn read_tool() -> Tool {
        Tool {
            name: "read".into(),
            description: "Read a file".into(),
            parameters: ToolParameterSchema {
                schema_type: "object".into(),
                properties: Some({
                    let mut m = Map::new();
                    let _ = m.insert("path".into(), json!({"type": "string"}));
                    m
                }),
                required: Some(vec!["path".into()]),
                description: None,
                extra: Map::new(),
            },
        }
    }

    // -- Tool --

    #[test]
    fn tool_serde_roundtrip() {
        let tool = read_tool();
        let json = serde_json::to_value(&tool).unwrap();
        let back: Tool = serde_json::from_value(json).unwrap();
        assert_eq!(tool, back);
    }

    #[test]
    fn required_fields_present() {
        assert_eq!(read_tool().required_fields(), ["path".to_owned()]);
    }

    #[test]
    fn required_fields_default_empty() {
        let tool = Tool {
            name: "noop".into(),
            description: String::new(),
            parameters: ToolParameterSchema::empty_object(),
        };
        assert!(tool.required_fields().is_empty());
    }

    #[test]
    fn schema_extra_fields_flatten() {
        let schema: ToolParameterSchema = serde_json::from_value(json!({
            "type": "object",
            "additionalProperties": false
        }))
        .unwrap();
        assert_eq!(schema.extra["additionalProperties"], false);
        let back = serde_json::to_value(&schema).unwrap();
        assert_eq!(back["additionalProperties"], false);
    }

    // -- RawToolCall::arguments_object --

    #[test]
    fn arguments_from_object() {
        let call = RawToolCall {
            id: "tc-1".into(),
            name: "read".into(),
            arguments: json!({"path": "a.rs"}),
        };
        let args = call.arguments_object().unwrap();
        assert_eq!(args["path"], "a.rs");
    }

    #[test]
    fn arguments_from_encoded_string() {
        let call = RawToolCall {
            id: "tc-1".into(),
            name: "read".into(),
            arguments: json!("{\"path\": \"a.rs\"}"),
        };
        let args = call.arguments_object().unwrap();
        assert_eq!(args["path"], "a.rs");
    }

    #[test]
    fn arguments_malformed_string_is_none() {
        let call = RawToolCall {
            id: "tc-1".into(),
            name: "read".into(),
            arguments: json!("{not json"),
        };
        assert!(call.arguments_object().is_none());
    }

    #[test]
    fn arguments_non_object_is_none() {
        for value in [json!(42), json!(["a"]), json!("\"a plain string\""), Value::Null] {
            let call = RawToolCall {
                id: "tc-1".into(),
                name: "read".into(),
                arguments: value,
            };
            assert!(call.arguments_object().is_none());
        }
    }

    #[test]
    fn raw_call_defaults_on_missing_fields() {
        let call: RawToolCall = serde_json::from_str("{}").unwrap();
        assert!(call.id.is_empty());
        assert!(call.name.is_empty());
        assert!(call.arguments.is_null());
    }
}
