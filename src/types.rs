//! Wire types for the LLM function-calling protocol.

use crate::error::CallError;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Tool calls (inbound)
// ---------------------------------------------------------------------------

/// A tool call request from the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    #[serde(rename = "type", default = "function_type")]
    pub call_type: String,
    pub function: FunctionCall,
}

impl ToolCall {
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            call_type: function_type(),
            function: FunctionCall {
                name: name.into(),
                arguments: arguments.into(),
            },
        }
    }
}

fn function_type() -> String {
    "function".into()
}

/// Function name plus its arguments as JSON text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    /// JSON object text. An inline object is accepted and re-encoded.
    #[serde(deserialize_with = "arguments_text")]
    pub arguments: String,
}

fn arguments_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Outcomes (outbound)
// ---------------------------------------------------------------------------

/// Successful result of a tool call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolOutput {
    pub tool_call_id: String,
    pub output: String,
}

/// Failed tool call, with every error found.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolCallErrors {
    pub tool_call_id: String,
    pub errors: Vec<CallError>,
}

/// One outcome per tool call, in call order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CallOutcome {
    Output(ToolOutput),
    Errors(ToolCallErrors),
}

impl CallOutcome {
    pub fn tool_call_id(&self) -> &str {
        match self {
            Self::Output(o) => &o.tool_call_id,
            Self::Errors(e) => &e.tool_call_id,
        }
    }

    pub fn is_output(&self) -> bool {
        matches!(self, Self::Output(_))
    }

    pub fn output(&self) -> Option<&str> {
        match self {
            Self::Output(o) => Some(&o.output),
            Self::Errors(_) => None,
        }
    }

    /// Errors of a failed call; empty for a successful one.
    pub fn errors(&self) -> &[CallError] {
        match self {
            Self::Output(_) => &[],
            Self::Errors(e) => &e.errors,
        }
    }
}
