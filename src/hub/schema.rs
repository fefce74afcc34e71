//! Tool definitions in the function-calling format.

use crate::function::{FunctionSpec, ParameterSpec};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

const REQUIRED_NOTE: &str = "This parameter is required.";

/// Definition of a tool exposed to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

impl ToolDefinition {
    pub fn from_spec(spec: &FunctionSpec) -> Self {
        let mut properties = Map::new();
        let mut required = Vec::new();
        for p in &spec.parameters {
            properties.insert(p.name.clone(), parameter_schema(p));
            if p.required {
                required.push(Value::String(p.name.clone()));
            }
        }

        Self {
            name: spec.name.clone(),
            description: describe(spec.description.as_deref(), &spec.returns.description),
            parameters: json!({
                "type": "object",
                "properties": properties,
                "required": required,
            }),
        }
    }
}

/// `{"type": "function", "function": {...}}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolPayload {
    #[serde(rename = "type")]
    pub tool_type: String,
    pub function: ToolDefinition,
}

impl From<ToolDefinition> for ToolPayload {
    fn from(function: ToolDefinition) -> Self {
        Self {
            tool_type: "function".into(),
            function,
        }
    }
}

fn parameter_schema(p: &ParameterSpec) -> Value {
    let mut schema = p.value_type.json_schema();
    let description = match (p.description.as_deref(), p.required) {
        (Some(d), true) => Some(format!("{}. {}", d.trim_end().trim_end_matches('.'), REQUIRED_NOTE)),
        (Some(d), false) => Some(d.to_string()),
        (None, true) => Some(REQUIRED_NOTE.to_string()),
        (None, false) => None,
    };
    if let (Some(d), Some(obj)) = (description, schema.as_object_mut()) {
        obj.insert("description".into(), Value::String(d));
    }
    schema
}

fn describe(description: Option<&str>, returns: &str) -> String {
    match description.map(str::trim).filter(|d| !d.is_empty()) {
        Some(d) => format!("{}. Returns: {}", d.trim_end_matches('.'), returns),
        None => format!("Returns: {}", returns),
    }
}
