//! The invocation hub: exports the registry as LLM tool definitions and
//! executes batches of tool calls against it.

pub mod schema;

pub use schema::{ToolDefinition, ToolPayload};

use crate::auth::AuthContext;
use crate::config::HubLimits;
use crate::error::{CallError, HubError};
use crate::function::{Arguments, FunctionSpec};
use crate::registry::Registry;
use crate::types::{CallOutcome, ToolCall, ToolCallErrors, ToolOutput};
use serde_json::{Map, Value};
use std::collections::HashSet;
use tracing::{debug, warn};

pub struct Hub {
    registry: Registry,
    limits: HubLimits,
}

impl Hub {
    pub fn new(registry: Registry) -> Self {
        Self {
            registry,
            limits: HubLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: HubLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    // -----------------------------------------------------------------------
    // Schema export
    // -----------------------------------------------------------------------

    /// One tool definition per listed function.
    pub fn tools_spec(&self) -> Result<Vec<ToolPayload>, HubError> {
        let count = self.registry.len();
        if count > self.limits.max_tools {
            return Err(HubError::TooManyTools {
                count,
                max: self.limits.max_tools,
            });
        }
        Ok(self
            .registry
            .list()
            .map(|f| ToolDefinition::from_spec(f.spec()).into())
            .collect())
    }

    // -----------------------------------------------------------------------
    // Call execution
    // -----------------------------------------------------------------------

    /// Execute `calls` in order, one outcome per call. Only a malformed batch
    /// (empty or repeated ids) fails as a whole.
    pub fn call_tools(&self, auth: &AuthContext, calls: &[ToolCall]) -> Result<Vec<CallOutcome>, HubError> {
        let mut seen = HashSet::new();
        for call in calls {
            if call.id.trim().is_empty() {
                return Err(HubError::MalformedBatch("tool call with an empty id".into()));
            }
            if !seen.insert(call.id.as_str()) {
                return Err(HubError::MalformedBatch(format!("duplicate tool call id {}", call.id)));
            }
        }

        Ok(calls.iter().map(|call| self.call_tool(auth, call)).collect())
    }

    /// Execute one call. Failures are reported in the outcome.
    pub fn call_tool(&self, auth: &AuthContext, call: &ToolCall) -> CallOutcome {
        debug!("Tool call {}: {}", call.id, call.function.name);
        match self.execute(auth, call) {
            Ok(output) => CallOutcome::Output(ToolOutput {
                tool_call_id: call.id.clone(),
                output,
            }),
            Err(errors) => {
                for e in &errors {
                    warn!("Tool call {} ({}) failed: {}", call.id, call.function.name, e);
                }
                CallOutcome::Errors(ToolCallErrors {
                    tool_call_id: call.id.clone(),
                    errors,
                })
            }
        }
    }

    fn execute(&self, auth: &AuthContext, call: &ToolCall) -> Result<String, Vec<CallError>> {
        let function = self.registry.get(&call.function.name).map_err(|e| vec![e])?;
        let raw = parse_arguments(&call.function.arguments).map_err(|e| vec![e])?;
        let args = coerce_arguments(function.spec(), &raw)?;

        let result = function.bind(auth).call(&args).map_err(|e| vec![e])?;
        let output = truncate(stringify(result), self.limits.max_result_length);
        debug!("Tool call {} returned {} characters", call.id, output.chars().count());
        Ok(output)
    }
}

/// Parse argument text as a JSON object. Blank text means no arguments.
pub fn parse_arguments(text: &str) -> Result<Map<String, Value>, CallError> {
    if text.trim().is_empty() {
        return Ok(Map::new());
    }
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(CallError::MalformedArguments(format!(
            "expected a JSON object, got {}",
            other
        ))),
        Err(e) => Err(CallError::MalformedArguments(e.to_string())),
    }
}

/// Coerce every declared parameter, accumulating all failures. Arguments
/// the function does not declare are ignored; `null` counts as absent.
pub fn coerce_arguments(spec: &FunctionSpec, raw: &Map<String, Value>) -> Result<Arguments, Vec<CallError>> {
    let mut args = Arguments::new();
    let mut errors = Vec::new();

    for p in &spec.parameters {
        match raw.get(&p.name).filter(|v| !v.is_null()) {
            Some(value) => match p.value_type.coerce(value) {
                Ok(typed) => {
                    args.insert(p.name.clone(), typed);
                }
                Err(reason) => errors.push(CallError::ParameterType {
                    name: p.name.clone(),
                    expected: p.value_type.to_string(),
                    reason,
                }),
            },
            None if p.required => errors.push(CallError::MissingParameter(p.name.clone())),
            None => {}
        }
    }

    if errors.is_empty() {
        Ok(args)
    } else {
        Err(errors)
    }
}

/// JSON strings as raw text, anything else as compact JSON.
pub fn stringify(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

/// Keep at most `max` characters, noting how many were dropped.
pub fn truncate(output: String, max: usize) -> String {
    let total = output.chars().count();
    if total <= max {
        return output;
    }
    let mut kept: String = output.chars().take(max).collect();
    kept.push_str(&format!("... {} characters omitted", total - max));
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::BuiltinProvider;
    use crate::provider::Provider;
    use crate::registry::RegistryFilter;
    use serde_json::json;

    fn hub() -> Hub {
        let providers: Vec<Box<dyn Provider>> = vec![Box::new(BuiltinProvider::new())];
        Hub::new(Registry::new(&providers, &RegistryFilter::default()))
    }

    #[test]
    fn parses_arguments() {
        assert!(parse_arguments("").unwrap().is_empty());
        assert_eq!(parse_arguments(r#"{"length": 4}"#).unwrap()["length"], json!(4));
        assert!(matches!(parse_arguments("[1]"), Err(CallError::MalformedArguments(_))));
        assert!(matches!(parse_arguments("{oops"), Err(CallError::MalformedArguments(_))));
    }

    #[test]
    fn truncates_long_output() {
        assert_eq!(truncate("abc".into(), 3), "abc");
        assert_eq!(truncate("abcdef".into(), 4), "abcd... 2 characters omitted");
        let long = "é".repeat(1030);
        let out = truncate(long, 1024);
        assert!(out.ends_with("... 6 characters omitted"));
        assert_eq!(out.chars().count(), 1024 + "... 6 characters omitted".len());
    }

    #[test]
    fn stringifies_json() {
        assert_eq!(stringify(json!("plain")), "plain");
        assert_eq!(stringify(json!(100)), "100");
        assert_eq!(stringify(json!({"a": [1, 2]})), r#"{"a":[1,2]}"#);
        assert_eq!(stringify(Value::Null), "null");
    }

    #[test]
    fn coercion_accumulates_errors() {
        let hub = hub();
        let spec = hub.registry().get("random_string").unwrap().spec().clone();
        let raw = parse_arguments(r#"{"charset": 5}"#).unwrap();
        // Numbers are accepted as strings; only `length` is missing.
        let errors = coerce_arguments(&spec, &raw).unwrap_err();
        assert_eq!(errors, vec![CallError::MissingParameter("length".into())]);

        let raw = parse_arguments(r#"{"length": "ten", "charset": null}"#).unwrap();
        let errors = coerce_arguments(&spec, &raw).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind(), "parameter_type");
    }

    #[test]
    fn rejects_malformed_batches() {
        let hub = hub();
        let auth = AuthContext::anonymous();
        let dup = [
            ToolCall::new("x", "random_string", r#"{"length": 1}"#),
            ToolCall::new("x", "random_string", r#"{"length": 2}"#),
        ];
        assert!(matches!(hub.call_tools(&auth, &dup), Err(HubError::MalformedBatch(_))));
        let empty = [ToolCall::new(" ", "random_string", "{}")];
        assert!(matches!(hub.call_tools(&auth, &empty), Err(HubError::MalformedBatch(_))));
        assert!(hub.call_tools(&auth, &[]).unwrap().is_empty());
    }

    #[test]
    fn respects_configured_tool_limit() {
        let hub = hub().with_limits(HubLimits {
            max_tools: 0,
            max_result_length: 1024,
        });
        assert_eq!(
            hub.tools_spec().unwrap_err(),
            HubError::TooManyTools { count: 1, max: 0 }
        );
    }
}
