//! Builtin functions that run locally and need no credentials.

use crate::auth::AuthContext;
use crate::error::CallError;
use crate::function::{
    Arguments, Function, FunctionCollection, FunctionOrigin, FunctionSpec, ParameterSpec, ReturnSpec,
    ValueType,
};
use crate::provider::Provider;
use rand::Rng;
use serde_json::Value;
use std::sync::Arc;

/// Characters used when `charset` is not given.
pub const DEFAULT_CHARSET: &str = "abcdefghijklmnopqrstuvwxyz0123456789";

/// Longest string `random_string` will generate.
pub const MAX_RANDOM_STRING_LEN: i64 = 65_536;

pub struct BuiltinProvider {
    functions: Vec<Arc<Function>>,
    collections: Vec<FunctionCollection>,
}

impl BuiltinProvider {
    pub fn new() -> Self {
        let function = Function::new(random_string_spec(), FunctionOrigin::Builtin, random_string);
        let collections = vec![FunctionCollection::new(
            "random",
            Some("functions that generate random outputs".into()),
            [function.name().to_string()],
        )];
        Self {
            functions: vec![Arc::new(function)],
            collections,
        }
    }
}

impl Default for BuiltinProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl Provider for BuiltinProvider {
    fn name(&self) -> &str {
        "builtin"
    }

    fn functions(&self) -> &[Arc<Function>] {
        &self.functions
    }

    fn collections(&self) -> &[FunctionCollection] {
        &self.collections
    }
}

fn random_string_spec() -> FunctionSpec {
    FunctionSpec {
        name: "random_string".into(),
        parameters: vec![
            ParameterSpec::new("length", ValueType::Integer, "Length of the generated string.", true),
            ParameterSpec::new(
                "charset",
                ValueType::String,
                "Set of characters used to generate the string.",
                false,
            ),
        ],
        returns: ReturnSpec::new(ValueType::String, "A random string."),
        description: None,
    }
}

fn random_string(_auth: &AuthContext, args: &Arguments) -> Result<Value, CallError> {
    let length = args
        .get("length")
        .and_then(|v| v.as_i64())
        .ok_or_else(|| CallError::MissingParameter("length".into()))?;
    if !(0..=MAX_RANDOM_STRING_LEN).contains(&length) {
        return Err(CallError::Invocation(format!(
            "length must be between 0 and {}, got {}",
            MAX_RANDOM_STRING_LEN, length
        )));
    }

    // An empty charset falls back to the default.
    let charset: Vec<char> = args
        .get("charset")
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_CHARSET)
        .chars()
        .collect();

    let mut rng = rand::thread_rng();
    let out: String = (0..length)
        .map(|_| charset[rng.gen_range(0..charset.len())])
        .collect();
    Ok(Value::String(out))
}
