//! Shared vocabulary for describing a callable tool.
//!
//! A [`Function`] pairs an immutable [`FunctionSpec`] with an invoker. The
//! invoker is bound to an [`AuthContext`] only at call time, so specs never
//! carry credentials.

pub mod origin;
pub mod value;

pub use origin::{CatalogEndpoint, FunctionOrigin, OpenApiEndpoint};
pub use value::{FieldSpec, RecordType, TypedValue, ValueType};

use crate::auth::AuthContext;
use crate::error::{CallError, SpecError};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::sync::Arc;

/// Longest function name the LLM tool protocol accepts.
pub const MAX_FUNCTION_NAME_LEN: usize = 64;

/// Coerced arguments keyed by parameter name, in declaration order.
pub type Arguments = IndexMap<String, TypedValue>;

/// Whether `name` matches `[A-Za-z0-9_-]{1,64}`.
pub fn is_valid_function_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= MAX_FUNCTION_NAME_LEN
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub value_type: ValueType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub required: bool,
}

impl ParameterSpec {
    pub fn new(
        name: impl Into<String>,
        value_type: ValueType,
        description: impl Into<String>,
        required: bool,
    ) -> Self {
        Self {
            name: name.into(),
            value_type,
            description: Some(description.into()),
            required,
        }
    }
}

/// Result type plus a description of its shape. Documentation only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnSpec {
    #[serde(rename = "type")]
    pub value_type: ValueType,
    pub description: String,
}

impl ReturnSpec {
    pub fn new(value_type: ValueType, description: impl Into<String>) -> Self {
        Self {
            value_type,
            description: description.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionSpec {
    pub name: String,
    pub parameters: Vec<ParameterSpec>,
    #[serde(rename = "return")]
    pub returns: ReturnSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl FunctionSpec {
    /// Build a validated spec.
    pub fn new(
        name: impl Into<String>,
        parameters: Vec<ParameterSpec>,
        returns: ReturnSpec,
        description: Option<String>,
    ) -> Result<Self, SpecError> {
        let spec = Self {
            name: name.into(),
            parameters,
            returns,
            description,
        };
        spec.validate()?;
        Ok(spec)
    }

    /// Check the name pattern and parameter-name uniqueness.
    pub fn validate(&self) -> Result<(), SpecError> {
        if !is_valid_function_name(&self.name) {
            return Err(SpecError::InvalidName(self.name.clone()));
        }
        let mut seen = HashSet::new();
        for p in &self.parameters {
            if !seen.insert(p.name.as_str()) {
                return Err(SpecError::DuplicateParameter {
                    function: self.name.clone(),
                    parameter: p.name.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn parameter(&self, name: &str) -> Option<&ParameterSpec> {
        self.parameters.iter().find(|p| p.name == name)
    }
}

/// The work behind a function: an HTTP call or a local computation.
pub trait Invoke: Send + Sync {
    fn invoke(&self, auth: &AuthContext, args: &Arguments) -> Result<serde_json::Value, CallError>;
}

impl<F> Invoke for F
where
    F: Fn(&AuthContext, &Arguments) -> Result<serde_json::Value, CallError> + Send + Sync,
{
    fn invoke(&self, auth: &AuthContext, args: &Arguments) -> Result<serde_json::Value, CallError> {
        self(auth, args)
    }
}

/// A spec paired with the invoker that performs it.
#[derive(Clone)]
pub struct Function {
    spec: FunctionSpec,
    origin: FunctionOrigin,
    invoker: Arc<dyn Invoke>,
}

impl Function {
    pub fn new(spec: FunctionSpec, origin: FunctionOrigin, invoker: impl Invoke + 'static) -> Self {
        Self {
            spec,
            origin,
            invoker: Arc::new(invoker),
        }
    }

    pub fn name(&self) -> &str {
        &self.spec.name
    }

    pub fn spec(&self) -> &FunctionSpec {
        &self.spec
    }

    pub fn origin(&self) -> &FunctionOrigin {
        &self.origin
    }

    /// Catalog metadata when the function is catalog-backed.
    pub fn catalog_endpoint(&self) -> Option<&CatalogEndpoint> {
        match &self.origin {
            FunctionOrigin::Catalog(endpoint) => Some(endpoint),
            _ => None,
        }
    }

    /// Bind the function to credentials, producing the callable.
    pub fn bind<'a>(&'a self, auth: &'a AuthContext) -> BoundFunction<'a> {
        BoundFunction {
            function: self,
            auth,
        }
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.spec.name)
            .field("origin", &self.origin)
            .finish_non_exhaustive()
    }
}

/// A function bound to an [`AuthContext`], ready to be called.
pub struct BoundFunction<'a> {
    function: &'a Function,
    auth: &'a AuthContext,
}

impl BoundFunction<'_> {
    pub fn call(&self, args: &Arguments) -> Result<serde_json::Value, CallError> {
        self.function.invoker.invoke(self.auth, args)
    }
}

/// A named tag grouping function names, used only for filtering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionCollection {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub function_names: BTreeSet<String>,
}

impl FunctionCollection {
    pub fn new(
        name: impl Into<String>,
        description: Option<String>,
        function_names: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            name: name.into(),
            description,
            function_names: function_names.into_iter().collect(),
        }
    }

    pub fn contains(&self, function_name: &str) -> bool {
        self.function_names.contains(function_name)
    }
}
