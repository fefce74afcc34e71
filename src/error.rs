//! Error taxonomy for loading, credential resolution, and tool calls.
//!
//! Load-time errors for a single endpoint are logged and swallowed by the
//! providers; call-time errors are reported per call by the hub and never
//! abort sibling calls in a batch.

use crate::auth::IntegrationKind;
use serde::{Serialize, Serializer};
use thiserror::Error;

/// Credential construction and lookup failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// The credential source is missing or invalid.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A call needs a credential the context does not carry.
    #[error("missing credential for {0} integration")]
    MissingCredential(IntegrationKind),
}

/// Invalid function specs, rejected at construction time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpecError {
    #[error("invalid function name '{0}': must match [A-Za-z0-9_-]{{1,64}}")]
    InvalidName(String),

    #[error("duplicate parameter '{parameter}' in function '{function}'")]
    DuplicateParameter { function: String, parameter: String },

    /// A `$ref` that points at neither a model nor an enum component.
    #[error("unsupported reference: {0}")]
    UnsupportedReference(String),
}

/// Failure to load a schema document or catalog table as a whole.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("failed to parse {source_name}: {reason}")]
    Parse { source_name: String, reason: String },

    #[error("invalid document {source_name}: {reason}")]
    InvalidDocument { source_name: String, reason: String },
}

/// Transport-level failure raised by an [`HttpTransport`](crate::http::HttpTransport).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("request failed: {0}")]
    Request(String),
}

/// A single per-call failure. A failed call reports one or more of these.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CallError {
    #[error("unknown function: {0}")]
    UnknownFunction(String),

    #[error("malformed arguments: {0}")]
    MalformedArguments(String),

    #[error("missing required parameter {0}")]
    MissingParameter(String),

    #[error("parameter {name} expected type {expected}: {reason}")]
    ParameterType {
        name: String,
        expected: String,
        reason: String,
    },

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("error({status}) {body}")]
    Status { status: u16, body: String },

    #[error("{0}")]
    Invocation(String),
}

impl CallError {
    /// Stable, machine-readable kind tag reported alongside the message.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UnknownFunction(_) => "unknown_function",
            Self::MalformedArguments(_) => "malformed_arguments",
            Self::MissingParameter(_) => "missing_parameter",
            Self::ParameterType { .. } => "parameter_type",
            Self::Auth(AuthError::MissingCredential(_)) => "missing_credential",
            Self::Auth(AuthError::Configuration(_)) => "configuration",
            Self::Transport(_) => "transport",
            Self::Status { .. } => "status",
            Self::Invocation(_) => "invocation",
        }
    }
}

impl Serialize for CallError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;
        let mut s = serializer.serialize_struct("CallError", 2)?;
        s.serialize_field("kind", self.kind())?;
        s.serialize_field("message", &self.to_string())?;
        s.end()
    }
}

/// Batch-level failures. These are the only errors the hub returns instead
/// of reporting per call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HubError {
    #[error("{count} tools exceed the protocol maximum of {max}; narrow the registry with collection, hostname, or endpoint URL filters")]
    TooManyTools { count: usize, max: usize },

    #[error("malformed batch: {0}")]
    MalformedBatch(String),
}
