//! toolhub: one callable-tool layer for LLM agents.
//!
//! OpenAPI-described services, a catalog of third-party REST endpoints, and
//! builtin functions are loaded by providers, aggregated and filtered by a
//! registry, and exposed to the model through the hub's tool schema and
//! batch call execution.

pub mod auth;
pub mod builtin;
pub mod catalog;
pub mod config;
pub mod error;
pub mod function;
pub mod http;
pub mod hub;
pub mod openapi;
pub mod provider;
pub mod registry;
pub mod template;
pub mod types;

pub use auth::AuthContext;
pub use error::{AuthError, CallError, HubError, LoadError, SpecError};
pub use function::{Function, FunctionCollection, FunctionSpec};
pub use hub::Hub;
pub use provider::Provider;
pub use registry::{Registry, RegistryFilter};
