//! OpenAPI integration: document loading, endpoint-to-function parsing,
//! and the provider that invokes the generated functions over HTTP.

pub mod describe;
pub mod document;
pub mod invoker;
pub mod naming;
pub mod parser;
pub mod provider;

pub use describe::{DescribeLimits, ResponseDescriber};
pub use document::{OpenApiDocument, Operation, SchemaSource};
pub use invoker::OpenApiInvoker;
pub use naming::function_name;
pub use parser::{DefaultPolicy, EndpointPolicy, OpenApiFunctionSpec, ParameterLocation, Parser, RawParameter};
pub use provider::{ApiLoader, OpenApiProvider};
