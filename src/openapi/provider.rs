//! Provider over one or more schema-described APIs.

use super::describe::DescribeLimits;
use super::document::SchemaSource;
use super::invoker::OpenApiInvoker;
use super::parser::Parser;
use crate::config::{HubConfig, OpenApiSource};
use crate::error::LoadError;
use crate::function::{Function, FunctionCollection, FunctionOrigin};
use crate::http::HttpTransport;
use crate::provider::Provider;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::info;

/// A parser for one API plus where its requests go.
pub struct ApiLoader {
    pub base_url: String,
    pub parser: Parser,
    /// When set, only these generated function names are kept.
    pub allow: Option<BTreeSet<String>>,
}

impl ApiLoader {
    pub fn new(parser: Parser, base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            parser,
            allow: None,
        }
    }

    pub fn with_allow(mut self, names: impl IntoIterator<Item = String>) -> Self {
        self.allow = Some(names.into_iter().collect());
        self
    }

    /// Load the schema named by a `[[openapi]]` config entry.
    pub fn from_source(
        source: &OpenApiSource,
        limits: &DescribeLimits,
        transport: &dyn HttpTransport,
    ) -> Result<Self, LoadError> {
        let schema = SchemaSource::parse(&source.schema);
        let parser = Parser::from_source(&source.api, &schema, transport)?.with_limits(limits.clone());
        let loader = Self::new(parser, &source.base_url);
        Ok(match &source.allow {
            Some(names) => loader.with_allow(names.iter().cloned()),
            None => loader,
        })
    }

    pub fn api(&self) -> &str {
        self.parser.api()
    }
}

pub struct OpenApiProvider {
    functions: Vec<Arc<Function>>,
    collections: Vec<FunctionCollection>,
}

impl OpenApiProvider {
    /// Parse every loader's document; each API becomes one collection.
    pub fn new(loaders: Vec<ApiLoader>, transport: Arc<dyn HttpTransport>) -> Self {
        let mut functions = Vec::new();
        let mut collections = Vec::new();

        for loader in loaders {
            let mut names = BTreeSet::new();
            for generated in loader.parser.fn_specs() {
                if let Some(allow) = &loader.allow {
                    if !allow.contains(&generated.spec.name) {
                        continue;
                    }
                }
                let invoker = OpenApiInvoker::new(
                    &loader.base_url,
                    generated.endpoint.clone(),
                    transport.clone(),
                );
                names.insert(generated.spec.name.clone());
                functions.push(Arc::new(Function::new(
                    generated.spec,
                    FunctionOrigin::OpenApi(generated.endpoint),
                    invoker,
                )));
            }
            info!("OpenAPI provider: {} functions from {}", names.len(), loader.api());
            collections.push(FunctionCollection::new(loader.api(), None, names));
        }

        Self {
            functions,
            collections,
        }
    }

    /// Load every `[[openapi]]` entry. A schema that cannot be loaded fails
    /// the whole provider.
    pub fn from_config(config: &HubConfig, transport: Arc<dyn HttpTransport>) -> Result<Self, LoadError> {
        let loaders = config
            .openapi
            .iter()
            .map(|source| ApiLoader::from_source(source, &config.describe, transport.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(loaders, transport))
    }
}

impl Provider for OpenApiProvider {
    fn name(&self) -> &str {
        "openapi"
    }

    fn functions(&self) -> &[Arc<Function>] {
        &self.functions
    }

    fn collections(&self) -> &[FunctionCollection] {
        &self.collections
    }
}
