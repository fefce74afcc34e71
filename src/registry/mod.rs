//! The registry: every provider's functions under one name-keyed map,
//! narrowed by optional selection filters.

use crate::builtin::BuiltinProvider;
use crate::catalog::{CatalogFilter, CatalogProvider};
use crate::config::{FilterConfig, HubConfig};
use crate::error::{CallError, LoadError};
use crate::function::{Function, FunctionCollection};
use crate::http::HttpTransport;
use crate::openapi::OpenApiProvider;
use crate::provider::Provider;
use indexmap::IndexMap;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Selection criteria. Criteria combine by inclusive-or; with none active
/// every function is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistryFilter {
    /// Collection names.
    pub collections: Vec<String>,
    /// Catalog root hostnames, given as URLs or bare hostnames.
    pub hostnames: Vec<String>,
    /// Concrete URLs matched against catalog URL templates.
    pub endpoint_urls: Vec<String>,
}

impl RegistryFilter {
    pub fn is_active(&self) -> bool {
        !(self.collections.is_empty() && self.hostnames.is_empty() && self.endpoint_urls.is_empty())
    }
}

impl From<&FilterConfig> for RegistryFilter {
    fn from(config: &FilterConfig) -> Self {
        Self {
            collections: config.collections.clone(),
            hostnames: config.hostnames.clone(),
            endpoint_urls: config.endpoint_urls.clone(),
        }
    }
}

/// Immutable name -> function lookup.
#[derive(Debug, Default)]
pub struct Registry {
    functions: IndexMap<String, Arc<Function>>,
    collections: IndexMap<String, FunctionCollection>,
}

impl Registry {
    /// Aggregate `providers` in order. A later provider's function replaces
    /// an earlier one with the same name.
    pub fn new(providers: &[Box<dyn Provider>], filter: &RegistryFilter) -> Self {
        let mut all: IndexMap<String, Arc<Function>> = IndexMap::new();
        let mut collections: IndexMap<String, FunctionCollection> = IndexMap::new();

        for provider in providers {
            for function in provider.functions() {
                if all
                    .insert(function.name().to_string(), function.clone())
                    .is_some()
                {
                    warn!(
                        "Function {} from provider {} replaces an earlier definition",
                        function.name(),
                        provider.name()
                    );
                }
            }
            for collection in provider.collections() {
                collections
                    .entry(collection.name.clone())
                    .and_modify(|c| {
                        c.function_names
                            .extend(collection.function_names.iter().cloned());
                        if c.description.is_none() {
                            c.description = collection.description.clone();
                        }
                    })
                    .or_insert_with(|| collection.clone());
            }
        }

        let functions = if filter.is_active() {
            Self::select(all, &collections, filter)
        } else {
            all
        };

        info!(
            "Registry: {} functions, {} collections",
            functions.len(),
            collections.len()
        );
        Self {
            functions,
            collections,
        }
    }

    fn select(
        all: IndexMap<String, Arc<Function>>,
        collections: &IndexMap<String, FunctionCollection>,
        filter: &RegistryFilter,
    ) -> IndexMap<String, Arc<Function>> {
        let mut in_collections: HashSet<&str> = HashSet::new();
        for name in &filter.collections {
            match collections.get(name) {
                Some(c) => in_collections.extend(c.function_names.iter().map(String::as_str)),
                None => warn!("Unknown collection in filter: {}", name),
            }
        }
        let catalog = CatalogFilter::new(&filter.hostnames, &filter.endpoint_urls);

        all.into_iter()
            .filter(|(name, function)| {
                let keep = in_collections.contains(name.as_str())
                    || function
                        .catalog_endpoint()
                        .map(|endpoint| catalog.matches(endpoint))
                        .unwrap_or(false);
                if !keep {
                    debug!("Filtered out {}", name);
                }
                keep
            })
            .collect()
    }

    /// Builtin, configured OpenAPI, and configured catalog providers, in
    /// that order, narrowed by the configured filters.
    pub fn standard(config: &HubConfig, transport: Arc<dyn HttpTransport>) -> Result<Self, LoadError> {
        Self::standard_with_filter(config, transport, &RegistryFilter::from(&config.filters))
    }

    /// Like [`standard`](Self::standard) with an explicit filter.
    pub fn standard_with_filter(
        config: &HubConfig,
        transport: Arc<dyn HttpTransport>,
        filter: &RegistryFilter,
    ) -> Result<Self, LoadError> {
        let mut providers: Vec<Box<dyn Provider>> = vec![
            Box::new(BuiltinProvider::new()),
            Box::new(OpenApiProvider::from_config(config, transport.clone())?),
        ];
        if let Some(catalog) = CatalogProvider::from_config(config, transport)? {
            providers.push(Box::new(catalog));
        }
        Ok(Self::new(&providers, filter))
    }

    /// Look up a listed function.
    pub fn get(&self, name: &str) -> Result<&Arc<Function>, CallError> {
        self.functions
            .get(name)
            .ok_or_else(|| CallError::UnknownFunction(name.to_string()))
    }

    /// Listed functions in first-encounter order.
    pub fn list(&self) -> impl Iterator<Item = &Arc<Function>> {
        self.functions.values()
    }

    /// Every collection across providers, unioned by name.
    pub fn collections(&self) -> impl Iterator<Item = &FunctionCollection> {
        self.collections.values()
    }

    pub fn collection(&self, name: &str) -> Option<&FunctionCollection> {
        self.collections.get(name)
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}
