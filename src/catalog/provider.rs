//! Provider over the catalog table.

use super::filter::CatalogFilter;
use super::invoker::{CatalogHeaders, CatalogInvoker};
use super::table::CatalogTable;
use crate::config::{CatalogConfig, HubConfig};
use crate::error::LoadError;
use crate::function::{Function, FunctionCollection, FunctionOrigin};
use crate::http::HttpTransport;
use crate::provider::Provider;
use indexmap::IndexMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

pub struct CatalogProvider {
    functions: Vec<Arc<Function>>,
    collections: Vec<FunctionCollection>,
}

impl CatalogProvider {
    /// Keep the table entries passing `filter` (all of them when it is
    /// inactive). Later entries with a duplicate name replace earlier ones.
    pub fn new(
        table: CatalogTable,
        filter: &CatalogFilter,
        headers: CatalogHeaders,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        let (entries, collections) = table.into_parts();
        let total = entries.len();

        let mut by_name: IndexMap<String, Arc<Function>> = IndexMap::new();
        for entry in entries {
            if filter.is_active() && !filter.matches(&entry.endpoint) {
                continue;
            }
            let invoker = CatalogInvoker::new(entry.endpoint.clone(), headers.clone(), transport.clone());
            let function = Function::new(entry.spec, FunctionOrigin::Catalog(entry.endpoint), invoker);
            if let Some(previous) = by_name.insert(function.name().to_string(), Arc::new(function)) {
                debug!("Catalog entry {} replaced a duplicate", previous.name());
            }
        }

        let collections: Vec<FunctionCollection> = collections
            .into_iter()
            .map(|c| {
                let names = c
                    .function_names
                    .into_iter()
                    .filter(|n| by_name.contains_key(n));
                FunctionCollection::new(c.name, c.description, names)
            })
            .filter(|c| !c.function_names.is_empty())
            .collect();

        info!(
            "Catalog provider: kept {} of {} functions in {} collections",
            by_name.len(),
            total,
            collections.len()
        );
        Self {
            functions: by_name.into_values().collect(),
            collections,
        }
    }

    pub fn from_path(
        path: &Path,
        filter: &CatalogFilter,
        headers: CatalogHeaders,
        transport: Arc<dyn HttpTransport>,
    ) -> Result<Self, LoadError> {
        let table = CatalogTable::from_path(path)?;
        Ok(Self::new(table, filter, headers, transport))
    }

    /// Load the whole `[catalog]` table; selection is left to the registry.
    /// `Ok(None)` when no catalog is configured.
    pub fn from_config(config: &HubConfig, transport: Arc<dyn HttpTransport>) -> Result<Option<Self>, LoadError> {
        let Some(catalog) = &config.catalog else {
            return Ok(None);
        };
        let path = config.resolve_path(&catalog.path);
        Self::from_path(
            Path::new(&path),
            &CatalogFilter::default(),
            headers_from(catalog),
            transport,
        )
        .map(Some)
    }
}

fn headers_from(config: &CatalogConfig) -> CatalogHeaders {
    CatalogHeaders {
        key_header: config.key_header.clone(),
        host_header: config.host_header.clone(),
    }
}

impl Provider for CatalogProvider {
    fn name(&self) -> &str {
        "catalog"
    }

    fn functions(&self) -> &[Arc<Function>] {
        &self.functions
    }

    fn collections(&self) -> &[FunctionCollection] {
        &self.collections
    }
}
