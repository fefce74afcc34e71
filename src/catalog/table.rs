//! The pre-built catalog table: category -> api -> endpoint entries.

use crate::error::LoadError;
use crate::function::{CatalogEndpoint, FunctionCollection, FunctionSpec};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{info, warn};

/// One table entry as serialized: spec fields plus endpoint details.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    #[serde(flatten)]
    pub spec: FunctionSpec,
    pub endpoint: String,
    pub method: String,
    pub root_url: String,
    pub url_template: String,
    #[serde(default)]
    pub required_params: BTreeSet<String>,
    #[serde(default)]
    pub conditional_params: BTreeSet<String>,
}

/// A validated entry with its catalog identity.
#[derive(Debug, Clone)]
pub struct CatalogFunction {
    pub spec: FunctionSpec,
    pub endpoint: CatalogEndpoint,
}

#[derive(Debug, Clone, Default)]
pub struct CatalogTable {
    functions: Vec<CatalogFunction>,
    collections: Vec<FunctionCollection>,
}

impl CatalogTable {
    pub fn from_path(path: &Path) -> Result<Self, LoadError> {
        let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let table = Self::parse(&path.display().to_string(), &text)?;
        info!(
            "Loaded {} catalog functions in {} collections from {}",
            table.functions.len(),
            table.collections.len(),
            path.display()
        );
        Ok(table)
    }

    /// Parse table JSON. Entries that do not deserialize or validate are
    /// skipped with a warning.
    pub fn parse(source_name: &str, text: &str) -> Result<Self, LoadError> {
        let raw: IndexMap<String, IndexMap<String, Vec<Value>>> =
            serde_json::from_str(text).map_err(|e| LoadError::Parse {
                source_name: source_name.to_string(),
                reason: e.to_string(),
            })?;

        let mut table = Self::default();
        for (category, apis) in raw {
            for (api, entries) in apis {
                let mut names = BTreeSet::new();
                for value in entries {
                    match Self::entry(&category, &api, value) {
                        Ok(function) => {
                            names.insert(function.spec.name.clone());
                            table.functions.push(function);
                        }
                        Err(reason) => warn!("{}: skipping entry in {}.{}: {}", source_name, category, api, reason),
                    }
                }
                table
                    .collections
                    .push(FunctionCollection::new(format!("{}.{}", category, api), None, names));
            }
        }
        Ok(table)
    }

    fn entry(category: &str, api: &str, value: Value) -> Result<CatalogFunction, String> {
        let entry: CatalogEntry = serde_json::from_value(value).map_err(|e| e.to_string())?;
        entry.spec.validate().map_err(|e| e.to_string())?;
        Ok(CatalogFunction {
            spec: entry.spec,
            endpoint: CatalogEndpoint {
                category: category.to_string(),
                api: api.to_string(),
                endpoint: entry.endpoint,
                method: entry.method,
                root_url: entry.root_url,
                url_template: entry.url_template,
                required_params: entry.required_params,
                conditional_params: entry.conditional_params,
            },
        })
    }

    pub fn functions(&self) -> &[CatalogFunction] {
        &self.functions
    }

    /// `<category>.<api>` collections, in table order.
    pub fn collections(&self) -> &[FunctionCollection] {
        &self.collections
    }

    pub fn into_parts(self) -> (Vec<CatalogFunction>, Vec<FunctionCollection>) {
        (self.functions, self.collections)
    }
}
