//! Where a function came from, used for filtering and catalog identity.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FunctionOrigin {
    /// Hand-declared local function.
    Builtin,
    /// Endpoint of a schema-described API.
    OpenApi(OpenApiEndpoint),
    /// Endpoint from the pre-harvested catalog.
    Catalog(CatalogEndpoint),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OpenApiEndpoint {
    pub api: String,
    /// Path template, e.g. `/entities/organizations/{entity_id}`.
    pub endpoint: String,
    /// Lowercase HTTP method.
    pub method: String,
}

/// A catalog endpoint: a verb against a root hostname and a URL template.
///
/// Identity is `(category, api, endpoint, method)`; two catalog entries with
/// the same display name but different identities stay distinct.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEndpoint {
    pub category: String,
    pub api: String,
    pub endpoint: String,
    pub method: String,
    /// Hostname the endpoint lives on, sent as the host header.
    pub root_url: String,
    /// Full URL with `{param}` placeholders.
    pub url_template: String,
    #[serde(default)]
    pub required_params: BTreeSet<String>,
    #[serde(default)]
    pub conditional_params: BTreeSet<String>,
}

impl CatalogEndpoint {
    fn identity(&self) -> (&str, &str, &str, &str) {
        (&self.category, &self.api, &self.endpoint, &self.method)
    }

    /// Collection name grouping this endpoint with its API siblings.
    pub fn collection_name(&self) -> String {
        format!("{}.{}", self.category, self.api)
    }
}

impl PartialEq for CatalogEndpoint {
    fn eq(&self, other: &Self) -> bool {
        self.identity() == other.identity()
    }
}

impl Eq for CatalogEndpoint {}

impl Hash for CatalogEndpoint {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity().hash(state);
    }
}
