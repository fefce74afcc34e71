//! Capability-scoped credentials passed explicitly into every call.
//!
//! Functions never carry credentials in their specs. Each invocation receives
//! an [`AuthContext`] and resolves the sub-context for its integration kind,
//! failing with [`AuthError::MissingCredential`] when it is absent.

use crate::config::HubConfig;
use crate::error::AuthError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Static headers keyed by header name.
pub type Headers = BTreeMap<String, String>;

/// Integration kinds that may require credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegrationKind {
    /// Schema-described (OpenAPI) APIs.
    OpenApi,
    /// Catalog-described third-party endpoints.
    Catalog,
}

impl fmt::Display for IntegrationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OpenApi => write!(f, "openapi"),
            Self::Catalog => write!(f, "catalog"),
        }
    }
}

/// Credentials for schema-described APIs: static headers per API identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenApiAuth {
    pub api_to_headers: BTreeMap<String, Headers>,
}

impl OpenApiAuth {
    /// Headers configured for `api`, empty if none.
    pub fn headers_for(&self, api: &str) -> Headers {
        self.api_to_headers.get(api).cloned().unwrap_or_default()
    }
}

/// Credentials for catalog endpoints: one key plus per-hostname overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogAuth {
    pub api_key: String,
    pub host_to_headers: BTreeMap<String, Headers>,
}

impl CatalogAuth {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            host_to_headers: BTreeMap::new(),
        }
    }

    /// Header overrides configured for `hostname`, empty if none.
    pub fn headers_for(&self, hostname: &str) -> Headers {
        self.host_to_headers.get(hostname).cloned().unwrap_or_default()
    }
}

/// A resolved sub-context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Credentials<'a> {
    OpenApi(&'a OpenApiAuth),
    Catalog(&'a CatalogAuth),
}

/// Credential bundle with one independently optional field per integration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    #[serde(default)]
    pub openapi: Option<OpenApiAuth>,
    #[serde(default)]
    pub catalog: Option<CatalogAuth>,
}

impl AuthContext {
    /// Context without any credentials, enough for builtin functions.
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn with_openapi(mut self, openapi: OpenApiAuth) -> Self {
        self.openapi = Some(openapi);
        self
    }

    pub fn with_catalog(mut self, catalog: CatalogAuth) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Build the context from loaded configuration.
    ///
    /// Fails with [`AuthError::Configuration`] when the configuration carries
    /// no `[auth]` section at all, or a catalog section without a key, rather
    /// than defaulting to empty credentials.
    pub fn from_config(config: &HubConfig) -> Result<Self, AuthError> {
        let auth = config.auth.as_ref().ok_or_else(|| {
            AuthError::Configuration("no [auth] section in configuration".into())
        })?;

        if let Some(catalog) = &auth.catalog {
            if catalog.api_key.trim().is_empty() {
                return Err(AuthError::Configuration(
                    "[auth.catalog] is present but api_key is empty".into(),
                ));
            }
        }

        Ok(Self {
            openapi: auth.openapi.clone(),
            catalog: auth.catalog.clone(),
        })
    }

    /// Resolve the sub-context for `kind`.
    pub fn resolve(&self, kind: IntegrationKind) -> Result<Credentials<'_>, AuthError> {
        match kind {
            IntegrationKind::OpenApi => self.openapi().map(Credentials::OpenApi),
            IntegrationKind::Catalog => self.catalog().map(Credentials::Catalog),
        }
    }

    pub fn openapi(&self) -> Result<&OpenApiAuth, AuthError> {
        self.openapi
            .as_ref()
            .ok_or(AuthError::MissingCredential(IntegrationKind::OpenApi))
    }

    pub fn catalog(&self) -> Result<&CatalogAuth, AuthError> {
        self.catalog
            .as_ref()
            .ok_or(AuthError::MissingCredential(IntegrationKind::Catalog))
    }
}
