//! Configuration schema for toolhub.toml.

use crate::auth::{CatalogAuth, OpenApiAuth};
use crate::openapi::DescribeLimits;
use serde::{Deserialize, Serialize};

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HubConfig {
    /// Log level (debug, info, warn, error).
    pub log_level: String,

    /// HTTP transport settings.
    pub http: HttpConfig,

    /// Response-description limits for the OpenAPI parser.
    pub describe: DescribeLimits,

    /// LLM protocol limits.
    pub hub: HubLimits,

    /// Schema-described APIs to load.
    pub openapi: Vec<OpenApiSource>,

    /// Pre-built endpoint catalog, if any.
    pub catalog: Option<CatalogConfig>,

    /// Registry selection filters.
    pub filters: FilterConfig,

    /// Credentials. Absent means the caller must supply them explicitly.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth: Option<AuthConfig>,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            log_level: "info".into(),
            http: HttpConfig::default(),
            describe: DescribeLimits::default(),
            hub: HubLimits::default(),
            openapi: Vec::new(),
            catalog: None,
            filters: FilterConfig::default(),
            auth: None,
        }
    }
}

impl HubConfig {
    /// Resolve a path that may contain `~` to an absolute path.
    pub fn resolve_path(&self, path: &str) -> String {
        shellexpand::tilde(path).into_owned()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { timeout_secs: 30 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HubLimits {
    /// Maximum number of tools the LLM protocol accepts.
    pub max_tools: usize,

    /// Maximum characters of a tool output before truncation.
    pub max_result_length: usize,
}

impl Default for HubLimits {
    fn default() -> Self {
        Self {
            max_tools: 127,
            max_result_length: 1024,
        }
    }
}

/// One schema-described API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenApiSource {
    /// API identifier, used as function-name prefix and collection name.
    pub api: String,

    /// Schema document path or URL (JSON or YAML).
    pub schema: String,

    /// Base URL requests are sent to.
    pub base_url: String,

    /// Optional allow-list of generated function names.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Path to the catalog table (JSON).
    pub path: String,

    /// Header carrying the catalog API key.
    #[serde(default = "default_key_header")]
    pub key_header: String,

    /// Header carrying the endpoint's root hostname.
    #[serde(default = "default_host_header")]
    pub host_header: String,
}

fn default_key_header() -> String {
    "X-RapidAPI-Key".into()
}

fn default_host_header() -> String {
    "X-RapidAPI-Host".into()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub collections: Vec<String>,
    pub hostnames: Vec<String>,
    pub endpoint_urls: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub openapi: Option<OpenApiAuth>,
    pub catalog: Option<CatalogAuth>,
}
