//! Loading an OpenAPI document and navigating its paths and components.

use crate::error::LoadError;
use crate::http::{HttpRequest, HttpTransport};
use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// HTTP methods recognised in a path item, in emission order.
const METHODS: &[&str] = &["get", "put", "post", "delete", "options", "head", "patch", "trace"];

/// Where a schema document lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaSource {
    Path(PathBuf),
    Url(String),
}

impl SchemaSource {
    /// Interpret `s` as a URL when it has an http(s) scheme, else as a path.
    pub fn parse(s: &str) -> Self {
        if s.starts_with("http://") || s.starts_with("https://") {
            Self::Url(s.to_string())
        } else {
            Self::Path(PathBuf::from(shellexpand::tilde(s).into_owned()))
        }
    }
}

impl fmt::Display for SchemaSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(p) => write!(f, "{}", p.display()),
            Self::Url(u) => f.write_str(u),
        }
    }
}

/// One operation: a method on a path item.
#[derive(Debug, Clone, Copy)]
pub struct Operation<'a> {
    pub path: &'a str,
    pub method: &'a str,
    pub path_item: &'a Value,
    pub operation: &'a Value,
}

impl<'a> Operation<'a> {
    pub fn summary(&self) -> Option<&'a str> {
        self.operation
            .get("summary")
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
    }

    pub fn description(&self) -> Option<&'a str> {
        self.operation
            .get("description")
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
    }
}

/// A parsed OpenAPI document.
#[derive(Debug, Clone)]
pub struct OpenApiDocument {
    source_name: String,
    root: Value,
}

impl OpenApiDocument {
    /// Wrap an already-parsed document, checking it has a `paths` object.
    pub fn from_value(source_name: impl Into<String>, root: Value) -> Result<Self, LoadError> {
        let source_name = source_name.into();
        if !root.get("paths").map(Value::is_object).unwrap_or(false) {
            return Err(LoadError::InvalidDocument {
                source_name,
                reason: "missing 'paths' object".into(),
            });
        }
        Ok(Self { source_name, root })
    }

    /// Parse JSON or YAML text.
    pub fn parse(source_name: impl Into<String>, text: &str) -> Result<Self, LoadError> {
        let source_name = source_name.into();
        let root: Value = if text.trim_start().starts_with('{') {
            serde_json::from_str(text).map_err(|e| LoadError::Parse {
                source_name: source_name.clone(),
                reason: e.to_string(),
            })?
        } else {
            let yaml: serde_yaml::Value =
                serde_yaml::from_str(text).map_err(|e| LoadError::Parse {
                    source_name: source_name.clone(),
                    reason: e.to_string(),
                })?;
            yaml_to_json(yaml)
        };
        Self::from_value(source_name, root)
    }

    pub fn from_path(path: &Path) -> Result<Self, LoadError> {
        let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(path.display().to_string(), &text)
    }

    /// Fetch the document with a GET through `transport`.
    pub fn from_url(url: &str, transport: &dyn HttpTransport) -> Result<Self, LoadError> {
        let resp = transport
            .send(&HttpRequest::get(url))
            .map_err(|e| LoadError::Fetch {
                url: url.to_string(),
                reason: e.to_string(),
            })?;
        if !resp.is_success() {
            return Err(LoadError::Fetch {
                url: url.to_string(),
                reason: format!("status {}", resp.status),
            });
        }
        Self::parse(url, &resp.body)
    }

    pub fn load(source: &SchemaSource, transport: &dyn HttpTransport) -> Result<Self, LoadError> {
        let doc = match source {
            SchemaSource::Path(path) => Self::from_path(path)?,
            SchemaSource::Url(url) => Self::from_url(url, transport)?,
        };
        info!("Loaded OpenAPI document {}", doc.source_name);
        Ok(doc)
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    /// All operations in document order.
    pub fn operations(&self) -> Vec<Operation<'_>> {
        let Some(paths) = self.root.get("paths").and_then(Value::as_object) else {
            return Vec::new();
        };

        let mut ops = Vec::new();
        for (path, item) in paths {
            let item = self.resolve(item);
            for &method in METHODS {
                if let Some(operation) = item.get(method).filter(|v| v.is_object()) {
                    ops.push(Operation {
                        path,
                        method,
                        path_item: item,
                        operation,
                    });
                }
            }
        }
        debug!("{}: {} operations", self.source_name, ops.len());
        ops
    }

    /// Look up a local `$ref` such as `#/components/schemas/Organization`.
    pub fn lookup_ref(&self, reference: &str) -> Option<&Value> {
        let pointer = reference.strip_prefix('#')?;
        self.root.pointer(pointer)
    }

    /// Follow `$ref` chains until a non-reference value; unknown refs resolve
    /// to the reference object itself.
    pub fn resolve<'a>(&'a self, value: &'a Value) -> &'a Value {
        let mut current = value;
        for _ in 0..16 {
            match current
                .get("$ref")
                .and_then(Value::as_str)
                .and_then(|r| self.lookup_ref(r))
            {
                Some(next) => current = next,
                None => break,
            }
        }
        current
    }
}

/// Convert YAML to JSON, stringifying non-string mapping keys such as
/// unquoted response codes.
fn yaml_to_json(value: serde_yaml::Value) -> Value {
    use serde_yaml::Value as Yaml;
    match value {
        Yaml::Null => Value::Null,
        Yaml::Bool(b) => Value::Bool(b),
        Yaml::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::from(i)
            } else if let Some(u) = n.as_u64() {
                Value::from(u)
            } else {
                n.as_f64().map(Value::from).unwrap_or(Value::Null)
            }
        }
        Yaml::String(s) => Value::String(s),
        Yaml::Sequence(items) => Value::Array(items.into_iter().map(yaml_to_json).collect()),
        Yaml::Mapping(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (yaml_key(k), yaml_to_json(v)))
                .collect(),
        ),
        Yaml::Tagged(tagged) => yaml_to_json(tagged.value),
    }
}

fn yaml_key(key: serde_yaml::Value) -> String {
    use serde_yaml::Value as Yaml;
    match key {
        Yaml::String(s) => s,
        Yaml::Bool(b) => b.to_string(),
        Yaml::Number(n) => n.to_string(),
        Yaml::Null => "null".into(),
        other => serde_yaml::to_string(&other)
            .map(|s| s.trim().to_string())
            .unwrap_or_default(),
    }
}

/// The `$ref` string of a reference object, if `value` is one.
pub fn reference_of(value: &Value) -> Option<&str> {
    value.get("$ref").and_then(Value::as_str)
}

/// Component name of a reference: the last pointer segment.
pub fn ref_name(reference: &str) -> &str {
    reference.rsplit('/').next().unwrap_or(reference)
}
