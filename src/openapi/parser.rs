//! Turn an OpenAPI document into function specs, one per usable endpoint.

use super::describe::{fit_length, DescribeLimits, ResponseDescriber};
use super::document::{OpenApiDocument, Operation, SchemaSource};
use super::naming::function_name;
use crate::error::{LoadError, SpecError};
use crate::function::{FunctionSpec, OpenApiEndpoint, ParameterSpec, ReturnSpec, ValueType};
use crate::http::HttpTransport;
use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, info, warn};

/// Where a parameter is sent. Header and cookie parameters are not exposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterLocation {
    Path,
    Query,
}

/// A parameter as declared in the document, before type mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct RawParameter {
    pub name: String,
    pub location: ParameterLocation,
    /// Parameter schema; for Swagger-style declarations, the parameter itself.
    pub schema: Value,
    pub description: Option<String>,
    pub required: bool,
}

/// Per-API hooks applied before an endpoint is converted.
pub trait EndpointPolicy: Send + Sync {
    /// Whether to produce a function for `operation`.
    fn include(&self, _operation: &Operation<'_>) -> bool {
        true
    }

    /// Rewrite a parameter, or drop it by returning `None`.
    fn map_parameter(&self, _operation: &Operation<'_>, parameter: RawParameter) -> Option<RawParameter> {
        Some(parameter)
    }
}

/// Keeps every endpoint and parameter unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultPolicy;

impl EndpointPolicy for DefaultPolicy {}

/// A generated spec plus the endpoint it calls.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenApiFunctionSpec {
    pub spec: FunctionSpec,
    pub endpoint: OpenApiEndpoint,
}

pub struct Parser {
    api: String,
    document: OpenApiDocument,
    limits: DescribeLimits,
    policy: Box<dyn EndpointPolicy>,
}

impl Parser {
    pub fn new(api: impl Into<String>, document: OpenApiDocument) -> Self {
        Self {
            api: api.into(),
            document,
            limits: DescribeLimits::default(),
            policy: Box::new(DefaultPolicy),
        }
    }

    /// Load the document from `source` and wrap it.
    pub fn from_source(
        api: impl Into<String>,
        source: &SchemaSource,
        transport: &dyn HttpTransport,
    ) -> Result<Self, LoadError> {
        let document = OpenApiDocument::load(source, transport)?;
        Ok(Self::new(api, document))
    }

    pub fn with_limits(mut self, limits: DescribeLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_policy(mut self, policy: impl EndpointPolicy + 'static) -> Self {
        self.policy = Box::new(policy);
        self
    }

    pub fn api(&self) -> &str {
        &self.api
    }

    /// Convert every endpoint. Endpoints that fail to convert are skipped.
    pub fn fn_specs(&self) -> Vec<OpenApiFunctionSpec> {
        let mut specs = Vec::new();
        for operation in self.document.operations() {
            match self.fn_spec(&operation) {
                Ok(Some(spec)) => specs.push(spec),
                Ok(None) => debug!(
                    "{}: excluded {} {}",
                    self.api, operation.method, operation.path
                ),
                Err(e) => warn!(
                    "{}: skipping {} {}: {}",
                    self.api, operation.method, operation.path, e
                ),
            }
        }
        info!(
            "Parsed {} functions for API {} from {}",
            specs.len(),
            self.api,
            self.document.source_name()
        );
        specs
    }

    fn fn_spec(&self, operation: &Operation<'_>) -> Result<Option<OpenApiFunctionSpec>, SpecError> {
        if !self.policy.include(operation) {
            return Ok(None);
        }

        let name = function_name(&self.api, operation.path, operation.method);

        let mut parameters = Vec::new();
        for raw in self.raw_parameters(operation) {
            let Some(raw) = self.policy.map_parameter(operation, raw) else {
                continue;
            };
            match self.map_type(&raw.schema) {
                Some(value_type) => {
                    let description = raw
                        .description
                        .filter(|d| !d.trim().is_empty())
                        .unwrap_or_else(|| raw.name.clone());
                    parameters.push(ParameterSpec::new(
                        raw.name,
                        value_type,
                        description,
                        raw.required,
                    ));
                }
                None => warn!(
                    "{}: dropping parameter {} of {}: unsupported type",
                    self.api, raw.name, name
                ),
            }
        }

        let returns = ReturnSpec::new(ValueType::String, self.response_description(operation)?);
        let description = operation
            .summary()
            .or_else(|| operation.description())
            .map(str::to_string);

        let spec = FunctionSpec::new(name, parameters, returns, description)?;
        Ok(Some(OpenApiFunctionSpec {
            spec,
            endpoint: OpenApiEndpoint {
                api: self.api.clone(),
                endpoint: operation.path.to_string(),
                method: operation.method.to_string(),
            },
        }))
    }

    /// Path-item parameters merged with operation parameters (the operation
    /// wins), path parameters first, each group in declaration order.
    fn raw_parameters(&self, operation: &Operation<'_>) -> Vec<RawParameter> {
        let mut merged: IndexMap<(ParameterLocation, String), RawParameter> = IndexMap::new();
        let declared = [operation.path_item, operation.operation]
            .into_iter()
            .filter_map(|v| v.get("parameters").and_then(Value::as_array))
            .flatten();

        for param in declared {
            let param = self.document.resolve(param);
            let Some(name) = param.get("name").and_then(Value::as_str) else {
                continue;
            };
            let location = match param.get("in").and_then(Value::as_str) {
                Some("path") => ParameterLocation::Path,
                Some("query") => ParameterLocation::Query,
                other => {
                    debug!("{}: ignoring {:?} parameter {}", self.api, other, name);
                    continue;
                }
            };
            let schema = param.get("schema").cloned().unwrap_or_else(|| param.clone());
            let required = location == ParameterLocation::Path
                || param.get("required").and_then(Value::as_bool).unwrap_or(false);
            let raw = RawParameter {
                name: name.to_string(),
                location,
                schema,
                description: param
                    .get("description")
                    .and_then(Value::as_str)
                    .map(str::to_string),
                required,
            };
            merged.insert((location, raw.name.clone()), raw);
        }

        let (mut path, query): (Vec<_>, Vec<_>) = merged
            .into_values()
            .partition(|p| p.location == ParameterLocation::Path);
        path.extend(query);
        path
    }

    /// Map a parameter schema to a semantic type, if it has one.
    pub fn map_type(&self, schema: &Value) -> Option<ValueType> {
        self.map_type_at(schema, 0)
    }

    fn map_type_at(&self, schema: &Value, depth: usize) -> Option<ValueType> {
        if depth > 8 {
            return None;
        }
        if let Some(reference) = schema.get("$ref").and_then(Value::as_str) {
            let target = self.document.lookup_ref(reference)?;
            return self.map_type_at(target, depth + 1);
        }
        if let Some(all_of) = schema.get("allOf").and_then(Value::as_array) {
            return match all_of.as_slice() {
                [only] => self.map_type_at(only, depth + 1),
                _ => None,
            };
        }

        match schema.get("type").and_then(Value::as_str) {
            Some("string") => Some(match schema.get("format").and_then(Value::as_str) {
                Some("date") => ValueType::Date,
                Some("date-time") => ValueType::DateTime,
                _ => ValueType::String,
            }),
            Some("integer") => Some(ValueType::Integer),
            Some("number") => Some(ValueType::Number),
            Some("boolean") => Some(ValueType::Boolean),
            Some("array") => {
                let items = schema.get("items")?;
                self.map_type_at(items, depth + 1).map(ValueType::list_of)
            }
            Some(_) => None,
            None => {
                let values = schema.get("enum").and_then(Value::as_array)?;
                values
                    .iter()
                    .all(Value::is_string)
                    .then_some(ValueType::String)
            }
        }
    }

    /// Describe the first success response, `"unspecified"` when the
    /// operation declares no response schema.
    fn response_description(&self, operation: &Operation<'_>) -> Result<String, SpecError> {
        let Some(schema) = self.response_schema(operation) else {
            return Ok(fit_length("unspecified", self.limits.max_length));
        };
        ResponseDescriber::new(&self.document, &self.limits).describe_response(schema)
    }

    fn response_schema<'a>(&'a self, operation: &Operation<'a>) -> Option<&'a Value> {
        let responses = operation.operation.get("responses")?.as_object()?;

        let mut success: Vec<(u16, &Value)> = responses
            .iter()
            .filter_map(|(code, r)| code.parse::<u16>().ok().map(|c| (c, r)))
            .filter(|(code, _)| (200..300).contains(code))
            .collect();
        success.sort_by_key(|(code, _)| *code);

        let response = success
            .first()
            .map(|(_, r)| *r)
            .or_else(|| responses.get("default"))?;
        let response = self.document.resolve(response);

        if let Some(content) = response.get("content").and_then(Value::as_object) {
            let media = content
                .get("application/json")
                .or_else(|| {
                    content
                        .iter()
                        .find(|(k, _)| k.contains("json"))
                        .map(|(_, v)| v)
                })
                .or_else(|| content.values().next())?;
            return media.get("schema");
        }
        response.get("schema")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parser(doc: Value) -> Parser {
        Parser::new("crunchbase", OpenApiDocument::from_value("test", doc).unwrap())
    }

    fn organizations_doc() -> Value {
        json!({
            "paths": {
                "/entities/organizations/{entity_id}": {
                    "parameters": [
                        {"name": "entity_id", "in": "path", "schema": {"type": "string"}},
                        {"name": "card_ids", "in": "query", "description": "old",
                         "schema": {"type": "string"}}
                    ],
                    "get": {
                        "summary": "Lookup Organization",
                        "parameters": [
                            {"name": "field_ids", "in": "query",
                             "schema": {"type": "array", "items": {"type": "string"}}},
                            {"name": "card_ids", "in": "query", "description": "Cards to include",
                             "schema": {"type": "string"}},
                            {"name": "X-cb-user-key", "in": "header", "schema": {"type": "string"}},
                            {"name": "since", "in": "query",
                             "schema": {"type": "string", "format": "date"}},
                            {"name": "filter", "in": "query",
                             "schema": {"type": "object", "properties": {}}},
                            {"$ref": "#/components/parameters/Limit"}
                        ],
                        "responses": {
                            "default": {"description": "error"},
                            "201": {"description": "created",
                                    "content": {"application/json": {"schema": {"type": "string"}}}},
                            "200": {"description": "ok",
                                    "content": {"application/json": {
                                        "schema": {"$ref": "#/components/schemas/Organization"}}}}
                        }
                    }
                }
            },
            "components": {
                "parameters": {
                    "Limit": {"name": "limit", "in": "query", "required": true,
                              "schema": {"$ref": "#/components/schemas/Limit"}}
                },
                "schemas": {
                    "Limit": {"type": "integer"},
                    "Organization": {"type": "object", "properties": {
                        "uuid": {"type": "string"},
                        "name": {"type": "string"}
                    }}
                }
            }
        })
    }

    #[test]
    fn converts_an_endpoint() {
        let specs = parser(organizations_doc()).fn_specs();
        assert_eq!(specs.len(), 1);
        let OpenApiFunctionSpec { spec, endpoint } = &specs[0];

        assert_eq!(spec.name, "crunchbase_entities_organizations_entity_id_get");
        assert_eq!(spec.description.as_deref(), Some("Lookup Organization"));
        assert_eq!(endpoint.endpoint, "/entities/organizations/{entity_id}");
        assert_eq!(endpoint.method, "get");

        let names: Vec<&str> = spec.parameters.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["entity_id", "card_ids", "field_ids", "since", "limit"]);

        let entity_id = spec.parameter("entity_id").unwrap();
        assert!(entity_id.required);
        assert_eq!(entity_id.description.as_deref(), Some("entity_id"));

        let card_ids = spec.parameter("card_ids").unwrap();
        assert_eq!(card_ids.description.as_deref(), Some("Cards to include"));
        assert!(!card_ids.required);

        assert_eq!(
            spec.parameter("field_ids").unwrap().value_type,
            ValueType::list_of(ValueType::String)
        );
        assert_eq!(spec.parameter("since").unwrap().value_type, ValueType::Date);
        let limit = spec.parameter("limit").unwrap();
        assert_eq!(limit.value_type, ValueType::Integer);
        assert!(limit.required);

        assert_eq!(spec.returns.value_type, ValueType::String);
        assert_eq!(spec.returns.description, "Organization{uuid, name}");
    }

    #[test]
    fn swagger_style_parameters_and_responses() {
        let p = parser(json!({
            "paths": {"/v2/orders": {"get": {
                "parameters": [
                    {"name": "status", "in": "query", "type": "string", "enum": ["open", "closed"]},
                    {"name": "after", "in": "query", "type": "string", "format": "date-time"}
                ],
                "responses": {"200": {"schema": {"type": "array", "items": {"type": "object",
                    "properties": {"id": {"type": "string"}}}}}}
            }}}
        }));
        let specs = p.fn_specs();
        let spec = &specs[0].spec;
        assert_eq!(spec.parameter("status").unwrap().value_type, ValueType::String);
        assert_eq!(spec.parameter("after").unwrap().value_type, ValueType::DateTime);
        assert_eq!(spec.returns.description, "[{id}]");
        assert_eq!(spec.description, None);
    }

    #[test]
    fn missing_response_schema_respects_length_limit() {
        let p = parser(json!({
            "paths": {"/v2/orders/{order_id}": {"delete": {
                "parameters": [{"name": "order_id", "in": "path", "schema": {"type": "string"}}],
                "responses": {"204": {"description": "No content"}}
            }}}
        }))
        .with_limits(DescribeLimits {
            max_length: 4,
            ..DescribeLimits::default()
        });
        let specs = p.fn_specs();
        assert_eq!(specs[0].spec.returns.description, "u...");
    }

    #[test]
    fn unsupported_reference_skips_only_that_endpoint() {
        let p = parser(json!({
            "paths": {
                "/broken": {"get": {"responses": {"200": {"content": {"application/json": {
                    "schema": {"$ref": "#/components/schemas/Nope"}}}}}}},
                "/clock": {"get": {"summary": "Clock"}}
            }
        }));
        let specs = p.fn_specs();
        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].spec.name, "crunchbase_clock_get");
        assert_eq!(specs[0].spec.returns.description, "unspecified");
    }

    #[test]
    fn duplicate_parameter_names_skip_the_endpoint() {
        let p = parser(json!({
            "paths": {"/items/{id}": {"get": {"parameters": [
                {"name": "id", "in": "path", "schema": {"type": "string"}},
                {"name": "id", "in": "query", "schema": {"type": "string"}}
            ]}}}
        }));
        assert!(p.fn_specs().is_empty());
    }

    struct OnlyGets;

    impl EndpointPolicy for OnlyGets {
        fn include(&self, operation: &Operation<'_>) -> bool {
            operation.method == "get"
        }

        fn map_parameter(&self, _operation: &Operation<'_>, mut parameter: RawParameter) -> Option<RawParameter> {
            if parameter.name == "secret" {
                return None;
            }
            parameter.description = Some(format!("[{}]", parameter.name));
            Some(parameter)
        }
    }

    #[test]
    fn policy_filters_endpoints_and_parameters() {
        let p = parser(json!({
            "paths": {"/orders": {
                "get": {"parameters": [
                    {"name": "symbol", "in": "query", "schema": {"type": "string"}},
                    {"name": "secret", "in": "query", "schema": {"type": "string"}}
                ]},
                "post": {}
            }}
        }))
        .with_policy(OnlyGets);
        let specs = p.fn_specs();
        assert_eq!(specs.len(), 1);
        let spec = &specs[0].spec;
        assert_eq!(spec.parameters.len(), 1);
        assert_eq!(spec.parameters[0].description.as_deref(), Some("[symbol]"));
    }
}
