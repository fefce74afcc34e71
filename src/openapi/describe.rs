//! Bounded natural-language description of a response schema.
//!
//! The walk renders a compact shape such as
//! `{id, name:Name, cards:[Card{title, tags:[Tag[a,b,...]]}]}`. Models and
//! enums expand once per attempt, so self-referential schemas terminate.
//! Generation retries at decreasing depth until the text fits the length
//! budget, then falls back to hard truncation.

use super::document::{ref_name, reference_of, OpenApiDocument};
use crate::error::SpecError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

/// Limits applied to every response description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DescribeLimits {
    /// Depth of the first attempt.
    pub max_depth: usize,
    /// Depth of the last attempt.
    pub min_depth: usize,
    /// Object fields rendered before eliding the rest with `, ...`.
    pub max_fields: usize,
    /// Enum values rendered before eliding the rest with `,...`.
    pub max_enum_values: usize,
    /// Maximum description length in characters.
    pub max_length: usize,
}

impl Default for DescribeLimits {
    fn default() -> Self {
        Self {
            max_depth: 7,
            min_depth: 2,
            max_fields: 20,
            max_enum_values: 2,
            max_length: 1024,
        }
    }
}

/// Components already expanded during one attempt.
#[derive(Debug, Default)]
struct TraversalContext {
    visited_models: HashSet<String>,
    visited_enums: HashSet<String>,
}

pub struct ResponseDescriber<'a> {
    document: &'a OpenApiDocument,
    limits: &'a DescribeLimits,
}

impl<'a> ResponseDescriber<'a> {
    pub fn new(document: &'a OpenApiDocument, limits: &'a DescribeLimits) -> Self {
        Self { document, limits }
    }

    /// Describe `schema`, falling back to its JSON type name when the walk
    /// renders nothing (primitives, empty objects).
    pub fn describe_response(&self, schema: &Value) -> Result<String, SpecError> {
        let description = self.describe(schema)?;
        if !description.is_empty() {
            return Ok(description);
        }
        Ok(fit_length(type_name(self.document.resolve(schema)), self.limits.max_length))
    }

    /// Run the depth-decreasing attempts and return the first non-empty
    /// description within the length budget.
    pub fn describe(&self, schema: &Value) -> Result<String, SpecError> {
        let max_length = self.limits.max_length;
        let mut last = String::new();
        for depth in (self.limits.min_depth..=self.limits.max_depth).rev() {
            let mut ctx = TraversalContext::default();
            let description = self.walk(&mut ctx, depth, schema)?;
            if !description.is_empty() && description.chars().count() <= max_length {
                return Ok(description);
            }
            last = description;
        }
        Ok(fit_length(&last, max_length))
    }

    fn walk(
        &self,
        ctx: &mut TraversalContext,
        remaining_depth: usize,
        schema: &Value,
    ) -> Result<String, SpecError> {
        if remaining_depth == 0 {
            return Ok(String::new());
        }

        if let Some(reference) = reference_of(schema) {
            return self.walk_reference(ctx, remaining_depth, reference);
        }

        if let Some(all_of) = schema.get("allOf").and_then(Value::as_array) {
            if let [only] = all_of.as_slice() {
                return self.walk(ctx, remaining_depth, only);
            }
            return Ok(String::new());
        }

        if schema.get("type").and_then(Value::as_str) == Some("array") {
            if let Some(items) = schema.get("items") {
                let inner = self.walk(ctx, remaining_depth - 1, items)?;
                return Ok(format!("[{}]", inner));
            }
            return Ok(String::new());
        }

        if let Some(properties) = schema.get("properties").and_then(Value::as_object) {
            let is_object = schema
                .get("type")
                .and_then(Value::as_str)
                .map(|t| t == "object")
                .unwrap_or(true);
            if is_object && !properties.is_empty() {
                return self.walk_properties(ctx, remaining_depth, properties);
            }
        }

        Ok(String::new())
    }

    fn walk_reference(
        &self,
        ctx: &mut TraversalContext,
        remaining_depth: usize,
        reference: &str,
    ) -> Result<String, SpecError> {
        let target = self
            .document
            .lookup_ref(reference)
            .map(|t| self.document.resolve(t))
            .filter(|t| t.is_object())
            .ok_or_else(|| SpecError::UnsupportedReference(reference.to_string()))?;
        let name = ref_name(reference);

        if let Some(values) = target.get("enum").and_then(Value::as_array) {
            if !ctx.visited_enums.insert(reference.to_string()) {
                return Ok(name.to_string());
            }
            let shown: Vec<String> = values
                .iter()
                .take(self.limits.max_enum_values)
                .map(enum_value)
                .collect();
            let more = if values.len() > self.limits.max_enum_values {
                ",..."
            } else {
                ""
            };
            return Ok(format!("{}[{}{}]", name, shown.join(","), more));
        }

        if !ctx.visited_models.insert(reference.to_string()) {
            return Ok(name.to_string());
        }
        let body = self.walk(ctx, remaining_depth - 1, target)?;
        Ok(format!("{}{}", name, body))
    }

    fn walk_properties(
        &self,
        ctx: &mut TraversalContext,
        remaining_depth: usize,
        properties: &serde_json::Map<String, Value>,
    ) -> Result<String, SpecError> {
        let fields: Vec<(&String, &Value)> = properties
            .iter()
            .filter(|(name, _)| !name.starts_with('_') && !name.to_lowercase().contains("links"))
            .collect();

        let mut rendered = Vec::with_capacity(fields.len().min(self.limits.max_fields));
        for (name, field) in fields.iter().take(self.limits.max_fields) {
            let description = self.walk(ctx, remaining_depth - 1, field)?;
            if description.is_empty() {
                rendered.push(name.to_string());
            } else {
                rendered.push(format!("{}:{}", name, description));
            }
        }

        let more = if fields.len() > self.limits.max_fields {
            ", ..."
        } else {
            ""
        };
        Ok(format!("{{{}{}}}", rendered.join(", "), more))
    }
}

fn enum_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Cut `text` to at most `max_length` characters, marking the cut with
/// `...` when there is room for it.
pub(crate) fn fit_length(text: &str, max_length: usize) -> String {
    if text.chars().count() <= max_length {
        return text.to_string();
    }
    if max_length < 3 {
        return text.chars().take(max_length).collect();
    }
    let mut truncated: String = text.chars().take(max_length - 3).collect();
    truncated.push_str("...");
    truncated
}

/// JSON type name of a schema, for descriptions of primitive responses.
fn type_name(schema: &Value) -> &str {
    match schema.get("type").and_then(Value::as_str) {
        Some(t) => t,
        None if schema.get("properties").is_some() => "object",
        None => "unspecified",
    }
}
