//! Semantic parameter types and the coercion of JSON arguments into them.
//!
//! The set of types is closed: each [`ValueType`] tag has exactly one
//! coercion routine, and each returns a typed value or a reason string that
//! the hub turns into a parameter type error.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fmt;

/// Declared type of a parameter or record field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    Boolean,
    Integer,
    Number,
    String,
    List(Box<ValueType>),
    Date,
    DateTime,
    Record(RecordType),
}

/// A structured record: named fields with their own types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordType {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub fields: Vec<FieldSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub value_type: ValueType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub required: bool,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean => write!(f, "boolean"),
            Self::Integer => write!(f, "integer"),
            Self::Number => write!(f, "number"),
            Self::String => write!(f, "string"),
            Self::List(inner) => write!(f, "list[{}]", inner),
            Self::Date => write!(f, "date"),
            Self::DateTime => write!(f, "datetime"),
            Self::Record(record) => write!(f, "{}", record.name),
        }
    }
}

impl ValueType {
    pub fn list_of(inner: ValueType) -> Self {
        Self::List(Box::new(inner))
    }

    /// JSON-schema fragment describing this type in the function-calling format.
    pub fn json_schema(&self) -> Value {
        match self {
            Self::Boolean => json!({ "type": "boolean" }),
            Self::Integer => json!({ "type": "integer" }),
            Self::Number => json!({ "type": "number" }),
            Self::String => json!({ "type": "string" }),
            Self::List(inner) => json!({ "type": "array", "items": inner.json_schema() }),
            Self::Date => json!({ "type": "string", "format": "date" }),
            Self::DateTime => json!({ "type": "string", "format": "date-time" }),
            Self::Record(record) => record.json_schema(),
        }
    }

    /// Coerce a JSON argument into this type.
    pub fn coerce(&self, value: &Value) -> Result<TypedValue, String> {
        match self {
            Self::Boolean => coerce_boolean(value),
            Self::Integer => coerce_integer(value),
            Self::Number => coerce_number(value),
            Self::String => coerce_string(value),
            Self::List(inner) => coerce_list(inner, value),
            Self::Date => coerce_date(value),
            Self::DateTime => coerce_datetime(value),
            Self::Record(record) => record.coerce(value),
        }
    }
}

impl RecordType {
    fn json_schema(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();
        for field in &self.fields {
            let mut schema = field.value_type.json_schema();
            if let (Some(description), Some(obj)) = (&field.description, schema.as_object_mut()) {
                obj.insert("description".into(), Value::String(description.clone()));
            }
            properties.insert(field.name.clone(), schema);
            if field.required {
                required.push(Value::String(field.name.clone()));
            }
        }

        let mut schema = json!({
            "type": "object",
            "title": self.name,
            "properties": properties,
            "required": required,
        });
        if let Some(description) = &self.description {
            schema["description"] = Value::String(description.clone());
        }
        schema
    }

    fn coerce(&self, value: &Value) -> Result<TypedValue, String> {
        let obj = value
            .as_object()
            .ok_or_else(|| format!("expected a JSON object for {}, got {}", self.name, kind_of(value)))?;

        let mut fields = IndexMap::new();
        for field in &self.fields {
            match obj.get(&field.name) {
                Some(Value::Null) | None if !field.required => {}
                Some(v) => {
                    let typed = field
                        .value_type
                        .coerce(v)
                        .map_err(|e| format!("field {}: {}", field.name, e))?;
                    fields.insert(field.name.clone(), typed);
                }
                None => return Err(format!("missing field {}", field.name)),
            }
        }
        Ok(TypedValue::Record(fields))
    }
}

/// An argument after coercion to its declared type.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    Boolean(bool),
    Integer(i64),
    Number(f64),
    String(String),
    List(Vec<TypedValue>),
    Date(NaiveDate),
    DateTime(DateTime<FixedOffset>),
    Record(IndexMap<String, TypedValue>),
}

impl TypedValue {
    /// Canonical JSON form.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Boolean(b) => Value::Bool(*b),
            Self::Integer(i) => json!(i),
            Self::Number(n) => json!(n),
            Self::String(s) => Value::String(s.clone()),
            Self::List(items) => Value::Array(items.iter().map(TypedValue::to_json).collect()),
            Self::Date(_) | Self::DateTime(_) => Value::String(self.to_string()),
            Self::Record(fields) => Value::Object(
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }

    /// Python-style truthiness, used for conditionally-included query parameters.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Boolean(b) => *b,
            Self::Integer(i) => *i != 0,
            Self::Number(n) => *n != 0.0,
            Self::String(s) => !s.is_empty(),
            Self::List(items) => !items.is_empty(),
            Self::Record(fields) => !fields.is_empty(),
            Self::Date(_) | Self::DateTime(_) => true,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean(b) => write!(f, "{}", b),
            Self::Integer(i) => write!(f, "{}", i),
            Self::Number(n) => write!(f, "{}", n),
            Self::String(s) => f.write_str(s),
            Self::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Self::DateTime(dt) => f.write_str(&dt.to_rfc3339()),
            Self::List(_) | Self::Record(_) => write!(f, "{}", self.to_json()),
        }
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn coerce_boolean(value: &Value) -> Result<TypedValue, String> {
    match value {
        Value::Bool(b) => Ok(TypedValue::Boolean(*b)),
        Value::String(s) if s.eq_ignore_ascii_case("true") => Ok(TypedValue::Boolean(true)),
        Value::String(s) if s.eq_ignore_ascii_case("false") => Ok(TypedValue::Boolean(false)),
        other => Err(format!("cannot convert {} to boolean", kind_of(other))),
    }
}

fn coerce_integer(value: &Value) -> Result<TypedValue, String> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Ok(TypedValue::Integer(i));
            }
            match n.as_f64() {
                Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
                    Ok(TypedValue::Integer(f as i64))
                }
                _ => Err(format!("{} is not an integer", n)),
            }
        }
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map(TypedValue::Integer)
            .map_err(|_| format!("invalid integer literal '{}'", s)),
        other => Err(format!("cannot convert {} to integer", kind_of(other))),
    }
}

fn coerce_number(value: &Value) -> Result<TypedValue, String> {
    match value {
        Value::Number(n) => n
            .as_f64()
            .map(TypedValue::Number)
            .ok_or_else(|| format!("{} is not representable as a number", n)),
        Value::String(s) => match s.trim().parse::<f64>() {
            Ok(f) if f.is_finite() => Ok(TypedValue::Number(f)),
            _ => Err(format!("invalid number literal '{}'", s)),
        },
        other => Err(format!("cannot convert {} to number", kind_of(other))),
    }
}

fn coerce_string(value: &Value) -> Result<TypedValue, String> {
    match value {
        Value::String(s) => Ok(TypedValue::String(s.clone())),
        Value::Number(n) => Ok(TypedValue::String(n.to_string())),
        Value::Bool(b) => Ok(TypedValue::String(b.to_string())),
        other => Err(format!("cannot convert {} to string", kind_of(other))),
    }
}

fn coerce_list(inner: &ValueType, value: &Value) -> Result<TypedValue, String> {
    let items = value
        .as_array()
        .ok_or_else(|| format!("expected a JSON array, got {}", kind_of(value)))?;
    items
        .iter()
        .enumerate()
        .map(|(i, item)| inner.coerce(item).map_err(|e| format!("item {}: {}", i, e)))
        .collect::<Result<Vec<_>, _>>()
        .map(TypedValue::List)
}

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

fn parse_naive_datetime(s: &str) -> Option<NaiveDateTime> {
    NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}

fn coerce_date(value: &Value) -> Result<TypedValue, String> {
    let s = value
        .as_str()
        .ok_or_else(|| format!("expected a date string, got {}", kind_of(value)))?
        .trim();

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
        .or_else(|| parse_naive_datetime(s).map(|dt| dt.date()))
        .map(TypedValue::Date)
        .ok_or_else(|| format!("invalid date '{}', expected YYYY-MM-DD", s))
}

fn coerce_datetime(value: &Value) -> Result<TypedValue, String> {
    let s = value
        .as_str()
        .ok_or_else(|| format!("expected a datetime string, got {}", kind_of(value)))?
        .trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(TypedValue::DateTime(dt));
    }
    // Naive inputs are taken as UTC.
    parse_naive_datetime(s)
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .map(|dt| TypedValue::DateTime(dt.and_utc().fixed_offset()))
        .ok_or_else(|| format!("invalid datetime '{}', expected RFC 3339", s))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn restaurant() -> ValueType {
        ValueType::Record(RecordType {
            name: "Restaurant".into(),
            description: None,
            fields: vec![
                FieldSpec {
                    name: "name".into(),
                    value_type: ValueType::String,
                    description: Some("Restaurant name".into()),
                    required: true,
                },
                FieldSpec {
                    name: "rating".into(),
                    value_type: ValueType::Number,
                    description: None,
                    required: false,
                },
            ],
        })
    }

    #[test]
    fn integer_round_trips_through_display() {
        let typed = ValueType::Integer.coerce(&json!(100)).unwrap();
        assert_eq!(typed, TypedValue::Integer(100));
        assert_eq!(typed.to_string(), "100");
    }

    #[test]
    fn integer_accepts_numeric_strings_and_integral_floats() {
        assert_eq!(
            ValueType::Integer.coerce(&json!("15")).unwrap(),
            TypedValue::Integer(15)
        );
        assert_eq!(
            ValueType::Integer.coerce(&json!(3.0)).unwrap(),
            TypedValue::Integer(3)
        );
        assert!(ValueType::Integer.coerce(&json!(3.5)).is_err());
        assert!(ValueType::Integer.coerce(&json!("abc")).is_err());
        assert!(ValueType::Integer.coerce(&json!(true)).is_err());
    }

    #[test]
    fn string_accepts_scalars_only() {
        assert_eq!(
            ValueType::String.coerce(&json!(42)).unwrap(),
            TypedValue::String("42".into())
        );
        assert!(ValueType::String.coerce(&json!({"a": 1})).is_err());
    }

    #[test]
    fn list_is_cast_element_wise() {
        let ty = ValueType::list_of(ValueType::Integer);
        assert_eq!(
            ty.coerce(&json!([1, "2"])).unwrap(),
            TypedValue::List(vec![TypedValue::Integer(1), TypedValue::Integer(2)])
        );
        let err = ty.coerce(&json!([1, "x"])).unwrap_err();
        assert!(err.starts_with("item 1:"), "{}", err);
    }

    #[test]
    fn date_and_datetime_parse() {
        let date = ValueType::Date.coerce(&json!("2024-02-29")).unwrap();
        assert_eq!(date.to_string(), "2024-02-29");
        let from_ts = ValueType::Date.coerce(&json!("2024-02-29T10:00:00Z")).unwrap();
        assert_eq!(from_ts, date);
        assert!(ValueType::Date.coerce(&json!("yesterday")).is_err());

        let dt = ValueType::DateTime
            .coerce(&json!("2024-01-01T12:30:00+02:00"))
            .unwrap();
        assert_eq!(dt.to_string(), "2024-01-01T12:30:00+02:00");
        let naive = ValueType::DateTime.coerce(&json!("2024-01-01 08:00:00")).unwrap();
        assert_eq!(naive.to_string(), "2024-01-01T08:00:00+00:00");
    }

    #[test]
    fn record_validates_fields() {
        let ty = restaurant();
        let typed = ty
            .coerce(&json!({"name": "Palateria", "rating": "4.5", "extra": 1}))
            .unwrap();
        assert_eq!(
            typed.to_json(),
            json!({"name": "Palateria", "rating": 4.5})
        );
        assert_eq!(
            ty.coerce(&json!({"rating": 1})).unwrap_err(),
            "missing field name"
        );
        assert!(ty.coerce(&json!("Palateria")).is_err());
    }

    #[test]
    fn json_schema_shapes() {
        assert_eq!(
            ValueType::list_of(ValueType::String).json_schema(),
            json!({"type": "array", "items": {"type": "string"}})
        );
        assert_eq!(
            ValueType::DateTime.json_schema(),
            json!({"type": "string", "format": "date-time"})
        );
        let schema = restaurant().json_schema();
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["required"], json!(["name"]));
        assert_eq!(schema["properties"]["name"]["description"], "Restaurant name");
    }

    #[test]
    fn value_type_serde_tags() {
        let ty: ValueType = serde_json::from_value(json!({"list": "integer"})).unwrap();
        assert_eq!(ty, ValueType::list_of(ValueType::Integer));
        assert_eq!(serde_json::to_value(ValueType::DateTime).unwrap(), json!("date_time"));
        assert_eq!(ty.to_string(), "list[integer]");
    }

    #[test]
    fn truthiness() {
        assert!(!TypedValue::String(String::new()).is_truthy());
        assert!(!TypedValue::Integer(0).is_truthy());
        assert!(TypedValue::Boolean(true).is_truthy());
    }
}
