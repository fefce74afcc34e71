//! Shared fixtures for the integration tests: a recording transport and a
//! small provider with record- and date-typed parameters.

#![allow(dead_code)]

use chrono::{Local, NaiveDate};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use toolhub::error::{CallError, TransportError};
use toolhub::function::{
    Arguments, FieldSpec, FunctionOrigin, ParameterSpec, RecordType, ReturnSpec, TypedValue, ValueType,
};
use toolhub::http::{HttpRequest, HttpResponse, HttpTransport};
use toolhub::{AuthContext, Function, FunctionCollection, FunctionSpec, Provider};

pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

// ---------------------------------------------------------------------------
// Transport
// ---------------------------------------------------------------------------

/// Answers from a `(METHOD, url)` route table, falling back to a default
/// response, and records every request it sees.
pub struct MockTransport {
    routes: HashMap<(String, String), HttpResponse>,
    fallback: HttpResponse,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    pub fn new(status: u16, body: &str) -> Self {
        Self {
            routes: HashMap::new(),
            fallback: HttpResponse {
                status,
                body: body.to_string(),
            },
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn route(mut self, method: &str, url: &str, status: u16, body: &str) -> Self {
        self.routes.insert(
            (method.to_uppercase(), url.to_string()),
            HttpResponse {
                status,
                body: body.to_string(),
            },
        );
        self
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> HttpRequest {
        self.requests().pop().expect("no request was sent")
    }
}

impl HttpTransport for MockTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap().push(request.clone());
        let key = (request.method.clone(), request.url.clone());
        Ok(self.routes.get(&key).unwrap_or(&self.fallback).clone())
    }
}

pub fn transport(status: u16, body: &str) -> Arc<MockTransport> {
    Arc::new(MockTransport::new(status, body))
}

// ---------------------------------------------------------------------------
// Test provider
// ---------------------------------------------------------------------------

pub const JOKE: &str = "McDonald’s is the Lebron James of frying potatoes.";
pub const QUOTE: &str = "The power to question is the basis of all human progress.";

fn restaurant_type() -> ValueType {
    ValueType::Record(RecordType {
        name: "Restaurant".into(),
        description: Some("A restaurant to review".into()),
        fields: vec![
            FieldSpec {
                name: "name".into(),
                value_type: ValueType::String,
                description: Some("Name of the restaurant".into()),
                required: true,
            },
            FieldSpec {
                name: "location".into(),
                value_type: ValueType::String,
                description: Some("City the restaurant is in".into()),
                required: true,
            },
        ],
    })
}

fn of_the_day(args: &Arguments, key: &str, text: &str, forgot: &str) -> Value {
    let today = Local::now().date_naive();
    match args.get(key) {
        Some(TypedValue::Date(day)) if *day >= today => json!(text),
        _ => json!(forgot),
    }
}

/// Local functions covering the date and record coercions.
pub struct TestProvider {
    functions: Vec<Arc<Function>>,
    collections: Vec<FunctionCollection>,
}

impl TestProvider {
    pub fn new() -> Self {
        let joke = FunctionSpec::new(
            "joke_of_the_day",
            vec![ParameterSpec::new("joke_date", ValueType::Date, "The date", true)],
            ReturnSpec::new(ValueType::String, "The joke of the day"),
            Some("Tell the joke of the day.".into()),
        )
        .unwrap();
        let quote = FunctionSpec::new(
            "quote_of_the_day",
            vec![ParameterSpec::new("quote_date", ValueType::Date, "The date", true)],
            ReturnSpec::new(ValueType::String, "The quote of the day"),
            Some("Tell the quote of the day.".into()),
        )
        .unwrap();
        let review = FunctionSpec::new(
            "foodhub_review",
            vec![ParameterSpec::new("restaurant", restaurant_type(), "The restaurant", true)],
            ReturnSpec::new(ValueType::String, "A short review, or null"),
            Some("Review a restaurant.".into()),
        )
        .unwrap();

        let functions = vec![
            Arc::new(Function::new(joke, FunctionOrigin::Builtin, |_: &AuthContext, args: &Arguments| {
                Ok::<_, CallError>(of_the_day(args, "joke_date", JOKE, "Forgot the joke!"))
            })),
            Arc::new(Function::new(quote, FunctionOrigin::Builtin, |_: &AuthContext, args: &Arguments| {
                Ok::<_, CallError>(of_the_day(args, "quote_date", QUOTE, "Forgot the quote!"))
            })),
            Arc::new(Function::new(review, FunctionOrigin::Builtin, |_: &AuthContext, args: &Arguments| {
                let Some(TypedValue::Record(fields)) = args.get("restaurant") else {
                    return Ok::<_, CallError>(Value::Null);
                };
                let is = |key: &str, expected: &str| fields.get(key).and_then(TypedValue::as_str) == Some(expected);
                Ok(if is("name", "Palateria Los Manguitos") && is("location", "Redwood City") {
                    json!("Delightful!")
                } else {
                    Value::Null
                })
            })),
        ];

        let collections = vec![
            FunctionCollection::new("jokes", Some("Daily jokes".into()), ["joke_of_the_day".to_string()]),
            FunctionCollection::new("quotes", Some("Daily quotes".into()), ["quote_of_the_day".to_string()]),
            FunctionCollection::new("reviews", None, ["foodhub_review".to_string()]),
        ];

        Self {
            functions,
            collections,
        }
    }
}

impl Provider for TestProvider {
    fn name(&self) -> &str {
        "test"
    }

    fn functions(&self) -> &[Arc<Function>] {
        &self.functions
    }

    fn collections(&self) -> &[FunctionCollection] {
        &self.collections
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}
