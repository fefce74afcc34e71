//! Outbound HTTP as an injected capability.
//!
//! Functions never talk to the network directly: they build an
//! [`HttpRequest`] and hand it to an [`HttpTransport`]. The default
//! transport is a blocking reqwest client, one request at a time.

use crate::auth::Headers;
use crate::error::{CallError, TransportError};
use crate::function::TypedValue;
use reqwest::blocking::Client;
use reqwest::Method;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    /// Uppercase HTTP method.
    pub method: String,
    pub url: String,
    pub headers: Headers,
    /// Query pairs; repeated keys are allowed for list values.
    pub query: Vec<(String, String)>,
}

impl HttpRequest {
    pub fn new(method: &str, url: impl Into<String>) -> Self {
        Self {
            method: method.to_uppercase(),
            url: url.into(),
            headers: Headers::new(),
            query: Vec::new(),
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new("GET", url)
    }

    /// Append a query argument. Lists become one pair per element.
    pub fn push_query(&mut self, name: &str, value: &TypedValue) {
        match value {
            TypedValue::List(items) => {
                for item in items {
                    self.query.push((name.to_string(), item.to_string()));
                }
            }
            other => self.query.push((name.to_string(), other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Turn a non-2xx response into a [`CallError::Status`].
    pub fn error_for_status(self) -> Result<Self, CallError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(CallError::Status {
                status: self.status,
                body: self.body,
            })
        }
    }
}

/// `send(method, url, headers, query) -> (status, body)`.
pub trait HttpTransport: Send + Sync {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Blocking reqwest transport.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http: Client,
}

impl ReqwestTransport {
    /// Create a transport whose requests time out after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Request(e.to_string()))?;
        Ok(Self { http })
    }
}

impl HttpTransport for ReqwestTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        debug!("HTTP {} {}", request.method, request.url);

        let method = Method::from_bytes(request.method.as_bytes())
            .map_err(|_| TransportError::Request(format!("invalid method {}", request.method)))?;

        let mut builder = self.http.request(method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }

        let resp = builder.send().map_err(map_reqwest_error)?;
        let status = resp.status().as_u16();
        let body = resp.text().map_err(map_reqwest_error)?;

        debug!("HTTP {} {} -> {}", request.method, request.url, status);
        Ok(HttpResponse { status, body })
    }
}

fn map_reqwest_error(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout(e.to_string())
    } else {
        TransportError::Request(e.to_string())
    }
}
