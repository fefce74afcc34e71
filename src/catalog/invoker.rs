//! HTTP invocation of a catalog endpoint.

use crate::auth::AuthContext;
use crate::error::CallError;
use crate::function::{Arguments, CatalogEndpoint, Invoke};
use crate::http::{HttpRequest, HttpTransport};
use crate::template;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Header names used for catalog credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogHeaders {
    pub key_header: String,
    pub host_header: String,
}

impl Default for CatalogHeaders {
    fn default() -> Self {
        Self {
            key_header: "X-RapidAPI-Key".into(),
            host_header: "X-RapidAPI-Host".into(),
        }
    }
}

pub struct CatalogInvoker {
    endpoint: CatalogEndpoint,
    headers: CatalogHeaders,
    transport: Arc<dyn HttpTransport>,
}

impl CatalogInvoker {
    pub fn new(endpoint: CatalogEndpoint, headers: CatalogHeaders, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            endpoint,
            headers,
            transport,
        }
    }

    /// Build the request: the template filled from the arguments, required
    /// arguments plus truthy conditional ones as query parameters.
    pub fn request(&self, auth: &AuthContext, args: &Arguments) -> Result<HttpRequest, CallError> {
        let catalog = auth.catalog()?;
        let ep = &self.endpoint;

        let url = template::render(&ep.url_template, |name| {
            args.get(name).map(|v| template::encode_segment(&v.to_string()))
        })
        .map_err(CallError::Invocation)?;

        let mut request = HttpRequest::new(&ep.method, url);
        request
            .headers
            .insert(self.headers.key_header.clone(), catalog.api_key.clone());
        request
            .headers
            .insert(self.headers.host_header.clone(), ep.root_url.clone());
        request.headers.extend(catalog.headers_for(&ep.root_url));

        for (name, value) in args {
            if ep.required_params.contains(name)
                || (value.is_truthy() && ep.conditional_params.contains(name))
            {
                request.push_query(name, value);
            }
        }
        Ok(request)
    }
}

impl Invoke for CatalogInvoker {
    fn invoke(&self, auth: &AuthContext, args: &Arguments) -> Result<Value, CallError> {
        let request = self.request(auth, args)?;
        debug!("catalog {}: {} {}", self.endpoint.root_url, request.method, request.url);
        let response = self.transport.send(&request)?.error_for_status()?;
        Ok(serde_json::from_str(&response.body).unwrap_or(Value::String(response.body)))
    }
}
