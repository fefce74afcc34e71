//! HTTP invocation of a schema-described endpoint.

use crate::auth::AuthContext;
use crate::error::CallError;
use crate::function::{Arguments, Invoke, OpenApiEndpoint};
use crate::http::{HttpRequest, HttpTransport};
use crate::template;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

/// Calls `base_url + endpoint` with path placeholders filled from the
/// arguments and every other argument sent as a query parameter.
pub struct OpenApiInvoker {
    base_url: String,
    endpoint: OpenApiEndpoint,
    transport: Arc<dyn HttpTransport>,
}

impl OpenApiInvoker {
    pub fn new(
        base_url: impl Into<String>,
        endpoint: OpenApiEndpoint,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            endpoint,
            transport,
        }
    }

    /// Build the request without sending it.
    pub fn request(&self, auth: &AuthContext, args: &Arguments) -> Result<HttpRequest, CallError> {
        let headers = auth.openapi()?.headers_for(&self.endpoint.api);

        let path = template::render(&self.endpoint.endpoint, |name| {
            args.get(name).map(|v| template::encode_segment(&v.to_string()))
        })
        .map_err(CallError::Invocation)?;
        let path_params: HashSet<&str> = template::placeholders(&self.endpoint.endpoint)
            .into_iter()
            .collect();

        let url = format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        let mut request = HttpRequest::new(&self.endpoint.method, url);
        request.headers = headers;
        for (name, value) in args {
            if !path_params.contains(name.as_str()) {
                request.push_query(name, value);
            }
        }
        Ok(request)
    }
}

impl Invoke for OpenApiInvoker {
    fn invoke(&self, auth: &AuthContext, args: &Arguments) -> Result<Value, CallError> {
        let request = self.request(auth, args)?;
        debug!(
            "{}: {} {}",
            self.endpoint.api, request.method, request.url
        );
        let response = self.transport.send(&request)?.error_for_status()?;
        if response.body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&response.body)
            .map_err(|e| CallError::Invocation(format!("invalid JSON response: {}", e)))
    }
}
