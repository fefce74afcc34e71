//! Function names for OpenAPI endpoints.
//!
//! Names look like `<api>_<path segments>_<method>` and always satisfy the
//! tool-name pattern `[A-Za-z0-9_-]{1,64}`. Path segments are taken from the
//! right, so the most specific part of the path survives when the budget
//! runs out.

use crate::function::MAX_FUNCTION_NAME_LEN;

/// Drop every character outside `[A-Za-z0-9_-]`.
pub fn sanitize(segment: &str) -> String {
    segment
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect()
}

/// Generate the function name for `method` on `endpoint` of `api`.
pub fn function_name(api: &str, endpoint: &str, method: &str) -> String {
    let api = sanitize(api);
    let method = sanitize(&method.to_lowercase());
    let budget = (MAX_FUNCTION_NAME_LEN - 1).saturating_sub(api.len());

    let mut suffix = method;
    for segment in endpoint.split('/').rev() {
        if segment.is_empty() {
            break;
        }
        let candidate = format!("{}_{}", sanitize(segment), suffix);
        if candidate.len() > budget {
            break;
        }
        suffix = candidate;
    }

    let mut name = if api.is_empty() {
        suffix
    } else {
        format!("{}_{}", api, suffix)
    };
    // Only reachable for pathological api identifiers or methods.
    name.truncate(MAX_FUNCTION_NAME_LEN);
    if name.is_empty() {
        name.push_str("fn");
    }
    name
}
