//! Hostname and endpoint-URL selection of catalog endpoints.

use crate::function::CatalogEndpoint;
use crate::template::TemplateMatcher;
use std::collections::{HashMap, HashSet};
use tracing::warn;

/// Trim whitespace and trailing slashes.
pub fn sanitize_url(url: &str) -> &str {
    url.trim().trim_end_matches('/')
}

/// Hostname of a URL, or the input itself when it is a bare hostname.
pub fn url_hostname(url: &str) -> Option<String> {
    let url = sanitize_url(url);
    if let Ok(parsed) = url::Url::parse(url) {
        return parsed.host_str().map(str::to_string);
    }
    let bare = !url.is_empty() && !url.contains(['/', ' ', '?', '#']);
    bare.then(|| url.to_ascii_lowercase())
}

/// Compiled hostname and endpoint-URL criteria. Either criterion may be
/// inactive; an endpoint passes if it satisfies any active one.
#[derive(Debug, Clone, Default)]
pub struct CatalogFilter {
    hostnames: Option<HashSet<String>>,
    endpoint_urls: Option<HashMap<String, Vec<String>>>,
}

impl CatalogFilter {
    /// Build from hostname entries (URLs or bare hostnames) and endpoint
    /// URLs. Empty lists leave the criterion inactive.
    pub fn new(hostnames: &[String], endpoint_urls: &[String]) -> Self {
        let hostnames = (!hostnames.is_empty()).then(|| {
            hostnames
                .iter()
                .filter_map(|h| {
                    let host = url_hostname(h);
                    if host.is_none() {
                        warn!("Ignoring hostname filter entry {:?}: no hostname", h);
                    }
                    host
                })
                .collect()
        });

        let endpoint_urls = (!endpoint_urls.is_empty()).then(|| {
            let mut by_host: HashMap<String, Vec<String>> = HashMap::new();
            for raw in endpoint_urls {
                let url = sanitize_url(raw);
                match url::Url::parse(url).ok().and_then(|u| u.host_str().map(str::to_string)) {
                    Some(host) => by_host.entry(host).or_default().push(url.to_string()),
                    None => warn!("Ignoring endpoint URL filter entry {:?}: not a URL", raw),
                }
            }
            by_host
        });

        Self {
            hostnames,
            endpoint_urls,
        }
    }

    pub fn is_active(&self) -> bool {
        self.hostnames.is_some() || self.endpoint_urls.is_some()
    }

    /// Whether `endpoint` satisfies an active criterion. Inactive filters
    /// match nothing here; callers check [`is_active`](Self::is_active) first.
    pub fn matches(&self, endpoint: &CatalogEndpoint) -> bool {
        self.matches_hostname(endpoint) || self.matches_endpoint_url(endpoint)
    }

    pub fn matches_hostname(&self, endpoint: &CatalogEndpoint) -> bool {
        self.hostnames
            .as_ref()
            .map(|hosts| hosts.contains(&endpoint.root_url.to_ascii_lowercase()))
            .unwrap_or(false)
    }

    pub fn matches_endpoint_url(&self, endpoint: &CatalogEndpoint) -> bool {
        let Some(urls) = self
            .endpoint_urls
            .as_ref()
            .and_then(|by_host| by_host.get(&endpoint.root_url.to_ascii_lowercase()))
        else {
            return false;
        };
        match TemplateMatcher::new(&endpoint.url_template) {
            Ok(matcher) => urls.iter().any(|url| matcher.matches(url)),
            Err(e) => {
                warn!("Invalid URL template {:?}: {}", endpoint.url_template, e);
                false
            }
        }
    }
}
