//! Catalog integration: a pre-built table of third-party REST endpoints,
//! each addressed by a URL template on a root hostname.

pub mod filter;
pub mod invoker;
pub mod provider;
pub mod table;

pub use filter::{sanitize_url, url_hostname, CatalogFilter};
pub use invoker::{CatalogHeaders, CatalogInvoker};
pub use provider::CatalogProvider;
pub use table::{CatalogEntry, CatalogFunction, CatalogTable};
