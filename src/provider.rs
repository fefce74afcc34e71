//! The provider abstraction: a source of functions and the collections
//! that tag them.

use crate::function::{Function, FunctionCollection};
use std::sync::Arc;

/// A loaded source of functions. Providers build everything at
/// construction; these accessors never perform I/O.
pub trait Provider: Send + Sync {
    /// Short label used in logs.
    fn name(&self) -> &str;

    fn functions(&self) -> &[Arc<Function>];

    fn collections(&self) -> &[FunctionCollection];
}
