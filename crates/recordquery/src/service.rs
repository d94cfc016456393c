//! Execution seam between descriptors and the engine that runs them.

use recordquery_core::{QueryDescriptor, Result};
use serde_json::{Map, Value};
use std::sync::Arc;

/// A result row: field name to value
pub type Record = Map<String, Value>;

/// How a query is dispatched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionMode {
    /// Read path that may be served from the result cache
    Cacheable,
    /// Always reaches the service
    #[default]
    Fresh,
}

impl From<bool> for ExecutionMode {
    /// `true` selects [`ExecutionMode::Cacheable`]
    fn from(cacheable: bool) -> Self {
        if cacheable {
            ExecutionMode::Cacheable
        } else {
            ExecutionMode::Fresh
        }
    }
}

/// Backend that executes query descriptors.
///
/// Implementations own the interpretation of operators, custom logic and
/// limits, and reject what they cannot run.
pub trait QueryService: Send + Sync {
    /// Execute on the non-cacheable, always-fresh target
    fn execute(&self, descriptor: &QueryDescriptor) -> Result<Vec<Record>>;

    /// Execute on the cacheable read target.
    ///
    /// Backends with a separate cacheable endpoint override this.
    fn execute_cacheable(&self, descriptor: &QueryDescriptor) -> Result<Vec<Record>> {
        self.execute(descriptor)
    }
}

impl<T: QueryService + ?Sized> QueryService for Arc<T> {
    fn execute(&self, descriptor: &QueryDescriptor) -> Result<Vec<Record>> {
        (**self).execute(descriptor)
    }

    fn execute_cacheable(&self, descriptor: &QueryDescriptor) -> Result<Vec<Record>> {
        (**self).execute_cacheable(descriptor)
    }
}

impl<T: QueryService + ?Sized> QueryService for Box<T> {
    fn execute(&self, descriptor: &QueryDescriptor) -> Result<Vec<Record>> {
        (**self).execute(descriptor)
    }

    fn execute_cacheable(&self, descriptor: &QueryDescriptor) -> Result<Vec<Record>> {
        (**self).execute_cacheable(descriptor)
    }
}
