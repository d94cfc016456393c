//! # RecordQuery
//!
//! Fluent query descriptors over named record collections, dispatched to a
//! pluggable query service with an optional cacheable read path.
//!
//! ## Quick Start
//!
//! ```rust
//! use recordquery::{Database, ExecutionMode, MemoryQueryService, QueryBuilder, Record};
//! use serde_json::json;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let accounts: Vec<Record> = serde_json::from_value(json!([
//!         { "Id": "001", "Name": "Acme", "Type": "Customer" },
//!         { "Id": "002", "Name": "Globex", "Type": "Partner" }
//!     ]))?;
//!     let service = MemoryQueryService::new().with_collection("Account", accounts)?;
//!     let db = Database::new(service);
//!
//!     let mut query = QueryBuilder::new("Account");
//!     query
//!         .add_field("Name")
//!         .add_where_condition("Type", "=", "Customer")
//!         .set_limit(10);
//!
//!     let rows = db.query(&query, ExecutionMode::Cacheable)?;
//!     assert_eq!(rows[0]["Name"], "Acme");
//!     Ok(())
//! }
//! ```
//!
//! ## Execution modes
//!
//! - [`ExecutionMode::Cacheable`] answers repeated descriptors from the
//!   result cache and otherwise calls [`QueryService::execute_cacheable`].
//! - [`ExecutionMode::Fresh`] always calls [`QueryService::execute`] and
//!   refreshes a cached entry for the same descriptor if one exists.

pub mod aggregate;
pub mod cache;
pub mod logging;
pub mod memory;
pub mod service;
pub mod value;

use std::sync::Arc;
use tracing::{debug, warn};

// Re-export core types
pub use recordquery_core::{
    Condition, Error, GroupBy, LogicClause, LogicError, LogicExpr, OrderBy, QueryBuilder,
    QueryDescriptor, Result, SortOrder, ValidationError,
};

pub use cache::{CacheConfig, CacheStats, QueryCache};
pub use memory::MemoryQueryService;
pub use service::{ExecutionMode, QueryService, Record};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Dispatch configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Validate descriptors before they reach the service
    pub validate_before_dispatch: bool,
    /// Result cache for the cacheable path
    pub cache: CacheConfig,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            validate_before_dispatch: true,
            cache: CacheConfig::default(),
        }
    }
}

impl DatabaseConfig {
    /// Forward descriptors unchecked and let the service reject them
    pub fn without_validation(mut self) -> Self {
        self.validate_before_dispatch = false;
        self
    }

    /// Set the cache configuration
    pub fn with_cache(mut self, cache: CacheConfig) -> Self {
        self.cache = cache;
        self
    }
}

/// Query dispatch facade.
///
/// Cheap to clone; clones share the service and the result cache.
#[derive(Clone)]
pub struct Database {
    service: Arc<dyn QueryService>,
    cache: Option<Arc<QueryCache>>,
    config: DatabaseConfig,
}

impl Database {
    /// Dispatch to `service` with the default configuration
    pub fn new<S: QueryService + 'static>(service: S) -> Self {
        Self::with_config(service, DatabaseConfig::default())
    }

    /// Dispatch to `service` with a custom configuration
    pub fn with_config<S: QueryService + 'static>(service: S, config: DatabaseConfig) -> Self {
        let cache = config
            .cache
            .enabled
            .then(|| Arc::new(QueryCache::new(config.cache.capacity)));
        Database {
            service: Arc::new(service),
            cache,
            config,
        }
    }

    /// Active configuration
    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    /// Build the builder's descriptor and execute it.
    ///
    /// `mode` accepts an [`ExecutionMode`] or a `bool` (`true` for cacheable).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use recordquery::{Database, MemoryQueryService, QueryBuilder};
    ///
    /// let service = MemoryQueryService::new().with_collection("Case", Vec::new())?;
    /// let db = Database::new(service);
    ///
    /// let rows = db.query(&QueryBuilder::new("Case"), false)?;
    /// assert!(rows.is_empty());
    /// # Ok::<(), recordquery::Error>(())
    /// ```
    pub fn query(
        &self,
        builder: &QueryBuilder,
        mode: impl Into<ExecutionMode>,
    ) -> Result<Vec<Record>> {
        self.execute(&builder.build(), mode.into())
    }

    /// Execute an already built descriptor
    pub fn execute(&self, descriptor: &QueryDescriptor, mode: ExecutionMode) -> Result<Vec<Record>> {
        debug!(
            collection = %descriptor.collection_name,
            ?mode,
            "dispatching query"
        );

        if self.config.validate_before_dispatch {
            if let Err(e) = descriptor.validate() {
                warn!(collection = %descriptor.collection_name, error = %e, "descriptor rejected");
                return Err(e);
            }
        }

        let Some(cache) = &self.cache else {
            return match mode {
                ExecutionMode::Cacheable => self.service.execute_cacheable(descriptor),
                ExecutionMode::Fresh => self.service.execute(descriptor),
            };
        };

        let key = QueryCache::key(descriptor)?;
        match mode {
            ExecutionMode::Cacheable => {
                if let Some(rows) = cache.get(&key)? {
                    debug!(rows = rows.len(), "cache hit");
                    return Ok(rows);
                }
                debug!("cache miss");
                let generation = cache.generation()?;
                let rows = self.service.execute_cacheable(descriptor)?;
                if !cache.insert_at(generation, key, &descriptor.collection_name, rows.clone())? {
                    debug!("cache invalidated during execution, result not stored");
                }
                Ok(rows)
            }
            ExecutionMode::Fresh => {
                let rows = self.service.execute(descriptor)?;
                if cache.refresh(&key, rows.clone())? {
                    debug!("refreshed cached result");
                }
                Ok(rows)
            }
        }
    }

    /// Drop cached results for `collection`, e.g. after its records change
    pub fn invalidate(&self, collection: &str) -> Result<usize> {
        match &self.cache {
            Some(cache) => {
                let removed = cache.invalidate_collection(collection)?;
                debug!(collection, removed, "invalidated cached results");
                Ok(removed)
            }
            None => Ok(0),
        }
    }

    /// Drop every cached result
    pub fn clear_cache(&self) -> Result<()> {
        match &self.cache {
            Some(cache) => cache.clear(),
            None => Ok(()),
        }
    }

    /// Cache counters; all zero when caching is disabled
    pub fn cache_stats(&self) -> Result<CacheStats> {
        match &self.cache {
            Some(cache) => cache.stats(),
            None => Ok(CacheStats::default()),
        }
    }
}
