//! # RecordQuery Core
//!
//! Query descriptor model, fluent builder, custom logic grammar and
//! descriptor validation for RecordQuery.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod builder;
pub mod descriptor;
pub mod error;
pub mod logic;
pub mod validate;

pub use builder::QueryBuilder;
pub use descriptor::{Condition, GroupBy, OrderBy, QueryDescriptor, SortOrder};
pub use error::{Error, Result};
pub use logic::{LogicError, LogicExpr};
pub use validate::{LogicClause, ValidationError};
