//! Descriptor validation.
//!
//! The builder accepts anything. Validation is the explicit step that
//! rejects descriptors an execution engine could not interpret.

use crate::descriptor::QueryDescriptor;
use crate::error::Result;
use crate::logic::{LogicError, LogicExpr};
use std::fmt;

/// Which logic string a validation error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicClause {
    /// `customLogic` over `whereConditions`
    Where,
    /// `groupBy.customLogic` over `groupBy.havingConditions`
    Having,
}

impl fmt::Display for LogicClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicClause::Where => write!(f, "WHERE"),
            LogicClause::Having => write!(f, "HAVING"),
        }
    }
}

/// Reasons a descriptor is rejected
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Collection name is empty or whitespace
    EmptyCollectionName,
    /// Query limit is below zero
    NegativeLimit(i64),
    /// Custom logic does not parse or references a missing condition
    InvalidLogic {
        /// Clause the logic belongs to
        clause: LogicClause,
        /// Underlying problem
        error: LogicError,
    },
    /// HAVING conditions without any GROUP BY field
    HavingWithoutGroupFields,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::EmptyCollectionName => write!(f, "collection name is empty"),
            ValidationError::NegativeLimit(n) => {
                write!(f, "query limit {} must be non-negative", n)
            }
            ValidationError::InvalidLogic { clause, error } => {
                write!(f, "{} logic: {}", clause, error)
            }
            ValidationError::HavingWithoutGroupFields => {
                write!(f, "HAVING conditions require at least one GROUP BY field")
            }
        }
    }
}

impl std::error::Error for ValidationError {}

fn check_logic(
    clause: LogicClause,
    custom: Option<&str>,
    count: usize,
) -> std::result::Result<(), ValidationError> {
    let result = match custom {
        Some(text) if !text.trim().is_empty() => {
            LogicExpr::parse(text).and_then(|expr| expr.check_bounds(count))
        }
        _ => Ok(()),
    };
    result.map_err(|error| ValidationError::InvalidLogic { clause, error })
}

impl QueryDescriptor {
    /// Check the descriptor before it crosses the execution boundary.
    ///
    /// Rejects an empty collection name, a negative limit, custom logic that
    /// does not parse or points past the end of its condition list, and
    /// HAVING conditions without grouping fields.
    pub fn validate(&self) -> Result<()> {
        if self.collection_name.trim().is_empty() {
            return Err(ValidationError::EmptyCollectionName.into());
        }

        if let Some(limit) = self.query_limit {
            if limit < 0 {
                return Err(ValidationError::NegativeLimit(limit).into());
            }
        }

        check_logic(
            LogicClause::Where,
            self.custom_logic.as_deref(),
            self.conditions().len(),
        )?;

        if let Some(group) = &self.group_by {
            if !group.having().is_empty() && group.group_fields().is_empty() {
                return Err(ValidationError::HavingWithoutGroupFields.into());
            }
            check_logic(
                LogicClause::Having,
                group.custom_logic.as_deref(),
                group.having().len(),
            )?;
        }

        Ok(())
    }
}
