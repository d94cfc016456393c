//! Error types for RecordQuery.

use crate::logic::LogicError;
use crate::validate::ValidationError;
use std::fmt;

/// The main error type for RecordQuery operations.
#[derive(Debug)]
pub enum Error {
    /// A lock was poisoned (internal error)
    LockPoisoned,

    /// Serialization/deserialization error
    Serialization(String),

    /// Descriptor failed validation before dispatch
    InvalidQueryDescriptor(ValidationError),

    /// Custom logic expression could not be parsed
    InvalidLogic(LogicError),

    /// Condition operator not understood by the execution engine
    UnsupportedOperator(String),

    /// Execution service error
    Execution(String),

    /// Collection not found
    NotFound(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::LockPoisoned => write!(f, "Lock poisoned"),
            Error::Serialization(msg) => write!(f, "Serialization error: {}", msg),
            Error::InvalidQueryDescriptor(e) => write!(f, "Invalid query descriptor: {}", e),
            Error::InvalidLogic(e) => write!(f, "Invalid custom logic: {}", e),
            Error::UnsupportedOperator(op) => write!(f, "Unsupported operator: '{}'", op),
            Error::Execution(msg) => write!(f, "Execution error: {}", msg),
            Error::NotFound(name) => write!(f, "Collection not found: {}", name),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::InvalidQueryDescriptor(e) => Some(e),
            Error::InvalidLogic(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<ValidationError> for Error {
    fn from(err: ValidationError) -> Self {
        Error::InvalidQueryDescriptor(err)
    }
}

impl From<LogicError> for Error {
    fn from(err: LogicError) -> Self {
        Error::InvalidLogic(err)
    }
}

/// A specialized `Result` type for RecordQuery operations.
pub type Result<T> = std::result::Result<T, Error>;
