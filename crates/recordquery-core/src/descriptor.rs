//! Query descriptor model.
//!
//! A [`QueryDescriptor`] is the immutable snapshot produced by
//! [`QueryBuilder::build`](crate::QueryBuilder::build) and sent to a query
//! execution service. Its JSON shape is a fixed wire contract: keys are
//! camelCase and unset members are omitted entirely.

use crate::error::Result;
use crate::logic::{LogicError, LogicExpr};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// A single filter predicate: `field operator value`.
///
/// The operator is opaque to the builder and interpreted by the execution
/// engine only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    /// Field the predicate reads
    pub field: String,
    /// Comparison operator, e.g. `=` or `LIKE`
    pub operator: String,
    /// Comparand; a missing wire value decodes as null
    #[serde(default)]
    pub value: Value,
}

impl Condition {
    /// Create a condition
    pub fn new(
        field: impl Into<String>,
        operator: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        Self {
            field: field.into(),
            operator: operator.into(),
            value: value.into(),
        }
    }
}

/// Sort direction of an ORDER BY clause
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    /// Ascending
    #[serde(rename = "ASC")]
    Asc,
    /// Descending
    #[serde(rename = "DESC")]
    Desc,
}

impl SortOrder {
    /// Wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// GROUP BY clause with optional HAVING conditions.
///
/// Every member is optional: the lazy initializers on the builder create a
/// group with only the member they touch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupBy {
    /// Grouping fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<String>>,
    /// HAVING conditions, addressed 1-based by `custom_logic`
    #[serde(
        default,
        alias = "havingCoditions",
        skip_serializing_if = "Option::is_none"
    )]
    pub having_conditions: Option<Vec<Condition>>,
    /// Logic over the HAVING conditions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_logic: Option<String>,
}

impl GroupBy {
    /// Having conditions, empty when unset
    pub fn having(&self) -> &[Condition] {
        self.having_conditions.as_deref().unwrap_or_default()
    }

    /// Grouping fields, empty when unset
    pub fn group_fields(&self) -> &[String] {
        self.fields.as_deref().unwrap_or_default()
    }

    /// Logic applied to the having conditions: the custom logic when set,
    /// otherwise an implicit AND over every having condition.
    pub fn effective_logic(&self) -> std::result::Result<Option<LogicExpr>, LogicError> {
        LogicExpr::resolve(self.custom_logic.as_deref(), self.having().len())
    }
}

/// ORDER BY clause
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderBy {
    /// Sort keys, most significant first
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<String>>,
    /// Direction applied to every key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<SortOrder>,
}

/// Snapshot of a query, ready to be handed to an execution service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryDescriptor {
    /// Target collection
    #[serde(alias = "objectApiName")]
    pub collection_name: String,
    /// Projected fields; all fields when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<String>>,
    /// Filter conditions, addressed 1-based by `custom_logic`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub where_conditions: Option<Vec<Condition>>,
    /// Logic over the filter conditions; implicit AND when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_logic: Option<String>,
    /// Grouping clause
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_by: Option<GroupBy>,
    /// Sorting clause
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_by: Option<OrderBy>,
    /// Maximum number of rows
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_limit: Option<i64>,
}

impl QueryDescriptor {
    /// Where conditions, empty when unset
    pub fn conditions(&self) -> &[Condition] {
        self.where_conditions.as_deref().unwrap_or_default()
    }

    /// Logic applied to the where conditions.
    ///
    /// Returns the parsed custom logic when one is set, the implicit AND of
    /// all conditions otherwise, and `None` when there is nothing to filter.
    pub fn effective_logic(&self) -> std::result::Result<Option<LogicExpr>, LogicError> {
        LogicExpr::resolve(self.custom_logic.as_deref(), self.conditions().len())
    }

    /// Serialize to the JSON wire format
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Serialize to indented JSON
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Decode a descriptor from its JSON wire format.
    ///
    /// Accepts the legacy keys `objectApiName` and `havingCoditions`.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
