//! Fluent query builder.
//!
//! [`QueryBuilder`] accumulates clauses through `&mut self` methods that
//! return the builder, and [`QueryBuilder::build`] hands out a detached
//! [`QueryDescriptor`]. The builder never rejects input; call
//! [`QueryDescriptor::validate`] to check a descriptor before dispatch.
//!
//! # Examples
//!
//! ```rust
//! use recordquery_core::{QueryBuilder, SortOrder};
//!
//! let mut builder = QueryBuilder::new("Account");
//! builder
//!     .add_field("Id")
//!     .add_field("Name")
//!     .add_where_condition("Type", "=", "Customer")
//!     .add_where_condition("Rating", "=", "Hot")
//!     .add_where_condition("AnnualRevenue", ">", 1_000_000)
//!     .set_custom_logic("1 AND (2 OR 3)")
//!     .create_order_by(["Name"], SortOrder::Asc)
//!     .set_limit(50);
//!
//! let descriptor = builder.build();
//! assert_eq!(descriptor.conditions().len(), 3);
//! assert_eq!(descriptor.query_limit, Some(50));
//! ```

use crate::descriptor::{Condition, GroupBy, OrderBy, QueryDescriptor, SortOrder};
use crate::error::Result;
use serde_json::Value;

/// Appends `name` unless it is already present.
fn push_unique(list: &mut Vec<String>, name: String) {
    if !list.contains(&name) {
        list.push(name);
    }
}

/// Mutable accumulator for a query against one record collection.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryBuilder {
    collection_name: String,
    fields: Option<Vec<String>>,
    where_conditions: Option<Vec<Condition>>,
    custom_logic: Option<String>,
    group_by: Option<GroupBy>,
    order_by: Option<OrderBy>,
    query_limit: Option<i64>,
}

impl QueryBuilder {
    /// Builder for `collection` with no clauses: builds to "select all, no filter".
    pub fn new(collection: impl Into<String>) -> Self {
        Self::create(collection, None, None, None, None, None, None)
    }

    /// Builder with every clause supplied up front.
    ///
    /// Values are stored as given; lists are not de-duplicated.
    pub fn create(
        collection: impl Into<String>,
        fields: Option<Vec<String>>,
        where_conditions: Option<Vec<Condition>>,
        custom_logic: Option<String>,
        group_by: Option<GroupBy>,
        order_by: Option<OrderBy>,
        query_limit: Option<i64>,
    ) -> Self {
        Self {
            collection_name: collection.into(),
            fields,
            where_conditions,
            custom_logic,
            group_by,
            order_by,
            query_limit,
        }
    }

    /// Target collection
    pub fn collection_name(&self) -> &str {
        &self.collection_name
    }

    /// Adds a projection field if it is not already selected.
    pub fn add_field(&mut self, name: impl Into<String>) -> &mut Self {
        push_unique(self.fields.get_or_insert_with(Vec::new), name.into());
        self
    }

    /// Replaces the projection fields. Duplicates are kept.
    pub fn set_fields<I, S>(&mut self, fields: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Replaces the where conditions.
    pub fn set_where_conditions(&mut self, conditions: Vec<Condition>) -> &mut Self {
        self.where_conditions = Some(conditions);
        self
    }

    /// Appends a where condition. Its 1-based position is the index custom
    /// logic refers to.
    pub fn add_where_condition(
        &mut self,
        field: impl Into<String>,
        operator: impl Into<String>,
        value: impl Into<Value>,
    ) -> &mut Self {
        self.where_conditions
            .get_or_insert_with(Vec::new)
            .push(Condition::new(field, operator, value));
        self
    }

    /// Stores the where logic verbatim, e.g. `1 AND (2 OR 3)`.
    pub fn set_custom_logic(&mut self, logic: impl Into<String>) -> &mut Self {
        self.custom_logic = Some(logic.into());
        self
    }

    /// Creates the GROUP BY clause.
    ///
    /// Does nothing when a group already exists, including one created
    /// lazily by [`add_group_by_field`](Self::add_group_by_field) or its
    /// siblings.
    pub fn create_group_by<I, S>(
        &mut self,
        fields: I,
        having: Vec<Condition>,
        logic: Option<String>,
    ) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if self.group_by.is_none() {
            self.group_by = Some(GroupBy {
                fields: Some(fields.into_iter().map(Into::into).collect()),
                having_conditions: Some(having),
                custom_logic: logic,
            });
        }
        self
    }

    /// Adds a grouping field if absent, creating the group as needed.
    pub fn add_group_by_field(&mut self, name: impl Into<String>) -> &mut Self {
        let group = self.group_by.get_or_insert_with(GroupBy::default);
        push_unique(group.fields.get_or_insert_with(Vec::new), name.into());
        self
    }

    /// Appends a HAVING condition, creating the group as needed.
    pub fn add_group_by_condition(
        &mut self,
        field: impl Into<String>,
        operator: impl Into<String>,
        value: impl Into<Value>,
    ) -> &mut Self {
        let group = self.group_by.get_or_insert_with(GroupBy::default);
        group
            .having_conditions
            .get_or_insert_with(Vec::new)
            .push(Condition::new(field, operator, value));
        self
    }

    /// Sets the HAVING logic, creating the group as needed.
    pub fn set_group_by_logic(&mut self, logic: impl Into<String>) -> &mut Self {
        self.group_by.get_or_insert_with(GroupBy::default).custom_logic = Some(logic.into());
        self
    }

    /// Creates the ORDER BY clause unless one already exists.
    pub fn create_order_by<I, S>(&mut self, fields: I, order: SortOrder) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if self.order_by.is_none() {
            self.order_by = Some(OrderBy {
                fields: Some(fields.into_iter().map(Into::into).collect()),
                order: Some(order),
            });
        }
        self
    }

    /// Adds a sort field if absent, creating the clause as needed.
    pub fn add_order_by_field(&mut self, name: impl Into<String>) -> &mut Self {
        let order_by = self.order_by.get_or_insert_with(OrderBy::default);
        push_unique(order_by.fields.get_or_insert_with(Vec::new), name.into());
        self
    }

    /// Sets the sort direction, creating the clause as needed.
    pub fn set_order_by_order(&mut self, order: SortOrder) -> &mut Self {
        self.order_by.get_or_insert_with(OrderBy::default).order = Some(order);
        self
    }

    /// Sets the row limit verbatim.
    pub fn set_limit(&mut self, limit: i64) -> &mut Self {
        self.query_limit = Some(limit);
        self
    }

    /// Snapshot of the current state.
    ///
    /// The descriptor shares nothing with the builder, and building does not
    /// change the builder.
    pub fn build(&self) -> QueryDescriptor {
        QueryDescriptor {
            collection_name: self.collection_name.clone(),
            fields: self.fields.clone(),
            where_conditions: self.where_conditions.clone(),
            custom_logic: self.custom_logic.clone(),
            group_by: self.group_by.clone(),
            order_by: self.order_by.clone(),
            query_limit: self.query_limit,
        }
    }

    /// Validate the descriptor this builder would produce.
    pub fn validate(&self) -> Result<()> {
        self.build().validate()
    }
}
