//! In-memory query engine.
//!
//! Executes descriptors against named collections of JSON records. Stages
//! run in a fixed order: filter, group (with HAVING), sort, limit, project.

use crate::aggregate::Aggregate;
use crate::service::{QueryService, Record};
use crate::value::{lookup, sort_order, Predicate};
use recordquery_core::{
    Condition, Error, LogicExpr, OrderBy, QueryDescriptor, Result, SortOrder, ValidationError,
};
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::{debug, trace};

/// Query service backed by in-memory collections
#[derive(Default)]
pub struct MemoryQueryService {
    collections: RwLock<HashMap<String, Vec<Record>>>,
}

impl MemoryQueryService {
    /// Create a service with no collections
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a collection, builder style
    pub fn with_collection(self, name: impl Into<String>, records: Vec<Record>) -> Result<Self> {
        self.insert_collection(name, records)?;
        Ok(self)
    }

    /// Add or replace a collection
    pub fn insert_collection(&self, name: impl Into<String>, records: Vec<Record>) -> Result<()> {
        let mut collections = self.collections.write().map_err(|_| Error::LockPoisoned)?;
        collections.insert(name.into(), records);
        Ok(())
    }

    /// Append one record, creating the collection if needed
    pub fn push_record(&self, collection: &str, record: Record) -> Result<()> {
        let mut collections = self.collections.write().map_err(|_| Error::LockPoisoned)?;
        collections
            .entry(collection.to_string())
            .or_default()
            .push(record);
        Ok(())
    }

    /// Number of records in a collection
    pub fn record_count(&self, collection: &str) -> Result<usize> {
        let collections = self.collections.read().map_err(|_| Error::LockPoisoned)?;
        collections
            .get(collection)
            .map(Vec::len)
            .ok_or_else(|| Error::NotFound(collection.to_string()))
    }
}

impl QueryService for MemoryQueryService {
    fn execute(&self, descriptor: &QueryDescriptor) -> Result<Vec<Record>> {
        descriptor.validate()?;

        let rows = {
            let collections = self.collections.read().map_err(|_| Error::LockPoisoned)?;
            collections
                .get(&descriptor.collection_name)
                .cloned()
                .ok_or_else(|| Error::NotFound(descriptor.collection_name.clone()))?
        };

        run(descriptor, rows)
    }
}

/// Execute a descriptor over `rows`.
///
/// The descriptor is assumed valid; a negative limit is still rejected.
pub fn run(descriptor: &QueryDescriptor, rows: Vec<Record>) -> Result<Vec<Record>> {
    let scanned = rows.len();
    let rows = filter(rows, descriptor.conditions(), descriptor.effective_logic()?)?;
    debug!(
        collection = %descriptor.collection_name,
        scanned,
        matched = rows.len(),
        "filtered rows"
    );

    let grouped = is_grouped(descriptor);
    let mut rows = if grouped { group(descriptor, rows)? } else { rows };

    sort(&mut rows, descriptor.order_by.as_ref());

    if let Some(limit) = descriptor.query_limit {
        let limit = usize::try_from(limit).map_err(|_| ValidationError::NegativeLimit(limit))?;
        rows.truncate(limit);
    }

    if grouped {
        Ok(rows)
    } else {
        Ok(project(rows, descriptor.fields.as_deref()))
    }
}

fn is_grouped(descriptor: &QueryDescriptor) -> bool {
    let has_keys = descriptor
        .group_by
        .as_ref()
        .is_some_and(|group| !group.group_fields().is_empty());
    let has_aggregates = descriptor
        .fields
        .iter()
        .flatten()
        .any(|field| Aggregate::parse(field).is_some());
    has_keys || has_aggregates
}

fn filter(
    rows: Vec<Record>,
    conditions: &[Condition],
    logic: Option<LogicExpr>,
) -> Result<Vec<Record>> {
    let Some(logic) = logic else {
        return Ok(rows);
    };
    let predicates = conditions
        .iter()
        .map(Predicate::compile)
        .collect::<Result<Vec<_>>>()?;

    Ok(rows
        .into_iter()
        .filter(|row| {
            let results: Vec<bool> = predicates.iter().map(|p| p.matches(row)).collect();
            logic.evaluate(&results).unwrap_or(false)
        })
        .collect())
}

enum OutputColumn {
    Key { name: String, index: usize },
    Aggregate(Aggregate),
}

fn group(descriptor: &QueryDescriptor, rows: Vec<Record>) -> Result<Vec<Record>> {
    let group = descriptor.group_by.clone().unwrap_or_default();
    let keys = group.group_fields();
    let key_index = |name: &str| keys.iter().position(|key| key == name);

    let columns = match descriptor.fields.as_deref() {
        None => keys
            .iter()
            .enumerate()
            .map(|(index, name)| OutputColumn::Key {
                name: name.clone(),
                index,
            })
            .collect(),
        Some(fields) => fields
            .iter()
            .map(|field| match (Aggregate::parse(field), key_index(field.as_str())) {
                (Some(aggregate), _) => Ok(OutputColumn::Aggregate(aggregate)),
                (None, Some(index)) => Ok(OutputColumn::Key {
                    name: field.clone(),
                    index,
                }),
                (None, None) => Err(Error::Execution(format!(
                    "field '{}' must be grouped or aggregated",
                    field
                ))),
            })
            .collect::<Result<Vec<_>>>()?,
    };

    // Buckets keep first-seen order
    let mut buckets: Vec<(Vec<Value>, Vec<Record>)> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    for row in rows {
        let key: Vec<Value> = keys.iter().map(|k| lookup(&row, k).clone()).collect();
        let id = Value::Array(key.clone()).to_string();
        match positions.get(&id) {
            Some(&position) => buckets[position].1.push(row),
            None => {
                positions.insert(id, buckets.len());
                buckets.push((key, vec![row]));
            }
        }
    }
    if keys.is_empty() && buckets.is_empty() {
        buckets.push((Vec::new(), Vec::new()));
    }

    let having = group
        .having()
        .iter()
        .map(|condition| -> Result<_> {
            Ok((
                Predicate::compile(condition)?,
                Aggregate::parse(&condition.field),
            ))
        })
        .collect::<Result<Vec<_>>>()?;
    let logic = group.effective_logic()?;

    let mut out = Vec::with_capacity(buckets.len());
    for (key, members) in buckets {
        if let Some(logic) = &logic {
            let results: Vec<bool> = having
                .iter()
                .map(|(predicate, aggregate)| {
                    let value = match aggregate {
                        Some(aggregate) => aggregate.compute(&members),
                        None => key_index(predicate.field())
                            .map(|i| key[i].clone())
                            .unwrap_or(Value::Null),
                    };
                    predicate.matches_value(&value)
                })
                .collect();
            if !logic.evaluate(&results).unwrap_or(false) {
                trace!(?key, "group removed by HAVING");
                continue;
            }
        }

        let record: Record = columns
            .iter()
            .map(|column| match column {
                OutputColumn::Key { name, index } => (name.clone(), key[*index].clone()),
                OutputColumn::Aggregate(aggregate) => {
                    (aggregate.label.clone(), aggregate.compute(&members))
                }
            })
            .collect();
        out.push(record);
    }

    debug!(groups = out.len(), "grouped rows");
    Ok(out)
}

fn sort(rows: &mut [Record], order_by: Option<&OrderBy>) {
    let Some(order_by) = order_by else {
        return;
    };
    let fields = order_by.fields.as_deref().unwrap_or_default();
    if fields.is_empty() {
        return;
    }
    let descending = order_by.order == Some(SortOrder::Desc);

    rows.sort_by(|a, b| {
        for field in fields {
            let ordering = sort_order(lookup(a, field), lookup(b, field));
            if ordering != Ordering::Equal {
                return if descending {
                    ordering.reverse()
                } else {
                    ordering
                };
            }
        }
        Ordering::Equal
    });
}

fn project(rows: Vec<Record>, fields: Option<&[String]>) -> Vec<Record> {
    let Some(fields) = fields else {
        return rows;
    };

    rows.into_iter()
        .map(|row| {
            fields
                .iter()
                .map(|field| (field.clone(), lookup(&row, field).clone()))
                .collect()
        })
        .collect()
}
