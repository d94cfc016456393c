//! Aggregate projections such as `COUNT(Id)` or `SUM(Amount) total`.

use crate::service::Record;
use crate::value::{compare, lookup};
use serde_json::{Number, Value};
use std::cmp::Ordering;
use std::collections::HashSet;

/// Aggregate functions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateFunction {
    Count,
    CountDistinct,
    Sum,
    Avg,
    Min,
    Max,
}

/// An aggregate expression parsed from a projection or HAVING field
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregate {
    pub function: AggregateFunction,
    /// Argument field; `None` for `COUNT()`
    pub column: Option<String>,
    /// Output key: the alias when given, otherwise the expression text
    pub label: String,
}

impl Aggregate {
    /// Parse `FUNC(arg)` with an optional trailing alias.
    ///
    /// Returns `None` when the text is a plain field.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let open = text.find('(')?;
        let close = text.rfind(')')?;
        if close < open {
            return None;
        }

        let function = match text[..open].trim().to_uppercase().as_str() {
            "COUNT" => AggregateFunction::Count,
            "COUNT_DISTINCT" => AggregateFunction::CountDistinct,
            "SUM" => AggregateFunction::Sum,
            "AVG" => AggregateFunction::Avg,
            "MIN" => AggregateFunction::Min,
            "MAX" => AggregateFunction::Max,
            _ => return None,
        };

        let argument = text[open + 1..close].trim();
        let column = match argument {
            "" | "*" => None,
            name => Some(name.to_string()),
        };
        if column.is_none() && function != AggregateFunction::Count {
            return None;
        }

        let alias = text[close + 1..].trim();
        let label = if alias.is_empty() {
            text[..=close].to_string()
        } else {
            alias.to_string()
        };

        Some(Self {
            function,
            column,
            label,
        })
    }

    /// Compute the aggregate over a group of records
    pub fn compute(&self, rows: &[Record]) -> Value {
        let Some(column) = self.column.as_deref() else {
            return Value::from(rows.len());
        };
        let values = rows
            .iter()
            .map(|row| lookup(row, column))
            .filter(|value| !value.is_null());

        match self.function {
            AggregateFunction::Count => Value::from(values.count()),
            AggregateFunction::CountDistinct => {
                let distinct: HashSet<String> = values.map(|v| v.to_string()).collect();
                Value::from(distinct.len())
            }
            AggregateFunction::Sum => {
                let numbers: Vec<f64> = values.filter_map(Value::as_f64).collect();
                if numbers.is_empty() {
                    Value::Null
                } else {
                    number(numbers.iter().sum())
                }
            }
            AggregateFunction::Avg => {
                let numbers: Vec<f64> = values.filter_map(Value::as_f64).collect();
                if numbers.is_empty() {
                    Value::Null
                } else {
                    number(numbers.iter().sum::<f64>() / numbers.len() as f64)
                }
            }
            AggregateFunction::Min => extreme(values, Ordering::Less),
            AggregateFunction::Max => extreme(values, Ordering::Greater),
        }
    }
}

fn extreme<'a>(values: impl Iterator<Item = &'a Value>, wanted: Ordering) -> Value {
    values
        .fold(None::<&Value>, |best, value| match best {
            Some(current) if compare(value, current) != Some(wanted) => Some(current),
            _ => Some(value),
        })
        .cloned()
        .unwrap_or(Value::Null)
}

/// Whole floats become integers so sums of integers stay integers
fn number(value: f64) -> Value {
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        Value::from(value as i64)
    } else {
        Number::from_f64(value).map_or(Value::Null, Value::Number)
    }
}
