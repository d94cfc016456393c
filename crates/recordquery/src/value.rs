//! Value comparison and condition operators for the in-memory engine.

use crate::service::Record;
use recordquery_core::{Condition, Error, Result};
use serde_json::{Number, Value};
use std::cmp::Ordering;

/// Condition operators understood by the in-memory engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,    // =
    Ne,    // != or <>
    Lt,    // <
    Le,    // <=
    Gt,    // >
    Ge,    // >=
    Like,  // LIKE
    In,    // IN
    NotIn, // NOT IN
}

impl Operator {
    /// Parse an operator string, ignoring case and surrounding whitespace
    pub fn parse(text: &str) -> Result<Self> {
        let normalized = text
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_uppercase();

        match normalized.as_str() {
            "=" | "==" => Ok(Operator::Eq),
            "!=" | "<>" => Ok(Operator::Ne),
            "<" => Ok(Operator::Lt),
            "<=" => Ok(Operator::Le),
            ">" => Ok(Operator::Gt),
            ">=" => Ok(Operator::Ge),
            "LIKE" => Ok(Operator::Like),
            "IN" => Ok(Operator::In),
            "NOT IN" => Ok(Operator::NotIn),
            _ => Err(Error::UnsupportedOperator(text.to_string())),
        }
    }
}

/// A condition with its operator resolved once
#[derive(Debug, Clone)]
pub struct Predicate<'a> {
    field: &'a str,
    op: Operator,
    value: &'a Value,
}

impl<'a> Predicate<'a> {
    /// Resolve the operator of `condition`
    pub fn compile(condition: &'a Condition) -> Result<Self> {
        Ok(Self {
            field: &condition.field,
            op: Operator::parse(&condition.operator)?,
            value: &condition.value,
        })
    }

    /// Field the predicate reads
    pub fn field(&self) -> &str {
        self.field
    }

    /// Test the predicate against a record
    pub fn matches(&self, record: &Record) -> bool {
        self.matches_value(lookup(record, self.field))
    }

    /// Test the predicate against an already resolved field value
    pub fn matches_value(&self, actual: &Value) -> bool {
        let expected = self.value;
        match self.op {
            Operator::Eq => values_equal(actual, expected),
            Operator::Ne => !values_equal(actual, expected),
            Operator::Lt => compare(actual, expected) == Some(Ordering::Less),
            Operator::Le => matches!(
                compare(actual, expected),
                Some(Ordering::Less | Ordering::Equal)
            ),
            Operator::Gt => compare(actual, expected) == Some(Ordering::Greater),
            Operator::Ge => matches!(
                compare(actual, expected),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            Operator::Like => match (actual, expected) {
                (Value::String(text), Value::String(pattern)) => like(text, pattern),
                _ => false,
            },
            Operator::In => in_list(actual, expected),
            Operator::NotIn => !actual.is_null() && !in_list(actual, expected),
        }
    }
}

/// Read a field, following dotted paths into nested objects.
///
/// Missing fields read as `null`.
pub fn lookup<'a>(record: &'a Record, field: &str) -> &'a Value {
    static NULL: Value = Value::Null;

    if let Some(value) = record.get(field) {
        return value;
    }

    let mut parts = field.split('.');
    let mut current = match parts.next().and_then(|head| record.get(head)) {
        Some(value) => value,
        None => return &NULL,
    };
    for part in parts {
        current = match current.get(part) {
            Some(value) => value,
            None => return &NULL,
        };
    }
    current
}

/// Equality with numbers compared by value, so `1` equals `1.0`
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => compare_numbers(x, y) == Ordering::Equal,
        _ => a == b,
    }
}

enum Numeric {
    Int(i128),
    Float(f64),
}

impl Numeric {
    fn of(number: &Number) -> Self {
        if let Some(i) = number.as_i64() {
            Numeric::Int(i128::from(i))
        } else if let Some(u) = number.as_u64() {
            Numeric::Int(i128::from(u))
        } else {
            Numeric::Float(number.as_f64().unwrap_or_default())
        }
    }
}

/// Exact ordering of a float against an integer
fn compare_float_int(f: f64, i: i128) -> Ordering {
    // Beyond every i64/u64 the sign decides
    const BOUND: f64 = 1.0e30;
    if f >= BOUND {
        return Ordering::Greater;
    }
    if f <= -BOUND {
        return Ordering::Less;
    }
    let whole = f.trunc();
    match (whole as i128).cmp(&i) {
        Ordering::Equal => f.partial_cmp(&whole).unwrap_or(Ordering::Equal),
        ordering => ordering,
    }
}

/// Numeric ordering; integers compare exactly, also against floats
pub fn compare_numbers(x: &Number, y: &Number) -> Ordering {
    match (Numeric::of(x), Numeric::of(y)) {
        (Numeric::Int(a), Numeric::Int(b)) => a.cmp(&b),
        (Numeric::Float(a), Numeric::Float(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
        (Numeric::Float(a), Numeric::Int(b)) => compare_float_int(a, b),
        (Numeric::Int(a), Numeric::Float(b)) => compare_float_int(b, a).reverse(),
    }
}

/// Ordering between two values of the same kind.
///
/// `null` sorts before everything. Mismatched kinds are unordered.
pub fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        (Value::Null, _) => Some(Ordering::Less),
        (_, Value::Null) => Some(Ordering::Greater),
        (Value::Number(x), Value::Number(y)) => Some(compare_numbers(x, y)),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

fn kind_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

/// Total order for sorting.
///
/// Kinds rank null, bool, number, string, array, object; values of one kind
/// compare by value, arrays and objects by their JSON text.
pub fn sort_order(a: &Value, b: &Value) -> Ordering {
    if let Some(ordering) = compare(a, b) {
        return ordering;
    }
    match kind_rank(a).cmp(&kind_rank(b)) {
        Ordering::Equal => a.to_string().cmp(&b.to_string()),
        ordering => ordering,
    }
}

fn in_list(actual: &Value, expected: &Value) -> bool {
    match expected {
        Value::Array(items) => items.iter().any(|item| values_equal(actual, item)),
        single => values_equal(actual, single),
    }
}

/// Case-insensitive LIKE: `%` matches any run of characters, `_` exactly one
pub fn like(text: &str, pattern: &str) -> bool {
    let text: Vec<char> = text.to_lowercase().chars().collect();
    let pattern: Vec<char> = pattern.to_lowercase().chars().collect();

    // Greedy wildcard matching with backtracking to the last `%`
    let (mut t, mut p) = (0, 0);
    let mut star: Option<(usize, usize)> = None;

    while t < text.len() {
        if p < pattern.len() && (pattern[p] == '_' || pattern[p] == text[t]) {
            t += 1;
            p += 1;
        } else if p < pattern.len() && pattern[p] == '%' {
            star = Some((p, t));
            p += 1;
        } else if let Some((star_p, star_t)) = star {
            p = star_p + 1;
            t = star_t + 1;
            star = Some((star_p, star_t + 1));
        } else {
            return false;
        }
    }

    pattern[p..].iter().all(|&c| c == '%')
}
