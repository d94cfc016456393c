//! Expression tree for custom logic
//!
//! Leaves are 1-based references into a flat condition list. `AND` and `OR`
//! hold all operands of a chain in one node, so tree depth only grows with
//! parentheses and `NOT`.

use super::parser::{LogicError, Parser};
use std::fmt;

/// Parsed custom logic expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogicExpr {
    /// Reference to condition N (1-based)
    Ref(usize),
    /// True when every operand is true
    And(Vec<LogicExpr>),
    /// True when any operand is true
    Or(Vec<LogicExpr>),
    /// NOT expression
    Not(Box<LogicExpr>),
}

impl LogicExpr {
    /// Parse custom logic text
    pub fn parse(input: &str) -> Result<Self, LogicError> {
        Parser::new(input)?.parse()
    }

    /// The default logic for `count` conditions: `1 AND 2 AND ... count`.
    ///
    /// Returns `None` for zero conditions.
    pub fn implicit_and(count: usize) -> Option<Self> {
        match count {
            0 => None,
            1 => Some(LogicExpr::Ref(1)),
            _ => Some(LogicExpr::And((1..=count).map(LogicExpr::Ref).collect())),
        }
    }

    /// Resolve the logic applied to `count` conditions.
    ///
    /// Blank or missing custom logic falls back to [`LogicExpr::implicit_and`].
    pub fn resolve(custom: Option<&str>, count: usize) -> Result<Option<Self>, LogicError> {
        match custom {
            Some(text) if !text.trim().is_empty() => Self::parse(text).map(Some),
            _ => Ok(Self::implicit_and(count)),
        }
    }

    /// Referenced condition indices in order of appearance
    pub fn indices(&self) -> Vec<usize> {
        let mut out = Vec::new();
        self.collect_indices(&mut out);
        out
    }

    fn collect_indices(&self, out: &mut Vec<usize>) {
        match self {
            LogicExpr::Ref(i) => out.push(*i),
            LogicExpr::And(operands) | LogicExpr::Or(operands) => {
                for operand in operands {
                    operand.collect_indices(out);
                }
            }
            LogicExpr::Not(inner) => inner.collect_indices(out),
        }
    }

    /// Largest referenced index
    pub fn max_index(&self) -> usize {
        match self {
            LogicExpr::Ref(i) => *i,
            LogicExpr::And(operands) | LogicExpr::Or(operands) => {
                operands.iter().map(LogicExpr::max_index).max().unwrap_or(0)
            }
            LogicExpr::Not(inner) => inner.max_index(),
        }
    }

    /// Check that every reference points into a list of `count` conditions
    pub fn check_bounds(&self, count: usize) -> Result<(), LogicError> {
        match self.indices().into_iter().find(|&i| i > count) {
            Some(index) => Err(LogicError::IndexOutOfRange { index, count }),
            None => Ok(()),
        }
    }

    /// Evaluate against per-condition results.
    ///
    /// `results[0]` is condition 1. Returns `None` if a reference is out of range.
    pub fn evaluate(&self, results: &[bool]) -> Option<bool> {
        match self {
            LogicExpr::Ref(i) => i.checked_sub(1).and_then(|idx| results.get(idx).copied()),
            LogicExpr::And(operands) => operands.iter().try_fold(true, |acc, operand| {
                operand.evaluate(results).map(|value| acc && value)
            }),
            LogicExpr::Or(operands) => operands.iter().try_fold(false, |acc, operand| {
                operand.evaluate(results).map(|value| acc || value)
            }),
            LogicExpr::Not(inner) => inner.evaluate(results).map(|v| !v),
        }
    }

    fn precedence(&self) -> u8 {
        match self {
            LogicExpr::Or(_) => 1,
            LogicExpr::And(_) => 2,
            LogicExpr::Not(_) => 3,
            LogicExpr::Ref(_) => 4,
        }
    }

    /// A nested chain is parenthesized unless it binds tighter than its parent
    fn fmt_child(&self, child: &LogicExpr, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let chain = matches!(child, LogicExpr::And(_) | LogicExpr::Or(_));
        if chain && child.precedence() <= self.precedence() {
            write!(f, "({})", child)
        } else {
            write!(f, "{}", child)
        }
    }

    fn fmt_chain(
        &self,
        operands: &[LogicExpr],
        op: &str,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        for (i, operand) in operands.iter().enumerate() {
            if i > 0 {
                write!(f, " {} ", op)?;
            }
            self.fmt_child(operand, f)?;
        }
        Ok(())
    }
}

impl fmt::Display for LogicExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicExpr::Ref(i) => write!(f, "{}", i),
            LogicExpr::And(operands) => self.fmt_chain(operands, "AND", f),
            LogicExpr::Or(operands) => self.fmt_chain(operands, "OR", f),
            LogicExpr::Not(inner) => {
                write!(f, "NOT ")?;
                self.fmt_child(inner, f)
            }
        }
    }
}
