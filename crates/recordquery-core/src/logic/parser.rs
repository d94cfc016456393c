//! Parser for custom logic expressions
//!
//! Precedence from loosest to tightest: OR, AND, NOT. Chains of one operator
//! are collected into a single node.

use super::ast::LogicExpr;
use super::lexer::{Lexer, LexerError, Token};
use std::fmt;

/// Maximum nesting of parentheses and NOT
pub const MAX_DEPTH: usize = 64;

/// Parser for custom logic
pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
    depth: usize,
}

impl Parser {
    /// Create a new parser from logic text
    pub fn new(input: &str) -> Result<Self, LogicError> {
        let mut lexer = Lexer::new(input);
        let tokens = lexer.tokenize().map_err(LogicError::Lexer)?;
        Ok(Self {
            tokens,
            position: 0,
            depth: 0,
        })
    }

    /// Parse the whole input into an expression
    pub fn parse(&mut self) -> Result<LogicExpr, LogicError> {
        if self.current_token() == &Token::Eof {
            return Err(LogicError::Empty);
        }

        let expr = self.parse_or()?;

        match self.current_token() {
            Token::Eof => Ok(expr),
            token => Err(LogicError::UnexpectedToken {
                expected: "AND, OR or end of expression".to_string(),
                found: token.clone(),
            }),
        }
    }

    fn parse_or(&mut self) -> Result<LogicExpr, LogicError> {
        let mut operands = vec![self.parse_and()?];

        while self.current_token() == &Token::Or {
            self.advance();
            operands.push(self.parse_and()?);
        }

        Ok(chain(operands, LogicExpr::Or))
    }

    fn parse_and(&mut self) -> Result<LogicExpr, LogicError> {
        let mut operands = vec![self.parse_not()?];

        while self.current_token() == &Token::And {
            self.advance();
            operands.push(self.parse_not()?);
        }

        Ok(chain(operands, LogicExpr::And))
    }

    fn parse_not(&mut self) -> Result<LogicExpr, LogicError> {
        if self.current_token() == &Token::Not {
            self.advance();
            self.enter()?;
            let expr = self.parse_not()?;
            self.depth -= 1;
            return Ok(LogicExpr::Not(Box::new(expr)));
        }

        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<LogicExpr, LogicError> {
        match self.current_token().clone() {
            Token::Index(0) => Err(LogicError::ZeroIndex),
            Token::Index(i) => {
                self.advance();
                Ok(LogicExpr::Ref(i))
            }
            Token::LeftParen => {
                self.advance();
                self.enter()?;
                let expr = self.parse_or()?;
                self.depth -= 1;
                match self.current_token() {
                    Token::RightParen => {
                        self.advance();
                        Ok(expr)
                    }
                    Token::Eof => Err(LogicError::UnclosedParenthesis),
                    token => Err(LogicError::UnexpectedToken {
                        expected: ")".to_string(),
                        found: token.clone(),
                    }),
                }
            }
            token => Err(LogicError::UnexpectedToken {
                expected: "condition index, NOT or (".to_string(),
                found: token,
            }),
        }
    }

    fn enter(&mut self) -> Result<(), LogicError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(LogicError::TooDeep(MAX_DEPTH));
        }
        Ok(())
    }

    fn current_token(&self) -> &Token {
        &self.tokens[self.position]
    }

    fn advance(&mut self) {
        if self.position < self.tokens.len() - 1 {
            self.position += 1;
        }
    }
}

/// A single operand stands alone; more become one chain node
fn chain(mut operands: Vec<LogicExpr>, node: fn(Vec<LogicExpr>) -> LogicExpr) -> LogicExpr {
    if operands.len() == 1 {
        operands.remove(0)
    } else {
        node(operands)
    }
}

/// Custom logic errors
#[derive(Debug, Clone, PartialEq)]
pub enum LogicError {
    /// The text could not be tokenized
    Lexer(LexerError),
    /// Blank input
    Empty,
    /// Condition indices are 1-based
    ZeroIndex,
    /// Token that does not fit the grammar at its position
    UnexpectedToken {
        /// What the parser was looking for
        expected: String,
        /// What it found instead
        found: Token,
    },
    /// Input ended inside parentheses
    UnclosedParenthesis,
    /// Reference past the end of the condition list
    IndexOutOfRange {
        /// Offending 1-based index
        index: usize,
        /// Number of conditions available
        count: usize,
    },
    /// Parentheses and NOT nested past the limit
    TooDeep(usize),
}

impl fmt::Display for LogicError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicError::Lexer(e) => write!(f, "Lexer error: {}", e),
            LogicError::Empty => write!(f, "Logic expression is empty"),
            LogicError::ZeroIndex => write!(f, "Condition indices start at 1"),
            LogicError::UnexpectedToken { expected, found } => {
                write!(f, "Expected {}, found {}", expected, found)
            }
            LogicError::UnclosedParenthesis => write!(f, "Unclosed parenthesis"),
            LogicError::IndexOutOfRange { index, count } => write!(
                f,
                "Condition index {} out of range ({} conditions defined)",
                index, count
            ),
            LogicError::TooDeep(max) => write!(f, "Expression nested deeper than {}", max),
        }
    }
}

impl std::error::Error for LogicError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> Result<LogicExpr, LogicError> {
        Parser::new(input)?.parse()
    }

    #[test]
    fn test_single_reference() {
        assert_eq!(parse("1").unwrap(), LogicExpr::Ref(1));
    }

    #[test]
    fn test_and_binds_tighter_than_or() {
        let expr = parse("1 AND 2 OR 3").unwrap();

        assert_eq!(
            expr,
            LogicExpr::Or(vec![
                LogicExpr::And(vec![LogicExpr::Ref(1), LogicExpr::Ref(2)]),
                LogicExpr::Ref(3),
            ])
        );
    }

    #[test]
    fn test_nested_grouping() {
        let expr = parse("1 AND 2 AND (3 OR 4 OR 5)").unwrap();

        assert_eq!(expr.indices(), vec![1, 2, 3, 4, 5]);
        assert_eq!(expr.evaluate(&[true, true, false, false, true]), Some(true));
        assert_eq!(expr.evaluate(&[true, true, false, false, false]), Some(false));
    }

    #[test]
    fn test_double_not() {
        let expr = parse("NOT NOT 1").unwrap();
        assert_eq!(expr.evaluate(&[true]), Some(true));
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(parse(""), Err(LogicError::Empty));
        assert_eq!(parse("  \t"), Err(LogicError::Empty));
    }

    #[test]
    fn test_zero_index() {
        assert_eq!(parse("0 OR 1"), Err(LogicError::ZeroIndex));
    }

    #[test]
    fn test_unclosed_parenthesis() {
        assert_eq!(parse("1 AND (2"), Err(LogicError::UnclosedParenthesis));
    }

    #[test]
    fn test_stray_closing_parenthesis() {
        assert!(matches!(
            parse("1 AND 2)"),
            Err(LogicError::UnexpectedToken {
                found: Token::RightParen,
                ..
            })
        ));
    }

    #[test]
    fn test_dangling_operator() {
        assert!(matches!(
            parse("1 AND"),
            Err(LogicError::UnexpectedToken {
                found: Token::Eof,
                ..
            })
        ));
    }

    #[test]
    fn test_adjacent_indices() {
        assert!(matches!(
            parse("1 2"),
            Err(LogicError::UnexpectedToken {
                found: Token::Index(2),
                ..
            })
        ));
    }

    #[test]
    fn test_nesting_limit() {
        let deep = format!("{}1{}", "(".repeat(MAX_DEPTH + 1), ")".repeat(MAX_DEPTH + 1));
        assert_eq!(parse(&deep), Err(LogicError::TooDeep(MAX_DEPTH)));

        let ok = format!("{}1{}", "(".repeat(MAX_DEPTH), ")".repeat(MAX_DEPTH));
        assert_eq!(parse(&ok), Ok(LogicExpr::Ref(1)));
    }

    #[test]
    fn test_lexer_error_is_wrapped() {
        assert!(matches!(parse("1 + 2"), Err(LogicError::Lexer(_))));
    }
}
