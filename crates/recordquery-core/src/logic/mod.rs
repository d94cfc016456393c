//! Custom logic grammar
//!
//! Boolean expressions over 1-based positions in a flat condition list,
//! e.g. `1 AND 2 AND (3 OR NOT 4)`.

pub mod ast;
pub mod lexer;
pub mod parser;

pub use ast::LogicExpr;
pub use lexer::{Lexer, LexerError, Token};
pub use parser::{LogicError, Parser};
