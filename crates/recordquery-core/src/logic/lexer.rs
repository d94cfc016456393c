//! Lexer for custom logic expressions
//!
//! Splits text like `1 AND (2 OR 3)` into index, keyword and parenthesis tokens.

use std::fmt;

/// Token types produced by the lexer
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Condition reference
    Index(usize),

    /// `AND`
    And,
    /// `OR`
    Or,
    /// `NOT`
    Not,

    /// `(`
    LeftParen,
    /// `)`
    RightParen,

    /// End of input
    Eof,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Index(i) => write!(f, "{}", i),
            Token::And => write!(f, "AND"),
            Token::Or => write!(f, "OR"),
            Token::Not => write!(f, "NOT"),
            Token::LeftParen => write!(f, "("),
            Token::RightParen => write!(f, ")"),
            Token::Eof => write!(f, "end of expression"),
        }
    }
}

/// Lexer state
pub struct Lexer {
    input: Vec<char>,
    position: usize,
}

impl Lexer {
    /// Create a new lexer from input string
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
        }
    }

    /// Get the next token
    pub fn next_token(&mut self) -> Result<Token, LexerError> {
        self.skip_whitespace();

        if self.position >= self.input.len() {
            return Ok(Token::Eof);
        }

        let ch = self.current_char();

        match ch {
            '(' => {
                self.advance();
                return Ok(Token::LeftParen);
            }
            ')' => {
                self.advance();
                return Ok(Token::RightParen);
            }
            _ => {}
        }

        if ch.is_ascii_digit() {
            return self.read_index();
        }

        if ch.is_alphabetic() {
            return self.read_keyword();
        }

        Err(LexerError::UnexpectedCharacter {
            ch,
            position: self.position,
        })
    }

    /// Tokenize entire input into vector of tokens
    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexerError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            if token == Token::Eof {
                tokens.push(token);
                break;
            }
            tokens.push(token);
        }
        Ok(tokens)
    }

    fn current_char(&self) -> char {
        self.input[self.position]
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    fn skip_whitespace(&mut self) {
        while self.position < self.input.len() && self.current_char().is_whitespace() {
            self.advance();
        }
    }

    fn read_index(&mut self) -> Result<Token, LexerError> {
        let start = self.position;

        while self.position < self.input.len() && self.current_char().is_ascii_digit() {
            self.advance();
        }

        let digits: String = self.input[start..self.position].iter().collect();
        digits
            .parse::<usize>()
            .map(Token::Index)
            .map_err(|_| LexerError::InvalidIndex(digits))
    }

    fn read_keyword(&mut self) -> Result<Token, LexerError> {
        let start = self.position;

        while self.position < self.input.len() && self.current_char().is_alphanumeric() {
            self.advance();
        }

        let text: String = self.input[start..self.position].iter().collect();

        match text.to_uppercase().as_str() {
            "AND" => Ok(Token::And),
            "OR" => Ok(Token::Or),
            "NOT" => Ok(Token::Not),
            _ => Err(LexerError::UnknownWord {
                word: text,
                position: start,
            }),
        }
    }
}

/// Lexer errors
#[derive(Debug, Clone, PartialEq)]
pub enum LexerError {
    /// Character outside the logic alphabet
    UnexpectedCharacter {
        /// The character
        ch: char,
        /// Character offset in the input
        position: usize,
    },
    /// Word other than `AND`, `OR` or `NOT`
    UnknownWord {
        /// The word as written
        word: String,
        /// Character offset where it starts
        position: usize,
    },
    /// Digits that do not fit in an index
    InvalidIndex(String),
}

impl fmt::Display for LexerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LexerError::UnexpectedCharacter { ch, position } => {
                write!(f, "Unexpected character '{}' at position {}", ch, position)
            }
            LexerError::UnknownWord { word, position } => {
                write!(f, "Unknown word '{}' at position {}", word, position)
            }
            LexerError::InvalidIndex(s) => write!(f, "Invalid condition index: '{}'", s),
        }
    }
}

impl std::error::Error for LexerError {}
