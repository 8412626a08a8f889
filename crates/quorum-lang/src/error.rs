//! Syntax and bound errors raised while parsing sources.

use crate::ast::Position;

#[derive(Debug, Clone, PartialEq)]
pub enum SyntaxError {
    /// The source does not match the grammar.
    Parse { message: String, position: Position },
    /// A numeric literal could not be read.
    InvalidNumber { text: String, position: Position },
    /// A bound was given twice, or an equality was mixed with an inequality.
    DuplicateBound {
        message: &'static str,
        position: Position,
    },
    /// A constraint without any bound.
    NoBound,
}

impl SyntaxError {
    /// Returns a semantic error code for programmatic handling.
    pub fn code(&self) -> &'static str {
        match self {
            SyntaxError::Parse { .. } => "SYNTAX_PARSE",
            SyntaxError::InvalidNumber { .. } => "SYNTAX_INVALID_NUMBER",
            SyntaxError::DuplicateBound { .. } => "SYNTAX_DUPLICATE_BOUND",
            SyntaxError::NoBound => "SYNTAX_NO_BOUND",
        }
    }

    pub fn position(&self) -> Option<Position> {
        match self {
            SyntaxError::Parse { position, .. }
            | SyntaxError::InvalidNumber { position, .. }
            | SyntaxError::DuplicateBound { position, .. } => Some(*position),
            SyntaxError::NoBound => None,
        }
    }
}

impl std::fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyntaxError::Parse { message, position } => {
                write!(f, "[{}] {}: {}", self.code(), position, message)
            }
            SyntaxError::InvalidNumber { text, position } => write!(
                f,
                "[{}] {}: invalid number '{}'",
                self.code(),
                position,
                text
            ),
            SyntaxError::DuplicateBound { message, position } => {
                write!(f, "[{}] {}: {}", self.code(), position, message)
            }
            SyntaxError::NoBound => write!(f, "[{}] expression is unbounded", self.code()),
        }
    }
}

impl std::error::Error for SyntaxError {}
