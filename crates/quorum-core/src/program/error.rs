//! Program error types.

use quorum_expr::{CodecError, ExprError};

use crate::mask::MaskError;
use crate::translate::TranslateError;

/// Errors that can occur during program operations
#[derive(Debug, Clone, PartialEq)]
pub enum ProgramError {
    /// A mask rejected a transform or an embedding
    Mask(MaskError),
    /// Malformed serialized text
    Codec(CodecError),
    /// Lowering a source failed
    Translate(TranslateError),
    /// A tree could not be read as a quadratic form
    Expr(ExprError),
    /// The operation needs a stack holding a single fixing mask
    NotSimple { operation: &'static str },
    /// The operation is not allowed once exclusion rows were appended
    ExclusionsPresent { operation: &'static str },
    /// A mask or vector does not match the program's variable count
    DimensionMismatch { expected: usize, found: usize },
    /// A constraint that no pass can turn linear
    NotLinearizable { index: usize },
    /// The cached text was written for another decision
    StaleHash { expected: String, found: String },
    /// The cached text was written by another code version
    StaleVersion { expected: String, found: String },
    /// Tokens left after the last display
    TrailingData,
    /// More constraints than detail-set ids can number
    TooManyConstraints { count: usize },
}

impl ProgramError {
    /// Returns a semantic error code for programmatic handling.
    pub fn code(&self) -> &'static str {
        match self {
            ProgramError::Mask(err) => err.code(),
            ProgramError::Codec(err) => err.code(),
            ProgramError::Translate(err) => err.code(),
            ProgramError::Expr(err) => err.code(),
            ProgramError::NotSimple { .. } => "PROGRAM_NOT_SIMPLE",
            ProgramError::ExclusionsPresent { .. } => "PROGRAM_EXCLUSIONS_PRESENT",
            ProgramError::DimensionMismatch { .. } => "PROGRAM_DIMENSION_MISMATCH",
            ProgramError::NotLinearizable { .. } => "PROGRAM_NOT_LINEARIZABLE",
            ProgramError::StaleHash { .. } => "PROGRAM_STALE_HASH",
            ProgramError::StaleVersion { .. } => "PROGRAM_STALE_VERSION",
            ProgramError::TrailingData => "PROGRAM_TRAILING_DATA",
            ProgramError::TooManyConstraints { .. } => "PROGRAM_TOO_MANY_CONSTRAINTS",
        }
    }

    /// The cached text is valid but outdated; rebuild from the problem.
    pub fn is_stale_cache(&self) -> bool {
        matches!(
            self,
            ProgramError::StaleHash { .. } | ProgramError::StaleVersion { .. }
        )
    }
}

impl std::fmt::Display for ProgramError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProgramError::Mask(err) => err.fmt(f),
            ProgramError::Codec(err) => err.fmt(f),
            ProgramError::Translate(err) => err.fmt(f),
            ProgramError::Expr(err) => err.fmt(f),
            ProgramError::NotSimple { operation } => write!(
                f,
                "[{}] {} requires a single fixing mask",
                self.code(),
                operation
            ),
            ProgramError::ExclusionsPresent { operation } => write!(
                f,
                "[{}] {} is not allowed after exclusion rows were added",
                self.code(),
                operation
            ),
            ProgramError::DimensionMismatch { expected, found } => write!(
                f,
                "[{}] Expected {} variables, found {}",
                self.code(),
                expected,
                found
            ),
            ProgramError::NotLinearizable { index } => write!(
                f,
                "[{}] Constraint {} cannot be linearized",
                self.code(),
                index
            ),
            ProgramError::StaleHash { expected, found } => write!(
                f,
                "[{}] Cached program hash '{}' does not match '{}'",
                self.code(),
                found,
                expected
            ),
            ProgramError::StaleVersion { expected, found } => write!(
                f,
                "[{}] Cached program version '{}' does not match '{}'",
                self.code(),
                found,
                expected
            ),
            ProgramError::TrailingData => {
                write!(f, "[{}] Unexpected data after the last display", self.code())
            }
            ProgramError::TooManyConstraints { count } => write!(
                f,
                "[{}] {} constraints exceed the detail-set id range",
                self.code(),
                count
            ),
        }
    }
}

impl std::error::Error for ProgramError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProgramError::Mask(err) => Some(err),
            ProgramError::Codec(err) => Some(err),
            ProgramError::Translate(err) => Some(err),
            ProgramError::Expr(err) => Some(err),
            _ => None,
        }
    }
}

impl From<MaskError> for ProgramError {
    fn from(err: MaskError) -> Self {
        ProgramError::Mask(err)
    }
}

impl From<CodecError> for ProgramError {
    fn from(err: CodecError) -> Self {
        ProgramError::Codec(err)
    }
}

impl From<TranslateError> for ProgramError {
    fn from(err: TranslateError) -> Self {
        ProgramError::Translate(err)
    }
}

impl From<ExprError> for ProgramError {
    fn from(err: ExprError) -> Self {
        ProgramError::Expr(err)
    }
}
