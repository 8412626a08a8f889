//! Problem definition errors.

use quorum_lang::SyntaxError;

#[derive(Debug, Clone, PartialEq)]
pub enum ProblemError {
    /// A problem needs at least one choice.
    NoChoices,
    /// Two entries of the same kind share a name.
    DuplicateName { kind: &'static str, name: String },
    /// A source string failed to parse.
    Syntax { name: String, error: SyntaxError },
    /// An exclusion row does not have one column per choice.
    ExclusionWidth { expected: usize, found: usize },
    /// An exclusion entry is neither 0 nor 1.
    ExclusionValue { row: usize, column: usize, value: f64 },
    /// A choice index outside the problem.
    InvalidChoice(usize),
}

impl ProblemError {
    /// Returns a semantic error code for programmatic handling.
    pub fn code(&self) -> &'static str {
        match self {
            ProblemError::NoChoices => "PROBLEM_NO_CHOICES",
            ProblemError::DuplicateName { .. } => "PROBLEM_DUPLICATE_NAME",
            ProblemError::Syntax { .. } => "PROBLEM_SYNTAX",
            ProblemError::ExclusionWidth { .. } => "PROBLEM_EXCLUSION_WIDTH",
            ProblemError::ExclusionValue { .. } => "PROBLEM_EXCLUSION_VALUE",
            ProblemError::InvalidChoice(_) => "PROBLEM_INVALID_CHOICE",
        }
    }
}

impl std::fmt::Display for ProblemError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProblemError::NoChoices => {
                write!(f, "[{}] A problem must have at least one choice", self.code())
            }
            ProblemError::DuplicateName { kind, name } => {
                write!(f, "[{}] Duplicate {} name '{}'", self.code(), kind, name)
            }
            ProblemError::Syntax { name, error } => {
                write!(f, "[{}] In '{}': {}", self.code(), name, error)
            }
            ProblemError::ExclusionWidth { expected, found } => write!(
                f,
                "[{}] Exclusion row has {} columns, expected {}",
                self.code(),
                found,
                expected
            ),
            ProblemError::ExclusionValue { row, column, value } => write!(
                f,
                "[{}] Exclusion row {} has value {} at choice {}, expected 0 or 1",
                self.code(),
                row,
                value,
                column
            ),
            ProblemError::InvalidChoice(index) => {
                write!(f, "[{}] Choice index {} does not exist", self.code(), index)
            }
        }
    }
}

impl std::error::Error for ProblemError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProblemError::Syntax { error, .. } => Some(error),
            _ => None,
        }
    }
}
