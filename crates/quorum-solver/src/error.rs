//! Solver error types.

use quorum_core::{ConstraintClass, ProgramError};

use crate::SolverStatus;

/// Error type for solver operations.
#[derive(Debug, Clone, PartialEq)]
pub enum SolverError {
    /// Every choice is fixed; nothing is left to decide.
    EmptyProgram,
    /// A linear backend received a row it cannot express.
    NotLinear {
        index: usize,
        class: ConstraintClass,
    },
    /// A solution vector does not match the program's variable count.
    DimensionMismatch { expected: usize, found: usize },
    /// Preparing or unmasking the program failed.
    Program(ProgramError),
    /// Backend-specific failure.
    InternalError(String),
    /// Solver failed to produce a selection.
    SolveFailure {
        /// The solver status that caused the failure.
        status: SolverStatus,
    },
}

impl SolverError {
    /// Returns a semantic error code for programmatic handling.
    pub fn code(&self) -> &'static str {
        match self {
            SolverError::EmptyProgram => "PROGRAM_EMPTY",
            SolverError::NotLinear { .. } => "PROGRAM_NOT_LINEAR",
            SolverError::DimensionMismatch { .. } => "SOLUTION_DIMENSION_MISMATCH",
            SolverError::Program(err) => err.code(),
            SolverError::InternalError(_) => "SOLVER_INTERNAL",
            SolverError::SolveFailure { status } => match status {
                SolverStatus::Infeasible => "SOLVER_INFEASIBLE",
                SolverStatus::Unbounded => "SOLVER_UNBOUNDED",
                SolverStatus::ReachedTimeLimit => "SOLVER_TIME_LIMIT",
                SolverStatus::ReachedIterationLimit => "SOLVER_ITERATION_LIMIT",
                _ => "SOLVER_INTERNAL",
            },
        }
    }
}

impl std::fmt::Display for SolverError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SolverError::EmptyProgram => {
                write!(f, "[{}] Program has no free variables", self.code())
            }
            SolverError::NotLinear { index, class } => write!(
                f,
                "[{}] Constraint {} is {}, backend needs linear rows",
                self.code(),
                index,
                class
            ),
            SolverError::DimensionMismatch { expected, found } => write!(
                f,
                "[{}] Solution has {} values, program has {} variables",
                self.code(),
                found,
                expected
            ),
            SolverError::Program(err) => write!(f, "{err}"),
            SolverError::InternalError(msg) => {
                write!(f, "[{}] Solver internal error: {}", self.code(), msg)
            }
            SolverError::SolveFailure { status } => {
                write!(f, "[{}] {}", self.code(), status_message(*status))
            }
        }
    }
}

fn status_message(status: SolverStatus) -> &'static str {
    match status {
        SolverStatus::Infeasible => "No selection satisfies the constraints",
        SolverStatus::Unbounded => "Objective is unbounded",
        SolverStatus::ReachedTimeLimit => "Solver reached time limit without a selection",
        SolverStatus::ReachedIterationLimit => {
            "Solver reached iteration limit without a selection"
        }
        SolverStatus::Unknown => "Solver status unknown",
        SolverStatus::Optimal => "Solver returned optimal",
    }
}

impl std::error::Error for SolverError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SolverError::Program(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ProgramError> for SolverError {
    fn from(err: ProgramError) -> Self {
        SolverError::Program(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_are_stable() {
        assert_eq!(SolverError::EmptyProgram.code(), "PROGRAM_EMPTY");
        assert_eq!(
            SolverError::NotLinear {
                index: 0,
                class: ConstraintClass::Quad
            }
            .code(),
            "PROGRAM_NOT_LINEAR"
        );
        assert_eq!(
            SolverError::InternalError(String::new()).code(),
            "SOLVER_INTERNAL"
        );
        assert_eq!(
            SolverError::SolveFailure {
                status: SolverStatus::Unknown
            }
            .code(),
            "SOLVER_INTERNAL"
        );
    }

    #[test]
    fn test_program_errors_keep_their_code() {
        let err = SolverError::from(ProgramError::NotLinearizable { index: 2 });
        assert_eq!(err.code(), "PROGRAM_NOT_LINEARIZABLE");
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().starts_with("[PROGRAM_NOT_LINEARIZABLE]"));
    }

    #[test]
    fn test_error_display_not_linear() {
        let err = SolverError::NotLinear {
            index: 3,
            class: ConstraintClass::Others,
        };
        let msg = err.to_string();
        assert!(msg.contains("PROGRAM_NOT_LINEAR"));
        assert!(msg.contains("Constraint 3 is others"));
    }

    #[test]
    fn test_error_display_solve_failure_infeasible() {
        let err = SolverError::SolveFailure {
            status: SolverStatus::Infeasible,
        };
        let msg = err.to_string();
        assert!(msg.contains("SOLVER_INFEASIBLE"));
        assert!(msg.contains("No selection"));
    }
}
