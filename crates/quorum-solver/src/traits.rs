//! Solver traits for abstraction over different solver backends.

use quorum_core::Program;

use crate::{SolverConfig, SolverError, SolverStatus};

/// Read access to a solution, whatever backend produced it.
///
/// Values live in the outermost space of the program that was solved; use
/// [`crate::recover_selection`] to map them back onto the choices.
pub trait SolutionView {
    fn objective_value(&self) -> f64;

    fn status(&self) -> SolverStatus;

    /// All values of the outermost space.
    fn values(&self) -> &[f64];

    fn solve_time_seconds(&self) -> f64;

    fn value(&self, index: usize) -> Option<f64> {
        self.values().get(index).copied()
    }

    fn is_optimal(&self) -> bool {
        self.status().is_optimal()
    }

    fn is_feasible(&self) -> bool {
        self.status().is_feasible()
    }

    fn is_infeasible(&self) -> bool {
        self.status().is_infeasible()
    }
}

/// A backend that searches the selections of a prepared program.
///
/// Linear backends should reject programs whose rows are not all linear
/// with [`SolverError::NotLinear`]; see [`crate::prepare_program`].
pub trait Solve {
    type Solution: SolutionView;

    /// Search `program` for a selection.
    ///
    /// # Errors
    ///
    /// Returns a `SolverError` if:
    /// - The program has no free variables
    /// - A row has a class the backend cannot handle
    /// - The backend fails to produce a selection
    fn solve(
        &mut self,
        program: &Program<'_>,
        config: &SolverConfig,
    ) -> Result<Self::Solution, SolverError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixtureSolution {
        status: SolverStatus,
        values: Vec<f64>,
    }

    impl SolutionView for FixtureSolution {
        fn objective_value(&self) -> f64 {
            0.0
        }

        fn status(&self) -> SolverStatus {
            self.status
        }

        fn values(&self) -> &[f64] {
            &self.values
        }

        fn solve_time_seconds(&self) -> f64 {
            0.0
        }
    }

    #[test]
    fn test_solution_view_reads_values_by_index() {
        let solution = FixtureSolution {
            status: SolverStatus::Optimal,
            values: vec![1.0, 0.0],
        };
        assert_eq!(solution.value(0), Some(1.0));
        assert_eq!(solution.value(2), None);
        assert!(solution.is_optimal());
        assert!(solution.is_feasible());
    }

    #[test]
    fn test_solution_view_time_limit_is_feasible() {
        let solution = FixtureSolution {
            status: SolverStatus::ReachedTimeLimit,
            values: Vec::new(),
        };
        assert!(!solution.is_optimal());
        assert!(solution.is_feasible());
        assert!(!solution.is_infeasible());
    }
}
