//! Solver status types.

use serde::Serialize;

/// Outcome of a search over a program's selections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SolverStatus {
    /// Best selection found and proven.
    Optimal,
    /// No selection satisfies the rows.
    Infeasible,
    /// The objective grows without bound.
    Unbounded,
    /// Stopped on the time limit, possibly holding a selection.
    ReachedTimeLimit,
    /// Stopped on the iteration limit, possibly holding a selection.
    ReachedIterationLimit,
    Unknown,
}

impl SolverStatus {
    pub fn is_optimal(self) -> bool {
        matches!(self, SolverStatus::Optimal)
    }

    /// A selection can be read from the solution.
    pub fn is_feasible(self) -> bool {
        matches!(
            self,
            SolverStatus::Optimal
                | SolverStatus::ReachedTimeLimit
                | SolverStatus::ReachedIterationLimit
        )
    }

    pub fn is_infeasible(self) -> bool {
        matches!(self, SolverStatus::Infeasible)
    }

    pub fn is_unbounded(self) -> bool {
        matches!(self, SolverStatus::Unbounded)
    }

    /// The search stopped on a limit rather than a proof.
    pub fn is_limit(self) -> bool {
        matches!(
            self,
            SolverStatus::ReachedTimeLimit | SolverStatus::ReachedIterationLimit
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SolverStatus::Optimal => "optimal",
            SolverStatus::Infeasible => "infeasible",
            SolverStatus::Unbounded => "unbounded",
            SolverStatus::ReachedTimeLimit => "time_limit",
            SolverStatus::ReachedIterationLimit => "iteration_limit",
            SolverStatus::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for SolverStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limits_still_hold_a_selection() {
        for status in [SolverStatus::ReachedTimeLimit, SolverStatus::ReachedIterationLimit] {
            assert!(status.is_feasible());
            assert!(status.is_limit());
            assert!(!status.is_optimal());
        }
        assert!(!SolverStatus::Optimal.is_limit());
    }

    #[test]
    fn test_failures_hold_no_selection() {
        for status in [
            SolverStatus::Infeasible,
            SolverStatus::Unbounded,
            SolverStatus::Unknown,
        ] {
            assert!(!status.is_feasible());
        }
        assert!(SolverStatus::Infeasible.is_infeasible());
        assert!(SolverStatus::Unbounded.is_unbounded());
    }

    #[test]
    fn test_status_display_matches_as_str() {
        assert_eq!(SolverStatus::ReachedTimeLimit.to_string(), "time_limit");
        assert_eq!(format!("{}", SolverStatus::Optimal), "optimal");
    }
}
