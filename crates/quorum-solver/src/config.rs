//! Solver configuration types.

use serde::{Deserialize, Serialize};

/// Which linearization pass [`crate::prepare_program`] runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Linearization {
    /// Every row must become linear; anything else is an error.
    #[default]
    Strict,
    /// Rewrite what can be rewritten and keep the remaining rows.
    Easy,
    /// Hand the program over untouched, for nonlinear backends.
    Off,
}

impl Linearization {
    pub fn as_str(self) -> &'static str {
        match self {
            Linearization::Strict => "strict",
            Linearization::Easy => "easy",
            Linearization::Off => "off",
        }
    }
}

/// Configuration options for solver behavior.
///
/// `None` leaves the backend default in place.
#[derive(Debug, Clone, Default)]
pub struct SolverConfig {
    /// Time limit in seconds. `None` means no limit.
    pub time_limit: Option<f64>,
    /// Feasibility tolerance, also used when checking a recovered selection.
    pub tolerance: Option<f64>,
    /// Log solver progress through `tracing` at info level.
    pub log_to_console: Option<bool>,
    /// Linearization pass run by [`crate::prepare_program`].
    pub linearization: Linearization,
}

impl SolverConfig {
    /// Create a new configuration with all defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the time limit in seconds.
    pub fn with_time_limit(mut self, seconds: f64) -> Self {
        self.time_limit = Some(seconds);
        self
    }

    /// Set the feasibility tolerance.
    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tolerance = Some(tol);
        self
    }

    pub fn with_log_to_console(mut self, enabled: bool) -> Self {
        self.log_to_console = Some(enabled);
        self
    }

    pub fn with_linearization(mut self, mode: Linearization) -> Self {
        self.linearization = mode;
        self
    }

    /// Tolerance used when checking rows, `1e-6` unless configured.
    pub fn feasibility_tolerance(&self) -> f64 {
        self.tolerance.unwrap_or(1e-6)
    }

    /// Whether `elapsed` seconds reach the configured time limit.
    pub fn time_limit_reached(&self, elapsed: f64) -> bool {
        self.time_limit.is_some_and(|limit| elapsed >= limit)
    }

    pub fn logs_to_console(&self) -> bool {
        self.log_to_console.unwrap_or(false)
    }

    /// No backend limit is set. The linearization mode is not a limit and
    /// does not count.
    pub fn is_empty(&self) -> bool {
        self.time_limit.is_none() && self.tolerance.is_none() && self.log_to_console.is_none()
    }
}
