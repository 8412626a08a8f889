//! Mapping solutions back onto the choices of a problem.

use quorum_core::{Bridge, Program};

use crate::error::SolverError;
use crate::traits::SolutionView;

/// Values of every original choice for a solution of `program`'s outermost
/// space. Auxiliary variables are dropped and fixed choices filled in.
pub fn recover_selection(program: &Program<'_>, values: &[f64]) -> Result<Vec<f64>, SolverError> {
    if values.len() != program.n_var() {
        return Err(SolverError::DimensionMismatch {
            expected: program.n_var(),
            found: values.len(),
        });
    }
    Ok(program.unmask(values, None)?)
}

/// Selection held by a backend's solution, checked for a usable status.
pub fn recover_solution<S: SolutionView>(
    program: &Program<'_>,
    solution: &S,
) -> Result<Vec<f64>, SolverError> {
    let status = solution.status();
    if !status.is_feasible() {
        return Err(SolverError::SolveFailure { status });
    }
    let selection = recover_selection(program, solution.values())?;

    tracing::debug!(
        component = "solver",
        operation = "recover_solution",
        status = status.as_str(),
        objective = solution.objective_value(),
        solve_time_seconds = solution.solve_time_seconds(),
        selected = selection.iter().filter(|value| **value > 0.5).count(),
        "Recovered selection"
    );
    Ok(selection)
}

/// Same as [`recover_selection`] for backends that only kept the bridge.
pub fn recover_from_bridge(bridge: &Bridge, values: &[f64]) -> Result<Vec<f64>, SolverError> {
    if values.len() != bridge.n_free() {
        return Err(SolverError::DimensionMismatch {
            expected: bridge.n_free(),
            found: values.len(),
        });
    }
    bridge
        .expand(values)
        .map_err(|err| SolverError::Program(err.into()))
}

/// Names of the choices whose value rounds to 1.
pub fn selected_choices<'p>(program: &Program<'p>, selection: &[f64]) -> Vec<&'p str> {
    program
        .problem()
        .choices()
        .iter()
        .zip(selection)
        .filter(|(_, value)| **value > 0.5)
        .map(|(choice, _)| choice.name())
        .collect()
}
