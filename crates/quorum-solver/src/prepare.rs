//! Turning a compiled program into what a backend expects.

use quorum_core::{ConstraintClass, Program};

use crate::config::{Linearization, SolverConfig};
use crate::error::SolverError;

/// Run the linearization pass selected by `config`, then record the bridge
/// when the stack still consists of fixing masks only.
///
/// With [`Linearization::Strict`] the result is guaranteed linear; with the
/// other modes the caller's backend decides what it accepts, see
/// [`ensure_linear`].
pub fn prepare_program<'p>(
    program: Program<'p>,
    config: &SolverConfig,
) -> Result<Program<'p>, SolverError> {
    if program.n_var() == 0 {
        return Err(SolverError::EmptyProgram);
    }
    let mut program = match config.linearization {
        Linearization::Strict => program.linearize(false)?,
        Linearization::Easy => program.linearize(true)?,
        Linearization::Off => program,
    };
    let fix_only = program
        .stack()
        .layers()
        .iter()
        .all(|layer| layer.as_fix().is_some());
    if fix_only {
        program.signal_bridge()?;
    }

    tracing::debug!(
        component = "solver",
        operation = "prepare_program",
        status = "success",
        linearization = config.linearization.as_str(),
        n_var = program.n_var(),
        constraints = program.constraints().len(),
        bridge = program.has_bridge(),
        "Prepared program for solve"
    );
    Ok(program)
}

/// Check that every row is linear or relaxed.
pub fn ensure_linear(program: &Program<'_>) -> Result<(), SolverError> {
    match program
        .constraints()
        .iter()
        .enumerate()
        .find(|(_, c)| !matches!(c.class, ConstraintClass::Linear | ConstraintClass::Void))
    {
        Some((index, constraint)) => Err(SolverError::NotLinear {
            index,
            class: constraint.class,
        }),
        None => Ok(()),
    }
}
