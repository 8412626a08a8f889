//! Compiled program container.
//!
//! A [`Program`] holds the constraints and displays of a [`Problem`] as
//! expression trees in the space produced by its [`MaskStack`], together with
//! the detail names each constraint references.
//!
//! # Module Organization
//!
//! - [`error`]: Program error types
//! - [`builder`]: Construction from a problem through the translator
//! - [`classify`]: Constraint classes
//! - [`linearize`]: Fraction splitting and product reformulation
//! - [`image`]: Applying masks and deriving exclusion images
//! - [`codec`]: Text save/load used for cached programs
//! - [`inspect`]: Serializable snapshots
//! - [`pretty`]: Human-readable listing

mod builder;
mod classify;
mod codec;
mod error;
mod image;
mod inspect;
mod linearize;
mod pretty;

use std::collections::BTreeSet;

use quorum_expr::Node;

use crate::config::CompileOptions;
use crate::ids::DetailSetId;
use crate::mask::{Bridge, MaskStack};
use crate::problem::Problem;

pub use classify::{ConstraintClass, classify};
pub use error::ProgramError;
pub use inspect::{ConstraintSnapshot, DisplaySnapshot, LayerSnapshot, ProgramSnapshot};

/// One bounded row of a program.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgramConstraint {
    pub lower: f64,
    pub upper: f64,
    pub class: ConstraintClass,
    pub detail_set: Option<DetailSetId>,
    pub relaxable: bool,
    /// `None` once the constraint was relaxed away.
    pub expr: Option<Node>,
}

impl ProgramConstraint {
    /// A row that belongs to no detail set and is never relaxed.
    pub fn structural(lower: f64, upper: f64, expr: Node, space: &dyn quorum_expr::VarSpace) -> Self {
        Self {
            lower,
            upper,
            class: classify(Some(&expr), space),
            detail_set: None,
            relaxable: false,
            expr: Some(expr),
        }
    }

    /// Value at `point`; `None` for a relaxed row.
    pub fn evaluate(&self, point: &[f64]) -> Option<f64> {
        self.expr.as_ref().map(|expr| expr.evaluate(point))
    }

    /// Whether the value at `point` lies within the bounds widened by `tol`.
    /// Relaxed rows are always satisfied.
    pub fn is_satisfied(&self, point: &[f64], tol: f64) -> bool {
        self.evaluate(point)
            .is_none_or(|value| value >= self.lower - tol && value <= self.upper + tol)
    }
}

/// Constraints and displays of a problem, expressed through a mask stack.
#[derive(Debug, Clone)]
pub struct Program<'p> {
    problem: &'p Problem,
    stack: MaskStack,
    constraints: Vec<ProgramConstraint>,
    displays: Vec<Node>,
    // One set per problem constraint, indexed by DetailSetId.
    detail_sets: Vec<BTreeSet<String>>,
    bridge: Option<Bridge>,
    exclusions_added: bool,
    options: CompileOptions,
}

impl<'p> Program<'p> {
    // ── Accessors ───────────────────────────────────────────

    pub fn problem(&self) -> &'p Problem {
        self.problem
    }

    pub fn stack(&self) -> &MaskStack {
        &self.stack
    }

    pub fn constraints(&self) -> &[ProgramConstraint] {
        &self.constraints
    }

    pub fn displays(&self) -> &[Node] {
        &self.displays
    }

    pub fn detail_sets(&self) -> &[BTreeSet<String>] {
        &self.detail_sets
    }

    pub fn detail_set(&self, id: DetailSetId) -> Option<&BTreeSet<String>> {
        self.detail_sets.get(id.index())
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    pub fn has_exclusions(&self) -> bool {
        self.exclusions_added
    }

    /// Number of variables of the outermost mask.
    pub fn n_var(&self) -> usize {
        self.stack.n_var()
    }

    pub fn n_var_orig(&self, depth: Option<usize>) -> usize {
        self.stack.n_var_orig(depth)
    }

    /// All rows are linear or relaxed.
    pub fn is_linear(&self) -> bool {
        self.constraints.iter().all(|c| {
            matches!(c.class, ConstraintClass::Linear | ConstraintClass::Void)
        })
    }

    /// No row falls outside the classes `linearize` can rewrite.
    pub fn is_linearizable(&self) -> bool {
        self.constraints
            .iter()
            .all(|c| c.class != ConstraintClass::Others)
    }

    // ── Coordinates ─────────────────────────────────────────

    pub fn mask(&self, unmasked: &[f64], depth: Option<usize>) -> Result<Vec<f64>, ProgramError> {
        Ok(self.stack.mask(unmasked, depth)?)
    }

    pub fn unmask(&self, masked: &[f64], depth: Option<usize>) -> Result<Vec<f64>, ProgramError> {
        Ok(self.stack.unmask(masked, depth)?)
    }

    // ── Bridge ──────────────────────────────────────────────

    /// Record the solver-facing encoding of the outermost fixing mask. Every
    /// inner layer must be an identity fixing mask.
    pub fn signal_bridge(&mut self) -> Result<(), ProgramError> {
        let outer = self
            .stack
            .layers()
            .split_first()
            .filter(|(_, inner)| {
                inner
                    .iter()
                    .all(|layer| layer.as_fix().is_some_and(|mask| mask.is_identity()))
            })
            .and_then(|(outer, _)| outer.as_fix());
        let Some(outer) = outer else {
            return Err(ProgramError::NotSimple {
                operation: "signal_bridge",
            });
        };
        self.bridge = Some(outer.make_bridge()?);
        Ok(())
    }

    pub fn has_bridge(&self) -> bool {
        self.bridge.is_some()
    }

    pub fn bridge(&self) -> Option<&Bridge> {
        self.bridge.as_ref()
    }

    // ── Evaluation ──────────────────────────────────────────

    /// Row values at a point of the outermost space.
    pub fn evaluate_constraints(&self, point: &[f64]) -> Result<Vec<Option<f64>>, ProgramError> {
        self.check_point(point)?;
        Ok(self.constraints.iter().map(|c| c.evaluate(point)).collect())
    }

    pub fn evaluate_displays(&self, point: &[f64]) -> Result<Vec<f64>, ProgramError> {
        self.check_point(point)?;
        Ok(self.displays.iter().map(|d| d.evaluate(point)).collect())
    }

    /// Indices of rows whose value leaves their bounds by more than `tol`.
    pub fn constraint_violations(&self, point: &[f64], tol: f64) -> Result<Vec<usize>, ProgramError> {
        self.check_point(point)?;
        Ok(self
            .constraints
            .iter()
            .enumerate()
            .filter(|(_, c)| !c.is_satisfied(point, tol))
            .map(|(i, _)| i)
            .collect())
    }

    /// Same rows and displays, with trees similar within the configured
    /// epsilon.
    pub fn is_similar(&self, other: &Program<'_>) -> bool {
        let epsilon = self.options.similarity_epsilon;
        let trees_match = |a: Option<&Node>, b: Option<&Node>| match (a, b) {
            (Some(a), Some(b)) => a.is_similar(b, epsilon),
            (None, None) => true,
            _ => false,
        };
        self.n_var() == other.n_var()
            && self.constraints.len() == other.constraints.len()
            && self.displays.len() == other.displays.len()
            && self.constraints.iter().zip(&other.constraints).all(|(a, b)| {
                a.lower == b.lower
                    && a.upper == b.upper
                    && a.detail_set == b.detail_set
                    && a.relaxable == b.relaxable
                    && trees_match(a.expr.as_ref(), b.expr.as_ref())
            })
            && self
                .displays
                .iter()
                .zip(&other.displays)
                .all(|(a, b)| a.is_similar(b, epsilon))
    }

    fn check_point(&self, point: &[f64]) -> Result<(), ProgramError> {
        if point.len() == self.n_var() {
            Ok(())
        } else {
            Err(ProgramError::DimensionMismatch {
                expected: self.n_var(),
                found: point.len(),
            })
        }
    }
}
