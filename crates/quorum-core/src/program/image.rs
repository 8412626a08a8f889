//! Applying masks and deriving exclusion images.

use quorum_expr::{Linear, Node};

use crate::mask::{FixMask, MaskLayer};

use super::error::ProgramError;
use super::{Program, ProgramConstraint};

impl<'p> Program<'p> {
    /// Rewrite every constraint and display through `layer` and place it in
    /// front of the stack. The layer must read exactly the current space.
    pub fn apply_mask(mut self, layer: MaskLayer) -> Result<Self, ProgramError> {
        if layer.n_var_orig() != self.n_var() {
            return Err(ProgramError::DimensionMismatch {
                expected: self.n_var(),
                found: layer.n_var_orig(),
            });
        }
        let n_var_before = self.n_var();
        self.stack.push_front(layer)?;
        let layer = self.stack.outermost();

        let constraints = std::mem::take(&mut self.constraints);
        self.constraints = constraints
            .into_iter()
            .map(|mut constraint| -> Result<ProgramConstraint, ProgramError> {
                constraint.expr = constraint.expr.map(|e| layer.transform(e)).transpose()?;
                Ok(constraint)
            })
            .collect::<Result<_, _>>()?;
        let displays = std::mem::take(&mut self.displays);
        self.displays = displays
            .into_iter()
            .map(|d| layer.transform(d))
            .collect::<Result<_, _>>()?;
        self.reclassify();
        self.bridge = None;

        tracing::debug!(
            component = "program",
            operation = "apply_mask",
            status = "success",
            layer = self.stack.outermost().name(),
            n_var_before,
            n_var_after = self.n_var(),
            depth = self.stack.max_depth(),
            "Applied mask to program"
        );
        Ok(self)
    }

    /// Derive a solver-ready copy: drop relaxable constraints that reference
    /// an excluded detail, apply `mask`, then add one exclusion row per
    /// explored scenario of the problem.
    pub fn create_image(&self, mask: FixMask) -> Result<Program<'p>, ProgramError> {
        if self.exclusions_added {
            return Err(ProgramError::ExclusionsPresent {
                operation: "create_image",
            });
        }
        if self.stack.simple_fix().is_none() {
            return Err(ProgramError::NotSimple {
                operation: "create_image",
            });
        }
        if mask.n_var_orig() != self.n_var() {
            return Err(ProgramError::DimensionMismatch {
                expected: self.n_var(),
                found: mask.n_var_orig(),
            });
        }

        let excluded = self.problem.excluded_details();
        let survivors: Vec<ProgramConstraint> = self
            .constraints
            .iter()
            .filter(|constraint| {
                let blacklisted = constraint
                    .detail_set
                    .and_then(|id| self.detail_set(id))
                    .is_some_and(|set| !set.is_disjoint(excluded));
                !(constraint.relaxable && blacklisted)
            })
            .cloned()
            .collect();
        let filtered = self.constraints.len() - survivors.len();

        let image = Program {
            problem: self.problem,
            stack: self.stack.clone(),
            constraints: survivors,
            displays: self.displays.clone(),
            detail_sets: self.detail_sets.clone(),
            bridge: None,
            exclusions_added: false,
            options: self.options,
        };
        let mut image = image.apply_mask(MaskLayer::Fix(mask))?;
        let exclusions = image.add_exclusions()?;

        tracing::debug!(
            component = "program",
            operation = "create_image",
            status = "success",
            filtered,
            exclusions,
            constraints = image.constraints.len(),
            n_var = image.n_var(),
            "Created program image"
        );
        Ok(image)
    }

    /// Append `Σ |x_i - e_i| >= 1` for every explored scenario `e`. Rows are
    /// built in the original space, where each term is linear on binary
    /// choices, and threaded through the whole stack.
    fn add_exclusions(&mut self) -> Result<usize, ProgramError> {
        let rows = self.problem.exclusions();
        for row in rows {
            let mut coefficients = vec![0.0; row.len()];
            let mut constant = 0.0;
            for (j, &e) in row.iter().enumerate() {
                if e == 0.0 {
                    coefficients[j] = 1.0;
                } else {
                    coefficients[j] = -1.0;
                    constant += 1.0;
                }
            }
            let expr = self
                .stack
                .transform(Node::Linear(Linear::new(coefficients, constant)))?;
            let row = ProgramConstraint::structural(1.0, f64::INFINITY, expr, &self.stack);
            self.constraints.push(row);
        }
        if !rows.is_empty() {
            self.exclusions_added = true;
        }
        Ok(rows.len())
    }
}
