//! Construction of programs from a problem.

use crate::config::CompileOptions;
use crate::ids::DetailSetId;
use crate::mask::{FixMask, MaskStack};
use crate::problem::Problem;
use crate::translate::Translator;

use super::classify::classify;
use super::error::ProgramError;
use super::{Program, ProgramConstraint};

impl<'p> Program<'p> {
    /// Lower every constraint and display of `problem` through `mask`.
    /// Exclusion rows follow the problem constraints when
    /// `options.include_exclusions` is set.
    pub fn new(
        problem: &'p Problem,
        mask: FixMask,
        options: CompileOptions,
    ) -> Result<Self, ProgramError> {
        let translator = Translator::new(problem, &mask, &options)?;

        let lowered = translator.translate_constraints()?;
        let mut constraints = Vec::with_capacity(lowered.len() + problem.exclusions().len());
        let mut detail_sets = Vec::with_capacity(lowered.len());
        let mut relaxed = 0;
        for (i, (spec, entry)) in problem.constraints().iter().zip(lowered).enumerate() {
            let detail_set = DetailSetId::from_index(i).ok_or(ProgramError::TooManyConstraints {
                count: problem.constraints().len(),
            })?;
            if entry.expr.is_none() {
                relaxed += 1;
            }
            constraints.push(ProgramConstraint {
                lower: spec.lower(),
                upper: spec.upper(),
                class: classify(entry.expr.as_ref(), &mask),
                detail_set: Some(detail_set),
                relaxable: spec.is_relaxable(),
                expr: entry.expr,
            });
            detail_sets.push(entry.details);
        }

        let mut exclusions_added = false;
        if options.include_exclusions {
            for row in problem.exclusions() {
                let expr = translator.translate_exclusion(row);
                constraints.push(ProgramConstraint::structural(1.0, f64::INFINITY, expr, &mask));
                exclusions_added = true;
            }
        }

        let displays = translator.translate_displays()?;

        tracing::debug!(
            component = "program",
            operation = "new",
            status = "success",
            constraints = constraints.len(),
            relaxed,
            displays = displays.len(),
            n_var = mask.n_var(),
            "Built program from problem"
        );

        Ok(Self {
            problem,
            stack: MaskStack::new(mask),
            constraints,
            displays,
            detail_sets,
            bridge: None,
            exclusions_added,
            options,
        })
    }

    /// Program over every choice, nothing fixed, default options.
    pub fn from_problem(problem: &'p Problem) -> Result<Self, ProgramError> {
        Self::new(problem, FixMask::identity(problem.dim()), CompileOptions::default())
    }
}
