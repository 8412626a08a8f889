//! Linearization passes.
//!
//! Fractions with a one-signed denominator split into one or two linear
//! rows. Products of binary choices are replaced through an RLT mask, and
//! each auxiliary variable gets its McCormick envelope.

use quorum_expr::builders::sub;
use quorum_expr::{Linear, Node, Quadratic};

use crate::mask::{MaskLayer, RltMaskBuilder};

use super::classify::ConstraintClass;
use super::error::ProgramError;
use super::{Program, ProgramConstraint};

impl Program<'_> {
    /// Rewrite the program so that every row is linear. With `easy`, rows
    /// no pass can handle are kept as they are; otherwise they are an error.
    pub fn linearize(mut self, easy: bool) -> Result<Self, ProgramError> {
        if self.is_linear() {
            tracing::debug!(
                component = "program",
                operation = "linearize",
                status = "skipped",
                "Program is already linear"
            );
            return Ok(self);
        }
        if !easy {
            if let Some(index) = self
                .constraints
                .iter()
                .position(|c| c.class == ConstraintClass::Others)
            {
                return Err(ProgramError::NotLinearizable { index });
            }
        }

        let mut kept = Vec::new();
        let mut fractions = Vec::new();
        let mut quads = Vec::new();
        for constraint in std::mem::take(&mut self.constraints) {
            match constraint.class {
                ConstraintClass::Frac1 => fractions.push(constraint),
                ConstraintClass::Quad => quads.push(constraint),
                _ => kept.push(constraint),
            }
        }
        let n_fractions = fractions.len();
        let n_quads = quads.len();

        let mut halves = Vec::with_capacity(2 * fractions.len());
        for constraint in fractions {
            self.split_fraction(constraint, &mut halves);
        }
        kept.extend(halves);

        if quads.is_empty() {
            self.constraints = kept;
            self.reclassify();
        } else {
            let mut builder = RltMaskBuilder::new(self.n_var());
            for constraint in &mut quads {
                if let Some(expr) = constraint.expr.take() {
                    let quad = Quadratic::from_node(expr)?;
                    builder.signal_terms(&quad)?;
                    constraint.expr = Some(Node::Quadratic(quad));
                }
            }
            kept.extend(quads);
            self.constraints = kept;
            let rlt = builder.finalize();
            let products: Vec<_> = rlt.products().collect();
            self = self.apply_mask(MaskLayer::Rlt(rlt))?;
            self.add_mccormick(&products);
        }

        tracing::debug!(
            component = "program",
            operation = "linearize",
            status = "success",
            easy,
            fractions = n_fractions,
            quadratics = n_quads,
            n_var = self.n_var(),
            constraints = self.constraints.len(),
            "Linearized program"
        );
        Ok(self)
    }

    /// `lb <= num / den <= ub` with a one-signed `den` becomes
    /// `num - lb·den >= 0` and `num - ub·den <= 0` for the finite sides.
    fn split_fraction(&self, constraint: ProgramConstraint, out: &mut Vec<ProgramConstraint>) {
        let ProgramConstraint {
            mut lower,
            mut upper,
            class,
            detail_set,
            relaxable,
            expr,
        } = constraint;
        let (num, mut den) = match expr {
            Some(Node::Div(num, den)) => (*num, *den),
            expr => {
                out.push(ProgramConstraint {
                    lower,
                    upper,
                    class,
                    detail_set,
                    relaxable,
                    expr,
                });
                return;
            }
        };
        let (den_lower, den_upper) = den.predict_bound(&self.stack);
        if den_lower < 0.0 && den_upper <= 0.0 {
            den.scale(-1.0);
            (lower, upper) = (-upper, -lower);
        }
        let half = |expr: Node, lower: f64, upper: f64| ProgramConstraint {
            lower,
            upper,
            class: ConstraintClass::Linear,
            detail_set,
            relaxable,
            expr: Some(expr),
        };
        if lower.is_finite() {
            let expr = sub(num.clone(), den.clone().scaled(lower));
            out.push(half(expr, 0.0, f64::INFINITY));
        }
        if upper.is_finite() {
            out.push(half(sub(num, den.scaled(upper)), f64::NEG_INFINITY, 0.0));
        }
    }

    /// Three rows per product `y = x_i·x_j` of binary variables.
    fn add_mccormick(&mut self, products: &[((usize, usize), usize)]) {
        let n = self.n_var();
        let tol = self.options.mccormick_tolerance;
        let row = |terms: &[(usize, f64)]| {
            let mut coefficients = vec![0.0; n];
            for &(index, a) in terms {
                coefficients[index] = a;
            }
            Node::Linear(Linear::new(coefficients, 0.0))
        };
        for &((i, j), y) in products {
            let envelope = [
                (row(&[(y, 1.0), (i, -1.0)]), f64::NEG_INFINITY, tol),
                (row(&[(y, 1.0), (j, -1.0)]), f64::NEG_INFINITY, tol),
                (
                    row(&[(y, 1.0), (i, -1.0), (j, -1.0)]),
                    -1.0 - tol,
                    f64::INFINITY,
                ),
            ];
            for (expr, lower, upper) in envelope {
                let constraint = ProgramConstraint::structural(lower, upper, expr, &self.stack);
                self.constraints.push(constraint);
            }
        }
    }
}
