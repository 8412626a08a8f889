//! Dense affine leaf: `a · x + b`.

use crate::dual::Dual;
use crate::space::VarSpace;

/// Coefficients below this magnitude count as zero when deciding whether a
/// leaf is a pure constant.
pub const ZERO_TOLERANCE: f64 = 10.0 * f64::EPSILON;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Linear {
    coefficients: Vec<f64>,
    constant: f64,
}

impl Linear {
    // ── Constructors ────────────────────────────────────────

    pub fn new(coefficients: Vec<f64>, constant: f64) -> Self {
        Self {
            coefficients,
            constant,
        }
    }

    /// All-zero leaf over `n` variables.
    pub fn zeros(n: usize) -> Self {
        Self::from_constant(n, 0.0)
    }

    /// Constant leaf over `n` variables.
    pub fn from_constant(n: usize, value: f64) -> Self {
        Self {
            coefficients: vec![0.0; n],
            constant: value,
        }
    }

    /// Single variable `x[index]` with coefficient 1.
    pub fn unit(n: usize, index: usize) -> Self {
        let mut leaf = Self::zeros(n);
        if let Some(slot) = leaf.coefficients.get_mut(index) {
            *slot = 1.0;
        }
        leaf
    }

    // ── Accessors ───────────────────────────────────────────

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn coefficient(&self, index: usize) -> f64 {
        self.coefficients.get(index).copied().unwrap_or(0.0)
    }

    pub fn constant(&self) -> f64 {
        self.constant
    }

    pub fn dimension(&self) -> usize {
        self.coefficients.len()
    }

    /// True when every coefficient is numerically zero.
    pub fn is_constant(&self) -> bool {
        self.coefficients.iter().all(|a| a.abs() < ZERO_TOLERANCE)
    }

    /// Consume and return (coefficients, constant).
    pub fn into_parts(self) -> (Vec<f64>, f64) {
        (self.coefficients, self.constant)
    }

    // ── Operations ──────────────────────────────────────────

    /// Add `other` into this leaf in place.
    pub fn merge(&mut self, other: &Linear) {
        if other.coefficients.len() > self.coefficients.len() {
            self.coefficients.resize(other.coefficients.len(), 0.0);
        }
        for (slot, a) in self.coefficients.iter_mut().zip(&other.coefficients) {
            *slot += a;
        }
        self.constant += other.constant;
    }

    /// Multiply by `k`. Structurally zero coefficients stay zero.
    pub fn scale(&mut self, k: f64) {
        for a in self.coefficients.iter_mut().filter(|a| **a != 0.0) {
            *a *= k;
        }
        self.constant *= k;
    }

    pub fn add_constant(&mut self, value: f64) {
        self.constant += value;
    }

    pub fn set_coefficient(&mut self, index: usize, value: f64) {
        if index >= self.coefficients.len() {
            self.coefficients.resize(index + 1, 0.0);
        }
        self.coefficients[index] = value;
    }

    pub fn evaluate(&self, point: &[f64]) -> f64 {
        self.coefficients
            .iter()
            .zip(point)
            .fold(self.constant, |acc, (a, x)| acc + a * x)
    }

    pub fn evaluate_dual(&self, point: &[Dual]) -> Dual {
        self.coefficients
            .iter()
            .zip(point)
            .fold(Dual::constant(self.constant), |acc, (a, x)| acc + *x * *a)
    }

    /// Exact range of the leaf over the box described by `space`.
    pub fn predict_bound(&self, space: &dyn VarSpace) -> (f64, f64) {
        let mut lower = self.constant;
        let mut upper = self.constant;
        for (index, &a) in self.coefficients.iter().enumerate() {
            if a == 0.0 {
                continue;
            }
            if index >= space.n_var() {
                return (f64::NEG_INFINITY, f64::INFINITY);
            }
            let lb = space.lower_bound(index);
            let ub = space.upper_bound(index);
            if a > 0.0 {
                lower += a * lb;
                upper += a * ub;
            } else {
                lower += a * ub;
                upper += a * lb;
            }
        }
        (lower, upper)
    }

    pub fn is_similar(&self, other: &Linear, epsilon: f64) -> bool {
        self.coefficients.len() == other.coefficients.len()
            && close(self.constant, other.constant, epsilon)
            && self
                .coefficients
                .iter()
                .zip(&other.coefficients)
                .all(|(a, b)| close(*a, *b, epsilon))
    }
}

pub(crate) fn close(a: f64, b: f64, epsilon: f64) -> bool {
    a == b || (a - b).abs() <= epsilon
}
