//! Quadratic leaf `xᵀAx + b·x + c`, used while reformulating products.

use nalgebra::DMatrix;

use super::{Node, NodeKind};
use super::linear::{Linear, close};
use crate::dual::Dual;
use crate::error::ExprError;

#[derive(Debug, Clone, PartialEq)]
pub struct Quadratic {
    a: DMatrix<f64>,
    b: Vec<f64>,
    c: f64,
}

impl Quadratic {
    pub fn zeros(n: usize) -> Self {
        Self {
            a: DMatrix::zeros(n, n),
            b: vec![0.0; n],
            c: 0.0,
        }
    }

    pub fn new(a: DMatrix<f64>, b: Vec<f64>, c: f64) -> Result<Self, ExprError> {
        let n = b.len();
        if a.nrows() != n || a.ncols() != n {
            return Err(ExprError::DimensionMismatch {
                expected: n,
                found: a.nrows().max(a.ncols()),
            });
        }
        Ok(Self { a, b, c })
    }

    /// Fold a linear leaf, a product of two linear leaves, or a sum of those
    /// into a single quadratic form.
    pub fn from_node(node: Node) -> Result<Self, ExprError> {
        let n = node.dimension();
        let mut quad = Self::zeros(n);
        quad.absorb(node)?;
        Ok(quad)
    }

    fn absorb(&mut self, node: Node) -> Result<(), ExprError> {
        match node {
            Node::Linear(leaf) => self.add_linear(&leaf),
            Node::Quadratic(other) => self.add_quadratic(&other),
            Node::Mult(lhs, rhs) => match (*lhs, *rhs) {
                (Node::Linear(l), Node::Linear(r)) => self.add_product(&l, &r),
                _ => Err(ExprError::NotQuadratic {
                    kind: NodeKind::Mult,
                }),
            },
            Node::Sum(terms) => terms.into_iter().try_for_each(|term| self.absorb(term)),
            other => Err(ExprError::NotQuadratic { kind: other.kind() }),
        }
    }

    // ── Accessors ───────────────────────────────────────────

    pub fn matrix(&self) -> &DMatrix<f64> {
        &self.a
    }

    pub fn linear(&self) -> &[f64] {
        &self.b
    }

    pub fn constant(&self) -> f64 {
        self.c
    }

    pub fn dimension(&self) -> usize {
        self.b.len()
    }

    /// Unordered index pairs `(i, j)`, `i < j`, with a nonzero cross term.
    pub fn cross_pairs(&self) -> Vec<(usize, usize)> {
        let n = self.dimension();
        let mut pairs = Vec::new();
        for i in 0..n {
            for j in (i + 1)..n {
                if self.a[(i, j)] != 0.0 || self.a[(j, i)] != 0.0 {
                    pairs.push((i, j));
                }
            }
        }
        pairs
    }

    // ── Accumulation ────────────────────────────────────────

    pub fn add_linear(&mut self, leaf: &Linear) -> Result<(), ExprError> {
        self.check_dimension(leaf.dimension())?;
        for (slot, a) in self.b.iter_mut().zip(leaf.coefficients()) {
            *slot += a;
        }
        self.c += leaf.constant();
        Ok(())
    }

    /// Accumulate `(v1·x + c1)(v2·x + c2)`.
    pub fn add_product(&mut self, lhs: &Linear, rhs: &Linear) -> Result<(), ExprError> {
        self.check_dimension(lhs.dimension())?;
        self.check_dimension(rhs.dimension())?;
        let (c1, c2) = (lhs.constant(), rhs.constant());
        for (i, &v1) in lhs.coefficients().iter().enumerate() {
            if v1 == 0.0 {
                continue;
            }
            for (j, &v2) in rhs.coefficients().iter().enumerate() {
                if v2 != 0.0 {
                    self.a[(i, j)] += v1 * v2;
                }
            }
        }
        for i in 0..self.b.len() {
            self.b[i] += c1 * rhs.coefficient(i) + c2 * lhs.coefficient(i);
        }
        self.c += c1 * c2;
        Ok(())
    }

    fn add_quadratic(&mut self, other: &Quadratic) -> Result<(), ExprError> {
        self.check_dimension(other.dimension())?;
        self.a += &other.a;
        for (slot, v) in self.b.iter_mut().zip(&other.b) {
            *slot += v;
        }
        self.c += other.c;
        Ok(())
    }

    fn check_dimension(&self, found: usize) -> Result<(), ExprError> {
        if found == self.dimension() {
            Ok(())
        } else {
            Err(ExprError::DimensionMismatch {
                expected: self.dimension(),
                found,
            })
        }
    }

    // ── Evaluation ──────────────────────────────────────────

    pub fn scale(&mut self, k: f64) {
        self.a *= k;
        for v in &mut self.b {
            *v *= k;
        }
        self.c *= k;
    }

    pub fn evaluate(&self, point: &[f64]) -> f64 {
        let n = self.dimension().min(point.len());
        let mut total = self.c;
        for i in 0..n {
            total += self.b[i] * point[i];
            for j in 0..n {
                let a = self.a[(i, j)];
                if a != 0.0 {
                    total += a * point[i] * point[j];
                }
            }
        }
        total
    }

    pub fn evaluate_dual(&self, point: &[Dual]) -> Dual {
        let n = self.dimension().min(point.len());
        let mut total = Dual::constant(self.c);
        for i in 0..n {
            total += point[i] * self.b[i];
            for j in 0..n {
                let a = self.a[(i, j)];
                if a != 0.0 {
                    total += point[i] * point[j] * a;
                }
            }
        }
        total
    }

    pub fn is_similar(&self, other: &Quadratic, epsilon: f64) -> bool {
        self.a.shape() == other.a.shape()
            && self.b.len() == other.b.len()
            && close(self.c, other.c, epsilon)
            && self
                .a
                .iter()
                .zip(other.a.iter())
                .all(|(x, y)| close(*x, *y, epsilon))
            && self
                .b
                .iter()
                .zip(&other.b)
                .all(|(x, y)| close(*x, *y, epsilon))
    }
}
