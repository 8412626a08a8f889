//! RLT mask: one auxiliary variable per binary product `x_i · x_j`.
//!
//! The original variables keep their indices; auxiliary variables follow
//! them in the order of their `(i, j)` pair. The inner space must be binary,
//! which lets diagonal terms `x_i²` fold onto `x_i`.

use std::collections::{BTreeMap, BTreeSet};

use quorum_expr::{Linear, Node, Quadratic, VarSpace};

use super::error::MaskError;
use super::fix::check_len;

/// Collects the products used by quadratic leaves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RltMaskBuilder {
    n: usize,
    pairs: BTreeSet<(usize, usize)>,
}

impl RltMaskBuilder {
    pub fn new(n: usize) -> Self {
        Self {
            n,
            pairs: BTreeSet::new(),
        }
    }

    /// Register every off-diagonal product of `quad`.
    pub fn signal_terms(&mut self, quad: &Quadratic) -> Result<(), MaskError> {
        check_len(self.n, quad.dimension())?;
        self.pairs.extend(quad.cross_pairs());
        Ok(())
    }

    pub fn n_pairs(&self) -> usize {
        self.pairs.len()
    }

    /// Assign auxiliary indices `n, n + 1, ...` in pair order.
    pub fn finalize(self) -> RltMask {
        let n = self.n;
        let order: Vec<(usize, usize)> = self.pairs.into_iter().collect();
        let index = order
            .iter()
            .enumerate()
            .map(|(pos, &pair)| (pair, n + pos))
            .collect();
        RltMask { n, index, order }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RltMask {
    n: usize,
    index: BTreeMap<(usize, usize), usize>,
    order: Vec<(usize, usize)>,
}

impl RltMask {
    pub fn n_var(&self) -> usize {
        self.n + self.order.len()
    }

    pub fn n_var_orig(&self) -> usize {
        self.n
    }

    pub fn n_aux(&self) -> usize {
        self.order.len()
    }

    /// Auxiliary index of the product `x_i · x_j`, in either order.
    pub fn aux_index(&self, i: usize, j: usize) -> Option<usize> {
        self.index.get(&(i.min(j), i.max(j))).copied()
    }

    /// `((i, j), aux)` for every registered product, by auxiliary index.
    pub fn products(&self) -> impl Iterator<Item = ((usize, usize), usize)> + '_ {
        self.order
            .iter()
            .enumerate()
            .map(move |(pos, &pair)| (pair, self.n + pos))
    }

    pub fn embedding_criteria(&self, inner: &dyn VarSpace) -> bool {
        inner.is_binary() && inner.n_var() == self.n
    }

    pub fn transform_leaf(&self, leaf: Node) -> Result<Node, MaskError> {
        match leaf {
            Node::Linear(leaf) => {
                check_len(self.n, leaf.dimension())?;
                let (mut coefficients, constant) = leaf.into_parts();
                coefficients.resize(self.n_var(), 0.0);
                Ok(Node::Linear(Linear::new(coefficients, constant)))
            }
            Node::Quadratic(quad) => {
                check_len(self.n, quad.dimension())?;
                let a = quad.matrix();
                let mut coefficients = vec![0.0; self.n_var()];
                for ((i, j), aux) in self.products() {
                    coefficients[aux] = a[(i, j)] + a[(j, i)];
                }
                for (i, b) in quad.linear().iter().enumerate() {
                    coefficients[i] = a[(i, i)] + b;
                }
                Ok(Node::Linear(Linear::new(coefficients, quad.constant())))
            }
            other => Err(MaskError::UnsupportedLeaf {
                mask: "rlt",
                kind: other.kind(),
            }),
        }
    }

    /// Extend a binary point with the products it implies.
    pub fn local_mask(&self, unmasked: &[f64]) -> Result<Vec<f64>, MaskError> {
        check_len(self.n, unmasked.len())?;
        let mut masked = unmasked.to_vec();
        masked.extend(self.order.iter().map(|&(i, j)| unmasked[i] * unmasked[j]));
        Ok(masked)
    }

    /// Drop the auxiliary variables.
    pub fn local_unmask(&self, masked: &[f64]) -> Result<Vec<f64>, MaskError> {
        check_len(self.n_var(), masked.len())?;
        Ok(masked[..self.n].to_vec())
    }
}

impl VarSpace for RltMask {
    fn n_var(&self) -> usize {
        RltMask::n_var(self)
    }

    fn lower_bound(&self, _index: usize) -> f64 {
        0.0
    }

    fn upper_bound(&self, _index: usize) -> f64 {
        1.0
    }

    fn is_binary(&self) -> bool {
        true
    }
}
