//! Fixing mask: collapse some variables to constants and renumber the rest.
//!
//! Editing happens on [`FixMaskBuilder`]; [`FixMaskBuilder::finalize`]
//! produces the immutable [`FixMask`] that owns the free/original index
//! bijection. Only the finalized mask can rewrite leaves or map vectors.

use quorum_expr::{Linear, Node, VarSpace};

use super::bridge::{Bridge, BridgeSlot};
use super::error::MaskError;

/// Editing state of a fixing mask.
#[derive(Debug, Clone, PartialEq)]
pub struct FixMaskBuilder {
    lower: Vec<f64>,
    upper: Vec<f64>,
    values: Vec<f64>,
    fixed: Vec<bool>,
}

impl FixMaskBuilder {
    /// `n` binary variables, none fixed.
    pub fn new(n: usize) -> Self {
        Self {
            lower: vec![0.0; n],
            upper: vec![1.0; n],
            values: vec![0.0; n],
            fixed: vec![false; n],
        }
    }

    pub fn n_var_orig(&self) -> usize {
        self.values.len()
    }

    pub fn is_fixed(&self, index: usize) -> bool {
        self.fixed.get(index).copied().unwrap_or(false)
    }

    pub fn set_bounds(&mut self, index: usize, lower: f64, upper: f64) -> Result<(), MaskError> {
        self.check_index(index)?;
        if lower > upper {
            return Err(MaskError::InvalidBounds {
                index,
                lower,
                upper,
            });
        }
        self.lower[index] = lower;
        self.upper[index] = upper;
        Ok(())
    }

    /// Fix `index` to `value`. Re-fixing to the same value is accepted; the
    /// builder is unchanged on error.
    pub fn fix_variable(&mut self, index: usize, value: f64) -> Result<(), MaskError> {
        self.check_index(index)?;
        if self.fixed[index] {
            return if self.values[index] == value {
                Ok(())
            } else {
                Err(MaskError::AlreadyFixed {
                    index,
                    value: self.values[index],
                })
            };
        }
        let (lower, upper) = (self.lower[index], self.upper[index]);
        if value < lower || value > upper {
            return Err(MaskError::ValueOutOfBounds {
                index,
                value,
                lower,
                upper,
            });
        }
        self.fixed[index] = true;
        self.values[index] = value;
        Ok(())
    }

    pub fn free_variable(&mut self, index: usize) -> Result<(), MaskError> {
        self.check_index(index)?;
        if self.lower[index] == self.upper[index] {
            return Err(MaskError::DegenerateBounds { index });
        }
        self.fixed[index] = false;
        self.values[index] = 0.0;
        Ok(())
    }

    /// Build the bijection. Variables whose bounds coincide are fixed to
    /// that bound; free variables are numbered in original order.
    pub fn finalize(mut self) -> FixMask {
        let n = self.n_var_orig();
        let mut orig_to_mask = vec![None; n];
        let mut mask_to_orig = Vec::with_capacity(n);
        for i in 0..n {
            if self.lower[i] == self.upper[i] {
                self.fixed[i] = true;
                self.values[i] = self.lower[i];
            }
            if !self.fixed[i] {
                orig_to_mask[i] = Some(mask_to_orig.len());
                mask_to_orig.push(i);
            }
        }
        let binary = mask_to_orig
            .iter()
            .all(|&i| self.lower[i] == 0.0 && self.upper[i] == 1.0);
        FixMask {
            lower: self.lower,
            upper: self.upper,
            values: self.values,
            orig_to_mask,
            mask_to_orig,
            binary,
        }
    }

    fn check_index(&self, index: usize) -> Result<(), MaskError> {
        if index < self.n_var_orig() {
            Ok(())
        } else {
            Err(MaskError::IndexOutOfRange {
                index,
                n_var: self.n_var_orig(),
            })
        }
    }
}

/// Finalized fixing mask.
#[derive(Debug, Clone, PartialEq)]
pub struct FixMask {
    lower: Vec<f64>,
    upper: Vec<f64>,
    // Value of every original variable; meaningful for fixed ones.
    values: Vec<f64>,
    orig_to_mask: Vec<Option<usize>>,
    mask_to_orig: Vec<usize>,
    binary: bool,
}

impl FixMask {
    /// `n` free binary variables.
    pub fn identity(n: usize) -> Self {
        FixMaskBuilder::new(n).finalize()
    }

    /// Reopen the mask for editing.
    pub fn to_builder(&self) -> FixMaskBuilder {
        FixMaskBuilder {
            lower: self.lower.clone(),
            upper: self.upper.clone(),
            values: self.values.clone(),
            fixed: self.orig_to_mask.iter().map(Option::is_none).collect(),
        }
    }

    // ── Accessors ───────────────────────────────────────────

    /// Number of free variables.
    pub fn n_var(&self) -> usize {
        self.mask_to_orig.len()
    }

    pub fn n_var_orig(&self) -> usize {
        self.values.len()
    }

    pub fn is_fixed(&self, orig: usize) -> bool {
        matches!(self.orig_to_mask.get(orig), Some(None))
    }

    /// Values of all original variables; free ones read as 0.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn value(&self, orig: usize) -> Option<f64> {
        self.values.get(orig).copied()
    }

    /// Original index of free variable `mask_id`.
    pub fn orig_id(&self, mask_id: usize) -> Option<usize> {
        self.mask_to_orig.get(mask_id).copied()
    }

    /// Free index of original variable `orig`, `None` when fixed.
    pub fn mask_id(&self, orig: usize) -> Option<usize> {
        self.orig_to_mask.get(orig).copied().flatten()
    }

    pub fn orig_bounds(&self, orig: usize) -> Option<(f64, f64)> {
        Some((*self.lower.get(orig)?, *self.upper.get(orig)?))
    }

    /// Nothing fixed.
    pub fn is_identity(&self) -> bool {
        self.mask_to_orig.len() == self.orig_to_mask.len()
    }

    pub fn is_binary(&self) -> bool {
        self.binary
    }

    /// The mask can sit in front of `inner` when `inner` produces exactly the
    /// original space of this mask with the same bounds.
    pub fn embedding_criteria(&self, inner: &dyn VarSpace) -> bool {
        inner.n_var() == self.n_var_orig()
            && (0..self.n_var_orig()).all(|i| {
                inner.lower_bound(i) == self.lower[i] && inner.upper_bound(i) == self.upper[i]
            })
    }

    // ── Transforms ──────────────────────────────────────────

    /// Rewrite a linear leaf from the original space into the free space,
    /// folding fixed variables into the constant.
    pub fn transform_leaf(&self, leaf: Node) -> Result<Node, MaskError> {
        let leaf = match leaf {
            Node::Linear(leaf) => leaf,
            other => {
                return Err(MaskError::UnsupportedLeaf {
                    mask: "fix",
                    kind: other.kind(),
                });
            }
        };
        if leaf.dimension() != self.n_var_orig() {
            return Err(MaskError::DimensionMismatch {
                expected: self.n_var_orig(),
                found: leaf.dimension(),
            });
        }
        let (coefficients, mut constant) = leaf.into_parts();
        let mut reduced = vec![0.0; self.n_var()];
        for (orig, a) in coefficients.into_iter().enumerate() {
            match self.orig_to_mask[orig] {
                Some(id) => reduced[id] = a,
                None if self.values[orig] != 0.0 => constant += a * self.values[orig],
                None => {}
            }
        }
        Ok(Node::Linear(Linear::new(reduced, constant)))
    }

    /// Project an original-space vector onto the free variables.
    pub fn local_mask(&self, unmasked: &[f64]) -> Result<Vec<f64>, MaskError> {
        check_len(self.n_var_orig(), unmasked.len())?;
        Ok(self.mask_to_orig.iter().map(|&i| unmasked[i]).collect())
    }

    /// Lift a free-space vector back, filling fixed variables with their value.
    pub fn local_unmask(&self, masked: &[f64]) -> Result<Vec<f64>, MaskError> {
        check_len(self.n_var(), masked.len())?;
        let mut unmasked = self.values.clone();
        for (&orig, &value) in self.mask_to_orig.iter().zip(masked) {
            unmasked[orig] = value;
        }
        Ok(unmasked)
    }

    /// Encode the mask for solver backends. Fails when a variable is fixed to
    /// anything other than 0 or 1.
    pub fn make_bridge(&self) -> Result<Bridge, MaskError> {
        let slots = self
            .orig_to_mask
            .iter()
            .enumerate()
            .map(|(orig, slot)| match *slot {
                Some(id) => Ok(BridgeSlot::Free(id)),
                None if self.values[orig] == 0.0 => Ok(BridgeSlot::FixedZero),
                None if self.values[orig] == 1.0 => Ok(BridgeSlot::FixedOne),
                None => Err(MaskError::NonBinaryFixedValue {
                    index: orig,
                    value: self.values[orig],
                }),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Bridge::from_slots(slots)
    }

    /// Whether `bridge` encodes exactly this mask.
    pub fn check_bridge(&self, bridge: &Bridge) -> bool {
        self.make_bridge().is_ok_and(|own| own == *bridge)
    }
}

impl VarSpace for FixMask {
    fn n_var(&self) -> usize {
        FixMask::n_var(self)
    }

    fn lower_bound(&self, index: usize) -> f64 {
        self.orig_id(index)
            .map_or(f64::NEG_INFINITY, |orig| self.lower[orig])
    }

    fn upper_bound(&self, index: usize) -> f64 {
        self.orig_id(index).map_or(f64::INFINITY, |orig| self.upper[orig])
    }

    fn is_binary(&self) -> bool {
        self.binary
    }
}

pub(crate) fn check_len(expected: usize, found: usize) -> Result<(), MaskError> {
    if expected == found {
        Ok(())
    } else {
        Err(MaskError::DimensionMismatch { expected, found })
    }
}
