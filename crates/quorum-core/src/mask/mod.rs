//! Variable masks: coordinate changes between an original variable space and
//! a reduced or extended one.
//!
//! - [`fix`]: fix variables to constants, renumber the rest ([`FixMask`])
//! - [`rlt`]: add one auxiliary variable per binary product ([`RltMask`])
//! - [`bridge`]: solver-facing free/fixed encoding of a FixMask ([`Bridge`])
//! - [`error`]: MaskError
//!
//! Masks compose as a [`MaskStack`]: layer 0 is the outermost (most recently
//! applied) mask, the last layer reads the problem's original space.

pub mod bridge;
pub mod error;
pub mod fix;
pub mod rlt;

use quorum_expr::builders::rebuild;
use quorum_expr::{Node, VarSpace};

pub use bridge::{Bridge, BridgeSlot};
pub use error::MaskError;
pub use fix::{FixMask, FixMaskBuilder};
pub use rlt::{RltMask, RltMaskBuilder};

/// One finalized mask.
#[derive(Debug, Clone, PartialEq)]
pub enum MaskLayer {
    Fix(FixMask),
    Rlt(RltMask),
}

impl MaskLayer {
    pub fn name(&self) -> &'static str {
        match self {
            MaskLayer::Fix(_) => "fix",
            MaskLayer::Rlt(_) => "rlt",
        }
    }

    /// Number of variables this layer produces.
    pub fn n_var(&self) -> usize {
        match self {
            MaskLayer::Fix(mask) => mask.n_var(),
            MaskLayer::Rlt(mask) => mask.n_var(),
        }
    }

    /// Number of variables this layer reads.
    pub fn n_var_orig(&self) -> usize {
        match self {
            MaskLayer::Fix(mask) => mask.n_var_orig(),
            MaskLayer::Rlt(mask) => mask.n_var_orig(),
        }
    }

    pub fn as_fix(&self) -> Option<&FixMask> {
        match self {
            MaskLayer::Fix(mask) => Some(mask),
            MaskLayer::Rlt(_) => None,
        }
    }

    pub fn as_rlt(&self) -> Option<&RltMask> {
        match self {
            MaskLayer::Rlt(mask) => Some(mask),
            MaskLayer::Fix(_) => None,
        }
    }

    /// Whether this layer may be placed in front of `inner`.
    pub fn embedding_criteria(&self, inner: &dyn VarSpace) -> bool {
        match self {
            MaskLayer::Fix(mask) => mask.embedding_criteria(inner),
            MaskLayer::Rlt(mask) => mask.embedding_criteria(inner),
        }
    }

    pub fn transform_leaf(&self, leaf: Node) -> Result<Node, MaskError> {
        match self {
            MaskLayer::Fix(mask) => mask.transform_leaf(leaf),
            MaskLayer::Rlt(mask) => mask.transform_leaf(leaf),
        }
    }

    pub fn local_mask(&self, unmasked: &[f64]) -> Result<Vec<f64>, MaskError> {
        match self {
            MaskLayer::Fix(mask) => mask.local_mask(unmasked),
            MaskLayer::Rlt(mask) => mask.local_mask(unmasked),
        }
    }

    pub fn local_unmask(&self, masked: &[f64]) -> Result<Vec<f64>, MaskError> {
        match self {
            MaskLayer::Fix(mask) => mask.local_unmask(masked),
            MaskLayer::Rlt(mask) => mask.local_unmask(masked),
        }
    }

    /// Rewrite a tree whose leaves live in this layer's input space.
    pub fn transform(&self, node: Node) -> Result<Node, MaskError> {
        transform_tree(node, self, &|leaf| self.transform_leaf(leaf))
    }
}

impl VarSpace for MaskLayer {
    fn n_var(&self) -> usize {
        MaskLayer::n_var(self)
    }

    fn lower_bound(&self, index: usize) -> f64 {
        match self {
            MaskLayer::Fix(mask) => mask.lower_bound(index),
            MaskLayer::Rlt(mask) => mask.lower_bound(index),
        }
    }

    fn upper_bound(&self, index: usize) -> f64 {
        match self {
            MaskLayer::Fix(mask) => mask.upper_bound(index),
            MaskLayer::Rlt(mask) => mask.upper_bound(index),
        }
    }

    fn is_binary(&self) -> bool {
        match self {
            MaskLayer::Fix(mask) => mask.is_binary(),
            MaskLayer::Rlt(mask) => mask.is_binary(),
        }
    }
}

impl From<FixMask> for MaskLayer {
    fn from(mask: FixMask) -> Self {
        MaskLayer::Fix(mask)
    }
}

impl From<RltMask> for MaskLayer {
    fn from(mask: RltMask) -> Self {
        MaskLayer::Rlt(mask)
    }
}

/// Rewrite leaves with `leaf_fn` and rebuild composites through the
/// simplifying constructors, interpreting bounds in `space`.
fn transform_tree(
    node: Node,
    space: &dyn VarSpace,
    leaf_fn: &dyn Fn(Node) -> Result<Node, MaskError>,
) -> Result<Node, MaskError> {
    if node.is_leaf() {
        return leaf_fn(node);
    }
    let mut parts = node.decouple();
    parts.children = parts
        .children
        .into_iter()
        .map(|child| transform_tree(child, space, leaf_fn))
        .collect::<Result<_, _>>()?;
    Ok(rebuild(parts, space))
}

/// Ordered mask layers, outermost first. Never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct MaskStack {
    layers: Vec<MaskLayer>,
}

impl MaskStack {
    pub fn new(base: impl Into<MaskLayer>) -> Self {
        Self {
            layers: vec![base.into()],
        }
    }

    pub fn layers(&self) -> &[MaskLayer] {
        &self.layers
    }

    pub fn outermost(&self) -> &MaskLayer {
        &self.layers[0]
    }

    /// A single layer.
    pub fn is_simple(&self) -> bool {
        self.layers.len() == 1
    }

    /// Number of layers behind the outermost one.
    pub fn max_depth(&self) -> usize {
        self.layers.len() - 1
    }

    /// The fixing mask of a simple stack.
    pub fn simple_fix(&self) -> Option<&FixMask> {
        if self.is_simple() {
            self.outermost().as_fix()
        } else {
            None
        }
    }

    pub fn n_var(&self) -> usize {
        self.outermost().n_var()
    }

    /// Input dimension of the layer at `depth`; `None` or a depth past the
    /// innermost layer gives the original space.
    pub fn n_var_orig(&self, depth: Option<usize>) -> usize {
        self.layers[self.clamp(depth)].n_var_orig()
    }

    /// Place `layer` in front. The layer must accept the current outermost
    /// space.
    pub fn push_front(&mut self, layer: MaskLayer) -> Result<(), MaskError> {
        if !layer.embedding_criteria(self.outermost()) {
            return Err(MaskError::EmbeddingRejected {
                outer: layer.name(),
                inner: self.outermost().name(),
            });
        }
        self.layers.insert(0, layer);
        Ok(())
    }

    /// Map a vector from the input space of layer `depth` to the outermost
    /// space.
    pub fn mask(&self, unmasked: &[f64], depth: Option<usize>) -> Result<Vec<f64>, MaskError> {
        let last = self.clamp(depth);
        self.layers[..=last]
            .iter()
            .rev()
            .try_fold(unmasked.to_vec(), |v, layer| layer.local_mask(&v))
    }

    /// Map a vector from the outermost space back to the input space of
    /// layer `depth`.
    pub fn unmask(&self, masked: &[f64], depth: Option<usize>) -> Result<Vec<f64>, MaskError> {
        let last = self.clamp(depth);
        self.layers[..=last]
            .iter()
            .try_fold(masked.to_vec(), |v, layer| layer.local_unmask(&v))
    }

    /// Rewrite a tree from the original space into the outermost space.
    /// Leaves pass through every layer, innermost first.
    pub fn transform(&self, node: Node) -> Result<Node, MaskError> {
        transform_tree(node, self.outermost(), &|leaf| {
            self.layers
                .iter()
                .rev()
                .try_fold(leaf, |leaf, layer| layer.transform_leaf(leaf))
        })
    }

    fn clamp(&self, depth: Option<usize>) -> usize {
        depth.map_or(self.max_depth(), |d| d.min(self.max_depth()))
    }
}

impl VarSpace for MaskStack {
    fn n_var(&self) -> usize {
        MaskStack::n_var(self)
    }

    fn lower_bound(&self, index: usize) -> f64 {
        self.outermost().lower_bound(index)
    }

    fn upper_bound(&self, index: usize) -> f64 {
        self.outermost().upper_bound(index)
    }

    fn is_binary(&self) -> bool {
        self.outermost().is_binary()
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use quorum_expr::builders::{abs, mult, sub};
    use quorum_expr::{BoxSpace, Linear, NodeKind, Quadratic};

    fn fixed(n: usize, fixes: &[(usize, f64)]) -> FixMask {
        let mut builder = FixMaskBuilder::new(n);
        for &(i, v) in fixes {
            builder.fix_variable(i, v).unwrap();
        }
        builder.finalize()
    }

    #[test]
    fn transform_folds_through_rebuilt_composites() {
        // abs(x0 - x1) with x1 fixed at 1 becomes 1 - x0
        let space = BoxSpace::binary(2);
        let tree = abs(sub(Node::variable(2, 0), Node::variable(2, 1)), &space);
        assert_eq!(tree.kind(), NodeKind::Abs);

        let layer = MaskLayer::Fix(fixed(2, &[(1, 1.0)]));
        let out = layer.transform(tree).unwrap();
        let leaf = out.as_linear().unwrap();
        assert_eq!(leaf.coefficients(), &[-1.0]);
        assert_eq!(leaf.constant(), 1.0);
    }

    #[test]
    fn transform_reapplies_negation_and_sqrt() {
        let tree = Node::Sqrt {
            arg: Box::new(Node::variable(2, 0)),
            negated: true,
        };
        let layer = MaskLayer::Fix(fixed(2, &[(0, 1.0)]));
        let out = layer.transform(tree).unwrap();
        assert!(out.is_constant());
        assert_eq!(out.evaluate(&[]), -1.0);
    }

    #[test]
    fn transform_turns_products_of_fixed_variables_into_constants() {
        let tree = mult(Node::variable(3, 0), Node::variable(3, 2));
        let layer = MaskLayer::Fix(fixed(3, &[(2, 1.0)]));
        let out = layer.transform(tree).unwrap();
        let leaf = out.as_linear().unwrap();
        assert_eq!(leaf.coefficients(), &[1.0, 0.0]);
    }

    #[test]
    fn stack_tracks_depth_and_dimensions() {
        let mut stack = MaskStack::new(fixed(3, &[(1, 0.0)]));
        assert!(stack.is_simple());
        assert_eq!(stack.n_var(), 2);

        let mut builder = RltMaskBuilder::new(2);
        builder
            .signal_terms(&Quadratic::from_node(mult(Node::variable(2, 0), Node::variable(2, 1))).unwrap())
            .unwrap();
        stack.push_front(MaskLayer::Rlt(builder.finalize())).unwrap();

        assert!(!stack.is_simple());
        assert_eq!(stack.max_depth(), 1);
        assert_eq!(stack.n_var(), 3);
        assert_eq!(stack.n_var_orig(Some(0)), 2);
        assert_eq!(stack.n_var_orig(None), 3);
        assert_eq!(stack.n_var_orig(Some(9)), 3);
        assert!(stack.simple_fix().is_none());
    }

    #[test]
    fn stack_mask_and_unmask_walk_every_layer() {
        let mut stack = MaskStack::new(fixed(3, &[(1, 1.0)]));
        let mut builder = RltMaskBuilder::new(2);
        builder
            .signal_terms(&Quadratic::from_node(mult(Node::variable(2, 0), Node::variable(2, 1))).unwrap())
            .unwrap();
        stack.push_front(builder.finalize().into()).unwrap();

        let masked = stack.mask(&[1.0, 1.0, 1.0], None).unwrap();
        assert_eq!(masked, vec![1.0, 1.0, 1.0]);
        assert_eq!(stack.unmask(&[1.0, 0.0, 0.0], None).unwrap(), vec![1.0, 1.0, 0.0]);
        assert_eq!(stack.unmask(&[1.0, 0.0, 0.0], Some(0)).unwrap(), vec![1.0, 0.0]);
    }

    #[test]
    fn push_front_checks_embedding() {
        let mut stack = MaskStack::new(FixMask::identity(3));
        let err = stack
            .push_front(MaskLayer::Fix(FixMask::identity(2)))
            .unwrap_err();
        assert_eq!(
            err,
            MaskError::EmbeddingRejected {
                outer: "fix",
                inner: "fix"
            }
        );
    }

    #[test]
    fn stack_transform_threads_leaves_innermost_first() {
        let mut stack = MaskStack::new(fixed(3, &[(0, 1.0)]));
        stack
            .push_front(MaskLayer::Fix(fixed(2, &[(1, 0.0)])))
            .unwrap();
        let leaf = Node::Linear(Linear::new(vec![2.0, 3.0, 5.0], 1.0));
        let out = stack.transform(leaf).unwrap();
        let out = out.as_linear().unwrap();
        assert_eq!(out.coefficients(), &[3.0]);
        assert_eq!(out.constant(), 3.0);
    }
}
