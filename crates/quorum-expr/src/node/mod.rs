//! Expression tree node and its structural operations.
//!
//! - [`linear`]: dense affine leaf ([`Linear`])
//! - [`quadratic`]: transient leaf used by product reformulation ([`Quadratic`])
//! - [`render`]: infix rendering for diagnostics
//!
//! A tree is exclusively owned by its slot. Restructuring goes through
//! [`Node::decouple`], which consumes the node and hands its children out by
//! value, and the smart constructors in [`crate::builders`].

pub mod linear;
pub mod quadratic;
mod render;

pub use linear::{Linear, ZERO_TOLERANCE};
pub use quadratic::Quadratic;

use crate::dual::Dual;
use crate::space::VarSpace;

/// Variant tag of a node, with the integer tag used by the text format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeKind {
    Sum,
    Mult,
    Div,
    Abs,
    Linear,
    Sqrt,
    Quadratic,
}

impl NodeKind {
    pub fn tag(self) -> i64 {
        match self {
            NodeKind::Sum => 0,
            NodeKind::Mult => 1,
            NodeKind::Div => 2,
            NodeKind::Abs => 3,
            NodeKind::Linear => 4,
            NodeKind::Sqrt => 5,
            NodeKind::Quadratic => 6,
        }
    }

    pub fn from_tag(tag: i64) -> Option<Self> {
        match tag {
            0 => Some(NodeKind::Sum),
            1 => Some(NodeKind::Mult),
            2 => Some(NodeKind::Div),
            3 => Some(NodeKind::Abs),
            4 => Some(NodeKind::Linear),
            5 => Some(NodeKind::Sqrt),
            6 => Some(NodeKind::Quadratic),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Sum => "sum",
            NodeKind::Mult => "mult",
            NodeKind::Div => "div",
            NodeKind::Abs => "abs",
            NodeKind::Linear => "linear",
            NodeKind::Sqrt => "sqrt",
            NodeKind::Quadratic => "quadratic",
        }
    }

    pub fn is_leaf(self) -> bool {
        matches!(self, NodeKind::Linear | NodeKind::Quadratic)
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Linear(Linear),
    Quadratic(Quadratic),
    Sum(Vec<Node>),
    Mult(Box<Node>, Box<Node>),
    /// `numerator / denominator`; evaluates to zero where the denominator is zero.
    Div(Box<Node>, Box<Node>),
    Abs { arg: Box<Node>, negated: bool },
    Sqrt { arg: Box<Node>, negated: bool },
}

/// A composite node taken apart by [`Node::decouple`].
///
/// Leaves decouple into themselves: `kind` is the leaf kind and `children`
/// holds the leaf.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoupled {
    pub kind: NodeKind,
    pub negated: bool,
    pub children: Vec<Node>,
}

impl Node {
    // ── Constructors ────────────────────────────────────────

    pub fn constant(n: usize, value: f64) -> Self {
        Node::Linear(Linear::from_constant(n, value))
    }

    pub fn zeros(n: usize) -> Self {
        Node::Linear(Linear::zeros(n))
    }

    pub fn variable(n: usize, index: usize) -> Self {
        Node::Linear(Linear::unit(n, index))
    }

    // ── Inspection ──────────────────────────────────────────

    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Linear(_) => NodeKind::Linear,
            Node::Quadratic(_) => NodeKind::Quadratic,
            Node::Sum(_) => NodeKind::Sum,
            Node::Mult(..) => NodeKind::Mult,
            Node::Div(..) => NodeKind::Div,
            Node::Abs { .. } => NodeKind::Abs,
            Node::Sqrt { .. } => NodeKind::Sqrt,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.kind().is_leaf()
    }

    /// Dimension of the first leaf reached; zero for an empty sum.
    pub fn dimension(&self) -> usize {
        match self {
            Node::Linear(leaf) => leaf.dimension(),
            Node::Quadratic(leaf) => leaf.dimension(),
            Node::Sum(terms) => terms.first().map_or(0, Node::dimension),
            Node::Mult(lhs, _) | Node::Div(lhs, _) => lhs.dimension(),
            Node::Abs { arg, .. } | Node::Sqrt { arg, .. } => arg.dimension(),
        }
    }

    /// Number of nodes in the tree.
    pub fn node_count(&self) -> usize {
        1 + match self {
            Node::Linear(_) | Node::Quadratic(_) => 0,
            Node::Sum(terms) => terms.iter().map(Node::node_count).sum(),
            Node::Mult(lhs, rhs) | Node::Div(lhs, rhs) => lhs.node_count() + rhs.node_count(),
            Node::Abs { arg, .. } | Node::Sqrt { arg, .. } => arg.node_count(),
        }
    }

    pub fn as_linear(&self) -> Option<&Linear> {
        match self {
            Node::Linear(leaf) => Some(leaf),
            _ => None,
        }
    }

    pub fn is_linear(&self) -> bool {
        matches!(self, Node::Linear(_))
    }

    /// A linear leaf with numerically zero coefficients.
    pub fn is_constant(&self) -> bool {
        self.as_linear().is_some_and(Linear::is_constant)
    }

    /// A quotient of two linear leaves.
    pub fn is_fraction(&self) -> bool {
        matches!(self, Node::Div(num, den) if num.is_linear() && den.is_linear())
    }

    /// Linear, a product of two linear leaves, or a sum of such terms.
    pub fn is_quadratic(&self) -> bool {
        match self {
            Node::Linear(_) => true,
            Node::Sum(terms) => terms.iter().all(Node::is_quadratic),
            Node::Mult(lhs, rhs) => lhs.is_linear() && rhs.is_linear(),
            _ => false,
        }
    }

    // ── Restructuring ───────────────────────────────────────

    /// Take the node apart, consuming it.
    pub fn decouple(self) -> Decoupled {
        let kind = self.kind();
        let (negated, children) = match self {
            Node::Sum(terms) => (false, terms),
            Node::Mult(lhs, rhs) | Node::Div(lhs, rhs) => (false, vec![*lhs, *rhs]),
            Node::Abs { arg, negated } | Node::Sqrt { arg, negated } => (negated, vec![*arg]),
            leaf @ (Node::Linear(_) | Node::Quadratic(_)) => (false, vec![leaf]),
        };
        Decoupled {
            kind,
            negated,
            children,
        }
    }

    /// Multiply the value of the node by `k` in place.
    pub fn scale(&mut self, k: f64) {
        match self {
            Node::Linear(leaf) => leaf.scale(k),
            Node::Quadratic(leaf) => leaf.scale(k),
            Node::Sum(terms) => terms.iter_mut().for_each(|term| term.scale(k)),
            Node::Mult(lhs, _) => lhs.scale(k),
            Node::Div(num, den) => {
                if k.abs() >= 1.0 || k == 0.0 {
                    num.scale(k);
                } else {
                    den.scale(1.0 / k);
                }
            }
            Node::Abs { arg, negated } => {
                if k < 0.0 {
                    *negated = !*negated;
                }
                arg.scale(k.abs());
            }
            Node::Sqrt { arg, negated } => {
                if k < 0.0 {
                    *negated = !*negated;
                }
                arg.scale(k * k);
            }
        }
    }

    /// Consuming form of [`Node::scale`].
    pub fn scaled(mut self, k: f64) -> Self {
        self.scale(k);
        self
    }

    // ── Evaluation ──────────────────────────────────────────

    pub fn evaluate(&self, point: &[f64]) -> f64 {
        match self {
            Node::Linear(leaf) => leaf.evaluate(point),
            Node::Quadratic(leaf) => leaf.evaluate(point),
            Node::Sum(terms) => terms.iter().map(|term| term.evaluate(point)).sum(),
            Node::Mult(lhs, rhs) => lhs.evaluate(point) * rhs.evaluate(point),
            Node::Div(num, den) => {
                let denominator = den.evaluate(point);
                if denominator == 0.0 {
                    0.0
                } else {
                    num.evaluate(point) / denominator
                }
            }
            Node::Abs { arg, negated } => signed(arg.evaluate(point).abs(), *negated),
            Node::Sqrt { arg, negated } => signed(arg.evaluate(point).sqrt(), *negated),
        }
    }

    pub fn evaluate_dual(&self, point: &[Dual]) -> Dual {
        match self {
            Node::Linear(leaf) => leaf.evaluate_dual(point),
            Node::Quadratic(leaf) => leaf.evaluate_dual(point),
            Node::Sum(terms) => terms
                .iter()
                .fold(Dual::constant(0.0), |acc, term| acc + term.evaluate_dual(point)),
            Node::Mult(lhs, rhs) => lhs.evaluate_dual(point) * rhs.evaluate_dual(point),
            Node::Div(num, den) => num
                .evaluate_dual(point)
                .checked_div(den.evaluate_dual(point)),
            Node::Abs { arg, negated } => {
                let value = arg.evaluate_dual(point).abs();
                if *negated { -value } else { value }
            }
            Node::Sqrt { arg, negated } => {
                let value = arg.evaluate_dual(point).sqrt();
                if *negated { -value } else { value }
            }
        }
    }

    /// Interval estimate of the node over `space`. Only linear leaves are
    /// bounded; every other variant reports the whole real line.
    pub fn predict_bound(&self, space: &dyn VarSpace) -> (f64, f64) {
        match self {
            Node::Linear(leaf) => leaf.predict_bound(space),
            _ => (f64::NEG_INFINITY, f64::INFINITY),
        }
    }

    /// Same variant, numeric fields within `epsilon`, children similar.
    pub fn is_similar(&self, other: &Node, epsilon: f64) -> bool {
        match (self, other) {
            (Node::Linear(a), Node::Linear(b)) => a.is_similar(b, epsilon),
            (Node::Quadratic(a), Node::Quadratic(b)) => a.is_similar(b, epsilon),
            (Node::Sum(a), Node::Sum(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.is_similar(y, epsilon))
            }
            (Node::Mult(a1, a2), Node::Mult(b1, b2)) | (Node::Div(a1, a2), Node::Div(b1, b2)) => {
                a1.is_similar(b1, epsilon) && a2.is_similar(b2, epsilon)
            }
            (
                Node::Abs {
                    arg: a,
                    negated: na,
                },
                Node::Abs {
                    arg: b,
                    negated: nb,
                },
            )
            | (
                Node::Sqrt {
                    arg: a,
                    negated: na,
                },
                Node::Sqrt {
                    arg: b,
                    negated: nb,
                },
            ) => na == nb && a.is_similar(b, epsilon),
            _ => false,
        }
    }
}

fn signed(value: f64, negated: bool) -> f64 {
    if negated { -value } else { value }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    fn var(n: usize, i: usize) -> Node {
        Node::variable(n, i)
    }

    #[test]
    fn kind_tags_round_trip() {
        for kind in [
            NodeKind::Sum,
            NodeKind::Mult,
            NodeKind::Div,
            NodeKind::Abs,
            NodeKind::Linear,
            NodeKind::Sqrt,
            NodeKind::Quadratic,
        ] {
            assert_eq!(NodeKind::from_tag(kind.tag()), Some(kind));
        }
        assert_eq!(NodeKind::from_tag(7), None);
        assert_eq!(NodeKind::from_tag(-1), None);
    }

    #[test]
    fn decouple_hands_out_children_by_value() {
        let node = Node::Abs {
            arg: Box::new(var(2, 0)),
            negated: true,
        };
        let parts = node.decouple();
        assert_eq!(parts.kind, NodeKind::Abs);
        assert!(parts.negated);
        assert_eq!(parts.children, vec![var(2, 0)]);

        let leaf = var(2, 1).decouple();
        assert_eq!(leaf.kind, NodeKind::Linear);
        assert_eq!(leaf.children.len(), 1);
    }

    #[test]
    fn scale_abs_flips_sign_flag() {
        let mut node = Node::Abs {
            arg: Box::new(var(1, 0)),
            negated: false,
        };
        node.scale(-2.0);
        assert_eq!(node.evaluate(&[3.0]), -6.0);
        match &node {
            Node::Abs { negated, .. } => assert!(*negated),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn scale_sqrt_squares_factor() {
        let mut node = Node::Sqrt {
            arg: Box::new(var(1, 0)),
            negated: false,
        };
        node.scale(-3.0);
        assert_eq!(node.evaluate(&[4.0]), -6.0);
    }

    #[test]
    fn scale_div_picks_operand_by_magnitude() {
        let div = Node::Div(Box::new(var(1, 0)), Box::new(Node::constant(1, 2.0)));
        let big = div.clone().scaled(4.0);
        assert_eq!(big.evaluate(&[3.0]), 6.0);
        match &big {
            Node::Div(num, _) => assert_eq!(num.evaluate(&[3.0]), 12.0),
            other => panic!("unexpected {other:?}"),
        }

        let small = div.scaled(0.5);
        assert_eq!(small.evaluate(&[3.0]), 0.75);
        match &small {
            Node::Div(_, den) => assert_eq!(den.evaluate(&[3.0]), 4.0),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn scale_mult_touches_first_factor_only() {
        let node = Node::Mult(Box::new(var(2, 0)), Box::new(var(2, 1))).scaled(3.0);
        assert_eq!(node.evaluate(&[2.0, 5.0]), 30.0);
        match &node {
            Node::Mult(_, rhs) => assert_eq!(rhs.evaluate(&[2.0, 5.0]), 5.0),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn div_by_zero_evaluates_to_zero() {
        let node = Node::Div(Box::new(Node::constant(1, 5.0)), Box::new(var(1, 0)));
        assert_eq!(node.evaluate(&[0.0]), 0.0);
        assert_eq!(node.evaluate(&[2.0]), 2.5);
        assert_eq!(node.evaluate_dual(&[Dual::variable(0.0)]), Dual::constant(0.0));
    }

    #[test]
    fn dual_matches_finite_difference_for_every_variant() {
        let n = 2;
        let tree = Node::Sum(vec![
            Node::Mult(Box::new(var(n, 0)), Box::new(var(n, 1))),
            Node::Div(Box::new(var(n, 0)), Box::new(Node::Linear(Linear::new(vec![0.0, 1.0], 1.0)))),
            Node::Abs {
                arg: Box::new(Node::Linear(Linear::new(vec![1.0, -3.0], 0.0))),
                negated: true,
            },
            Node::Sqrt {
                arg: Box::new(Node::Linear(Linear::new(vec![1.0, 0.0], 1.0))),
                negated: false,
            },
        ]);
        let x = [1.5, 0.25];
        let h = 1e-6;
        let dual = tree.evaluate_dual(&[Dual::variable(x[0]), Dual::constant(x[1])]);
        let numeric = (tree.evaluate(&[x[0] + h, x[1]]) - tree.evaluate(&[x[0] - h, x[1]])) / (2.0 * h);
        assert!((dual.value - tree.evaluate(&x)).abs() < 1e-12);
        assert!((dual.derivative - numeric).abs() < 1e-5);
    }

    #[test]
    fn predicates_follow_shape() {
        let product = Node::Mult(Box::new(var(2, 0)), Box::new(var(2, 1)));
        assert!(product.is_quadratic());
        assert!(!product.is_linear());

        let sum = Node::Sum(vec![var(2, 0), product.clone()]);
        assert!(sum.is_quadratic());

        let fraction = Node::Div(Box::new(var(2, 0)), Box::new(var(2, 1)));
        assert!(fraction.is_fraction());
        assert!(!fraction.is_quadratic());

        let nested = Node::Mult(Box::new(product), Box::new(var(2, 0)));
        assert!(!nested.is_quadratic());
    }

    #[test]
    fn similarity_checks_structure_and_flags() {
        let a = Node::Abs {
            arg: Box::new(var(1, 0)),
            negated: false,
        };
        let b = Node::Abs {
            arg: Box::new(var(1, 0)),
            negated: true,
        };
        assert!(a.is_similar(&a.clone(), 0.0));
        assert!(!a.is_similar(&b, 1.0));
        assert!(!a.is_similar(&var(1, 0), 1.0));
    }

    #[test]
    fn dimension_and_node_count() {
        let tree = Node::Sum(vec![var(4, 0), Node::Mult(Box::new(var(4, 1)), Box::new(var(4, 2)))]);
        assert_eq!(tree.dimension(), 4);
        assert_eq!(tree.node_count(), 5);
        assert_eq!(Node::Sum(Vec::new()).dimension(), 0);
    }
}
