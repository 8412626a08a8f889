//! Simplifying constructors.
//!
//! Every arithmetic operation on trees goes through these functions, so
//! constant folding and linear merging happen eagerly while a tree is built:
//!
//! - two linear operands merge into one leaf
//! - sums flatten and keep at most one linear leaf, placed first
//! - products and quotients by a constant leaf become a `scale`
//! - `abs` of a sign-definite linear leaf disappears
//! - `sqrt` of a constant leaf is evaluated

use crate::node::{Decoupled, Linear, Node, NodeKind};
use crate::space::VarSpace;

/// N-ary sum over `n` variables. Linear terms are merged into a single leaf;
/// nested sums are flattened. Returns the merged leaf alone when no other
/// term remains, and a zero leaf for no terms at all.
pub fn sigma(n: usize, terms: Vec<Node>) -> Node {
    let mut merged: Option<Linear> = None;
    let mut others = Vec::new();
    for term in terms {
        absorb(term, &mut merged, &mut others);
    }

    if others.is_empty() {
        return match merged {
            Some(leaf) => Node::Linear(leaf),
            None => Node::zeros(n),
        };
    }

    let mut out = Vec::with_capacity(others.len() + 1);
    if let Some(leaf) = merged {
        out.push(Node::Linear(leaf));
    }
    out.extend(others);
    if out.len() == 1 {
        return out.remove(0);
    }
    Node::Sum(out)
}

fn absorb(term: Node, merged: &mut Option<Linear>, others: &mut Vec<Node>) {
    match term {
        Node::Linear(leaf) => match merged {
            Some(acc) => acc.merge(&leaf),
            None => *merged = Some(leaf),
        },
        Node::Sum(children) => {
            for child in children {
                absorb(child, merged, others);
            }
        }
        other => others.push(other),
    }
}

pub fn add(lhs: Node, rhs: Node) -> Node {
    match (lhs, rhs) {
        (Node::Linear(mut a), Node::Linear(b)) => {
            a.merge(&b);
            Node::Linear(a)
        }
        (Node::Sum(mut terms), other) | (other, Node::Sum(mut terms)) => {
            let n = other.dimension();
            terms.push(other);
            sigma(n, terms)
        }
        (lhs, rhs) => Node::Sum(vec![lhs, rhs]),
    }
}

/// `add` with an absent accumulator treated as the additive identity.
pub fn accumulate(acc: Option<Node>, term: Node) -> Node {
    match acc {
        Some(acc) => add(acc, term),
        None => term,
    }
}

pub fn sub(lhs: Node, rhs: Node) -> Node {
    add(lhs, rhs.scaled(-1.0))
}

pub fn mult(lhs: Node, rhs: Node) -> Node {
    if let Some(k) = constant_value(&lhs) {
        return if k == 0.0 { lhs } else { rhs.scaled(k) };
    }
    if let Some(k) = constant_value(&rhs) {
        return if k == 0.0 { rhs } else { lhs.scaled(k) };
    }
    Node::Mult(Box::new(lhs), Box::new(rhs))
}

/// Quotient. A constant denominator becomes a scale of the numerator; an
/// exact zero denominator yields a zero leaf, matching the evaluation rule.
pub fn div(numerator: Node, denominator: Node) -> Node {
    if let Some(k) = constant_value(&denominator) {
        if k == 0.0 {
            return Node::zeros(numerator.dimension());
        }
        return numerator.scaled(1.0 / k);
    }
    Node::Div(Box::new(numerator), Box::new(denominator))
}

/// Absolute value, folded away when `space` proves a linear argument has a
/// single sign.
pub fn abs(arg: Node, space: &dyn VarSpace) -> Node {
    match arg {
        Node::Linear(leaf) => {
            let (lower, upper) = leaf.predict_bound(space);
            if lower >= 0.0 {
                Node::Linear(leaf)
            } else if upper <= 0.0 {
                Node::Linear(leaf).scaled(-1.0)
            } else {
                wrap_abs(Node::Linear(leaf))
            }
        }
        other => wrap_abs(other),
    }
}

fn wrap_abs(arg: Node) -> Node {
    Node::Abs {
        arg: Box::new(arg),
        negated: false,
    }
}

pub fn sqrt(arg: Node) -> Node {
    if let Some(k) = constant_value(&arg) {
        return Node::constant(arg.dimension(), k.sqrt());
    }
    Node::Sqrt {
        arg: Box::new(arg),
        negated: false,
    }
}

/// Rebuild a decoupled node through the simplifying constructors, re-applying
/// a recorded negation.
pub fn rebuild(parts: Decoupled, space: &dyn VarSpace) -> Node {
    let Decoupled {
        kind,
        negated,
        children,
    } = parts;
    let n = space.n_var();
    let mut children = children.into_iter();
    let node = match kind {
        NodeKind::Sum | NodeKind::Linear | NodeKind::Quadratic => sigma(n, children.collect()),
        NodeKind::Mult | NodeKind::Div => match (children.next(), children.next()) {
            (Some(lhs), Some(rhs)) if kind == NodeKind::Mult => mult(lhs, rhs),
            (Some(lhs), Some(rhs)) => div(lhs, rhs),
            (lhs, _) => lhs.unwrap_or_else(|| Node::zeros(n)),
        },
        NodeKind::Abs => children
            .next()
            .map_or_else(|| Node::zeros(n), |arg| abs(arg, space)),
        NodeKind::Sqrt => children.next().map_or_else(|| Node::zeros(n), sqrt),
    };
    if negated { node.scaled(-1.0) } else { node }
}

fn constant_value(node: &Node) -> Option<f64> {
    node.as_linear()
        .filter(|leaf| leaf.is_constant())
        .map(Linear::constant)
}
