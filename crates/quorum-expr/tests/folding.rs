#![allow(clippy::float_cmp)]

use proptest::prelude::*;
use quorum_expr::builders::{abs, add, div, mult, sqrt, sub};
use quorum_expr::{BoxSpace, Node};

#[derive(Debug, Clone)]
enum Literal {
    Number(f64),
    Add(Box<Literal>, Box<Literal>),
    Sub(Box<Literal>, Box<Literal>),
    Mul(Box<Literal>, Box<Literal>),
    Div(Box<Literal>, Box<Literal>),
    Abs(Box<Literal>),
    Sqrt(Box<Literal>),
}

fn literal() -> impl Strategy<Value = Literal> {
    let leaf = (-50.0f64..50.0).prop_map(Literal::Number);
    leaf.prop_recursive(5, 48, 2, |inner| {
        prop_oneof![
            (inner.clone(), inner.clone()).prop_map(|(a, b)| Literal::Add(Box::new(a), Box::new(b))),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| Literal::Sub(Box::new(a), Box::new(b))),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| Literal::Mul(Box::new(a), Box::new(b))),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| Literal::Div(Box::new(a), Box::new(b))),
            inner.clone().prop_map(|a| Literal::Abs(Box::new(a))),
            inner.prop_map(|a| Literal::Sqrt(Box::new(a))),
        ]
    })
}

fn lower(expr: &Literal, n: usize, space: &BoxSpace) -> Node {
    match expr {
        Literal::Number(v) => Node::constant(n, *v),
        Literal::Add(a, b) => add(lower(a, n, space), lower(b, n, space)),
        Literal::Sub(a, b) => sub(lower(a, n, space), lower(b, n, space)),
        Literal::Mul(a, b) => mult(lower(a, n, space), lower(b, n, space)),
        Literal::Div(a, b) => div(lower(a, n, space), lower(b, n, space)),
        Literal::Abs(a) => abs(lower(a, n, space), space),
        Literal::Sqrt(a) => sqrt(lower(a, n, space)),
    }
}

proptest! {
    #[test]
    fn literal_expressions_fold_to_one_constant_leaf(expr in literal()) {
        let space = BoxSpace::binary(3);
        let node = lower(&expr, 3, &space);
        prop_assert!(node.is_linear(), "not folded: {node:?}");
        let leaf = node.as_linear().unwrap();
        prop_assert!(leaf.coefficients().iter().all(|a| *a == 0.0));
        prop_assert_eq!(leaf.dimension(), 3);
    }
}

#[test]
fn nested_arithmetic_collapses_to_linear() {
    // ((x0 + 2) * 3 - x1) / 2 + abs(-4) stays linear
    let space = BoxSpace::binary(2);
    let x0 = Node::variable(2, 0);
    let x1 = Node::variable(2, 1);
    let inner = sub(mult(add(x0, Node::constant(2, 2.0)), Node::constant(2, 3.0)), x1);
    let node = add(
        div(inner, Node::constant(2, 2.0)),
        abs(Node::constant(2, -4.0), &space),
    );
    let leaf = node.as_linear().expect("linear");
    assert_eq!(leaf.coefficients(), &[1.5, -0.5]);
    assert_eq!(leaf.constant(), 7.0);
}
