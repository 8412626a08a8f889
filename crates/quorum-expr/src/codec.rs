//! Line-oriented text format for expression trees.
//!
//! A node is written as its integer type tag on one line followed by a
//! variant payload:
//!
//! | tag | variant | payload |
//! |-----|---------|---------|
//! | 0 | Sum | term count, then each term |
//! | 1 | Mult | both factors |
//! | 2 | Div | numerator, denominator |
//! | 3 | Abs | negation flag (0/1), argument |
//! | 4 | Linear | coefficients and constant, space separated |
//! | 5 | Sqrt | negation flag (0/1), argument |
//!
//! Quadratic leaves only exist while products are being reformulated and
//! have no text form. Reading is whitespace-token based.

use std::fmt::Write;
use std::str::SplitAsciiWhitespace;

use crate::error::CodecError;
use crate::node::{Linear, Node, NodeKind};

/// Whitespace token reader over serialized text.
pub struct Tokens<'a> {
    inner: SplitAsciiWhitespace<'a>,
}

impl<'a> Tokens<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            inner: text.split_ascii_whitespace(),
        }
    }

    pub fn next_token(&mut self, expected: &'static str) -> Result<&'a str, CodecError> {
        self.inner
            .next()
            .ok_or(CodecError::UnexpectedEnd { expected })
    }

    pub fn next_f64(&mut self, expected: &'static str) -> Result<f64, CodecError> {
        let token = self.next_token(expected)?;
        token.parse().map_err(|_| invalid(token, expected))
    }

    pub fn next_usize(&mut self, expected: &'static str) -> Result<usize, CodecError> {
        let token = self.next_token(expected)?;
        token.parse().map_err(|_| invalid(token, expected))
    }

    pub fn next_i64(&mut self, expected: &'static str) -> Result<i64, CodecError> {
        let token = self.next_token(expected)?;
        token.parse().map_err(|_| invalid(token, expected))
    }

    /// A `0`/`1` flag.
    pub fn next_flag(&mut self, expected: &'static str) -> Result<bool, CodecError> {
        match self.next_token(expected)? {
            "0" => Ok(false),
            "1" => Ok(true),
            token => Err(invalid(token, expected)),
        }
    }

    /// True when no tokens remain.
    pub fn is_empty(&self) -> bool {
        self.inner.clone().next().is_none()
    }
}

fn invalid(token: &str, expected: &'static str) -> CodecError {
    CodecError::InvalidToken {
        token: token.to_string(),
        expected,
    }
}

impl Node {
    /// Append the text form of the tree to `out`.
    pub fn save(&self, out: &mut String) -> Result<(), CodecError> {
        let _ = writeln!(out, "{}", self.kind().tag());
        match self {
            Node::Linear(leaf) => {
                write_linear(out, leaf);
                Ok(())
            }
            Node::Quadratic(_) => Err(CodecError::Unserializable(NodeKind::Quadratic)),
            Node::Sum(terms) => {
                let _ = writeln!(out, "{}", terms.len());
                terms.iter().try_for_each(|term| term.save(out))
            }
            Node::Mult(lhs, rhs) | Node::Div(lhs, rhs) => {
                lhs.save(out)?;
                rhs.save(out)
            }
            Node::Abs { arg, negated } | Node::Sqrt { arg, negated } => {
                let _ = writeln!(out, "{}", u8::from(*negated));
                arg.save(out)
            }
        }
    }

    /// Read a tree whose linear leaves have `n_var` coefficients.
    pub fn load(tokens: &mut Tokens<'_>, n_var: usize) -> Result<Node, CodecError> {
        let tag = tokens.next_i64("node type tag")?;
        Self::load_with_tag(tag, tokens, n_var)
    }

    /// Read the payload of a node whose tag has already been consumed.
    pub fn load_with_tag(tag: i64, tokens: &mut Tokens<'_>, n_var: usize) -> Result<Node, CodecError> {
        let kind = NodeKind::from_tag(tag).ok_or(CodecError::UnknownTag(tag))?;
        match kind {
            NodeKind::Linear => {
                let mut coefficients = Vec::with_capacity(n_var);
                for _ in 0..n_var {
                    coefficients.push(tokens.next_f64("linear coefficient")?);
                }
                let constant = tokens.next_f64("linear constant")?;
                Ok(Node::Linear(Linear::new(coefficients, constant)))
            }
            NodeKind::Quadratic => Err(CodecError::Unserializable(NodeKind::Quadratic)),
            NodeKind::Sum => {
                let count = tokens.next_usize("sum term count")?;
                let mut terms = Vec::with_capacity(count);
                for _ in 0..count {
                    terms.push(Self::load(tokens, n_var)?);
                }
                Ok(Node::Sum(terms))
            }
            NodeKind::Mult => {
                let lhs = Self::load(tokens, n_var)?;
                let rhs = Self::load(tokens, n_var)?;
                Ok(Node::Mult(Box::new(lhs), Box::new(rhs)))
            }
            NodeKind::Div => {
                let num = Self::load(tokens, n_var)?;
                let den = Self::load(tokens, n_var)?;
                Ok(Node::Div(Box::new(num), Box::new(den)))
            }
            NodeKind::Abs => {
                let negated = tokens.next_flag("abs negation flag")?;
                let arg = Box::new(Self::load(tokens, n_var)?);
                Ok(Node::Abs { arg, negated })
            }
            NodeKind::Sqrt => {
                let negated = tokens.next_flag("sqrt negation flag")?;
                let arg = Box::new(Self::load(tokens, n_var)?);
                Ok(Node::Sqrt { arg, negated })
            }
        }
    }
}

fn write_linear(out: &mut String, leaf: &Linear) {
    for coef in leaf.coefficients() {
        let _ = write!(out, "{coef} ");
    }
    let _ = writeln!(out, "{}", leaf.constant());
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::node::Quadratic;

    fn sample_tree() -> Node {
        Node::Sum(vec![
            Node::Linear(Linear::new(vec![0.5, -2.0], 1.25)),
            Node::Mult(
                Box::new(Node::variable(2, 0)),
                Box::new(Node::Sqrt {
                    arg: Box::new(Node::variable(2, 1)),
                    negated: true,
                }),
            ),
            Node::Div(
                Box::new(Node::Abs {
                    arg: Box::new(Node::Linear(Linear::new(vec![1.0, -1.0], 0.0))),
                    negated: false,
                }),
                Box::new(Node::Linear(Linear::new(vec![0.0, 3.0], 1e-7))),
            ),
        ])
    }

    #[test]
    fn linear_layout_is_one_line() {
        let mut out = String::new();
        Node::Linear(Linear::new(vec![1.0, 0.5], -3.0))
            .save(&mut out)
            .unwrap();
        assert_eq!(out, "4\n1 0.5 -3\n");
    }

    #[test]
    fn tree_round_trips() {
        let tree = sample_tree();
        let mut out = String::new();
        tree.save(&mut out).unwrap();

        let mut tokens = Tokens::new(&out);
        let loaded = Node::load(&mut tokens, 2).unwrap();
        assert!(tokens.is_empty());
        assert!(loaded.is_similar(&tree, 0.0));
        assert_eq!(loaded, tree);
    }

    #[test]
    fn infinite_constants_round_trip() {
        let tree = Node::constant(1, f64::INFINITY);
        let mut out = String::new();
        tree.save(&mut out).unwrap();
        let loaded = Node::load(&mut Tokens::new(&out), 1).unwrap();
        assert_eq!(loaded.evaluate(&[0.0]), f64::INFINITY);
    }

    #[test]
    fn quadratic_cannot_be_saved() {
        let mut out = String::new();
        let err = Node::Quadratic(Quadratic::zeros(2)).save(&mut out).unwrap_err();
        assert_eq!(err, CodecError::Unserializable(NodeKind::Quadratic));
    }

    #[test]
    fn unknown_tag_is_rejected() {
        let err = Node::load(&mut Tokens::new("9\n"), 1).unwrap_err();
        assert_eq!(err, CodecError::UnknownTag(9));
    }

    #[test]
    fn truncated_input_reports_missing_field() {
        let err = Node::load(&mut Tokens::new("4\n1 2"), 2).unwrap_err();
        assert_eq!(
            err,
            CodecError::UnexpectedEnd {
                expected: "linear constant"
            }
        );
    }

    #[test]
    fn bad_flag_is_rejected() {
        let err = Node::load(&mut Tokens::new("3\n2\n4\n1 0\n"), 1).unwrap_err();
        assert_eq!(err.code(), "CODEC_INVALID_TOKEN");
    }
}
