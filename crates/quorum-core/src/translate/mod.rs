//! Lowering of parsed sources into expression trees.
//!
//! The [`Translator`] walks the syntax tree of each constraint and display
//! of a [`Problem`] and builds a tree in the free space of a fixing mask.
//! Every arithmetic step goes through the simplifying constructors, so fixed
//! choices and constant sub-expressions fold while the tree is built.

mod error;

use std::collections::{BTreeMap, BTreeSet};

use quorum_expr::builders::{abs, accumulate, add, div, mult, sigma, sqrt, sub};
use quorum_expr::{Linear, Node};
use quorum_lang::{BinaryOp, Domain, Expr, ExprKind, Index, Position};

use crate::config::CompileOptions;
use crate::mask::FixMask;
use crate::problem::{ConstraintSpec, Problem};

pub use error::TranslateError;

/// A lowered constraint. `expr` is `None` when the constraint was relaxed
/// because it references an excluded detail.
#[derive(Debug, Clone, PartialEq)]
pub struct Lowered {
    pub expr: Option<Node>,
    pub details: BTreeSet<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Aggregate {
    Sum,
    SumAll,
    Mean,
    MeanAll,
}

impl Aggregate {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "sum" => Some(Aggregate::Sum),
            "sum_all" => Some(Aggregate::SumAll),
            "mean" => Some(Aggregate::Mean),
            "mean_all" => Some(Aggregate::MeanAll),
            _ => None,
        }
    }
}

/// Lexical state of one lowering step.
#[derive(Debug, Clone)]
struct Scope<'p> {
    entry: &'p str,
    options: Vec<usize>,
    locals: BTreeMap<&'p str, usize>,
    relaxable: bool,
}

/// State accumulated over a whole entry.
#[derive(Debug, Default)]
struct Trace<'p> {
    details: BTreeSet<String>,
    blacklisted: bool,
    active_fragments: Vec<&'p str>,
}

pub struct Translator<'p> {
    problem: &'p Problem,
    mask: &'p FixMask,
    relax_blacklisted: bool,
}

impl<'p> Translator<'p> {
    pub fn new(
        problem: &'p Problem,
        mask: &'p FixMask,
        options: &CompileOptions,
    ) -> Result<Self, TranslateError> {
        if mask.n_var_orig() != problem.dim() {
            return Err(TranslateError::DimensionMismatch {
                expected: problem.dim(),
                found: mask.n_var_orig(),
            });
        }
        Ok(Self {
            problem,
            mask,
            relax_blacklisted: options.relax_blacklisted_details,
        })
    }

    // ── Entries ─────────────────────────────────────────────

    pub fn translate_constraints(&self) -> Result<Vec<Lowered>, TranslateError> {
        self.problem
            .constraints()
            .iter()
            .map(|spec| self.translate_constraint(spec))
            .collect()
    }

    pub fn translate_constraint(&self, spec: &'p ConstraintSpec) -> Result<Lowered, TranslateError> {
        let scope = self.root_scope(spec.name(), spec.is_relaxable());
        let mut trace = Trace::default();
        let node = self.lower(spec.expr(), &scope, &mut trace)?;
        let expr = if trace.blacklisted && spec.is_relaxable() {
            tracing::debug!(
                component = "translate",
                operation = "translate_constraint",
                status = "relaxed",
                constraint = spec.name(),
                "Relaxed constraint referencing an excluded detail"
            );
            None
        } else {
            Some(node)
        };
        Ok(Lowered {
            expr,
            details: trace.details,
        })
    }

    pub fn translate_displays(&self) -> Result<Vec<Node>, TranslateError> {
        self.problem
            .displays()
            .iter()
            .map(|spec| {
                let scope = self.root_scope(spec.name(), false);
                self.lower(spec.expr(), &scope, &mut Trace::default())
            })
            .collect()
    }

    /// `Σ |x_i - row_i|`, which is at least 1 for every selection other
    /// than `row` itself.
    pub fn translate_exclusion(&self, row: &[f64]) -> Node {
        row.iter().enumerate().fold(None, |acc, (i, &value)| {
            let distance = sub(self.option_leaf(i), Node::constant(self.mask.n_var(), value));
            Some(accumulate(acc, abs(distance, self.mask)))
        })
        .unwrap_or_else(|| Node::zeros(self.mask.n_var()))
    }

    fn root_scope(&self, entry: &'p str, relaxable: bool) -> Scope<'p> {
        Scope {
            entry,
            options: (0..self.problem.dim()).collect(),
            locals: BTreeMap::new(),
            relaxable,
        }
    }

    // ── Lowering ────────────────────────────────────────────

    fn lower(
        &self,
        expr: &'p Expr,
        scope: &Scope<'p>,
        trace: &mut Trace<'p>,
    ) -> Result<Node, TranslateError> {
        let n = self.mask.n_var();
        match &expr.kind {
            ExprKind::Number(value) => Ok(Node::constant(n, *value)),
            ExprKind::Variable { name, index } => {
                if name != "x" {
                    return Err(TranslateError::Name {
                        entry: scope.entry.to_string(),
                        name: name.clone(),
                        position: expr.position,
                    });
                }
                match index {
                    Some(index) => Ok(self.option_leaf(self.resolve(index, scope, expr.position)?)),
                    None => {
                        let mut coefficients = vec![0.0; self.problem.dim()];
                        for &i in &scope.options {
                            coefficients[i] = 1.0;
                        }
                        Ok(self.leaf(&coefficients))
                    }
                }
            }
            ExprKind::Detail { name, index } => {
                trace.details.insert(name.clone());
                if self.relax_blacklisted && scope.relaxable && self.problem.is_detail_excluded(name)
                {
                    tracing::debug!(
                        component = "translate",
                        operation = "lower",
                        status = "blacklisted",
                        entry = scope.entry,
                        detail = name.as_str(),
                        "Excluded detail contributes zero"
                    );
                    trace.blacklisted = true;
                    return Ok(Node::zeros(n));
                }
                let choices = self.problem.choices();
                match index {
                    Some(index) => {
                        let i = self.resolve(index, scope, expr.position)?;
                        Ok(Node::constant(n, choices[i].detail(name)))
                    }
                    None => {
                        let mut coefficients = vec![0.0; self.problem.dim()];
                        for &i in &scope.options {
                            coefficients[i] = choices[i].detail(name);
                        }
                        Ok(self.leaf(&coefficients))
                    }
                }
            }
            ExprKind::Fragment(name) => self.lower_fragment(name, expr.position, scope, trace),
            ExprKind::Call { function, args } => {
                let is_abs = match function.as_str() {
                    "abs" => true,
                    "sqrt" => false,
                    _ => {
                        return Err(self.key_error(scope, "unknown function", function, expr.position));
                    }
                };
                let [arg] = args.as_slice() else {
                    return Err(TranslateError::Type {
                        entry: scope.entry.to_string(),
                        message: format!("{function}() expects exactly 1 argument"),
                        position: expr.position,
                    });
                };
                let arg = self.lower(arg, scope, trace)?;
                Ok(if is_abs { abs(arg, self.mask) } else { sqrt(arg) })
            }
            ExprKind::Aggregate {
                function,
                local,
                domain,
                body,
            } => {
                let aggregate = Aggregate::from_name(function).ok_or_else(|| {
                    self.key_error(scope, "unknown aggregate", function, expr.position)
                })?;
                let subset = match domain {
                    Domain::Variable(name) if name == "x" => scope.options.clone(),
                    Domain::Variable(name) => {
                        return Err(TranslateError::Name {
                            entry: scope.entry.to_string(),
                            name: name.clone(),
                            position: expr.position,
                        });
                    }
                    Domain::Detail(detail) => self.filter_options(&scope.options, detail),
                };
                let mut values = Vec::with_capacity(subset.len());
                for &i in &subset {
                    let mut inner = scope.clone();
                    inner.locals.insert(local.as_str(), i);
                    values.push((i, self.lower(body, &inner, trace)?));
                }
                Ok(self.combine(aggregate, values))
            }
            ExprKind::Filter { detail, body } => {
                let mut inner = scope.clone();
                inner.options = self.filter_options(&scope.options, detail);
                self.lower(body, &inner, trace)
            }
            ExprKind::Binary { op, lhs, rhs } => {
                let lhs = self.lower(lhs, scope, trace)?;
                let rhs = self.lower(rhs, scope, trace)?;
                Ok(match op {
                    BinaryOp::Add => add(lhs, rhs),
                    BinaryOp::Sub => sub(lhs, rhs),
                    BinaryOp::Mul => mult(lhs, rhs),
                    BinaryOp::Div => div(lhs, rhs),
                })
            }
        }
    }

    fn lower_fragment(
        &self,
        name: &str,
        position: Position,
        scope: &Scope<'p>,
        trace: &mut Trace<'p>,
    ) -> Result<Node, TranslateError> {
        let fragment = self
            .problem
            .fragment(name)
            .ok_or_else(|| self.key_error(scope, "unknown fragment", name, position))?;
        if trace.active_fragments.contains(&fragment.name()) {
            return Err(TranslateError::Recursion {
                entry: scope.entry.to_string(),
                fragment: name.to_string(),
                position,
            });
        }
        let mut inner = scope.clone();
        inner.entry = fragment.name();
        trace.active_fragments.push(fragment.name());
        let node = self.lower(fragment.expr(), &inner, trace);
        trace.active_fragments.pop();
        node
    }

    fn combine(&self, aggregate: Aggregate, values: Vec<(usize, Node)>) -> Node {
        let n = self.mask.n_var();
        if values.is_empty() {
            return Node::zeros(n);
        }
        match aggregate {
            Aggregate::Sum => self.weighted_sum(values),
            Aggregate::SumAll => sigma(n, values.into_iter().map(|(_, value)| value).collect()),
            Aggregate::Mean => {
                let count = sigma(n, values.iter().map(|&(i, _)| self.option_leaf(i)).collect());
                div(self.weighted_sum(values), count)
            }
            Aggregate::MeanAll => {
                let k = 1.0 / values.len() as f64;
                sigma(n, values.into_iter().map(|(_, value)| value).collect()).scaled(k)
            }
        }
    }

    /// `Σ value_i · x_i`.
    fn weighted_sum(&self, values: Vec<(usize, Node)>) -> Node {
        values
            .into_iter()
            .fold(None, |acc, (i, value)| {
                Some(accumulate(acc, mult(value, self.option_leaf(i))))
            })
            .unwrap_or_else(|| Node::zeros(self.mask.n_var()))
    }

    // ── Helpers ─────────────────────────────────────────────

    /// Options of `options` whose detail is not numerically zero.
    fn filter_options(&self, options: &[usize], detail: &str) -> Vec<usize> {
        let choices = self.problem.choices();
        options
            .iter()
            .copied()
            .filter(|&i| choices[i].detail(detail).abs() > f64::EPSILON)
            .collect()
    }

    fn resolve(
        &self,
        index: &Index,
        scope: &Scope<'p>,
        position: Position,
    ) -> Result<usize, TranslateError> {
        let i = match index {
            Index::Integer(i) => *i,
            Index::Local(name) => scope
                .locals
                .get(name.as_str())
                .copied()
                .ok_or_else(|| self.key_error(scope, "use of undefined local", name, position))?,
            Index::OptionName(name) => self
                .problem
                .choice_index(name)
                .ok_or_else(|| self.key_error(scope, "use of undefined option", name, position))?,
        };
        if i >= self.problem.dim() {
            return Err(TranslateError::Index {
                entry: scope.entry.to_string(),
                index: i,
                dim: self.problem.dim(),
                position,
            });
        }
        Ok(i)
    }

    fn key_error(
        &self,
        scope: &Scope<'p>,
        message: &'static str,
        key: &str,
        position: Position,
    ) -> TranslateError {
        TranslateError::Key {
            entry: scope.entry.to_string(),
            message,
            key: key.to_string(),
            position,
        }
    }

    fn option_leaf(&self, orig: usize) -> Node {
        let mut coefficients = vec![0.0; self.problem.dim()];
        coefficients[orig] = 1.0;
        self.leaf(&coefficients)
    }

    /// Leaf in the free space from original-space coefficients; fixed
    /// choices fold into the constant.
    fn leaf(&self, coefficients: &[f64]) -> Node {
        let mut reduced = vec![0.0; self.mask.n_var()];
        let mut constant = 0.0;
        for (orig, &a) in coefficients.iter().enumerate() {
            match self.mask.mask_id(orig) {
                Some(id) => reduced[id] = a,
                None => constant += a * self.mask.values()[orig],
            }
        }
        Node::Linear(Linear::new(reduced, constant))
    }
}
