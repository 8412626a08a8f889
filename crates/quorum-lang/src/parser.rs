//! Source text to [`Expr`] / [`ConstraintAst`].
//!
//! The grammar lives in `grammar.pest`. Constraint sources wrap the
//! expression in brackets with numeric bounds on either side:
//!
//! ```text
//! 1 <= [sum[i in x]{$cost[i]}] <= 10
//! [x['salad'] + x['soup']] = 1
//! ```

use pest::Parser;
use pest::error::LineColLocation;
use pest::iterators::{Pair, Pairs};
use pest_derive::Parser;

use crate::ast::{BinaryOp, ConstraintAst, Domain, Expr, ExprKind, Index, Position};
use crate::error::SyntaxError;

#[derive(Parser)]
#[grammar = "../grammar.pest"]
pub struct ExpressionParser;

/// Parse a bare expression (fragment or display source).
pub fn parse_expression(source: &str) -> Result<Expr, SyntaxError> {
    let mut pairs = ExpressionParser::parse(Rule::expression_source, source).map_err(from_pest)?;
    let root = next_pair(&mut pairs, "expression", Position::default())?;
    let position = position_of(&root);
    let mut inner = root.into_inner();
    build_expr(next_pair(&mut inner, "expression", position)?)
}

/// Parse a bounded constraint source.
pub fn parse_constraint(source: &str) -> Result<ConstraintAst, SyntaxError> {
    let mut pairs = ExpressionParser::parse(Rule::constraint_source, source).map_err(from_pest)?;
    let root = next_pair(&mut pairs, "constraint", Position::default())?;

    let mut bounds = Bounds::default();
    let mut expr = None;
    for pair in root.into_inner() {
        match pair.as_rule() {
            Rule::leading_bound => {
                let position = position_of(&pair);
                let mut it = pair.into_inner();
                let value = parse_number(next_pair(&mut it, "bound value", position)?)?;
                let relation = next_pair(&mut it, "relation", position)?;
                // `v <= [e]` bounds the expression from below.
                let sense = match relation.as_str() {
                    "<=" => Sense::Lower,
                    ">=" => Sense::Upper,
                    _ => Sense::Equal,
                };
                bounds.apply(sense, value, position)?;
            }
            Rule::trailing_bound => {
                let position = position_of(&pair);
                let mut it = pair.into_inner();
                let relation = next_pair(&mut it, "relation", position)?;
                let sense = match relation.as_str() {
                    ">=" => Sense::Lower,
                    "<=" => Sense::Upper,
                    _ => Sense::Equal,
                };
                let value = parse_number(next_pair(&mut it, "bound value", position)?)?;
                bounds.apply(sense, value, position)?;
            }
            Rule::expr => expr = Some(build_expr(pair)?),
            _ => {}
        }
    }

    let expr = expr.ok_or_else(|| malformed("constraint expression", Position::default()))?;
    if bounds.lower.is_none() && bounds.upper.is_none() {
        return Err(SyntaxError::NoBound);
    }
    Ok(ConstraintAst {
        expr,
        lower: bounds.lower,
        upper: bounds.upper,
    })
}

#[derive(Clone, Copy)]
enum Sense {
    Lower,
    Upper,
    Equal,
}

#[derive(Default)]
struct Bounds {
    lower: Option<f64>,
    upper: Option<f64>,
}

impl Bounds {
    fn apply(&mut self, sense: Sense, value: f64, position: Position) -> Result<(), SyntaxError> {
        let duplicate = |message| SyntaxError::DuplicateBound { message, position };
        match sense {
            Sense::Lower => {
                if self.lower.is_some() {
                    return Err(duplicate("duplicate lower bound"));
                }
                self.lower = Some(value);
            }
            Sense::Upper => {
                if self.upper.is_some() {
                    return Err(duplicate("duplicate upper bound"));
                }
                self.upper = Some(value);
            }
            Sense::Equal => {
                if self.lower.is_some() || self.upper.is_some() {
                    return Err(duplicate("equality mixed with inequality"));
                }
                self.lower = Some(value);
                self.upper = Some(value);
            }
        }
        Ok(())
    }
}

fn build_expr(pair: Pair<'_, Rule>) -> Result<Expr, SyntaxError> {
    let position = position_of(&pair);
    match pair.as_rule() {
        Rule::expr => {
            let mut it = pair.into_inner();
            build_expr(next_pair(&mut it, "expression", position)?)
        }
        Rule::add_expr | Rule::mul_expr => {
            let mut it = pair.into_inner();
            let mut node = build_expr(next_pair(&mut it, "operand", position)?)?;
            while let Some(op) = it.next() {
                let op = match op.as_str() {
                    "+" => BinaryOp::Add,
                    "-" => BinaryOp::Sub,
                    "*" => BinaryOp::Mul,
                    _ => BinaryOp::Div,
                };
                let rhs = build_expr(next_pair(&mut it, "operand", position)?)?;
                node = Expr::new(
                    ExprKind::Binary {
                        op,
                        lhs: Box::new(node),
                        rhs: Box::new(rhs),
                    },
                    position,
                );
            }
            Ok(node)
        }
        Rule::number => Ok(Expr::new(ExprKind::Number(parse_number(pair)?), position)),
        Rule::variable => {
            let mut it = pair.into_inner();
            let name = next_pair(&mut it, "variable name", position)?.as_str().to_string();
            let index = it.next().map(build_index).transpose()?;
            Ok(Expr::new(ExprKind::Variable { name, index }, position))
        }
        Rule::detail => {
            let mut it = pair.into_inner();
            let name = detail_name(next_pair(&mut it, "detail name", position)?, position)?;
            let index = it.next().map(build_index).transpose()?;
            Ok(Expr::new(ExprKind::Detail { name, index }, position))
        }
        Rule::fragment => {
            let mut it = pair.into_inner();
            let name = next_pair(&mut it, "fragment name", position)?.as_str().to_string();
            Ok(Expr::new(ExprKind::Fragment(name), position))
        }
        Rule::call => {
            let mut it = pair.into_inner();
            let function = next_pair(&mut it, "function name", position)?.as_str().to_string();
            let args = it.map(build_expr).collect::<Result<Vec<_>, _>>()?;
            Ok(Expr::new(ExprKind::Call { function, args }, position))
        }
        Rule::aggregate => {
            let mut it = pair.into_inner();
            let function = next_pair(&mut it, "aggregate name", position)?.as_str().to_string();
            let local = next_pair(&mut it, "loop variable", position)?.as_str().to_string();
            let domain = build_domain(next_pair(&mut it, "aggregate domain", position)?)?;
            let body = build_expr(next_pair(&mut it, "aggregate body", position)?)?;
            Ok(Expr::new(
                ExprKind::Aggregate {
                    function,
                    local,
                    domain,
                    body: Box::new(body),
                },
                position,
            ))
        }
        Rule::filter => {
            let mut it = pair.into_inner();
            let detail = detail_name(next_pair(&mut it, "filter detail", position)?, position)?;
            let body = build_expr(next_pair(&mut it, "filter body", position)?)?;
            Ok(Expr::new(
                ExprKind::Filter {
                    detail,
                    body: Box::new(body),
                },
                position,
            ))
        }
        _ => Err(malformed("term", position)),
    }
}

fn build_index(pair: Pair<'_, Rule>) -> Result<Index, SyntaxError> {
    let position = position_of(&pair);
    let mut it = pair.into_inner();
    let inner = next_pair(&mut it, "index", position)?;
    match inner.as_rule() {
        Rule::integer => inner
            .as_str()
            .parse()
            .map(Index::Integer)
            .map_err(|_| SyntaxError::InvalidNumber {
                text: inner.as_str().to_string(),
                position,
            }),
        Rule::quoted => {
            let text = inner.into_inner().next().map_or("", |p| p.as_str());
            Ok(Index::OptionName(text.to_string()))
        }
        _ => Ok(Index::Local(inner.as_str().to_string())),
    }
}

fn build_domain(pair: Pair<'_, Rule>) -> Result<Domain, SyntaxError> {
    let position = position_of(&pair);
    let mut it = pair.into_inner();
    let inner = next_pair(&mut it, "aggregate domain", position)?;
    match inner.as_rule() {
        Rule::detail_name => Ok(Domain::Detail(detail_name(inner, position)?)),
        _ => Ok(Domain::Variable(inner.as_str().to_string())),
    }
}

fn detail_name(pair: Pair<'_, Rule>, position: Position) -> Result<String, SyntaxError> {
    let mut it = pair.into_inner();
    Ok(next_pair(&mut it, "detail name", position)?.as_str().to_string())
}

fn parse_number(pair: Pair<'_, Rule>) -> Result<f64, SyntaxError> {
    pair.as_str()
        .parse()
        .map_err(|_| SyntaxError::InvalidNumber {
            text: pair.as_str().to_string(),
            position: position_of(&pair),
        })
}

fn next_pair<'i>(
    pairs: &mut Pairs<'i, Rule>,
    what: &'static str,
    position: Position,
) -> Result<Pair<'i, Rule>, SyntaxError> {
    pairs.next().ok_or_else(|| malformed(what, position))
}

fn malformed(what: &'static str, position: Position) -> SyntaxError {
    SyntaxError::Parse {
        message: format!("malformed {what}"),
        position,
    }
}

fn position_of(pair: &Pair<'_, Rule>) -> Position {
    let (line, column) = pair.as_span().start_pos().line_col();
    Position { line, column }
}

fn from_pest(err: pest::error::Error<Rule>) -> SyntaxError {
    let (line, column) = match err.line_col {
        LineColLocation::Pos(pos) => pos,
        LineColLocation::Span(start, _) => start,
    };
    SyntaxError::Parse {
        message: err.to_string(),
        position: Position { line, column },
    }
}
