//! Parser for the expression language used in constraint, display and
//! fragment sources.
//!
//! - [`ast`]: typed syntax tree with source positions
//! - [`parser`]: pest grammar and tree construction
//! - [`error`]: [`SyntaxError`]
//!
//! ```text
//! sum[i in $vegan]{$cost[i]} / 2 + abs(x['soup'] - @lunch)
//! 1 <= [mean[i in x]{$rating[i]}] <= 5
//! ```

pub mod ast;
pub mod error;
pub mod parser;

pub use ast::{BinaryOp, ConstraintAst, Domain, Expr, ExprKind, Index, Position};
pub use error::SyntaxError;
pub use parser::{parse_constraint, parse_expression};
