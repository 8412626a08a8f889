//! Constraint classes.

use serde::Serialize;

use quorum_expr::{Node, VarSpace};

use super::Program;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintClass {
    /// Relaxed away; no tree.
    Void,
    Linear,
    /// Quotient of linear leaves with a one-signed denominator.
    Frac1,
    Quad,
    Others,
}

impl ConstraintClass {
    pub fn as_str(self) -> &'static str {
        match self {
            ConstraintClass::Void => "void",
            ConstraintClass::Linear => "linear",
            ConstraintClass::Frac1 => "frac1",
            ConstraintClass::Quad => "quad",
            ConstraintClass::Others => "others",
        }
    }
}

impl std::fmt::Display for ConstraintClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Class of a tree whose leaves live in `space`.
pub fn classify(expr: Option<&Node>, space: &dyn VarSpace) -> ConstraintClass {
    let Some(expr) = expr else {
        return ConstraintClass::Void;
    };
    if expr.is_linear() {
        return ConstraintClass::Linear;
    }
    if let Node::Div(_, den) = expr {
        if expr.is_fraction() {
            let (lower, upper) = den.predict_bound(space);
            if lower >= 0.0 || upper <= 0.0 {
                return ConstraintClass::Frac1;
            }
        }
    }
    if expr.is_quadratic() {
        return ConstraintClass::Quad;
    }
    ConstraintClass::Others
}

impl Program<'_> {
    /// Recompute every class against the outermost space.
    pub(super) fn reclassify(&mut self) {
        let stack = &self.stack;
        for constraint in &mut self.constraints {
            constraint.class = classify(constraint.expr.as_ref(), stack);
        }
    }
}
