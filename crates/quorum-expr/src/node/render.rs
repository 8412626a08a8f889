//! Infix rendering of expression trees.

use std::fmt;

use super::{Linear, Node, Quadratic};

fn write_term(f: &mut fmt::Formatter<'_>, first: &mut bool, coef: f64, body: &str) -> fmt::Result {
    if *first {
        if coef < 0.0 {
            f.write_str("-")?;
        }
    } else if coef < 0.0 {
        f.write_str(" - ")?;
    } else {
        f.write_str(" + ")?;
    }
    *first = false;
    let magnitude = coef.abs();
    if body.is_empty() {
        write!(f, "{magnitude}")
    } else if magnitude == 1.0 {
        f.write_str(body)
    } else {
        write!(f, "{magnitude} {body}")
    }
}

impl fmt::Display for Linear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (index, &coef) in self.coefficients().iter().enumerate() {
            if coef != 0.0 {
                write_term(f, &mut first, coef, &format!("x[{index}]"))?;
            }
        }
        if self.constant() != 0.0 || first {
            write_term(f, &mut first, self.constant(), "")?;
        }
        Ok(())
    }
}

impl fmt::Display for Quadratic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        let n = self.dimension();
        for i in 0..n {
            for j in 0..n {
                let coef = self.matrix()[(i, j)];
                if coef != 0.0 {
                    write_term(f, &mut first, coef, &format!("x[{i}] x[{j}]"))?;
                }
            }
        }
        for (index, &coef) in self.linear().iter().enumerate() {
            if coef != 0.0 {
                write_term(f, &mut first, coef, &format!("x[{index}]"))?;
            }
        }
        if self.constant() != 0.0 || first {
            write_term(f, &mut first, self.constant(), "")?;
        }
        Ok(())
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Linear(leaf) => write!(f, "({leaf})"),
            Node::Quadratic(leaf) => write!(f, "({leaf})"),
            Node::Sum(terms) => {
                f.write_str("(")?;
                for (i, term) in terms.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" + ")?;
                    }
                    write!(f, "{term}")?;
                }
                f.write_str(")")
            }
            Node::Mult(lhs, rhs) => write!(f, "{lhs} * {rhs}"),
            Node::Div(num, den) => write!(f, "{num} / {den}"),
            Node::Abs { arg, negated } => {
                if *negated {
                    f.write_str("-")?;
                }
                write!(f, "abs({arg})")
            }
            Node::Sqrt { arg, negated } => {
                if *negated {
                    f.write_str("-")?;
                }
                write!(f, "sqrt({arg})")
            }
        }
    }
}
