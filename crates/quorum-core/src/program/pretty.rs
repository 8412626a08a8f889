//! Human-readable program listing.

use std::fmt::Write as _;

use super::{Program, ProgramConstraint};

const FLOAT_EQ_EPSILON: f64 = 1e-12;

struct RowLine {
    lhs: String,
    op: &'static str,
    rhs: String,
}

impl Program<'_> {
    /// Render the program: the mask stack, one line per constraint with its
    /// class and bounds, then the displays.
    pub fn pretty(&self) -> String {
        let mut out = String::new();
        let layers: Vec<String> = self
            .stack
            .layers()
            .iter()
            .map(|layer| format!("{}({} -> {})", layer.name(), layer.n_var_orig(), layer.n_var()))
            .collect();
        let _ = writeln!(out, "masks: {}", layers.join(" <- "));
        let _ = writeln!(out);
        let _ = writeln!(out, "s.t.");

        if self.constraints.is_empty() {
            let _ = writeln!(out, " (none)");
        }
        let rows: Vec<RowLine> = self
            .constraints
            .iter()
            .enumerate()
            .map(|(index, constraint)| render_row(index, constraint))
            .collect();
        let lhs_width = rows.iter().map(|row| row.lhs.len()).max().unwrap_or(0);
        for row in rows {
            let _ = writeln!(
                out,
                " {:lhs_width$} {:>2} {}",
                row.lhs,
                row.op,
                row.rhs,
                lhs_width = lhs_width
            );
        }

        if !self.displays.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "displays:");
            for (index, display) in self.displays.iter().enumerate() {
                let _ = writeln!(out, " d{index}: {display}");
            }
        }
        out
    }
}

fn render_row(index: usize, constraint: &ProgramConstraint) -> RowLine {
    let lhs = match &constraint.expr {
        Some(expr) => format!("c{index} [{}]: {expr}", constraint.class),
        None => format!("c{index} [{}]: relaxed", constraint.class),
    };
    let (lower, upper) = (constraint.lower, constraint.upper);
    if (lower - upper).abs() <= FLOAT_EQ_EPSILON {
        return RowLine {
            lhs,
            op: "=",
            rhs: format!("{upper}"),
        };
    }
    match (lower.is_finite(), upper.is_finite()) {
        (false, true) => RowLine {
            lhs,
            op: "<=",
            rhs: format!("{upper}"),
        },
        (true, false) => RowLine {
            lhs,
            op: ">=",
            rhs: format!("{lower}"),
        },
        (true, true) => RowLine {
            lhs,
            op: "in",
            rhs: format!("[{lower}, {upper}]"),
        },
        (false, false) => RowLine {
            lhs,
            op: "",
            rhs: "free".to_string(),
        },
    }
}
