//! Program inspection and snapshot methods.

use serde::Serialize;

use super::Program;
use super::classify::ConstraintClass;

/// View of one mask layer in a program snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct LayerSnapshot {
    pub kind: &'static str,
    pub n_var: usize,
    pub n_var_orig: usize,
}

/// View of a constraint in a program snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct ConstraintSnapshot {
    pub index: usize,
    pub class: ConstraintClass,
    pub lower: f64,
    pub upper: f64,
    pub relaxable: bool,
    pub detail_set: Option<u32>,
    pub details: Vec<String>,
    /// Kind of the root node; `None` for a relaxed row.
    pub root: Option<&'static str>,
    pub node_count: usize,
}

/// View of a display in a program snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct DisplaySnapshot {
    pub index: usize,
    pub root: &'static str,
    pub node_count: usize,
}

/// A complete snapshot of a program.
#[derive(Debug, Clone, Serialize)]
pub struct ProgramSnapshot {
    pub n_var: usize,
    pub n_var_orig: usize,
    pub layers: Vec<LayerSnapshot>,
    pub constraints: Vec<ConstraintSnapshot>,
    pub displays: Vec<DisplaySnapshot>,
    pub bridge: Option<Vec<i64>>,
    pub exclusions_added: bool,
}

impl ProgramSnapshot {
    /// Render the snapshot as pretty-printed JSON. Infinite bounds are
    /// written as `null`.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl Program<'_> {
    /// Inspect the program structure and return a structured snapshot.
    pub fn inspect(&self) -> ProgramSnapshot {
        let layers = self
            .stack
            .layers()
            .iter()
            .map(|layer| LayerSnapshot {
                kind: layer.name(),
                n_var: layer.n_var(),
                n_var_orig: layer.n_var_orig(),
            })
            .collect();

        let constraints = self
            .constraints
            .iter()
            .enumerate()
            .map(|(index, constraint)| ConstraintSnapshot {
                index,
                class: constraint.class,
                lower: constraint.lower,
                upper: constraint.upper,
                relaxable: constraint.relaxable,
                detail_set: constraint.detail_set.map(|id| id.inner()),
                details: constraint
                    .detail_set
                    .and_then(|id| self.detail_set(id))
                    .map(|set| set.iter().cloned().collect())
                    .unwrap_or_default(),
                root: constraint.expr.as_ref().map(|e| e.kind().as_str()),
                node_count: constraint.expr.as_ref().map_or(0, |e| e.node_count()),
            })
            .collect();

        let displays = self
            .displays
            .iter()
            .enumerate()
            .map(|(index, display)| DisplaySnapshot {
                index,
                root: display.kind().as_str(),
                node_count: display.node_count(),
            })
            .collect();

        ProgramSnapshot {
            n_var: self.n_var(),
            n_var_orig: self.n_var_orig(None),
            layers,
            constraints,
            displays,
            bridge: self.bridge.as_ref().map(|bridge| bridge.to_raw()),
            exclusions_added: self.exclusions_added,
        }
    }
}
