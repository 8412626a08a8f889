//! Decision problem definition.
//!
//! A [`Problem`] holds the choices being decided on, named expression
//! fragments, bounded constraints, display expressions, and the scenarios
//! already explored. Sources are parsed when the entry is created so that a
//! problem never holds text the translator cannot read.

mod error;

use std::collections::{BTreeMap, BTreeSet};

use quorum_lang::{ConstraintAst, Expr, parse_constraint, parse_expression};

pub use error::ProblemError;

/// One selectable choice with its numeric details.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Choice {
    name: String,
    details: BTreeMap<String, f64>,
}

impl Choice {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            details: BTreeMap::new(),
        }
    }

    pub fn with_detail(mut self, name: impl Into<String>, value: f64) -> Self {
        self.details.insert(name.into(), value);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Value of a detail; details that are not set read as zero.
    pub fn detail(&self, name: &str) -> f64 {
        self.details.get(name).copied().unwrap_or(0.0)
    }

    pub fn details(&self) -> &BTreeMap<String, f64> {
        &self.details
    }
}

/// Named sub-expression referenced as `@name`.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    name: String,
    source: String,
    expr: Expr,
}

impl Fragment {
    pub fn parse(name: impl Into<String>, source: impl Into<String>) -> Result<Self, ProblemError> {
        let name = name.into();
        let source = source.into();
        let expr = parse_expression(&source).map_err(|error| ProblemError::Syntax {
            name: name.clone(),
            error,
        })?;
        Ok(Self { name, source, expr })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }
}

/// A bounded constraint source such as `1 <= [x['a'] + x['b']] <= 2`.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintSpec {
    name: String,
    source: String,
    expr: Expr,
    lower: f64,
    upper: f64,
    relaxable: bool,
}

impl ConstraintSpec {
    /// Parse a constraint. Missing bounds become infinite; constraints are
    /// relaxable unless stated otherwise.
    pub fn parse(name: impl Into<String>, source: impl Into<String>) -> Result<Self, ProblemError> {
        let name = name.into();
        let source = source.into();
        let ConstraintAst { expr, lower, upper } =
            parse_constraint(&source).map_err(|error| ProblemError::Syntax {
                name: name.clone(),
                error,
            })?;
        Ok(Self {
            name,
            source,
            expr,
            lower: lower.unwrap_or(f64::NEG_INFINITY),
            upper: upper.unwrap_or(f64::INFINITY),
            relaxable: true,
        })
    }

    pub fn with_relaxable(mut self, relaxable: bool) -> Self {
        self.relaxable = relaxable;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    pub fn lower(&self) -> f64 {
        self.lower
    }

    pub fn upper(&self) -> f64 {
        self.upper
    }

    pub fn is_relaxable(&self) -> bool {
        self.relaxable
    }
}

/// An expression reported alongside a solution.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplaySpec {
    name: String,
    source: String,
    expr: Expr,
}

impl DisplaySpec {
    pub fn parse(name: impl Into<String>, source: impl Into<String>) -> Result<Self, ProblemError> {
        let name = name.into();
        let source = source.into();
        let expr = parse_expression(&source).map_err(|error| ProblemError::Syntax {
            name: name.clone(),
            error,
        })?;
        Ok(Self { name, source, expr })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Problem {
    choices: Vec<Choice>,
    fragments: Vec<Fragment>,
    constraints: Vec<ConstraintSpec>,
    displays: Vec<DisplaySpec>,
    // One row per explored scenario, one column per choice.
    exclusions: Vec<Vec<f64>>,
    excluded_details: BTreeSet<String>,
}

impl Problem {
    // ── Construction ────────────────────────────────────────

    pub fn new(choices: Vec<Choice>) -> Result<Self, ProblemError> {
        if choices.is_empty() {
            return Err(ProblemError::NoChoices);
        }
        ensure_unique("choice", choices.iter().map(Choice::name))?;
        Ok(Self {
            choices,
            fragments: Vec::new(),
            constraints: Vec::new(),
            displays: Vec::new(),
            exclusions: Vec::new(),
            excluded_details: BTreeSet::new(),
        })
    }

    pub fn with_fragments(mut self, fragments: Vec<Fragment>) -> Result<Self, ProblemError> {
        ensure_unique("fragment", fragments.iter().map(Fragment::name))?;
        self.fragments = fragments;
        Ok(self)
    }

    pub fn with_constraints(mut self, constraints: Vec<ConstraintSpec>) -> Self {
        self.constraints = constraints;
        self
    }

    pub fn with_displays(mut self, displays: Vec<DisplaySpec>) -> Self {
        self.displays = displays;
        self
    }

    pub fn with_exclusions(mut self, rows: Vec<Vec<f64>>) -> Result<Self, ProblemError> {
        self.set_exclusions(rows)?;
        Ok(self)
    }

    /// Replace the explored scenarios. Every entry must be 0 or 1.
    pub fn set_exclusions(&mut self, rows: Vec<Vec<f64>>) -> Result<(), ProblemError> {
        let expected = self.dim();
        if let Some(row) = rows.iter().find(|row| row.len() != expected) {
            return Err(ProblemError::ExclusionWidth {
                expected,
                found: row.len(),
            });
        }
        for (row, values) in rows.iter().enumerate() {
            if let Some((column, &value)) = values
                .iter()
                .enumerate()
                .find(|(_, value)| **value != 0.0 && **value != 1.0)
            {
                return Err(ProblemError::ExclusionValue { row, column, value });
            }
        }
        self.exclusions = rows;
        Ok(())
    }

    /// Take the given choices out of scope and recompute the excluded
    /// details: those with a nonzero total over the excluded choices and a
    /// zero total over the remaining ones. An empty slice clears the set.
    pub fn exclude_options(&mut self, excluded: &[usize]) -> Result<(), ProblemError> {
        if let Some(&index) = excluded.iter().find(|&&i| i >= self.dim()) {
            return Err(ProblemError::InvalidChoice(index));
        }
        let excluded: BTreeSet<usize> = excluded.iter().copied().collect();

        let mut included_sums: BTreeMap<&str, f64> = BTreeMap::new();
        let mut excluded_sums: BTreeMap<&str, f64> = BTreeMap::new();
        for (index, choice) in self.choices.iter().enumerate() {
            let sums = if excluded.contains(&index) {
                &mut excluded_sums
            } else {
                &mut included_sums
            };
            for (name, value) in &choice.details {
                *sums.entry(name.as_str()).or_insert(0.0) += value.abs();
            }
        }

        let details: BTreeSet<String> = excluded_sums
            .iter()
            .filter(|&(name, sum)| {
                let included = included_sums.get(name).copied().unwrap_or(0.0);
                sum.abs() > f64::EPSILON && included.abs() < f64::EPSILON
            })
            .map(|(name, _)| (*name).to_string())
            .collect();

        tracing::debug!(
            component = "problem",
            operation = "exclude_options",
            status = "success",
            excluded_choices = excluded.len(),
            excluded_details = details.len(),
            "Recomputed excluded details"
        );
        self.excluded_details = details;
        Ok(())
    }

    // ── Accessors ───────────────────────────────────────────

    /// Number of choices, which is the dimension of the original space.
    pub fn dim(&self) -> usize {
        self.choices.len()
    }

    pub fn choices(&self) -> &[Choice] {
        &self.choices
    }

    pub fn choice_index(&self, name: &str) -> Option<usize> {
        self.choices.iter().position(|choice| choice.name == name)
    }

    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    pub fn fragment(&self, name: &str) -> Option<&Fragment> {
        self.fragments.iter().find(|fragment| fragment.name == name)
    }

    pub fn constraints(&self) -> &[ConstraintSpec] {
        &self.constraints
    }

    pub fn displays(&self) -> &[DisplaySpec] {
        &self.displays
    }

    pub fn exclusions(&self) -> &[Vec<f64>] {
        &self.exclusions
    }

    pub fn excluded_details(&self) -> &BTreeSet<String> {
        &self.excluded_details
    }

    pub fn is_detail_excluded(&self, name: &str) -> bool {
        self.excluded_details.contains(name)
    }
}

fn ensure_unique<'a>(
    kind: &'static str,
    names: impl Iterator<Item = &'a str>,
) -> Result<(), ProblemError> {
    let mut seen = BTreeSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(ProblemError::DuplicateName {
                kind,
                name: name.to_string(),
            });
        }
    }
    Ok(())
}
