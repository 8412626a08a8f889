//! Variable spaces that expression leaves are dimensioned against.

/// Read-only view of a variable space: its dimension and per-variable bounds.
///
/// Expression trees never store the space they live in. Operations that need
/// bounds (bound prediction, `abs` folding, classification) receive it
/// explicitly.
pub trait VarSpace {
    fn n_var(&self) -> usize;

    fn lower_bound(&self, index: usize) -> f64;

    fn upper_bound(&self, index: usize) -> f64;

    /// True when every variable is bounded by `[0, 1]`.
    fn is_binary(&self) -> bool {
        (0..self.n_var()).all(|i| self.lower_bound(i) == 0.0 && self.upper_bound(i) == 1.0)
    }
}

impl<T: VarSpace + ?Sized> VarSpace for &T {
    fn n_var(&self) -> usize {
        (**self).n_var()
    }

    fn lower_bound(&self, index: usize) -> f64 {
        (**self).lower_bound(index)
    }

    fn upper_bound(&self, index: usize) -> f64 {
        (**self).upper_bound(index)
    }

    fn is_binary(&self) -> bool {
        (**self).is_binary()
    }
}

/// A space described by an explicit `(lower, upper)` pair per variable.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BoxSpace {
    bounds: Vec<(f64, f64)>,
}

impl BoxSpace {
    pub fn from_bounds(bounds: Vec<(f64, f64)>) -> Self {
        Self { bounds }
    }

    /// `n` variables bounded by `[0, 1]`.
    pub fn binary(n: usize) -> Self {
        Self {
            bounds: vec![(0.0, 1.0); n],
        }
    }

    /// `n` free variables.
    pub fn unbounded(n: usize) -> Self {
        Self {
            bounds: vec![(f64::NEG_INFINITY, f64::INFINITY); n],
        }
    }
}

impl VarSpace for BoxSpace {
    fn n_var(&self) -> usize {
        self.bounds.len()
    }

    fn lower_bound(&self, index: usize) -> f64 {
        self.bounds.get(index).map_or(f64::NEG_INFINITY, |b| b.0)
    }

    fn upper_bound(&self, index: usize) -> f64 {
        self.bounds.get(index).map_or(f64::INFINITY, |b| b.1)
    }
}
