//! Compilation options for building programs from a problem.

use serde::{Deserialize, Serialize};

/// Default slack on McCormick rows.
pub const DEFAULT_MCCORMICK_TOLERANCE: f64 = f64::EPSILON;

/// Default tolerance used when comparing programs.
pub const DEFAULT_SIMILARITY_EPSILON: f64 = f64::EPSILON;

/// Options controlling how a problem is lowered into a program.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileOptions {
    /// Append one exclusion row per explored scenario at construction.
    pub include_exclusions: bool,
    /// Drop relaxable constraints that reference an excluded detail.
    pub relax_blacklisted_details: bool,
    /// Slack added to each McCormick row.
    pub mccormick_tolerance: f64,
    /// Tolerance for [`crate::Program::is_similar`].
    pub similarity_epsilon: f64,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            include_exclusions: true,
            relax_blacklisted_details: true,
            mccormick_tolerance: DEFAULT_MCCORMICK_TOLERANCE,
            similarity_epsilon: DEFAULT_SIMILARITY_EPSILON,
        }
    }
}

impl CompileOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_exclusions(mut self, enabled: bool) -> Self {
        self.include_exclusions = enabled;
        self
    }

    pub fn with_relax_blacklisted_details(mut self, enabled: bool) -> Self {
        self.relax_blacklisted_details = enabled;
        self
    }

    pub fn with_mccormick_tolerance(mut self, tol: f64) -> Self {
        self.mccormick_tolerance = tol;
        self
    }

    pub fn with_similarity_epsilon(mut self, epsilon: f64) -> Self {
        self.similarity_epsilon = epsilon;
        self
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn defaults_include_exclusions_and_relaxation() {
        let options = CompileOptions::new();
        assert!(options.include_exclusions);
        assert!(options.relax_blacklisted_details);
        assert_eq!(options.mccormick_tolerance, f64::EPSILON);
    }

    #[test]
    fn builder_overrides_fields() {
        let options = CompileOptions::new()
            .with_exclusions(false)
            .with_relax_blacklisted_details(false)
            .with_mccormick_tolerance(1e-9)
            .with_similarity_epsilon(1e-6);
        assert!(!options.include_exclusions);
        assert!(!options.relax_blacklisted_details);
        assert_eq!(options.mccormick_tolerance, 1e-9);
        assert_eq!(options.similarity_epsilon, 1e-6);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let options: CompileOptions =
            serde_json::from_str(r#"{"include_exclusions": false}"#).unwrap();
        assert!(!options.include_exclusions);
        assert!(options.relax_blacklisted_details);

        let json = serde_json::to_string(&options).unwrap();
        let back: CompileOptions = serde_json::from_str(&json).unwrap();
        assert_eq!(back, options);
    }
}
