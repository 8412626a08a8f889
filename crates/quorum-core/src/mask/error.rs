//! Mask construction and transform errors.

use quorum_expr::NodeKind;

#[derive(Debug, Clone, PartialEq)]
pub enum MaskError {
    /// Variable index outside the original space.
    IndexOutOfRange { index: usize, n_var: usize },
    /// The variable is already fixed to another value.
    AlreadyFixed { index: usize, value: f64 },
    /// The fixing value lies outside the variable bounds.
    ValueOutOfBounds {
        index: usize,
        value: f64,
        lower: f64,
        upper: f64,
    },
    /// Lower bound above upper bound.
    InvalidBounds { index: usize, lower: f64, upper: f64 },
    /// A variable with equal bounds cannot be freed.
    DegenerateBounds { index: usize },
    /// The layer cannot rewrite this kind of leaf.
    UnsupportedLeaf { mask: &'static str, kind: NodeKind },
    /// A vector or leaf has the wrong length for the space.
    DimensionMismatch { expected: usize, found: usize },
    /// A fixed value other than 0 or 1 has no bridge encoding.
    NonBinaryFixedValue { index: usize, value: f64 },
    /// Bridge slots are not a contiguous free numbering.
    InvalidBridge,
    /// The outer layer does not accept the inner one.
    EmbeddingRejected { outer: &'static str, inner: &'static str },
}

impl MaskError {
    /// Returns a semantic error code for programmatic handling.
    pub fn code(&self) -> &'static str {
        match self {
            MaskError::IndexOutOfRange { .. } => "MASK_INDEX_OUT_OF_RANGE",
            MaskError::AlreadyFixed { .. } => "MASK_ALREADY_FIXED",
            MaskError::ValueOutOfBounds { .. } => "MASK_VALUE_OUT_OF_BOUNDS",
            MaskError::InvalidBounds { .. } => "MASK_INVALID_BOUNDS",
            MaskError::DegenerateBounds { .. } => "MASK_DEGENERATE_BOUNDS",
            MaskError::UnsupportedLeaf { .. } => "MASK_UNSUPPORTED_LEAF",
            MaskError::DimensionMismatch { .. } => "MASK_DIMENSION_MISMATCH",
            MaskError::NonBinaryFixedValue { .. } => "MASK_NON_BINARY_FIXED_VALUE",
            MaskError::InvalidBridge => "MASK_INVALID_BRIDGE",
            MaskError::EmbeddingRejected { .. } => "MASK_EMBEDDING_REJECTED",
        }
    }
}

impl std::fmt::Display for MaskError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MaskError::IndexOutOfRange { index, n_var } => write!(
                f,
                "[{}] Variable {} is outside a space of {} variables",
                self.code(),
                index,
                n_var
            ),
            MaskError::AlreadyFixed { index, value } => write!(
                f,
                "[{}] Variable {} is already fixed to {}",
                self.code(),
                index,
                value
            ),
            MaskError::ValueOutOfBounds {
                index,
                value,
                lower,
                upper,
            } => write!(
                f,
                "[{}] Value {} for variable {} is outside [{}, {}]",
                self.code(),
                value,
                index,
                lower,
                upper
            ),
            MaskError::InvalidBounds {
                index,
                lower,
                upper,
            } => write!(
                f,
                "[{}] Variable {} bounds invalid: lower ({}) > upper ({})",
                self.code(),
                index,
                lower,
                upper
            ),
            MaskError::DegenerateBounds { index } => write!(
                f,
                "[{}] Variable {} has equal bounds and cannot be freed",
                self.code(),
                index
            ),
            MaskError::UnsupportedLeaf { mask, kind } => write!(
                f,
                "[{}] {} mask cannot transform a {} leaf",
                self.code(),
                mask,
                kind
            ),
            MaskError::DimensionMismatch { expected, found } => write!(
                f,
                "[{}] Expected {} variables, found {}",
                self.code(),
                expected,
                found
            ),
            MaskError::NonBinaryFixedValue { index, value } => write!(
                f,
                "[{}] Variable {} is fixed to {}, which has no bridge encoding",
                self.code(),
                index,
                value
            ),
            MaskError::InvalidBridge => write!(
                f,
                "[{}] Bridge free slots must be numbered 0, 1, 2, ... in order",
                self.code()
            ),
            MaskError::EmbeddingRejected { outer, inner } => write!(
                f,
                "[{}] {} mask cannot be placed in front of a {} mask",
                self.code(),
                outer,
                inner
            ),
        }
    }
}

impl std::error::Error for MaskError {}
