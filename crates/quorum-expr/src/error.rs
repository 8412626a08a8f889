//! Expression construction and text codec errors.

use crate::node::NodeKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExprError {
    /// A tree could not be folded into a quadratic form.
    NotQuadratic { kind: NodeKind },
    /// A leaf does not have the dimension of the space it is used in.
    DimensionMismatch { expected: usize, found: usize },
}

impl ExprError {
    /// Returns a semantic error code for programmatic handling.
    pub fn code(&self) -> &'static str {
        match self {
            ExprError::NotQuadratic { .. } => "EXPR_NOT_QUADRATIC",
            ExprError::DimensionMismatch { .. } => "EXPR_DIMENSION_MISMATCH",
        }
    }
}

impl std::fmt::Display for ExprError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExprError::NotQuadratic { kind } => write!(
                f,
                "[{}] {} node has no quadratic form",
                self.code(),
                kind.as_str()
            ),
            ExprError::DimensionMismatch { expected, found } => write!(
                f,
                "[{}] expected {} variables, found {}",
                self.code(),
                expected,
                found
            ),
        }
    }
}

impl std::error::Error for ExprError {}

/// Errors raised while writing or reading the node text format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Input ended before a required field.
    UnexpectedEnd { expected: &'static str },
    /// A token could not be parsed as the expected field.
    InvalidToken { token: String, expected: &'static str },
    /// A type tag outside the known node set.
    UnknownTag(i64),
    /// The node variant has no text representation.
    Unserializable(NodeKind),
}

impl CodecError {
    /// Returns a semantic error code for programmatic handling.
    pub fn code(&self) -> &'static str {
        match self {
            CodecError::UnexpectedEnd { .. } => "CODEC_UNEXPECTED_END",
            CodecError::InvalidToken { .. } => "CODEC_INVALID_TOKEN",
            CodecError::UnknownTag(_) => "CODEC_UNKNOWN_TAG",
            CodecError::Unserializable(_) => "CODEC_UNSERIALIZABLE",
        }
    }
}

impl std::fmt::Display for CodecError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CodecError::UnexpectedEnd { expected } => {
                write!(f, "[{}] input ended while reading {}", self.code(), expected)
            }
            CodecError::InvalidToken { token, expected } => write!(
                f,
                "[{}] expected {}, found '{}'",
                self.code(),
                expected,
                token
            ),
            CodecError::UnknownTag(tag) => {
                write!(f, "[{}] unrecognized node type tag {}", self.code(), tag)
            }
            CodecError::Unserializable(kind) => write!(
                f,
                "[{}] {} nodes cannot be serialized",
                self.code(),
                kind.as_str()
            ),
        }
    }
}

impl std::error::Error for CodecError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_are_stable() {
        assert_eq!(
            ExprError::NotQuadratic {
                kind: NodeKind::Abs
            }
            .code(),
            "EXPR_NOT_QUADRATIC"
        );
        assert_eq!(CodecError::UnknownTag(9).code(), "CODEC_UNKNOWN_TAG");
        assert_eq!(
            CodecError::Unserializable(NodeKind::Quadratic).code(),
            "CODEC_UNSERIALIZABLE"
        );
    }

    #[test]
    fn display_prefixes_error_code() {
        let rendered = CodecError::UnknownTag(42).to_string();
        assert!(rendered.starts_with("[CODEC_UNKNOWN_TAG]"));
        assert!(rendered.contains("42"));

        let rendered = ExprError::DimensionMismatch {
            expected: 3,
            found: 2,
        }
        .to_string();
        assert!(rendered.starts_with("[EXPR_DIMENSION_MISMATCH]"));
    }
}
