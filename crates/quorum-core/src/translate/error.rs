//! Semantic errors raised while lowering parsed sources.

use quorum_lang::Position;

#[derive(Debug, Clone, PartialEq)]
pub enum TranslateError {
    /// The fixing mask does not read the problem's choice space.
    DimensionMismatch { expected: usize, found: usize },
    /// A variable other than `x` was referenced.
    Name {
        entry: String,
        name: String,
        position: Position,
    },
    /// Unknown fragment, function, aggregate, local or option.
    Key {
        entry: String,
        message: &'static str,
        key: String,
        position: Position,
    },
    /// An option index past the last choice.
    Index {
        entry: String,
        index: usize,
        dim: usize,
        position: Position,
    },
    /// A call with the wrong number of arguments.
    Type {
        entry: String,
        message: String,
        position: Position,
    },
    /// A fragment that references itself, directly or not.
    Recursion {
        entry: String,
        fragment: String,
        position: Position,
    },
}

impl TranslateError {
    /// Returns a semantic error code for programmatic handling.
    pub fn code(&self) -> &'static str {
        match self {
            TranslateError::DimensionMismatch { .. } => "TRANSLATE_DIMENSION_MISMATCH",
            TranslateError::Name { .. } => "TRANSLATE_NAME_ERROR",
            TranslateError::Key { .. } => "TRANSLATE_KEY_ERROR",
            TranslateError::Index { .. } => "TRANSLATE_INDEX_ERROR",
            TranslateError::Type { .. } => "TRANSLATE_TYPE_ERROR",
            TranslateError::Recursion { .. } => "TRANSLATE_RECURSION",
        }
    }

    /// Error class as reported to users of the expression language.
    pub fn kind(&self) -> &'static str {
        match self {
            TranslateError::DimensionMismatch { .. } => "ValueError",
            TranslateError::Name { .. } => "NameError",
            TranslateError::Key { .. } => "KeyError",
            TranslateError::Index { .. } => "IndexError",
            TranslateError::Type { .. } => "TypeError",
            TranslateError::Recursion { .. } => "RecursionError",
        }
    }

    /// Name of the constraint, display or fragment being lowered.
    pub fn entry(&self) -> Option<&str> {
        match self {
            TranslateError::DimensionMismatch { .. } => None,
            TranslateError::Name { entry, .. }
            | TranslateError::Key { entry, .. }
            | TranslateError::Index { entry, .. }
            | TranslateError::Type { entry, .. }
            | TranslateError::Recursion { entry, .. } => Some(entry),
        }
    }

    pub fn position(&self) -> Option<Position> {
        match self {
            TranslateError::DimensionMismatch { .. } => None,
            TranslateError::Name { position, .. }
            | TranslateError::Key { position, .. }
            | TranslateError::Index { position, .. }
            | TranslateError::Type { position, .. }
            | TranslateError::Recursion { position, .. } => Some(*position),
        }
    }
}

impl std::fmt::Display for TranslateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TranslateError::DimensionMismatch { expected, found } => write!(
                f,
                "[{}] Mask reads {} variables, the problem has {} choices",
                self.code(),
                found,
                expected
            ),
            TranslateError::Name {
                entry,
                name,
                position,
            } => write!(
                f,
                "[{}] {} at {}: use of undefined variable '{}'",
                self.code(),
                entry,
                position,
                name
            ),
            TranslateError::Key {
                entry,
                message,
                key,
                position,
            } => write!(
                f,
                "[{}] {} at {}: {} '{}'",
                self.code(),
                entry,
                position,
                message,
                key
            ),
            TranslateError::Index {
                entry,
                index,
                dim,
                position,
            } => write!(
                f,
                "[{}] {} at {}: index {} out of bounds of variable array of size {}",
                self.code(),
                entry,
                position,
                index,
                dim
            ),
            TranslateError::Type {
                entry,
                message,
                position,
            } => write!(f, "[{}] {} at {}: {}", self.code(), entry, position, message),
            TranslateError::Recursion {
                entry,
                fragment,
                position,
            } => write!(
                f,
                "[{}] {} at {}: fragment '{}' references itself",
                self.code(),
                entry,
                position,
                fragment
            ),
        }
    }
}

impl std::error::Error for TranslateError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(line: usize, column: usize) -> Position {
        Position { line, column }
    }

    #[test]
    fn error_codes_are_stable() {
        let err = TranslateError::Key {
            entry: "budget".to_string(),
            message: "unknown fragment",
            key: "cost".to_string(),
            position: at(1, 3),
        };
        assert_eq!(err.code(), "TRANSLATE_KEY_ERROR");
        assert_eq!(err.kind(), "KeyError");
        assert_eq!(err.entry(), Some("budget"));
        assert_eq!(err.position(), Some(at(1, 3)));
    }

    #[test]
    fn display_prefixes_error_code() {
        let err = TranslateError::Name {
            entry: "budget".to_string(),
            name: "y".to_string(),
            position: at(1, 2),
        };
        let msg = err.to_string();
        assert!(msg.starts_with("[TRANSLATE_NAME_ERROR]"));
        assert!(msg.contains("budget at 1:2"));
    }
}
