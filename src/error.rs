//! Error types for the rule engine.

use std::fmt;
use std::path::PathBuf;

/// Why a move attempt was rejected before any board write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IllegalMove {
    /// A result has already been declared for this session.
    GameOver,
    /// The source square is empty.
    NoPiece,
    /// The piece on the source square belongs to the side not on move.
    NotYourTurn,
    /// The destination is not in the piece's legal set.
    NotLegal,
}

impl fmt::Display for IllegalMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IllegalMove::GameOver => write!(f, "game is already over"),
            IllegalMove::NoPiece => write!(f, "no piece on source square"),
            IllegalMove::NotYourTurn => write!(f, "piece does not belong to side to move"),
            IllegalMove::NotLegal => write!(f, "destination is not a legal move"),
        }
    }
}

/// Category of a name that failed to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    /// A chunk name.
    Chunk,
    /// A piece type name.
    PieceType,
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReferenceKind::Chunk => write!(f, "chunk"),
            ReferenceKind::PieceType => write!(f, "piece type"),
        }
    }
}

/// Errors returned by engine operations.
///
/// Every variant leaves the engine in the state it had before the call.
#[derive(Debug)]
pub enum EngineError {
    /// Malformed mutation arguments.
    Validation(String),
    /// A move attempt was rejected.
    IllegalMove(IllegalMove),
    /// A chunk or piece type name did not resolve.
    UnknownReference {
        /// What kind of name it was.
        kind: ReferenceKind,
        /// The name as given.
        name: String,
    },
    /// Reading or writing a state document failed.
    Io {
        /// The file involved.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
    /// A state document could not be interpreted at all.
    ConfigMalformed(String),
}

impl EngineError {
    /// Shorthand for a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Shorthand for an unknown chunk name.
    pub fn unknown_chunk(name: &str) -> Self {
        Self::UnknownReference {
            kind: ReferenceKind::Chunk,
            name: name.to_string(),
        }
    }

    /// Shorthand for an unknown piece type name.
    pub fn unknown_type(name: &str) -> Self {
        Self::UnknownReference {
            kind: ReferenceKind::PieceType,
            name: name.to_string(),
        }
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation(message) => write!(f, "invalid arguments: {message}"),
            Self::IllegalMove(reason) => write!(f, "illegal move: {reason}"),
            Self::UnknownReference { kind, name } => write!(f, "unknown {kind} '{name}'"),
            Self::Io { path, source } => write!(f, "{}: {source}", path.display()),
            Self::ConfigMalformed(message) => write!(f, "malformed state document: {message}"),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<IllegalMove> for EngineError {
    fn from(reason: IllegalMove) -> Self {
        Self::IllegalMove(reason)
    }
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = EngineError::unknown_chunk("z1");
        assert_eq!(err.to_string(), "unknown chunk 'z1'");

        let err: EngineError = IllegalMove::GameOver.into();
        assert_eq!(err.to_string(), "illegal move: game is already over");
    }

    #[test]
    fn test_io_error_has_source() {
        use std::error::Error;

        let err = EngineError::Io {
            path: PathBuf::from("configs/x.json"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        assert!(err.source().is_some());
        assert!(err.to_string().starts_with("configs/x.json"));
    }
}
