//! Session invariants - sanity checks that detect engine bugs.
//!
//! None of these can be broken through the public API; a violation means a
//! mutation path forgot to keep board, registry and chunks consistent.

use crate::game::Session;

/// Invariant violation error.
#[derive(Debug, Clone)]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub message: String,
}

impl std::fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invariant violation: {}", self.message)
    }
}

impl std::error::Error for InvariantViolation {}

/// Check all session invariants.
///
/// Returns a list of violations found, or empty if all invariants hold.
#[must_use]
pub fn check_invariants(session: &Session) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();
    let board = &session.board;

    // Every piece refers to a registered type
    for (coord, piece) in board.pieces() {
        if !session.registry.contains(&piece.type_name) {
            violations.push(InvariantViolation {
                message: format!("Piece at {coord} has unregistered type '{}'", piece.type_name),
            });
        }
    }

    for coord in board.damaged() {
        if !board.in_bounds(coord) {
            violations.push(InvariantViolation {
                message: format!("Damaged square {},{} is off the board", coord.x, coord.y),
            });
        }
    }

    for (name, chunk) in session.chunks.iter() {
        let [x1, y1, x2, y2] = chunk.rect.corners();
        if x1 > x2 || y1 > y2 {
            violations.push(InvariantViolation {
                message: format!("Chunk '{name}' has unnormalized rectangle {x1},{y1}..{x2},{y2}"),
            });
        }
    }

    if !session.registry.has_archetypes() {
        violations.push(InvariantViolation {
            message: "Registry lacks the king or queen archetype".to_string(),
        });
    }

    if session.fullmove == 0 {
        violations.push(InvariantViolation {
            message: "Full-move counter is zero".to_string(),
        });
    }

    violations
}

/// Assert all session invariants hold, panicking if any are violated.
///
/// Only active in debug builds. No-op in release builds.
///
/// # Panics
///
/// Panics with detailed message if any invariant is violated.
#[cfg(debug_assertions)]
pub fn assert_invariants(session: &Session) {
    let violations = check_invariants(session);
    if !violations.is_empty() {
        let messages: Vec<_> = violations.iter().map(|v| v.message.as_str()).collect();
        panic!("Session invariant violations:\n  - {}", messages.join("\n  - "));
    }
}

/// No-op in release builds.
#[cfg(not(debug_assertions))]
pub fn assert_invariants(_session: &Session) {}
