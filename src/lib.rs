// Allow unwrap and unreadable literals in tests (test code is not production)
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::unreadable_literal))]
//! Fission: a configurable atomic-chess rule engine.
//!
//! The engine holds one game session and exposes a structured mutation API:
//! - Rectangular boards from 2x2 to 20x20 with damaged squares
//! - A registry of named piece types with custom movement and scripts
//! - Atomic, normal or no-consequence captures
//! - Chunks (switchable regions) and edge triggers
//! - Win conditions, move and time limits, and a drained event queue
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │   CLI / command adapter / render    │
//! ├─────────────────────────────────────┤
//! │   Codec (state document, files)     │
//! ├─────────────────────────────────────┤
//! │   Engine (game::*)                  │
//! └─────────────────────────────────────┘
//! ```

pub mod codec;
pub mod command;
pub mod error;
pub mod game;
pub mod render;

pub use error::{EngineError, EngineResult, IllegalMove, ReferenceKind};

// Re-export key game types at crate root for convenience
pub use game::{
    Board, Color, Coord, Engine, Event, GameOutcome, GameResult, MoveOutcome, Piece, PieceType, RuleChange,
    RulesConfig, Session,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_reexports() {
        let mut engine = Engine::with_seed(7);
        let outcome = engine
            .attempt_move(Coord::new(4, 1), Coord::new(4, 3))
            .unwrap();
        assert!(matches!(outcome, MoveOutcome::Applied(_)));
        assert!(matches!(engine.drain_events().as_slice(), [Event::MoveApplied(_)]));
    }
}
