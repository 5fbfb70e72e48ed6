//! Rules engine for Fission.
//!
//! Implements the variant-chess simulation:
//! - Board grid with damaged squares
//! - Piece type registry and per-piece scripts
//! - Move generation and atomic capture resolution
//! - Chunks (switchable board regions) and edge triggers
//! - Win conditions and the event stream

mod board;
mod capture;
mod chunks;
mod clock;
mod edge;
mod events;
pub mod invariants;
mod movegen;
mod piece_type;
mod rules;
mod scripts;
mod state;
mod victory;

pub use board::{default_symbol, Board, Color, Coord, EdgeDistances, Piece, PieceState, MAX_SIDE, MIN_SIDE};
pub use capture::{explosion_radius, resolve_capture, CaptureReport, Explosion};
pub use chunks::{Chunk, ChunkFill, ChunkOwner, ChunkSet, Crossing, Rect, ScriptOverride, Toggle};
pub use clock::{Clock, ManualClock, SystemClock};
pub use edge::{fire_triggers, spawn_rect, Edge, EdgeAction, EdgeReaction, EdgeTrigger, SpawnBounds, TypeFilter};
pub use events::{Event, GameOver, MoveApplied};
pub use movegen::{blocked_by_damage, legal_moves};
pub use piece_type::{PieceKind, PieceType, PieceTypeRegistry, Script, ScriptKind, TypeChange};
pub use rules::{CaptureMode, LimitOutcome, RuleChange, RulesConfig, VictoryMode};
pub use scripts::{effective_script, entropy_probability, post_move, pre_move, PostMove, PreMove};
pub use state::{standard_board, AppliedMove, Engine, MoveOutcome, Session, STANDARD_SIDE};
pub use victory::{board_outcome, evaluate, limit_outcome, GameOutcome, GameOverReason, GameResult};
