//! Events emitted to external consumers.
//!
//! Consumers receive values only; nothing in an event refers back into the engine.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::game::{GameOutcome, GameOverReason, GameResult};

/// A move was applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoveApplied {
    /// Full-move number after the move.
    pub fullmove: u32,
    /// Source square, algebraic.
    pub from: String,
    /// Destination square actually reached, algebraic.
    pub to: String,
    /// Label of the captured piece such as `black_pawn`, if any.
    pub captured: Option<String>,
    /// White pieces left.
    pub white_count: usize,
    /// Black pieces left.
    pub black_count: usize,
    /// `square:color_type` for every piece near the destination.
    pub neighbours: Vec<String>,
    /// Session label, if one is configured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// The game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GameOver {
    /// `1-0`, `0-1` or `1/2-1/2`.
    #[serde(serialize_with = "result_code")]
    pub result: GameResult,
    /// Reason tag.
    #[serde(serialize_with = "reason_tag")]
    pub reason: GameOverReason,
}

impl From<GameOutcome> for GameOver {
    fn from(outcome: GameOutcome) -> Self {
        Self {
            result: outcome.result,
            reason: outcome.reason,
        }
    }
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn result_code<S: Serializer>(result: &GameResult, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(result.code())
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn reason_tag<S: Serializer>(reason: &GameOverReason, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&reason.tag())
}

/// Anything the engine reports to consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    /// See [`MoveApplied`].
    MoveApplied(MoveApplied),
    /// See [`GameOver`].
    GameOver(GameOver),
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MoveApplied(m) => {
                write!(
                    f,
                    "move {} {}{} captured={} white={} black={}",
                    m.fullmove,
                    m.from,
                    m.to,
                    m.captured.as_deref().unwrap_or("none"),
                    m.white_count,
                    m.black_count
                )?;
                if !m.neighbours.is_empty() {
                    write!(f, " near=[{}]", m.neighbours.join(" "))?;
                }
                if let Some(label) = &m.label {
                    write!(f, " label={label}")?;
                }
                Ok(())
            }
            Self::GameOver(g) => write!(f, "game over {} {}", g.result, g.reason),
        }
    }
}
