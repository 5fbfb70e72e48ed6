//! Session rule set.

use serde::{Deserialize, Serialize};

use crate::game::Color;

/// What happens when a piece lands on an opponent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureMode {
    /// The captured piece detonates an area explosion.
    Atomic,
    /// The captured piece is simply removed.
    Normal,
    /// Landing on an opponent has no capture consequence beyond replacement.
    None,
}

impl CaptureMode {
    /// Parse `atomic`, `normal` or `none`.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        match text.to_ascii_lowercase().as_str() {
            "atomic" => Some(Self::Atomic),
            "normal" => Some(Self::Normal),
            "none" => Some(Self::None),
            _ => None,
        }
    }

    /// Lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Atomic => "atomic",
            Self::Normal => "normal",
            Self::None => "none",
        }
    }
}

/// Primary win condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VictoryMode {
    /// A side with no pieces left loses.
    Elimination,
    /// A side with no royal pieces left loses.
    #[serde(rename = "king_capture", alias = "king", alias = "royal_capture")]
    RoyalCapture,
    /// Only move and time limits end the game.
    None,
}

impl VictoryMode {
    /// Parse `elimination`, `king`, `king_capture`, `royal_capture` or `none`.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        match text.to_ascii_lowercase().as_str() {
            "elimination" => Some(Self::Elimination),
            "king" | "king_capture" | "royal_capture" => Some(Self::RoyalCapture),
            "none" => Some(Self::None),
            _ => None,
        }
    }

    /// Name as stored in state documents.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Elimination => "elimination",
            Self::RoyalCapture => "king_capture",
            Self::None => "none",
        }
    }
}

/// Result declared when a move or time limit is hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LimitOutcome {
    /// Neither side wins.
    Draw,
    /// White is awarded the game.
    White,
    /// Black is awarded the game.
    Black,
}

impl LimitOutcome {
    /// Parse `draw`, `white` or `black`.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        match text.to_ascii_lowercase().as_str() {
            "draw" => Some(Self::Draw),
            "white" => Some(Self::White),
            "black" => Some(Self::Black),
            _ => None,
        }
    }

    /// The winning side, if any.
    #[must_use]
    pub const fn winner(self) -> Option<Color> {
        match self {
            Self::Draw => None,
            Self::White => Some(Color::White),
            Self::Black => Some(Color::Black),
        }
    }
}

/// Mutable rule configuration for one game session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RulesConfig {
    /// Capture consequence.
    pub capture_mode: CaptureMode,
    /// Global explosion radius.
    pub atomic_radius: u32,
    /// Explosion damages the capture square.
    pub center_damages: bool,
    /// Capturing piece survives its own explosion.
    pub center_survives: bool,
    /// Damaged squares block movement of non-exempt types.
    pub damage_blocks_move: bool,
    /// Primary win condition.
    pub victory: VictoryMode,
    /// Full-move limit; 0 disables it.
    pub max_fullmoves: u32,
    /// Time limit in seconds; 0 disables it.
    pub max_seconds: u32,
    /// Result declared when a limit is hit.
    pub limit_result: LimitOutcome,
    /// Chebyshev radius of the neighbour list in move events.
    pub neighbour_radius: u32,
    /// Whether move events carry a neighbour list.
    pub neighbours_enabled: bool,
    /// Label appended to move events when non-empty.
    pub event_label: String,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            capture_mode: CaptureMode::Atomic,
            atomic_radius: 1,
            center_damages: true,
            center_survives: true,
            damage_blocks_move: true,
            victory: VictoryMode::Elimination,
            max_fullmoves: 0,
            max_seconds: 0,
            limit_result: LimitOutcome::Draw,
            neighbour_radius: 2,
            neighbours_enabled: true,
            event_label: String::new(),
        }
    }
}

/// A single rule edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleChange {
    /// Set the capture mode.
    CaptureMode(CaptureMode),
    /// Set the global explosion radius.
    AtomicRadius(u32),
    /// Set whether explosions damage the capture square.
    CenterDamages(bool),
    /// Set whether the capturing piece survives.
    CenterSurvives(bool),
    /// Set whether damage blocks movement.
    DamageBlocksMove(bool),
    /// Set the win condition.
    Victory(VictoryMode),
    /// Set the full-move limit.
    MaxFullmoves(u32),
    /// Set the time limit in seconds.
    MaxSeconds(u32),
    /// Set the limit result.
    LimitResult(LimitOutcome),
    /// Set the neighbour radius of move events.
    NeighbourRadius(u32),
    /// Enable or disable neighbour lists.
    Neighbours(bool),
    /// Set the event label.
    EventLabel(String),
}

impl RulesConfig {
    /// Return a copy with one change applied.
    #[must_use]
    pub fn apply(mut self, change: RuleChange) -> Self {
        match change {
            RuleChange::CaptureMode(mode) => self.capture_mode = mode,
            RuleChange::AtomicRadius(r) => self.atomic_radius = r,
            RuleChange::CenterDamages(on) => self.center_damages = on,
            RuleChange::CenterSurvives(on) => self.center_survives = on,
            RuleChange::DamageBlocksMove(on) => self.damage_blocks_move = on,
            RuleChange::Victory(mode) => self.victory = mode,
            RuleChange::MaxFullmoves(n) => self.max_fullmoves = n,
            RuleChange::MaxSeconds(s) => self.max_seconds = s,
            RuleChange::LimitResult(outcome) => self.limit_result = outcome,
            RuleChange::NeighbourRadius(r) => self.neighbour_radius = r,
            RuleChange::Neighbours(on) => self.neighbours_enabled = on,
            RuleChange::EventLabel(label) => self.event_label = label,
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let rules = RulesConfig::default();
        assert_eq!(rules.capture_mode, CaptureMode::Atomic);
        assert_eq!(rules.atomic_radius, 1);
        assert!(rules.center_survives);
        assert_eq!(rules.victory, VictoryMode::Elimination);
        assert_eq!(rules.neighbour_radius, 2);
    }

    #[test]
    fn test_apply_is_pure() {
        let base = RulesConfig::default();
        let changed = base.clone().apply(RuleChange::AtomicRadius(3));
        assert_eq!(base.atomic_radius, 1);
        assert_eq!(changed.atomic_radius, 3);
    }

    #[test]
    fn test_parse_names() {
        assert_eq!(CaptureMode::parse("Normal"), Some(CaptureMode::Normal));
        assert_eq!(CaptureMode::parse("nuclear"), None);
        assert_eq!(VictoryMode::parse("king"), Some(VictoryMode::RoyalCapture));
        assert_eq!(VictoryMode::RoyalCapture.as_str(), "king_capture");
        assert_eq!(LimitOutcome::parse("black"), Some(LimitOutcome::Black));
    }

    #[test]
    fn test_victory_aliases() {
        let mode: VictoryMode = serde_json::from_str("\"king\"").unwrap();
        assert_eq!(mode, VictoryMode::RoyalCapture);
        assert_eq!(
            serde_json::to_string(&VictoryMode::RoyalCapture).unwrap(),
            "\"king_capture\""
        );
    }
}
