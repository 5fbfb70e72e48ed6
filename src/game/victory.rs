//! Win-condition evaluation.

use std::fmt;
use std::time::Duration;

use crate::game::{Board, Color, LimitOutcome, PieceTypeRegistry, RulesConfig, VictoryMode};

/// Final result of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameResult {
    /// White won.
    WhiteWins,
    /// Black won.
    BlackWins,
    /// Nobody won.
    Draw,
}

impl GameResult {
    /// Result code: `1-0`, `0-1` or `1/2-1/2`.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::WhiteWins => "1-0",
            Self::BlackWins => "0-1",
            Self::Draw => "1/2-1/2",
        }
    }

    /// The game won by `winner`, or a draw.
    #[must_use]
    pub const fn for_winner(winner: Option<Color>) -> Self {
        match winner {
            Some(Color::White) => Self::WhiteWins,
            Some(Color::Black) => Self::BlackWins,
            None => Self::Draw,
        }
    }
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Why the game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOverReason {
    /// Royal capture mode and neither side has a royal piece.
    NoRoyals,
    /// White's last royal piece is gone.
    WhiteRoyalLost,
    /// Black's last royal piece is gone.
    BlackRoyalLost,
    /// Elimination mode and the board is empty.
    MutualDestruction,
    /// White has no pieces left.
    WhiteEliminated,
    /// Black has no pieces left.
    BlackEliminated,
    /// The full-move limit was exceeded.
    MoveLimit(LimitOutcome),
    /// The time limit ran out.
    TimeLimit(LimitOutcome),
}

impl GameOverReason {
    /// Reason tag such as `BLACK_ROYAL_LOST` or `MOVE_LIMIT_DRAW`.
    #[must_use]
    pub fn tag(self) -> String {
        let limit = |prefix: &str, outcome: LimitOutcome| {
            let suffix = match outcome {
                LimitOutcome::Draw => "DRAW",
                LimitOutcome::White => "WHITE",
                LimitOutcome::Black => "BLACK",
            };
            format!("{prefix}_{suffix}")
        };
        match self {
            Self::NoRoyals => "NO_ROYALS".to_string(),
            Self::WhiteRoyalLost => "WHITE_ROYAL_LOST".to_string(),
            Self::BlackRoyalLost => "BLACK_ROYAL_LOST".to_string(),
            Self::MutualDestruction => "MUTUAL_DESTRUCTION".to_string(),
            Self::WhiteEliminated => "WHITE_ELIMINATED".to_string(),
            Self::BlackEliminated => "BLACK_ELIMINATED".to_string(),
            Self::MoveLimit(outcome) => limit("MOVE_LIMIT", outcome),
            Self::TimeLimit(outcome) => limit("TIME_LIMIT", outcome),
        }
    }
}

impl fmt::Display for GameOverReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tag())
    }
}

/// A decided game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameOutcome {
    /// Result.
    pub result: GameResult,
    /// Reason.
    pub reason: GameOverReason,
}

impl GameOutcome {
    fn from_counts(
        white: usize,
        black: usize,
        both: GameOverReason,
        white_gone: GameOverReason,
        black_gone: GameOverReason,
    ) -> Option<Self> {
        let (result, reason) = match (white, black) {
            (0, 0) => (GameResult::Draw, both),
            (0, _) => (GameResult::BlackWins, white_gone),
            (_, 0) => (GameResult::WhiteWins, black_gone),
            _ => return None,
        };
        Some(Self { result, reason })
    }

    fn limit(reason: fn(LimitOutcome) -> GameOverReason, outcome: LimitOutcome) -> Self {
        Self {
            result: GameResult::for_winner(outcome.winner()),
            reason: reason(outcome),
        }
    }
}

/// Outcome decided by the board under the current victory mode, if any.
#[must_use]
pub fn board_outcome(board: &Board, registry: &PieceTypeRegistry, mode: VictoryMode) -> Option<GameOutcome> {
    match mode {
        VictoryMode::RoyalCapture => {
            let royals = |color: Color| {
                board
                    .pieces()
                    .filter(|(_, p)| p.color == color)
                    .filter(|(_, p)| registry.get(&p.type_name).is_some_and(|pt| pt.is_royal))
                    .count()
            };
            GameOutcome::from_counts(
                royals(Color::White),
                royals(Color::Black),
                GameOverReason::NoRoyals,
                GameOverReason::WhiteRoyalLost,
                GameOverReason::BlackRoyalLost,
            )
        }
        VictoryMode::Elimination => GameOutcome::from_counts(
            board.count(Color::White),
            board.count(Color::Black),
            GameOverReason::MutualDestruction,
            GameOverReason::WhiteEliminated,
            GameOverReason::BlackEliminated,
        ),
        VictoryMode::None => None,
    }
}

/// Outcome decided by the move or time limit, if any.
#[must_use]
pub fn limit_outcome(rules: &RulesConfig, fullmove: u32, elapsed: Duration) -> Option<GameOutcome> {
    if rules.max_fullmoves > 0 && fullmove > rules.max_fullmoves {
        return Some(GameOutcome::limit(GameOverReason::MoveLimit, rules.limit_result));
    }
    if rules.max_seconds > 0 && elapsed >= Duration::from_secs(u64::from(rules.max_seconds)) {
        return Some(GameOutcome::limit(GameOverReason::TimeLimit, rules.limit_result));
    }
    None
}

/// Full evaluation after a move: the board first, then the limits.
#[must_use]
pub fn evaluate(
    board: &Board,
    registry: &PieceTypeRegistry,
    rules: &RulesConfig,
    fullmove: u32,
    elapsed: Duration,
) -> Option<GameOutcome> {
    board_outcome(board, registry, rules.victory).or_else(|| limit_outcome(rules, fullmove, elapsed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Coord, Piece, RuleChange};

    fn kings_and_pawn() -> Board {
        let mut board = Board::new(8, 8);
        board.place(Coord::new(4, 0), Piece::new(Color::White, "king", None));
        board.place(Coord::new(0, 6), Piece::new(Color::Black, "pawn", None));
        board
    }

    #[test]
    fn test_royal_capture() {
        let board = kings_and_pawn();
        let registry = PieceTypeRegistry::standard();
        let outcome = board_outcome(&board, &registry, VictoryMode::RoyalCapture).unwrap();
        assert_eq!(outcome.result, GameResult::WhiteWins);
        assert_eq!(outcome.reason.tag(), "BLACK_ROYAL_LOST");

        assert_eq!(board_outcome(&board, &registry, VictoryMode::Elimination), None);
    }

    #[test]
    fn test_elimination_draw() {
        let board = Board::new(8, 8);
        let registry = PieceTypeRegistry::standard();
        let outcome = board_outcome(&board, &registry, VictoryMode::Elimination).unwrap();
        assert_eq!(outcome.result.code(), "1/2-1/2");
        assert_eq!(outcome.reason, GameOverReason::MutualDestruction);
    }

    #[test]
    fn test_move_limit() {
        let rules = RulesConfig::default()
            .apply(RuleChange::MaxFullmoves(10))
            .apply(RuleChange::LimitResult(LimitOutcome::Black));
        assert_eq!(limit_outcome(&rules, 10, Duration::ZERO), None);

        let outcome = limit_outcome(&rules, 11, Duration::ZERO).unwrap();
        assert_eq!(outcome.result, GameResult::BlackWins);
        assert_eq!(outcome.reason.tag(), "MOVE_LIMIT_BLACK");
    }

    #[test]
    fn test_time_limit() {
        let rules = RulesConfig::default().apply(RuleChange::MaxSeconds(30));
        assert_eq!(limit_outcome(&rules, 1, Duration::from_secs(29)), None);
        let outcome = limit_outcome(&rules, 1, Duration::from_secs(30)).unwrap();
        assert_eq!(outcome.reason.tag(), "TIME_LIMIT_DRAW");
    }

    #[test]
    fn test_board_checked_before_limits() {
        let board = kings_and_pawn();
        let registry = PieceTypeRegistry::standard();
        let rules = RulesConfig::default()
            .apply(RuleChange::Victory(VictoryMode::RoyalCapture))
            .apply(RuleChange::MaxFullmoves(1));
        let outcome = evaluate(&board, &registry, &rules, 5, Duration::ZERO).unwrap();
        assert_eq!(outcome.reason, GameOverReason::BlackRoyalLost);
    }
}
