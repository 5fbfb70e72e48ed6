//! Capture resolution.
//!
//! Runs after the mover already stands on its destination. In atomic mode a
//! capture detonates around the destination, removing every non-immune piece
//! within the explosion radius.

use tracing::debug;

use crate::game::{Board, CaptureMode, Coord, PieceTypeRegistry, RulesConfig};

/// An explosion that went off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Explosion {
    /// Capture square.
    pub center: Coord,
    /// Chebyshev radius.
    pub radius: u32,
}

/// What a capture did to the board.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaptureReport {
    /// Explosion, if one went off.
    pub explosion: Option<Explosion>,
    /// Squares whose pieces the explosion removed, the mover's included.
    pub destroyed: Vec<Coord>,
    /// The capture square was marked damaged.
    pub damaged_center: bool,
}

impl CaptureReport {
    /// True if the explosion removed the piece standing on `coord`.
    #[must_use]
    pub fn destroyed(&self, coord: Coord) -> bool {
        self.destroyed.contains(&coord)
    }
}

/// Explosion radius for the piece standing on `center`.
///
/// The type's override replaces the global radius; the piece's heat bonus is
/// added on top.
#[must_use]
pub fn explosion_radius(board: &Board, registry: &PieceTypeRegistry, rules: &RulesConfig, center: Coord) -> u32 {
    let Some(mover) = board.get(center) else {
        return rules.atomic_radius;
    };
    let base = registry
        .get(&mover.type_name)
        .and_then(|pt| pt.explosion_radius)
        .unwrap_or(rules.atomic_radius);
    base.saturating_add(mover.state.heat_bonus)
}

/// Resolve the consequences of the mover landing on `center`.
///
/// `captured` tells whether the destination held an opposing piece before the
/// move. Nothing happens unless it did and capture mode is atomic.
pub fn resolve_capture(
    board: &mut Board,
    registry: &PieceTypeRegistry,
    rules: &RulesConfig,
    center: Coord,
    captured: bool,
) -> CaptureReport {
    let mut report = CaptureReport::default();
    if !captured || rules.capture_mode != CaptureMode::Atomic {
        return report;
    }

    let radius = explosion_radius(board, registry, rules, center);
    if radius > 0 {
        debug!(square = %center, radius, "explosion");
        report.explosion = Some(Explosion { center, radius });

        let reach = i32::try_from(radius).unwrap_or(i32::MAX);
        let victims: Vec<Coord> = board
            .squares_within(center, reach)
            .filter(|&coord| !(rules.center_survives && coord == center))
            .filter(|&coord| {
                board.get(coord).is_some_and(|victim| {
                    !registry
                        .get(&victim.type_name)
                        .is_some_and(|pt| pt.immune_to_explosion)
                })
            })
            .collect();

        for coord in victims {
            board.take(coord);
            report.destroyed.push(coord);
        }

        // The mover dies in its own blast unless the centre survives, immunity notwithstanding.
        if !rules.center_survives && board.take(center).is_some() {
            report.destroyed.push(center);
        }
    }

    if rules.center_damages {
        board.mark_damaged(center);
        report.damaged_center = true;
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Color, Piece, RuleChange, TypeChange};

    fn crowded_board() -> Board {
        let mut board = Board::new(8, 8);
        for (x, y) in [(2, 2), (3, 2), (4, 2), (2, 3), (4, 3), (3, 5)] {
            board.place(Coord::new(x, y), Piece::new(Color::Black, "pawn", None));
        }
        board.place(Coord::new(3, 3), Piece::new(Color::White, "queen", None));
        board
    }

    #[test]
    fn test_atomic_capture_clears_neighbourhood() {
        let mut board = crowded_board();
        let registry = PieceTypeRegistry::standard();
        let rules = RulesConfig::default();

        let report = resolve_capture(&mut board, &registry, &rules, Coord::new(3, 3), true);
        assert_eq!(report.explosion.map(|e| e.radius), Some(1));
        assert_eq!(report.destroyed.len(), 5);
        assert!(board.get(Coord::new(3, 3)).is_some());
        assert!(board.get(Coord::new(3, 5)).is_some());
        assert!(board.is_damaged(Coord::new(3, 3)));
    }

    #[test]
    fn test_immune_pieces_survive() {
        let mut board = crowded_board();
        let mut registry = PieceTypeRegistry::standard();
        registry.modify("pawn", TypeChange::Immune(true)).unwrap();
        let rules = RulesConfig::default();

        let report = resolve_capture(&mut board, &registry, &rules, Coord::new(3, 3), true);
        assert!(report.destroyed.is_empty());
        assert_eq!(board.count(Color::Black), 6);
    }

    #[test]
    fn test_center_does_not_survive() {
        let mut board = crowded_board();
        let registry = PieceTypeRegistry::standard();
        let rules = RulesConfig::default().apply(RuleChange::CenterSurvives(false));

        let report = resolve_capture(&mut board, &registry, &rules, Coord::new(3, 3), true);
        assert!(report.destroyed(Coord::new(3, 3)));
        assert_eq!(board.count(Color::White), 0);
    }

    #[test]
    fn test_zero_radius_still_damages_center() {
        let mut board = crowded_board();
        let registry = PieceTypeRegistry::standard();
        let rules = RulesConfig::default().apply(RuleChange::AtomicRadius(0));

        let report = resolve_capture(&mut board, &registry, &rules, Coord::new(3, 3), true);
        assert_eq!(report.explosion, None);
        assert!(report.damaged_center);
        assert_eq!(board.count(Color::Black), 6);
    }

    #[test]
    fn test_heat_bonus_and_type_override() {
        let mut board = crowded_board();
        let mut registry = PieceTypeRegistry::standard();
        let rules = RulesConfig::default();
        registry.modify("queen", TypeChange::ExplosionRadius(0)).unwrap();
        if let Some(queen) = board.get_mut(Coord::new(3, 3)) {
            queen.state.heat_bonus = 2;
        }
        assert_eq!(explosion_radius(&board, &registry, &rules, Coord::new(3, 3)), 2);

        let report = resolve_capture(&mut board, &registry, &rules, Coord::new(3, 3), true);
        assert_eq!(report.destroyed.len(), 6);
    }

    #[test]
    fn test_normal_mode_has_no_side_effects() {
        let mut board = crowded_board();
        let registry = PieceTypeRegistry::standard();
        let rules = RulesConfig::default().apply(RuleChange::CaptureMode(CaptureMode::Normal));

        let report = resolve_capture(&mut board, &registry, &rules, Coord::new(3, 3), true);
        assert_eq!(report, CaptureReport::default());
        assert!(!board.is_damaged(Coord::new(3, 3)));
    }
}
