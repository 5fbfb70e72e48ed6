//! Legal destination computation.
//!
//! Move generation never looks at whose turn it is and never considers check:
//! a royal piece may be left en prise, the win evaluator deals with its loss.

use crate::game::{Board, Color, Coord, Piece, PieceKind, PieceType, PieceTypeRegistry};

/// Check if a damaged square blocks `piece_type`.
#[must_use]
pub fn blocked_by_damage(board: &Board, coord: Coord, piece_type: &PieceType, damage_blocks: bool) -> bool {
    damage_blocks && !piece_type.damaged_ok && board.is_damaged(coord)
}

/// Legal destinations for the piece standing on `from`.
///
/// Returns an empty list if the square is empty or holds a piece whose type
/// is not registered. Order follows the type's direction vectors.
#[must_use]
pub fn legal_moves(
    board: &Board,
    registry: &PieceTypeRegistry,
    damage_blocks: bool,
    from: Coord,
) -> Vec<Coord> {
    let Some(piece) = board.get(from) else {
        return Vec::new();
    };
    let Some(piece_type) = registry.get(&piece.type_name) else {
        return Vec::new();
    };

    let moves = MoveGen {
        board,
        piece,
        piece_type,
        damage_blocks,
        from,
    };

    if piece_type.kind == PieceKind::Pawn {
        return moves.pawn();
    }
    if piece_type.kind == PieceKind::Knight || piece_type.can_jump {
        return moves.leaps();
    }
    moves.slides()
}

struct MoveGen<'a> {
    board: &'a Board,
    piece: &'a Piece,
    piece_type: &'a PieceType,
    damage_blocks: bool,
    from: Coord,
}

impl MoveGen<'_> {
    fn blocked(&self, coord: Coord) -> bool {
        blocked_by_damage(self.board, coord, self.piece_type, self.damage_blocks)
    }

    fn is_opponent(&self, coord: Coord) -> bool {
        self.board
            .get(coord)
            .is_some_and(|target| target.color != self.piece.color)
    }

    fn open(&self, coord: Coord) -> bool {
        self.board.in_bounds(coord) && self.board.get(coord).is_none() && !self.blocked(coord)
    }

    fn pawn(&self) -> Vec<Coord> {
        let (dir, start_rank) = match self.piece.color {
            Color::White => (1, 1),
            Color::Black => (-1, self.board.height() - 2),
        };
        let mut moves = Vec::new();

        let step = self.from.offset(0, dir);
        if self.open(step) {
            moves.push(step);
            let double = self.from.offset(0, 2 * dir);
            if self.from.y == start_rank && self.open(double) {
                moves.push(double);
            }
        }

        for dx in [-1, 1] {
            let target = self.from.offset(dx, dir);
            if self.board.in_bounds(target) && !self.blocked(target) && self.is_opponent(target) {
                moves.push(target);
            }
        }
        moves
    }

    fn leaps(&self) -> Vec<Coord> {
        self.piece_type
            .directions
            .iter()
            .map(|&(dx, dy)| self.from.offset(dx, dy))
            .filter(|&to| {
                self.board.in_bounds(to)
                    && !self.blocked(to)
                    && (self.board.get(to).is_none() || self.is_opponent(to))
            })
            .collect()
    }

    fn max_steps(&self) -> i32 {
        // The range bonus only extends types with a finite base range.
        match self.piece_type.max_range {
            Some(range) => {
                let total = range.saturating_add(self.piece.state.range_bonus);
                i32::try_from(total).unwrap_or(i32::MAX)
            }
            None => self.board.width().max(self.board.height()),
        }
    }

    fn slides(&self) -> Vec<Coord> {
        let max_steps = self.max_steps();
        let mut moves = Vec::new();
        for &(dx, dy) in &self.piece_type.directions {
            if dx == 0 && dy == 0 {
                continue;
            }
            let mut to = self.from;
            for _ in 0..max_steps {
                to = to.offset(dx, dy);
                if !self.board.in_bounds(to) || self.blocked(to) {
                    break;
                }
                match self.board.get(to) {
                    None => moves.push(to),
                    Some(target) => {
                        if target.color != self.piece.color {
                            moves.push(to);
                        }
                        break;
                    }
                }
            }
        }
        moves
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::TypeChange;

    fn setup(pieces: &[(i32, i32, Color, &str)]) -> Board {
        let mut board = Board::new(8, 8);
        for &(x, y, color, name) in pieces {
            board.place(Coord::new(x, y), Piece::new(color, name, None));
        }
        board
    }

    fn sorted(mut moves: Vec<Coord>) -> Vec<Coord> {
        moves.sort();
        moves
    }

    #[test]
    fn test_pawn_single_and_double_step() {
        let board = setup(&[(4, 1, Color::White, "pawn")]);
        let registry = PieceTypeRegistry::standard();
        let moves = legal_moves(&board, &registry, true, Coord::new(4, 1));
        assert_eq!(sorted(moves), vec![Coord::new(4, 2), Coord::new(4, 3)]);
    }

    #[test]
    fn test_pawn_double_step_needs_clear_first_square() {
        let board = setup(&[(4, 6, Color::Black, "pawn"), (4, 5, Color::White, "rook")]);
        let registry = PieceTypeRegistry::standard();
        assert!(legal_moves(&board, &registry, true, Coord::new(4, 6)).is_empty());
    }

    #[test]
    fn test_pawn_diagonal_capture_only_opponent() {
        let board = setup(&[
            (3, 3, Color::White, "pawn"),
            (2, 4, Color::Black, "knight"),
            (4, 4, Color::White, "knight"),
        ]);
        let registry = PieceTypeRegistry::standard();
        let moves = sorted(legal_moves(&board, &registry, true, Coord::new(3, 3)));
        assert_eq!(moves, vec![Coord::new(2, 4), Coord::new(3, 4)]);
    }

    #[test]
    fn test_knight_leaps_over_pieces() {
        let board = setup(&[
            (1, 0, Color::White, "knight"),
            (1, 1, Color::White, "pawn"),
            (0, 1, Color::White, "pawn"),
            (2, 1, Color::White, "pawn"),
        ]);
        let registry = PieceTypeRegistry::standard();
        let moves = sorted(legal_moves(&board, &registry, true, Coord::new(1, 0)));
        assert_eq!(moves, vec![Coord::new(0, 2), Coord::new(2, 2), Coord::new(3, 1)]);
    }

    #[test]
    fn test_rook_stops_at_first_piece() {
        let board = setup(&[
            (0, 0, Color::White, "rook"),
            (0, 3, Color::Black, "pawn"),
            (2, 0, Color::White, "pawn"),
        ]);
        let registry = PieceTypeRegistry::standard();
        let moves = sorted(legal_moves(&board, &registry, true, Coord::new(0, 0)));
        assert_eq!(
            moves,
            vec![Coord::new(0, 1), Coord::new(0, 2), Coord::new(0, 3), Coord::new(1, 0)]
        );
    }

    #[test]
    fn test_damage_blocks_slider() {
        let mut board = setup(&[(0, 0, Color::White, "rook")]);
        board.mark_damaged(Coord::new(0, 2));
        let mut registry = PieceTypeRegistry::standard();

        let moves = legal_moves(&board, &registry, true, Coord::new(0, 0));
        assert!(moves.contains(&Coord::new(0, 1)));
        assert!(!moves.contains(&Coord::new(0, 2)));
        assert!(!moves.contains(&Coord::new(0, 3)));

        let moves = legal_moves(&board, &registry, false, Coord::new(0, 0));
        assert!(moves.contains(&Coord::new(0, 3)));

        registry.modify("rook", TypeChange::DamagedOk(true)).unwrap();
        let moves = legal_moves(&board, &registry, true, Coord::new(0, 0));
        assert!(moves.contains(&Coord::new(0, 2)));
    }

    #[test]
    fn test_range_bonus_extends_limited_range() {
        let mut board = setup(&[(3, 3, Color::White, "king")]);
        let registry = PieceTypeRegistry::standard();
        assert_eq!(legal_moves(&board, &registry, true, Coord::new(3, 3)).len(), 8);

        if let Some(king) = board.get_mut(Coord::new(3, 3)) {
            king.state.range_bonus = 1;
        }
        assert_eq!(legal_moves(&board, &registry, true, Coord::new(3, 3)).len(), 16);
    }

    #[test]
    fn test_unknown_type_has_no_moves() {
        let board = setup(&[(3, 3, Color::White, "ghost")]);
        let registry = PieceTypeRegistry::standard();
        assert!(legal_moves(&board, &registry, true, Coord::new(3, 3)).is_empty());
    }

    #[test]
    fn test_extreme_directions_leave_the_board() {
        let board = setup(&[(3, 3, Color::White, "rook"), (4, 4, Color::White, "knight")]);
        let mut registry = PieceTypeRegistry::standard();
        registry
            .modify("rook", TypeChange::Directions(vec![(i32::MAX, 0), (i32::MIN, i32::MIN), (1, 0)]))
            .unwrap();
        registry
            .modify("knight", TypeChange::Directions(vec![(i32::MAX, i32::MAX), (i32::MIN, 1)]))
            .unwrap();

        let moves = legal_moves(&board, &registry, true, Coord::new(3, 3));
        assert_eq!(moves, vec![Coord::new(4, 3), Coord::new(5, 3), Coord::new(6, 3), Coord::new(7, 3)]);
        assert!(legal_moves(&board, &registry, true, Coord::new(4, 4)).is_empty());
    }
}
