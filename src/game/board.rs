//! Board grid, squares and pieces.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::game::Script;

/// Smallest allowed board side.
pub const MIN_SIDE: i32 = 2;

/// Largest allowed board side.
pub const MAX_SIDE: i32 = 20;

/// A square on the board. Row 0 is rank 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coord {
    /// File index (column), 0 = file 'a'.
    pub x: i32,
    /// Rank index (row), 0 = rank 1.
    pub y: i32,
}

impl Coord {
    /// Create a new coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Coordinate displaced by `(dx, dy)`.
    ///
    /// Saturates at the `i32` limits, which are always off the board.
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x.saturating_add(dx), self.y.saturating_add(dy))
    }

    /// Chebyshev (king-move) distance between two squares.
    #[must_use]
    pub fn chebyshev(self, other: Coord) -> i32 {
        let dx = self.x.saturating_sub(other.x).saturating_abs();
        let dy = self.y.saturating_sub(other.y).saturating_abs();
        dx.max(dy)
    }

    /// Algebraic name such as `d7`.
    ///
    /// Only meaningful for non-negative coordinates below 26 files.
    #[must_use]
    pub fn to_algebraic(self) -> String {
        let file = u8::try_from(self.x)
            .ok()
            .filter(|x| *x < 26)
            .map_or('?', |x| char::from(b'a' + x));
        format!("{file}{}", self.y + 1)
    }

    /// Parse an algebraic square name such as `d7`.
    #[must_use]
    pub fn parse_algebraic(text: &str) -> Option<Self> {
        let mut chars = text.chars();
        let file = chars.next()?.to_ascii_lowercase();
        if !file.is_ascii_lowercase() {
            return None;
        }
        let rank: i32 = chars.as_str().parse().ok()?;
        if rank < 1 {
            return None;
        }
        Some(Self::new(i32::from(file as u8 - b'a'), rank - 1))
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_algebraic())
    }
}

/// Side a piece belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    /// Moves first; pawns advance towards higher ranks.
    White,
    /// Moves second; pawns advance towards rank 1.
    Black,
}

impl Color {
    /// The other side.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// Lowercase name used in labels and documents.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Color::White => "white",
            Color::Black => "black",
        }
    }

    /// Parse `white` / `black` (case-insensitive).
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        match text.to_ascii_lowercase().as_str() {
            "white" => Some(Color::White),
            "black" => Some(Color::Black),
            _ => None,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mutable per-instance state driven by scripts and chunk zones.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PieceState {
    /// Script that replaces the type's default for this piece.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub script_override: Option<Script>,
    /// Extra slider range earned through `charge`.
    pub range_bonus: u32,
    /// Extra explosion radius earned through `heat`.
    pub heat_bonus: u32,
    /// Moves left before `decay` removes the piece. Unset until the first move.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decay_left: Option<u32>,
    /// Moves counted towards the next `charge` bonus.
    pub charge_count: u32,
    /// Moves counted towards the next `heat` bonus.
    pub heat_count: u32,
    /// Number of completed moves under `entropy`.
    pub entropy_level: u32,
}

impl PieceState {
    /// True when nothing distinguishes this state from a fresh piece.
    #[must_use]
    pub fn is_fresh(&self) -> bool {
        *self == Self::default()
    }
}

/// A piece standing on the board.
#[derive(Debug, Clone, PartialEq)]
pub struct Piece {
    /// Owning side.
    pub color: Color,
    /// Name of the piece type in the registry.
    pub type_name: String,
    /// Display symbol.
    pub symbol: String,
    /// Script-driven instance state.
    pub state: PieceState,
}

impl Piece {
    /// Create a piece with fresh state.
    ///
    /// Without an explicit symbol the uppercased first letter of the type name is used.
    #[must_use]
    pub fn new(color: Color, type_name: &str, symbol: Option<&str>) -> Self {
        let symbol = symbol.map_or_else(|| default_symbol(type_name), str::to_string);
        Self {
            color,
            type_name: type_name.to_string(),
            symbol,
            state: PieceState::default(),
        }
    }

    /// Label such as `white_queen`.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{}_{}", self.color, self.type_name)
    }
}

/// Uppercased first character of a type name.
#[must_use]
pub fn default_symbol(type_name: &str) -> String {
    type_name
        .chars()
        .next()
        .map(|c| c.to_uppercase().collect())
        .unwrap_or_else(|| "?".to_string())
}

/// Distances from a square to the four board edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeDistances {
    /// Distance to file 0.
    pub left: i32,
    /// Distance to the last file.
    pub right: i32,
    /// Distance to rank 0.
    pub bottom: i32,
    /// Distance to the last rank.
    pub top: i32,
}

impl EdgeDistances {
    /// The smallest of the four distances.
    #[must_use]
    pub fn min(&self) -> i32 {
        self.left.min(self.right).min(self.bottom).min(self.top)
    }
}

/// The board: a dense grid of optional pieces plus a set of damaged squares.
#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    /// Number of files.
    width: i32,
    /// Number of ranks.
    height: i32,
    /// Cells stored in row-major order, rank 0 first.
    cells: Vec<Option<Piece>>,
    /// Damaged squares; always in bounds.
    damaged: BTreeSet<Coord>,
}

impl Board {
    /// Create an empty board. Each side is clamped to `[MIN_SIDE, MAX_SIDE]`.
    #[must_use]
    pub fn new(width: i32, height: i32) -> Self {
        let width = width.clamp(MIN_SIDE, MAX_SIDE);
        let height = height.clamp(MIN_SIDE, MAX_SIDE);
        let size = usize::try_from(width * height).unwrap_or_default();
        Self {
            width,
            height,
            cells: vec![None; size],
            damaged: BTreeSet::new(),
        }
    }

    /// Number of files.
    #[must_use]
    pub const fn width(&self) -> i32 {
        self.width
    }

    /// Number of ranks.
    #[must_use]
    pub const fn height(&self) -> i32 {
        self.height
    }

    /// Check if a coordinate is on the board.
    #[must_use]
    pub const fn in_bounds(&self, coord: Coord) -> bool {
        coord.x >= 0 && coord.y >= 0 && coord.x < self.width && coord.y < self.height
    }

    fn index(&self, coord: Coord) -> Option<usize> {
        if self.in_bounds(coord) {
            usize::try_from(coord.y * self.width + coord.x).ok()
        } else {
            None
        }
    }

    /// Piece on a square, if any.
    #[must_use]
    pub fn get(&self, coord: Coord) -> Option<&Piece> {
        self.index(coord).and_then(|idx| self.cells[idx].as_ref())
    }

    /// Mutable piece on a square, if any.
    #[must_use]
    pub fn get_mut(&mut self, coord: Coord) -> Option<&mut Piece> {
        self.index(coord).and_then(|idx| self.cells[idx].as_mut())
    }

    /// Put a piece on a square, replacing any occupant.
    ///
    /// Returns `false` if the coordinate is out of bounds.
    pub fn place(&mut self, coord: Coord, piece: Piece) -> bool {
        if let Some(idx) = self.index(coord) {
            self.cells[idx] = Some(piece);
            true
        } else {
            false
        }
    }

    /// Remove and return the piece on a square.
    pub fn take(&mut self, coord: Coord) -> Option<Piece> {
        self.index(coord).and_then(|idx| self.cells[idx].take())
    }

    /// Remove every piece and repair every square.
    pub fn clear(&mut self) {
        self.cells.iter_mut().for_each(|cell| *cell = None);
        self.damaged.clear();
    }

    /// Check if a square is damaged.
    #[must_use]
    pub fn is_damaged(&self, coord: Coord) -> bool {
        self.damaged.contains(&coord)
    }

    /// Mark a square damaged. Out-of-bounds squares are ignored.
    pub fn mark_damaged(&mut self, coord: Coord) {
        if self.in_bounds(coord) {
            self.damaged.insert(coord);
        }
    }

    /// Remove the damage flag from a square.
    pub fn repair(&mut self, coord: Coord) {
        self.damaged.remove(&coord);
    }

    /// Damaged squares in ascending order.
    pub fn damaged(&self) -> impl Iterator<Item = Coord> + '_ {
        self.damaged.iter().copied()
    }

    /// Iterate over occupied squares, rank 0 first.
    pub fn pieces(&self) -> impl Iterator<Item = (Coord, &Piece)> {
        let width = self.width;
        self.cells.iter().enumerate().filter_map(move |(idx, cell)| {
            let idx = i32::try_from(idx).ok()?;
            cell.as_ref()
                .map(|piece| (Coord::new(idx % width, idx / width), piece))
        })
    }

    /// Number of pieces of one side.
    #[must_use]
    pub fn count(&self, color: Color) -> usize {
        self.pieces().filter(|(_, p)| p.color == color).count()
    }

    /// In-bounds squares within Chebyshev `radius` of `center`, including it.
    ///
    /// Only the part of the window that overlaps the board is walked, so any
    /// radius costs at most one pass over the board.
    pub fn squares_within(&self, center: Coord, radius: i32) -> impl Iterator<Item = Coord> + '_ {
        let radius = radius.max(0);
        let xs = center.x.saturating_sub(radius).max(0)..=center.x.saturating_add(radius).min(self.width - 1);
        let ys = center.y.saturating_sub(radius).max(0)..=center.y.saturating_add(radius).min(self.height - 1);
        ys.flat_map(move |y| xs.clone().map(move |x| Coord::new(x, y)))
    }

    /// Distances from a square to each edge.
    #[must_use]
    pub const fn edge_distances(&self, coord: Coord) -> EdgeDistances {
        EdgeDistances {
            left: coord.x,
            right: self.width - 1 - coord.x,
            bottom: coord.y,
            top: self.height - 1 - coord.y,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_algebraic_round_trip() {
        assert_eq!(Coord::new(3, 6).to_algebraic(), "d7");
        assert_eq!(Coord::parse_algebraic("d7"), Some(Coord::new(3, 6)));
        assert_eq!(Coord::parse_algebraic("A1"), Some(Coord::new(0, 0)));
        assert_eq!(Coord::parse_algebraic("t20"), Some(Coord::new(19, 19)));
        assert_eq!(Coord::parse_algebraic("d0"), None);
        assert_eq!(Coord::parse_algebraic("7d"), None);
        assert_eq!(Coord::parse_algebraic(""), None);
    }

    #[test]
    fn test_board_dimensions_clamped() {
        let board = Board::new(1, 50);
        assert_eq!(board.width(), MIN_SIDE);
        assert_eq!(board.height(), MAX_SIDE);
    }

    #[test]
    fn test_place_take() {
        let mut board = Board::new(8, 8);
        assert!(board.place(Coord::new(2, 3), Piece::new(Color::White, "rook", None)));
        assert!(!board.place(Coord::new(8, 0), Piece::new(Color::White, "rook", None)));
        assert_eq!(board.get(Coord::new(2, 3)).map(|p| p.symbol.as_str()), Some("R"));
        assert_eq!(board.count(Color::White), 1);

        let piece = board.take(Coord::new(2, 3)).unwrap();
        assert_eq!(piece.label(), "white_rook");
        assert!(board.get(Coord::new(2, 3)).is_none());
    }

    #[test]
    fn test_damage_stays_in_bounds() {
        let mut board = Board::new(4, 4);
        board.mark_damaged(Coord::new(-1, 0));
        board.mark_damaged(Coord::new(4, 4));
        board.mark_damaged(Coord::new(1, 1));
        assert_eq!(board.damaged().collect::<Vec<_>>(), vec![Coord::new(1, 1)]);

        board.repair(Coord::new(1, 1));
        assert!(!board.is_damaged(Coord::new(1, 1)));
    }

    #[test]
    fn test_squares_within_corner() {
        let board = Board::new(8, 8);
        let squares: Vec<_> = board.squares_within(Coord::new(0, 0), 1).collect();
        assert_eq!(squares.len(), 4);
        assert!(squares.contains(&Coord::new(1, 1)));
    }

    #[test]
    fn test_squares_within_huge_radius() {
        let board = Board::new(8, 8);
        assert_eq!(board.squares_within(Coord::new(3, 3), i32::MAX).count(), 64);
        assert_eq!(board.squares_within(Coord::new(-5, 3), 2).count(), 0);
        assert_eq!(board.squares_within(Coord::new(i32::MAX, 0), i32::MAX).count(), 64);
    }

    #[test]
    fn test_offset_saturates_off_board() {
        let board = Board::new(8, 8);
        let far = Coord::new(3, 3).offset(i32::MAX, i32::MIN);
        assert_eq!(far, Coord::new(i32::MAX, i32::MIN));
        assert!(!board.in_bounds(far));
        assert_eq!(Coord::new(i32::MIN, 0).chebyshev(Coord::new(i32::MAX, 0)), i32::MAX);
    }

    #[test]
    fn test_edge_distances() {
        let board = Board::new(8, 6);
        let d = board.edge_distances(Coord::new(1, 4));
        assert_eq!((d.left, d.right, d.bottom, d.top), (1, 6, 4, 1));
        assert_eq!(d.min(), 1);
    }

    #[test]
    fn test_pieces_iterates_row_major() {
        let mut board = Board::new(3, 3);
        board.place(Coord::new(2, 0), Piece::new(Color::Black, "pawn", None));
        board.place(Coord::new(0, 1), Piece::new(Color::White, "king", Some("K")));
        let coords: Vec<_> = board.pieces().map(|(c, _)| c).collect();
        assert_eq!(coords, vec![Coord::new(2, 0), Coord::new(0, 1)]);
    }
}
