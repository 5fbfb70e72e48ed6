//! Named rectangular board regions.
//!
//! A chunk can be switched off (its squares are voided: cleared and damaged)
//! and back on (repaired and optionally refilled). Active chunks may also
//! rewrite the script of pieces entering or leaving them.

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::{EngineError, EngineResult};
use crate::game::{Board, Color, Coord, Piece, PieceTypeRegistry, Script};

/// Inclusive rectangle, always stored with `x1 <= x2` and `y1 <= y2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    x1: i32,
    y1: i32,
    x2: i32,
    y2: i32,
}

impl Rect {
    /// Build a rectangle from two corners in any order.
    #[must_use]
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self {
            x1: x1.min(x2),
            y1: y1.min(y2),
            x2: x1.max(x2),
            y2: y1.max(y2),
        }
    }

    /// Corners as `[x1, y1, x2, y2]`.
    #[must_use]
    pub const fn corners(&self) -> [i32; 4] {
        [self.x1, self.y1, self.x2, self.y2]
    }

    /// Check if a square lies inside the rectangle.
    #[must_use]
    pub const fn contains(&self, coord: Coord) -> bool {
        coord.x >= self.x1 && coord.x <= self.x2 && coord.y >= self.y1 && coord.y <= self.y2
    }

    /// Width in squares.
    #[must_use]
    pub const fn width(&self) -> i32 {
        self.x2 - self.x1 + 1
    }

    /// Height in squares.
    #[must_use]
    pub const fn height(&self) -> i32 {
        self.y2 - self.y1 + 1
    }

    /// Squares of the rectangle that are on the board, rank 0 first.
    pub fn cells_on<'a>(&self, board: &'a Board) -> impl Iterator<Item = Coord> + 'a {
        let Self { x1, y1, x2, y2 } = *self;
        (y1..=y2)
            .flat_map(move |y| (x1..=x2).map(move |x| Coord::new(x, y)))
            .filter(move |coord| board.in_bounds(*coord))
    }
}

/// Which side may trigger a chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChunkOwner {
    /// Either side.
    #[default]
    Any,
    /// Only this side.
    Side(Color),
}

impl ChunkOwner {
    /// Check if `color` is allowed to trigger the chunk.
    #[must_use]
    pub fn admits(self, color: Color) -> bool {
        match self {
            Self::Any => true,
            Self::Side(owner) => owner == color,
        }
    }

    /// Parse `any`, `white` or `black`.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        if text.eq_ignore_ascii_case("any") {
            return Some(Self::Any);
        }
        Color::parse(text).map(Self::Side)
    }

    /// Lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Any => "any",
            Self::Side(color) => color.as_str(),
        }
    }
}

/// Pieces placed on empty squares when a chunk is switched on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkFill {
    /// Side of the new pieces.
    pub color: Color,
    /// Piece type of the new pieces.
    pub type_name: String,
}

/// Script change applied to a piece entering or leaving a chunk.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScriptOverride {
    /// Remove the piece's script override.
    Clear,
    /// Replace the piece's script override.
    Set(Script),
}

impl ScriptOverride {
    fn apply_to(self, piece: &mut Piece) {
        piece.state.script_override = match self {
            Self::Clear => None,
            Self::Set(script) => Some(script),
        };
    }
}

/// A named board region.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    /// Region covered.
    pub rect: Rect,
    /// Whether the region is currently playable.
    pub active: bool,
    /// Optional refill on activation.
    pub fill: Option<ChunkFill>,
    /// Side allowed to trigger it.
    pub owner: ChunkOwner,
    /// Applied to pieces moving in.
    pub enter_script: Option<ScriptOverride>,
    /// Applied to pieces moving out.
    pub leave_script: Option<ScriptOverride>,
}

impl Chunk {
    /// An active chunk with no fill, owner or scripts.
    #[must_use]
    pub const fn new(rect: Rect) -> Self {
        Self {
            rect,
            active: true,
            fill: None,
            owner: ChunkOwner::Any,
            enter_script: None,
            leave_script: None,
        }
    }
}

/// Result of a toggle request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    /// The chunk was switched on.
    Enabled,
    /// The chunk was switched off and its squares voided.
    Disabled,
    /// The mover does not own the chunk; nothing changed.
    Refused,
}

/// Enter or leave side of a chunk boundary crossing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Crossing {
    /// The piece moved into the chunk.
    Enter,
    /// The piece moved out of the chunk.
    Leave,
}

/// All chunks of a session, keyed by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChunkSet {
    chunks: BTreeMap<String, Chunk>,
    spawned: u32,
}

impl ChunkSet {
    /// Empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a chunk.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Chunk> {
        self.chunks.get(name)
    }

    /// Check if a chunk exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.chunks.contains_key(name)
    }

    /// Iterate over chunks in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Chunk)> {
        self.chunks.iter().map(|(name, chunk)| (name.as_str(), chunk))
    }

    /// Number of chunks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// True when there are no chunks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Drop every chunk and restart spawned-name numbering.
    pub fn clear(&mut self) {
        self.chunks.clear();
        self.spawned = 0;
    }

    /// Insert or replace a chunk.
    pub fn insert(&mut self, name: &str, chunk: Chunk) {
        self.chunks.insert(name.to_string(), chunk);
    }

    /// Define (or redefine) a chunk over `rect`: active, owner any, no fill or scripts.
    pub fn define(&mut self, name: &str, rect: Rect) {
        self.insert(name, Chunk::new(rect));
    }

    /// Mutable access to a named chunk.
    ///
    /// # Errors
    ///
    /// Returns `UnknownReference` if the chunk does not exist.
    pub fn get_mut(&mut self, name: &str) -> EngineResult<&mut Chunk> {
        self.chunks
            .get_mut(name)
            .ok_or_else(|| EngineError::unknown_chunk(name))
    }

    /// Fresh name of the form `rand_N` not used by any chunk.
    pub fn next_spawn_name(&mut self) -> String {
        loop {
            let name = format!("rand_{}", self.spawned);
            self.spawned = self.spawned.wrapping_add(1);
            if !self.contains(&name) {
                return name;
            }
        }
    }

    /// Flip a chunk between active and voided.
    ///
    /// With `mover` set, a chunk owned by the other side refuses the toggle.
    /// Switching off clears and damages every on-board square of the chunk;
    /// switching on repairs them and, if the chunk has a fill, places a new
    /// piece on each empty square (registering unknown fill types as queen-like).
    ///
    /// # Errors
    ///
    /// Returns `UnknownReference` if the chunk does not exist.
    pub fn toggle(
        &mut self,
        name: &str,
        mover: Option<Color>,
        board: &mut Board,
        registry: &mut PieceTypeRegistry,
    ) -> EngineResult<Toggle> {
        let chunk = self.get_mut(name)?;
        if mover.is_some_and(|color| !chunk.owner.admits(color)) {
            return Ok(Toggle::Refused);
        }

        let cells: Vec<Coord> = chunk.rect.cells_on(board).collect();
        if chunk.active {
            for &coord in &cells {
                board.take(coord);
                board.mark_damaged(coord);
            }
            chunk.active = false;
            debug!(chunk = name, "chunk disabled");
            return Ok(Toggle::Disabled);
        }

        for &coord in &cells {
            board.repair(coord);
        }
        chunk.active = true;
        if let Some(fill) = &chunk.fill {
            registry.ensure(&fill.type_name);
            for &coord in &cells {
                if board.get(coord).is_none() {
                    board.place(coord, Piece::new(fill.color, &fill.type_name, None));
                }
            }
        }
        debug!(chunk = name, "chunk enabled");
        Ok(Toggle::Enabled)
    }

    /// Apply enter/leave scripts to a piece that moved from `from` to `to`.
    ///
    /// Only active chunks the piece's side may trigger are considered.
    /// Returns the crossings that carried a script, in chunk name order.
    pub fn on_move_completed(&self, piece: &mut Piece, from: Coord, to: Coord) -> Vec<(String, Crossing)> {
        let mut crossings = Vec::new();
        for (name, chunk) in &self.chunks {
            if !chunk.active || !chunk.owner.admits(piece.color) {
                continue;
            }
            let was_in = chunk.rect.contains(from);
            let is_in = chunk.rect.contains(to);
            let (script, crossing) = match (was_in, is_in) {
                (false, true) => (chunk.enter_script, Crossing::Enter),
                (true, false) => (chunk.leave_script, Crossing::Leave),
                _ => continue,
            };
            if let Some(script) = script {
                script.apply_to(piece);
                crossings.push((name.clone(), crossing));
            }
        }
        crossings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::ScriptKind;

    fn corner_chunk() -> (ChunkSet, Board, PieceTypeRegistry) {
        let mut chunks = ChunkSet::new();
        chunks.define("z1", Rect::new(1, 1, 0, 0));
        chunks.get_mut("z1").unwrap().fill = Some(ChunkFill {
            color: Color::White,
            type_name: "pawn".to_string(),
        });
        (chunks, Board::new(8, 8), PieceTypeRegistry::standard())
    }

    #[test]
    fn test_rect_is_normalized() {
        let rect = Rect::new(5, 7, 2, 3);
        assert_eq!(rect.corners(), [2, 3, 5, 7]);
        assert_eq!((rect.width(), rect.height()), (4, 5));
        assert!(rect.contains(Coord::new(2, 7)));
        assert!(!rect.contains(Coord::new(6, 7)));
    }

    #[test]
    fn test_toggle_voids_and_refills() {
        let (mut chunks, mut board, mut registry) = corner_chunk();
        board.place(Coord::new(0, 0), Piece::new(Color::Black, "rook", None));

        let t = chunks.toggle("z1", None, &mut board, &mut registry).unwrap();
        assert_eq!(t, Toggle::Disabled);
        assert_eq!(board.pieces().count(), 0);
        assert_eq!(board.damaged().count(), 4);

        let t = chunks.toggle("z1", None, &mut board, &mut registry).unwrap();
        assert_eq!(t, Toggle::Enabled);
        assert_eq!(board.damaged().count(), 0);
        assert_eq!(board.count(Color::White), 4);
        assert!(board.pieces().all(|(_, p)| p.type_name == "pawn"));
    }

    #[test]
    fn test_ownership_refuses_edge_toggle() {
        let (mut chunks, mut board, mut registry) = corner_chunk();
        chunks.get_mut("z1").unwrap().owner = ChunkOwner::Side(Color::White);

        let t = chunks
            .toggle("z1", Some(Color::Black), &mut board, &mut registry)
            .unwrap();
        assert_eq!(t, Toggle::Refused);
        assert!(chunks.get("z1").unwrap().active);

        let t = chunks.toggle("z1", None, &mut board, &mut registry).unwrap();
        assert_eq!(t, Toggle::Disabled);
    }

    #[test]
    fn test_unknown_fill_type_is_registered() {
        let (mut chunks, mut board, mut registry) = corner_chunk();
        chunks.get_mut("z1").unwrap().fill = Some(ChunkFill {
            color: Color::Black,
            type_name: "wyvern".to_string(),
        });
        chunks.toggle("z1", None, &mut board, &mut registry).unwrap();
        chunks.toggle("z1", None, &mut board, &mut registry).unwrap();
        assert!(registry.contains("wyvern"));
        assert_eq!(board.get(Coord::new(1, 1)).map(|p| p.symbol.as_str()), Some("W"));
    }

    #[test]
    fn test_unknown_chunk() {
        let (mut chunks, mut board, mut registry) = corner_chunk();
        assert!(chunks.toggle("nope", None, &mut board, &mut registry).is_err());
    }

    #[test]
    fn test_enter_and_leave_scripts() {
        let mut chunks = ChunkSet::new();
        chunks.define("hot", Rect::new(0, 0, 3, 3));
        let hot = chunks.get_mut("hot").unwrap();
        hot.enter_script = Some(ScriptOverride::Set(Script::new(ScriptKind::Heat, 2.0)));
        hot.leave_script = Some(ScriptOverride::Clear);

        let mut piece = Piece::new(Color::White, "rook", None);
        let crossings = chunks.on_move_completed(&mut piece, Coord::new(5, 5), Coord::new(2, 2));
        assert_eq!(crossings, vec![("hot".to_string(), Crossing::Enter)]);
        assert_eq!(piece.state.script_override.map(|s| s.kind), Some(ScriptKind::Heat));

        chunks.on_move_completed(&mut piece, Coord::new(2, 2), Coord::new(2, 3));
        assert!(piece.state.script_override.is_some());

        chunks.on_move_completed(&mut piece, Coord::new(2, 3), Coord::new(6, 3));
        assert_eq!(piece.state.script_override, None);
    }

    #[test]
    fn test_crossings_follow_name_order() {
        let mut chunks = ChunkSet::new();
        chunks.define("a_east", Rect::new(4, 0, 7, 7));
        chunks.define("b_west", Rect::new(0, 0, 3, 7));
        chunks.get_mut("a_east").unwrap().enter_script =
            Some(ScriptOverride::Set(Script::new(ScriptKind::Jitter, 0.5)));
        chunks.get_mut("b_west").unwrap().leave_script =
            Some(ScriptOverride::Set(Script::new(ScriptKind::Charge, 2.0)));

        let mut piece = Piece::new(Color::White, "rook", None);
        let crossings = chunks.on_move_completed(&mut piece, Coord::new(1, 1), Coord::new(6, 1));
        assert_eq!(
            crossings,
            vec![("a_east".to_string(), Crossing::Enter), ("b_west".to_string(), Crossing::Leave)]
        );
        // The later chunk's script wins
        assert_eq!(piece.state.script_override.map(|s| s.kind), Some(ScriptKind::Charge));
    }

    #[test]
    fn test_spawn_names_skip_taken() {
        let mut chunks = ChunkSet::new();
        chunks.define("rand_0", Rect::new(0, 0, 0, 0));
        assert_eq!(chunks.next_spawn_name(), "rand_1");
        assert_eq!(chunks.next_spawn_name(), "rand_2");
    }
}
