//! Edge-proximity triggers.

use rand::Rng;
use rand::seq::SliceRandom;
use tracing::{debug, warn};

use crate::game::{Board, Chunk, ChunkSet, Color, Coord, PieceTypeRegistry, Rect, Toggle};

/// Which piece types fire a trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeFilter {
    /// Every type.
    Any,
    /// Only this type name.
    Exact(String),
}

impl TypeFilter {
    /// Parse `any` or a type name.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        if text.eq_ignore_ascii_case("any") {
            Self::Any
        } else {
            Self::Exact(text.to_string())
        }
    }

    /// Check if a type name passes the filter.
    #[must_use]
    pub fn matches(&self, type_name: &str) -> bool {
        match self {
            Self::Any => true,
            Self::Exact(name) => name == type_name,
        }
    }

    /// Filter as written in documents.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Any => "any",
            Self::Exact(name) => name,
        }
    }
}

/// Size range of randomly spawned chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpawnBounds {
    /// Smallest width.
    pub min_w: i32,
    /// Largest width.
    pub max_w: i32,
    /// Smallest height.
    pub min_h: i32,
    /// Largest height.
    pub max_h: i32,
}

impl SpawnBounds {
    /// Bounds with minimums raised to 1 and maximums raised to the minimums.
    #[must_use]
    pub fn new(min_w: i32, max_w: i32, min_h: i32, max_h: i32) -> Self {
        let min_w = min_w.max(1);
        let min_h = min_h.max(1);
        Self {
            min_w,
            max_w: max_w.max(min_w),
            min_h,
            max_h: max_h.max(min_h),
        }
    }
}

/// What a trigger does when it fires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EdgeAction {
    /// Toggle an existing chunk on behalf of the mover.
    ToggleChunk(String),
    /// Spawn a new chunk attached to the nearest edge.
    SpawnRandom(SpawnBounds),
}

/// A trigger that fires when a piece lands within `distance` of an edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeTrigger {
    /// Type filter.
    pub filter: TypeFilter,
    /// Maximum distance to the nearest edge.
    pub distance: u32,
    /// Effect.
    pub action: EdgeAction,
}

/// The board edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    /// File 0.
    Left,
    /// Last file.
    Right,
    /// Rank 0.
    Bottom,
    /// Last rank.
    Top,
}

/// Something a fired trigger did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EdgeReaction {
    /// A chunk was toggled (or the toggle refused).
    Toggled {
        /// Chunk name.
        chunk: String,
        /// What happened.
        result: Toggle,
    },
    /// A new chunk was spawned.
    Spawned {
        /// Generated chunk name.
        chunk: String,
        /// Region covered.
        rect: Rect,
        /// Edge it is attached to.
        edge: Edge,
    },
}

/// Fire every trigger matching a piece of `color`/`type_name` that landed on `at`.
///
/// Triggers run in registration order, so a spawn can be toggled by a later
/// trigger. Toggles of unknown chunks are logged and skipped.
#[allow(clippy::too_many_arguments)]
pub fn fire_triggers<R: Rng>(
    triggers: &[EdgeTrigger],
    color: Color,
    type_name: &str,
    at: Coord,
    board: &mut Board,
    registry: &mut PieceTypeRegistry,
    chunks: &mut ChunkSet,
    rng: &mut R,
) -> Vec<EdgeReaction> {
    let mut reactions = Vec::new();
    if !board.in_bounds(at) {
        return reactions;
    }
    let min_dist = board.edge_distances(at).min();

    for trigger in triggers {
        if !trigger.filter.matches(type_name) {
            continue;
        }
        if i64::from(min_dist) > i64::from(trigger.distance) {
            continue;
        }
        match &trigger.action {
            EdgeAction::ToggleChunk(name) => match chunks.toggle(name, Some(color), board, registry) {
                Ok(result) => {
                    debug!(chunk = %name, ?result, "edge trigger toggled chunk");
                    reactions.push(EdgeReaction::Toggled {
                        chunk: name.clone(),
                        result,
                    });
                }
                Err(err) => warn!(chunk = %name, %err, "edge trigger skipped"),
            },
            EdgeAction::SpawnRandom(bounds) => {
                let (edge, rect) = spawn_rect(board, at, *bounds, rng);
                let name = chunks.next_spawn_name();
                chunks.insert(&name, Chunk::new(rect));
                debug!(chunk = %name, ?edge, ?rect, "edge trigger spawned chunk");
                reactions.push(EdgeReaction::Spawned { chunk: name, rect, edge });
            }
        }
    }
    reactions
}

/// Pick a nearest edge and a random-size rectangle attached to it, centred on `at`.
pub fn spawn_rect<R: Rng>(board: &Board, at: Coord, bounds: SpawnBounds, rng: &mut R) -> (Edge, Rect) {
    let d = board.edge_distances(at);
    let min = d.min();
    let nearest: Vec<Edge> = [
        (Edge::Left, d.left),
        (Edge::Right, d.right),
        (Edge::Bottom, d.bottom),
        (Edge::Top, d.top),
    ]
    .into_iter()
    .filter(|&(_, dist)| dist == min)
    .map(|(edge, _)| edge)
    .collect();
    let edge = nearest.choose(rng).copied().unwrap_or(Edge::Left);

    let cols = board.width();
    let rows = board.height();
    let w = pick_size(bounds.min_w, bounds.max_w, cols, rng);
    let h = pick_size(bounds.min_h, bounds.max_h, rows, rng);

    let rect = match edge {
        Edge::Left | Edge::Right => {
            let y1 = (at.y - h / 2).max(0);
            let y2 = (y1 + h - 1).min(rows - 1);
            if edge == Edge::Left {
                Rect::new(0, y1, (w - 1).min(cols - 1), y2)
            } else {
                Rect::new((cols - w).max(0), y1, cols - 1, y2)
            }
        }
        Edge::Bottom | Edge::Top => {
            let x1 = (at.x - w / 2).max(0);
            let x2 = (x1 + w - 1).min(cols - 1);
            if edge == Edge::Bottom {
                Rect::new(x1, 0, x2, (h - 1).min(rows - 1))
            } else {
                Rect::new(x1, (rows - h).max(0), x2, rows - 1)
            }
        }
    };
    (edge, rect)
}

fn pick_size<R: Rng>(min: i32, max: i32, side: i32, rng: &mut R) -> i32 {
    let hi = max.min(side).max(1);
    let lo = min.clamp(1, hi);
    rng.gen_range(lo..=hi)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Piece;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn fixed(size: i32) -> SpawnBounds {
        SpawnBounds::new(size, size, size, size)
    }

    #[test]
    fn test_spawn_on_left_edge() {
        let board = Board::new(8, 8);
        let mut rng = SmallRng::seed_from_u64(3);
        let (edge, rect) = spawn_rect(&board, Coord::new(0, 4), fixed(2), &mut rng);
        assert_eq!(edge, Edge::Left);
        assert_eq!(rect.corners(), [0, 3, 1, 4]);
    }

    #[test]
    fn test_spawn_clamped_at_corner() {
        let board = Board::new(8, 8);
        let mut rng = SmallRng::seed_from_u64(3);
        for _ in 0..20 {
            let (_, rect) = spawn_rect(&board, Coord::new(7, 7), fixed(4), &mut rng);
            let [x1, y1, x2, y2] = rect.corners();
            assert!(x1 >= 0 && y1 >= 0 && x2 <= 7 && y2 <= 7);
            assert!(rect.contains(Coord::new(7, 7)));
        }
    }

    #[test]
    fn test_oversized_bounds_clamp_to_board() {
        let board = Board::new(4, 3);
        let mut rng = SmallRng::seed_from_u64(11);
        let (_, rect) = spawn_rect(&board, Coord::new(0, 1), SpawnBounds::new(10, 12, 9, 9), &mut rng);
        assert_eq!((rect.width(), rect.height()), (4, 3));
    }

    #[test]
    fn test_fire_respects_distance_and_filter() {
        let mut board = Board::new(8, 8);
        board.place(Coord::new(3, 3), Piece::new(Color::White, "rook", None));
        let mut registry = PieceTypeRegistry::standard();
        let mut chunks = ChunkSet::new();
        let mut rng = SmallRng::seed_from_u64(5);
        let triggers = vec![
            EdgeTrigger {
                filter: TypeFilter::parse("any"),
                distance: 1,
                action: EdgeAction::SpawnRandom(fixed(2)),
            },
            EdgeTrigger {
                filter: TypeFilter::parse("knight"),
                distance: 7,
                action: EdgeAction::SpawnRandom(fixed(2)),
            },
        ];

        let reactions = fire_triggers(
            &triggers, Color::White, "rook", Coord::new(3, 3), &mut board, &mut registry, &mut chunks, &mut rng,
        );
        assert!(reactions.is_empty());

        let reactions = fire_triggers(
            &triggers, Color::White, "rook", Coord::new(3, 0), &mut board, &mut registry, &mut chunks, &mut rng,
        );
        assert_eq!(reactions.len(), 1);
        assert!(chunks.contains("rand_0"));
    }

    #[test]
    fn test_unknown_chunk_is_skipped() {
        let mut board = Board::new(8, 8);
        let mut registry = PieceTypeRegistry::standard();
        let mut chunks = ChunkSet::new();
        let mut rng = SmallRng::seed_from_u64(5);
        let triggers = vec![EdgeTrigger {
            filter: TypeFilter::Any,
            distance: 0,
            action: EdgeAction::ToggleChunk("gone".to_string()),
        }];
        let reactions = fire_triggers(
            &triggers, Color::Black, "pawn", Coord::new(0, 0), &mut board, &mut registry, &mut chunks, &mut rng,
        );
        assert!(reactions.is_empty());
    }
}
