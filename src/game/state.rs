//! Engine state and the structured mutation API.

use std::collections::VecDeque;
use std::time::Duration;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::error::{EngineError, EngineResult, IllegalMove};
use crate::game::capture::{Explosion, resolve_capture};
use crate::game::edge::{EdgeReaction, fire_triggers};
use crate::game::invariants::assert_invariants;
use crate::game::scripts::{PostMove, PreMove, effective_script, post_move, pre_move};
use crate::game::victory::{evaluate, limit_outcome};
use crate::game::{
    Board, ChunkFill, ChunkOwner, ChunkSet, Clock, Color, Coord, Crossing, EdgeAction, EdgeTrigger, Event,
    GameOutcome, GameOver, MoveApplied, Piece, PieceTypeRegistry, Rect, RuleChange, RulesConfig, ScriptOverride,
    SystemClock, Toggle, TypeChange, legal_moves,
};

/// Standard board side.
pub const STANDARD_SIDE: i32 = 8;

/// Everything that makes up a position and its rules.
///
/// This is the unit the codec exports and imports; an import builds a whole
/// new `Session` before swapping it in.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    /// Pieces and damage.
    pub board: Board,
    /// Piece types.
    pub registry: PieceTypeRegistry,
    /// Rule configuration.
    pub rules: RulesConfig,
    /// Chunks.
    pub chunks: ChunkSet,
    /// Edge triggers, in firing order.
    pub triggers: Vec<EdgeTrigger>,
    /// Side to move.
    pub turn: Color,
    /// Full-move counter, starting at 1, incremented after Black moves.
    pub fullmove: u32,
}

impl Session {
    /// Standard chess setup with default rules and types.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            board: standard_board(),
            registry: PieceTypeRegistry::standard(),
            rules: RulesConfig::default(),
            chunks: ChunkSet::new(),
            triggers: Vec::new(),
            turn: Color::White,
            fullmove: 1,
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::standard()
    }
}

/// The standard 8x8 starting position.
#[must_use]
pub fn standard_board() -> Board {
    const BACK_RANK: [(&str, &str); 8] = [
        ("rook", "R"),
        ("knight", "N"),
        ("bishop", "B"),
        ("queen", "Q"),
        ("king", "K"),
        ("bishop", "B"),
        ("knight", "N"),
        ("rook", "R"),
    ];

    let mut board = Board::new(STANDARD_SIDE, STANDARD_SIDE);
    for (x, (name, symbol)) in (0..).zip(BACK_RANK) {
        board.place(Coord::new(x, 0), Piece::new(Color::White, name, Some(symbol)));
        board.place(Coord::new(x, 1), Piece::new(Color::White, "pawn", Some("P")));
        board.place(Coord::new(x, 6), Piece::new(Color::Black, "pawn", Some("P")));
        board.place(Coord::new(x, 7), Piece::new(Color::Black, name, Some(symbol)));
    }
    board
}

/// Details of an applied move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedMove {
    /// Source square.
    pub from: Coord,
    /// Square actually reached (may differ from the request after a redirect).
    pub to: Coord,
    /// Label of the captured piece.
    pub captured: Option<String>,
    /// Explosion, if one went off.
    pub explosion: Option<Explosion>,
    /// The mover is still standing on `to` after every reaction.
    pub survived: bool,
    /// Edge trigger reactions.
    pub reactions: Vec<EdgeReaction>,
    /// Result, if this move ended the game.
    pub outcome: Option<GameOutcome>,
}

/// Result of an accepted move attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    /// A script cancelled the move before anything changed; the turn did not pass.
    Cancelled,
    /// The move was applied.
    Applied(AppliedMove),
}

/// The rule engine: one game session plus its random source, clock and event queue.
#[derive(Debug)]
pub struct Engine<R: Rng = SmallRng> {
    session: Session,
    outcome: Option<GameOutcome>,
    last_move: Option<(Coord, Coord)>,
    events: VecDeque<Event>,
    clock: Box<dyn Clock>,
    started: Duration,
    rng: R,
}

impl Engine<SmallRng> {
    /// Standard game with an entropy-seeded random source.
    #[must_use]
    pub fn new() -> Self {
        Self::with_rng(SmallRng::from_entropy())
    }

    /// Standard game with a fixed seed, for reproducible scripts.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(SmallRng::seed_from_u64(seed))
    }
}

impl Default for Engine<SmallRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> Engine<R> {
    /// Standard game drawing randomness from `rng`.
    pub fn with_rng(rng: R) -> Self {
        let clock = SystemClock::new();
        let started = clock.now();
        Self {
            session: Session::standard(),
            outcome: None,
            last_move: None,
            events: VecDeque::new(),
            clock: Box::new(clock),
            started,
            rng,
        }
    }

    /// Replace the time source; the session clock restarts.
    #[must_use]
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self.restart_clock();
        self
    }

    fn restart_clock(&mut self) {
        self.started = self.clock.now();
    }

    // ----- queries -----

    /// The whole session.
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// The board.
    #[must_use]
    pub const fn board(&self) -> &Board {
        &self.session.board
    }

    /// The piece type registry.
    #[must_use]
    pub const fn registry(&self) -> &PieceTypeRegistry {
        &self.session.registry
    }

    /// Current rules.
    #[must_use]
    pub const fn rules(&self) -> &RulesConfig {
        &self.session.rules
    }

    /// Chunks.
    #[must_use]
    pub const fn chunks(&self) -> &ChunkSet {
        &self.session.chunks
    }

    /// Edge triggers.
    #[must_use]
    pub fn triggers(&self) -> &[EdgeTrigger] {
        &self.session.triggers
    }

    /// Side to move.
    #[must_use]
    pub const fn turn(&self) -> Color {
        self.session.turn
    }

    /// Full-move counter.
    #[must_use]
    pub const fn fullmove(&self) -> u32 {
        self.session.fullmove
    }

    /// Result, once the game is decided.
    #[must_use]
    pub const fn outcome(&self) -> Option<GameOutcome> {
        self.outcome
    }

    /// True once a result has been declared.
    #[must_use]
    pub const fn is_game_over(&self) -> bool {
        self.outcome.is_some()
    }

    /// Last applied move.
    #[must_use]
    pub const fn last_move(&self) -> Option<(Coord, Coord)> {
        self.last_move
    }

    /// Time since the session clock was last started.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.clock.now().saturating_sub(self.started)
    }

    /// Legal destinations of the piece on `from`.
    #[must_use]
    pub fn legal_moves(&self, from: Coord) -> Vec<Coord> {
        legal_moves(
            &self.session.board,
            &self.session.registry,
            self.session.rules.damage_blocks_move,
            from,
        )
    }

    /// Take every queued event, oldest first.
    pub fn drain_events(&mut self) -> Vec<Event> {
        self.events.drain(..).collect()
    }

    // ----- resets and board edits -----

    fn clear_runtime(&mut self) {
        self.outcome = None;
        self.last_move = None;
        self.restart_clock();
    }

    /// Full reset: default rules and types, standard position, no chunks or triggers.
    pub fn reset_standard(&mut self) {
        self.session = Session::standard();
        self.clear_runtime();
        info!("reset to standard position");
    }

    /// Swap in a complete new session, as an import does.
    pub fn replace_session(&mut self, session: Session) {
        self.session = session;
        self.clear_runtime();
        info!(
            width = self.session.board.width(),
            height = self.session.board.height(),
            types = self.session.registry.len(),
            chunks = self.session.chunks.len(),
            "session replaced"
        );
    }

    /// Hard reset to an empty board of the given size (each side clamped to 2..=20).
    ///
    /// Rules and piece types are kept; turn, counters, damage, chunks and triggers are not.
    pub fn resize(&mut self, width: i32, height: i32) {
        self.session.board = Board::new(width, height);
        self.session.chunks.clear();
        self.session.triggers.clear();
        self.session.turn = Color::White;
        self.session.fullmove = 1;
        self.clear_runtime();
        info!(
            width = self.session.board.width(),
            height = self.session.board.height(),
            "board resized"
        );
    }

    /// Remove every piece and repair every square.
    pub fn clear_board(&mut self) {
        self.session.board.clear();
    }

    fn check_square(&self, at: Coord) -> EngineResult<()> {
        if self.session.board.in_bounds(at) {
            Ok(())
        } else {
            Err(EngineError::validation(format!("square {},{} is off the board", at.x, at.y)))
        }
    }

    /// Put a new piece on a square, replacing any occupant.
    ///
    /// An unknown type is registered with queen-like movement.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for an off-board square or an empty type name.
    pub fn place_piece(&mut self, at: Coord, color: Color, type_name: &str, symbol: Option<&str>) -> EngineResult<()> {
        self.check_square(at)?;
        if type_name.is_empty() {
            return Err(EngineError::validation("empty piece type name"));
        }
        if self.session.registry.ensure(type_name) {
            debug!(type_name, "registered queen-like type");
        }
        self.session.board.place(at, Piece::new(color, type_name, symbol));
        Ok(())
    }

    /// Remove and return the piece on a square.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for an off-board square.
    pub fn remove_piece(&mut self, at: Coord) -> EngineResult<Option<Piece>> {
        self.check_square(at)?;
        Ok(self.session.board.take(at))
    }

    // ----- types and rules -----

    /// Make `name` move like `base`, creating `name` if needed.
    ///
    /// # Errors
    ///
    /// Returns `UnknownReference` if `base` is not registered.
    pub fn define_like(&mut self, name: &str, base: &str) -> EngineResult<()> {
        if name.is_empty() {
            return Err(EngineError::validation("empty piece type name"));
        }
        self.session.registry.define_like(name, base)
    }

    /// Edit an existing piece type.
    ///
    /// # Errors
    ///
    /// Returns `UnknownReference` if the type is not registered.
    pub fn modify_piece_type(&mut self, name: &str, change: TypeChange) -> EngineResult<()> {
        self.session.registry.modify(name, change)
    }

    /// Change one rule. Setting a positive time limit restarts the session clock.
    pub fn set_rule(&mut self, change: RuleChange) {
        let restart = matches!(change, RuleChange::MaxSeconds(s) if s > 0);
        let rules = std::mem::take(&mut self.session.rules);
        self.session.rules = rules.apply(change);
        if restart {
            self.restart_clock();
        }
    }

    // ----- chunks and triggers -----

    /// Define or redefine a chunk: active, owned by either side, no fill or scripts.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for an empty name.
    pub fn define_chunk(&mut self, name: &str, rect: Rect) -> EngineResult<()> {
        if name.is_empty() {
            return Err(EngineError::validation("empty chunk name"));
        }
        self.session.chunks.define(name, rect);
        Ok(())
    }

    /// Set or remove a chunk's fill.
    ///
    /// # Errors
    ///
    /// Returns `UnknownReference` if the chunk does not exist.
    pub fn set_chunk_fill(&mut self, name: &str, fill: Option<ChunkFill>) -> EngineResult<()> {
        self.session.chunks.get_mut(name)?.fill = fill;
        Ok(())
    }

    /// Set a chunk's owner.
    ///
    /// # Errors
    ///
    /// Returns `UnknownReference` if the chunk does not exist.
    pub fn set_chunk_owner(&mut self, name: &str, owner: ChunkOwner) -> EngineResult<()> {
        self.session.chunks.get_mut(name)?.owner = owner;
        Ok(())
    }

    /// Set a chunk's enter or leave script.
    ///
    /// # Errors
    ///
    /// Returns `UnknownReference` if the chunk does not exist.
    pub fn set_chunk_script(&mut self, name: &str, side: Crossing, script: Option<ScriptOverride>) -> EngineResult<()> {
        let chunk = self.session.chunks.get_mut(name)?;
        match side {
            Crossing::Enter => chunk.enter_script = script,
            Crossing::Leave => chunk.leave_script = script,
        }
        Ok(())
    }

    /// Toggle a chunk directly; ownership is not checked.
    ///
    /// # Errors
    ///
    /// Returns `UnknownReference` if the chunk does not exist.
    pub fn toggle_chunk(&mut self, name: &str) -> EngineResult<Toggle> {
        let Session {
            board,
            registry,
            chunks,
            ..
        } = &mut self.session;
        chunks.toggle(name, None, board, registry)
    }

    /// Drop every chunk and edge trigger.
    pub fn reset_chunks(&mut self) {
        self.session.chunks.clear();
        self.session.triggers.clear();
    }

    /// Register an edge trigger.
    ///
    /// # Errors
    ///
    /// Returns `UnknownReference` if a toggle trigger names a chunk that does not exist.
    pub fn add_edge_trigger(&mut self, trigger: EdgeTrigger) -> EngineResult<()> {
        if let EdgeAction::ToggleChunk(name) = &trigger.action {
            if !self.session.chunks.contains(name) {
                return Err(EngineError::unknown_chunk(name));
            }
        }
        self.session.triggers.push(trigger);
        Ok(())
    }

    /// Remove every edge trigger.
    pub fn clear_edge_triggers(&mut self) {
        self.session.triggers.clear();
    }

    // ----- play -----

    /// Attempt to move the piece on `from` to `to`.
    ///
    /// Legality is checked before anything changes. An accepted move runs to
    /// completion: board write, capture, post-move script, neighbour report,
    /// turn handoff, chunk crossings, edge triggers and the win check.
    ///
    /// # Errors
    ///
    /// Returns `IllegalMove` if the game is over, `from` is empty, the piece
    /// is not on move, or `to` is not a legal destination.
    pub fn attempt_move(&mut self, from: Coord, to: Coord) -> EngineResult<MoveOutcome> {
        if self.outcome.is_some() {
            return Err(IllegalMove::GameOver.into());
        }
        let legal = self.legal_moves(from);
        let session = &self.session;
        let piece = session.board.get(from).ok_or(IllegalMove::NoPiece)?;
        if piece.color != session.turn {
            return Err(IllegalMove::NotYourTurn.into());
        }
        if !legal.contains(&to) {
            return Err(IllegalMove::NotLegal.into());
        }

        let script = effective_script(piece, session.registry.get(&piece.type_name));
        let target = match pre_move(script, &piece.state, to, &legal, &mut self.rng) {
            PreMove::Cancel => {
                debug!(from = %from, to = %to, "move cancelled by script");
                return Ok(MoveOutcome::Cancelled);
            }
            PreMove::Proceed(target) => target,
        };
        if target != to {
            debug!(from = %from, requested = %to, to = %target, "move redirected by script");
        }
        let mover = self.session.board.take(from).ok_or(IllegalMove::NoPiece)?;
        Ok(MoveOutcome::Applied(self.apply_move(from, target, mover)))
    }

    fn apply_move(&mut self, from: Coord, to: Coord, mover: Piece) -> AppliedMove {
        let Session {
            board,
            registry,
            rules,
            chunks,
            triggers,
            turn,
            fullmove,
        } = &mut self.session;

        let captured = board.get(to).map(Piece::label);
        let color = mover.color;
        let type_name = mover.type_name.clone();
        board.place(to, mover);

        let report = resolve_capture(board, registry, rules, to, captured.is_some());

        let expired = match board.get_mut(to) {
            Some(piece) if !report.destroyed(to) => {
                let script = effective_script(piece, registry.get(&piece.type_name));
                post_move(script, &mut piece.state) == PostMove::Expired
            }
            _ => false,
        };
        if expired {
            board.take(to);
            debug!(square = %to, "piece decayed");
        }

        let neighbours = if rules.neighbours_enabled {
            let radius = i32::try_from(rules.neighbour_radius).unwrap_or(i32::MAX);
            board
                .squares_within(to, radius)
                .filter_map(|sq| board.get(sq).map(|p| format!("{sq}:{}", p.label())))
                .collect()
        } else {
            Vec::new()
        };

        if *turn == Color::Black {
            *fullmove = fullmove.saturating_add(1);
        }
        *turn = turn.opponent();

        if let Some(piece) = board.get_mut(to) {
            for (chunk, crossing) in chunks.on_move_completed(piece, from, to) {
                debug!(chunk, ?crossing, square = %to, "chunk script applied");
            }
        }

        let reactions = fire_triggers(triggers, color, &type_name, to, board, registry, chunks, &mut self.rng);

        let survived = board.get(to).is_some_and(|p| p.color == color && p.type_name == type_name);
        let elapsed = self.clock.now().saturating_sub(self.started);
        let outcome = evaluate(board, registry, rules, *fullmove, elapsed);

        debug!(
            from = %from,
            to = %to,
            captured = captured.as_deref().unwrap_or("none"),
            fullmove = *fullmove,
            "move applied"
        );
        self.events.push_back(Event::MoveApplied(MoveApplied {
            fullmove: *fullmove,
            from: from.to_algebraic(),
            to: to.to_algebraic(),
            captured: captured.clone(),
            white_count: board.count(Color::White),
            black_count: board.count(Color::Black),
            neighbours,
            label: Some(rules.event_label.clone()).filter(|l| !l.is_empty()),
        }));

        self.last_move = Some((from, to));
        if let Some(outcome) = outcome {
            self.declare(outcome);
        }
        assert_invariants(&self.session);

        AppliedMove {
            from,
            to,
            captured,
            explosion: report.explosion,
            survived,
            reactions,
            outcome,
        }
    }

    fn declare(&mut self, outcome: GameOutcome) {
        if self.outcome.is_some() {
            return;
        }
        info!(result = %outcome.result, reason = %outcome.reason, "game over");
        self.outcome = Some(outcome);
        self.events.push_back(Event::GameOver(GameOver::from(outcome)));
    }

    /// Periodic check of the move and time limits, without a move.
    ///
    /// Returns the result if this tick ended the game.
    pub fn tick(&mut self) -> Option<GameOutcome> {
        if self.outcome.is_some() {
            return None;
        }
        let outcome = limit_outcome(&self.session.rules, self.session.fullmove, self.elapsed())?;
        self.declare(outcome);
        Some(outcome)
    }
}
