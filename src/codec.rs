//! State document export and import.
//!
//! Export is deterministic: types, chunks and board entries come out in a
//! fixed order, so exporting the same session twice yields the same text.
//! Import never aborts on a bad field; each value falls back to its default
//! on its own and a complete new [`Session`] is swapped into the engine.

mod document;
mod persistence;

pub use document::{
    float_value, int_value, ChunkDoc, FillDoc, PieceDoc, PieceTypeDoc, RulesDoc, ScriptDoc, StateDocument,
    TriggerDoc,
};
pub use persistence::{config_path, load, sanitize_name, save};

use rand::Rng;
use serde_json::Value;
use tracing::warn;

use crate::error::{EngineError, EngineResult};
use crate::game::{
    Board, Chunk, ChunkFill, ChunkOwner, ChunkSet, Color, Coord, EdgeAction, EdgeTrigger, Engine, Piece, PieceKind,
    PieceType, PieceTypeRegistry, Rect, RulesConfig, Script, ScriptKind, ScriptOverride, Session, SpawnBounds,
    TypeFilter, STANDARD_SIDE,
};

// ----- export -----

/// Snapshot the engine's session as a document.
#[must_use]
pub fn export<R: Rng>(engine: &Engine<R>) -> StateDocument {
    export_session(engine.session())
}

/// Snapshot a session as a document.
#[must_use]
pub fn export_session(session: &Session) -> StateDocument {
    let board = &session.board;
    StateDocument {
        cols: Some(i64::from(board.width())),
        rows: Some(i64::from(board.height())),
        turn: Some(session.turn.as_str().to_string()),
        fullmove: Some(i64::from(session.fullmove)),
        damaged: board.damaged().map(|c| [i64::from(c.x), i64::from(c.y)]).collect(),
        piece_types: session
            .registry
            .iter()
            .map(|pt| (pt.name.clone(), export_type(pt)))
            .collect(),
        board: board.pieces().map(|(at, piece)| export_piece(at, piece)).collect(),
        rules: Some(export_rules(&session.rules)),
        chunks: session
            .chunks
            .iter()
            .map(|(name, chunk)| (name.to_string(), export_chunk(chunk)))
            .collect(),
        edge_triggers: session.triggers.iter().map(export_trigger).collect(),
    }
}

fn export_type(pt: &PieceType) -> PieceTypeDoc {
    PieceTypeDoc {
        kind: Some(pt.kind.as_str().to_string()),
        directions: pt
            .directions
            .iter()
            .map(|&(dx, dy)| [i64::from(dx), i64::from(dy)])
            .collect(),
        max_range: Some(pt.max_range.map(i64::from)),
        can_jump: Some(pt.can_jump),
        explosion_radius: pt.explosion_radius.map(i64::from),
        immune_to_explosion: Some(pt.immune_to_explosion),
        damaged_ok: Some(pt.damaged_ok),
        is_royal: Some(pt.is_royal),
        script_name: pt.script.map(|s| s.kind.as_str().to_string()),
        script_param: pt.script.map(|s| s.param),
    }
}

fn export_piece(at: Coord, piece: &Piece) -> PieceDoc {
    PieceDoc {
        x: Some(i64::from(at.x)),
        y: Some(i64::from(at.y)),
        color: Some(piece.color.as_str().to_string()),
        type_name: Some(piece.type_name.clone()),
        symbol: Some(piece.symbol.clone()),
        state: Some(piece.state).filter(|s| !s.is_fresh()),
    }
}

fn export_rules(rules: &RulesConfig) -> RulesDoc {
    RulesDoc {
        capture_mode: Some(rules.capture_mode),
        atomic_radius: Some(i64::from(rules.atomic_radius)),
        center_damages: Some(rules.center_damages),
        center_survives: Some(rules.center_survives),
        damage_blocks_move: Some(rules.damage_blocks_move),
        victory: Some(rules.victory),
        max_fullmoves: Some(i64::from(rules.max_fullmoves)),
        max_seconds: Some(i64::from(rules.max_seconds)),
        limit_result: Some(rules.limit_result),
        neighbour_radius: Some(i64::from(rules.neighbour_radius)),
        neighbours_enabled: Some(rules.neighbours_enabled),
        event_label: Some(rules.event_label.clone()),
    }
}

fn export_script(script: ScriptOverride) -> ScriptDoc {
    match script {
        ScriptOverride::Clear => ScriptDoc {
            name: Some("none".to_string()),
            param: Some(0.0),
        },
        ScriptOverride::Set(s) => ScriptDoc {
            name: Some(s.kind.as_str().to_string()),
            param: Some(s.param),
        },
    }
}

fn export_chunk(chunk: &Chunk) -> ChunkDoc {
    ChunkDoc {
        rect: Some(chunk.rect.corners().map(i64::from)),
        fill: chunk.fill.as_ref().map(|fill| FillDoc {
            color: Some(fill.color.as_str().to_string()),
            type_name: Some(fill.type_name.clone()),
        }),
        active: Some(chunk.active),
        owner: Some(chunk.owner.as_str().to_string()),
        enter_script: chunk.enter_script.map(export_script),
        leave_script: chunk.leave_script.map(export_script),
    }
}

fn export_trigger(trigger: &EdgeTrigger) -> TriggerDoc {
    let mut doc = TriggerDoc {
        type_name: Some(trigger.filter.as_str().to_string()),
        dist: Some(i64::from(trigger.distance)),
        ..TriggerDoc::default()
    };
    match &trigger.action {
        EdgeAction::ToggleChunk(chunk) => {
            doc.mode = Some("chunk".to_string());
            doc.chunk = Some(chunk.clone());
        }
        EdgeAction::SpawnRandom(bounds) => {
            doc.mode = Some("random".to_string());
            doc.minw = Some(i64::from(bounds.min_w));
            doc.maxw = Some(i64::from(bounds.max_w));
            doc.minh = Some(i64::from(bounds.min_h));
            doc.maxh = Some(i64::from(bounds.max_h));
        }
    }
    doc
}

/// Serialize the engine's session as pretty-printed JSON.
///
/// # Errors
///
/// Returns `ConfigMalformed` if serialization fails. Documents hold only
/// strings, integers, booleans and finite floats, so this is not expected.
pub fn to_json<R: Rng>(engine: &Engine<R>) -> EngineResult<String> {
    serde_json::to_string_pretty(&export(engine)).map_err(|e| EngineError::ConfigMalformed(e.to_string()))
}

// ----- import -----

/// Parse a document.
///
/// # Errors
///
/// Returns `ConfigMalformed` if the text is not JSON or its top level is not an object.
pub fn from_json(text: &str) -> EngineResult<StateDocument> {
    let value: Value = serde_json::from_str(text).map_err(|e| EngineError::ConfigMalformed(e.to_string()))?;
    if !value.is_object() {
        return Err(EngineError::ConfigMalformed("top level is not an object".to_string()));
    }
    serde_json::from_value(value).map_err(|e| EngineError::ConfigMalformed(e.to_string()))
}

/// Parse `text` and swap the resulting session into the engine.
///
/// The game-over state, last move and time-limit clock are reset.
///
/// # Errors
///
/// Returns `ConfigMalformed` if the document is not a JSON object; the engine is untouched.
pub fn import_json<R: Rng>(engine: &mut Engine<R>, text: &str) -> EngineResult<()> {
    let doc = from_json(text)?;
    import(engine, &doc);
    Ok(())
}

/// Swap the session described by `doc` into the engine.
pub fn import<R: Rng>(engine: &mut Engine<R>, doc: &StateDocument) {
    engine.replace_session(session_from_document(doc));
}

fn to_i32(value: i64) -> Option<i32> {
    i32::try_from(value).ok()
}

fn to_u32(value: i64) -> u32 {
    u32::try_from(value.max(0)).unwrap_or(u32::MAX)
}

fn side(value: Option<i64>) -> i32 {
    value
        .map_or(STANDARD_SIDE, |v| i32::try_from(v).unwrap_or(i32::MAX))
}

/// Build a complete session from a document, field by field.
#[must_use]
pub fn session_from_document(doc: &StateDocument) -> Session {
    let mut registry = import_registry(doc);
    let mut board = Board::new(side(doc.cols), side(doc.rows));

    for entry in &doc.board {
        let Some((at, piece)) = import_piece(entry) else {
            continue;
        };
        if !board.in_bounds(at) {
            continue;
        }
        registry.ensure(&piece.type_name);
        board.place(at, piece);
    }
    for &[x, y] in &doc.damaged {
        if let (Some(x), Some(y)) = (to_i32(x), to_i32(y)) {
            board.mark_damaged(Coord::new(x, y));
        }
    }

    let mut chunks = ChunkSet::new();
    for (name, entry) in &doc.chunks {
        if let Some(chunk) = import_chunk(entry) {
            chunks.insert(name, chunk);
        }
    }
    let triggers = doc
        .edge_triggers
        .iter()
        .filter_map(|entry| import_trigger(entry, &chunks))
        .collect();

    Session {
        board,
        registry,
        rules: doc.rules.as_ref().map_or_else(RulesConfig::default, import_rules),
        chunks,
        triggers,
        turn: doc.turn.as_deref().and_then(Color::parse).unwrap_or(Color::White),
        fullmove: doc.fullmove.map_or(1, |n| to_u32(n).max(1)),
    }
}

fn import_registry(doc: &StateDocument) -> PieceTypeRegistry {
    let mut registry = PieceTypeRegistry::empty();
    for (name, entry) in &doc.piece_types {
        if !name.is_empty() {
            registry.insert(import_type(name, entry));
        }
    }
    if registry.has_archetypes() {
        registry
    } else {
        if !doc.piece_types.is_empty() {
            warn!(types = doc.piece_types.len(), "imported registry lacks king or queen, using defaults");
        }
        PieceTypeRegistry::standard()
    }
}

fn import_type(name: &str, doc: &PieceTypeDoc) -> PieceType {
    let kind = doc.kind.as_deref().and_then(PieceKind::parse).unwrap_or(PieceKind::Custom);
    let mut pt = PieceType::bare(name, kind);
    pt.directions = doc
        .directions
        .iter()
        .filter_map(|&[dx, dy]| Some((to_i32(dx)?, to_i32(dy)?)))
        .collect();
    pt.max_range = match doc.max_range {
        Some(None) => None,
        Some(Some(n)) if n <= 0 => None,
        Some(Some(n)) => Some(to_u32(n)),
        None => Some(1),
    };
    pt.can_jump = doc.can_jump.unwrap_or(false);
    pt.explosion_radius = doc.explosion_radius.map(to_u32);
    pt.immune_to_explosion = doc.immune_to_explosion.unwrap_or(false);
    pt.damaged_ok = doc.damaged_ok.unwrap_or(false);
    pt.is_royal = doc.is_royal.unwrap_or(false);
    pt.script = doc
        .script_name
        .as_deref()
        .and_then(ScriptKind::parse)
        .map(|kind| Script::new(kind, doc.script_param.unwrap_or(0.0)));
    pt
}

fn import_piece(doc: &PieceDoc) -> Option<(Coord, Piece)> {
    let at = Coord::new(to_i32(doc.x?)?, to_i32(doc.y?)?);
    let color = Color::parse(doc.color.as_deref()?)?;
    let type_name = doc.type_name.as_deref().filter(|t| !t.is_empty())?;
    let symbol = doc.symbol.as_deref().filter(|s| !s.is_empty());
    let mut piece = Piece::new(color, type_name, symbol);
    if let Some(state) = doc.state {
        piece.state = state;
    }
    Some((at, piece))
}

fn import_rules(doc: &RulesDoc) -> RulesConfig {
    let d = RulesConfig::default();
    RulesConfig {
        capture_mode: doc.capture_mode.unwrap_or(d.capture_mode),
        atomic_radius: doc.atomic_radius.map_or(d.atomic_radius, to_u32),
        center_damages: doc.center_damages.unwrap_or(d.center_damages),
        center_survives: doc.center_survives.unwrap_or(d.center_survives),
        damage_blocks_move: doc.damage_blocks_move.unwrap_or(d.damage_blocks_move),
        victory: doc.victory.unwrap_or(d.victory),
        max_fullmoves: doc.max_fullmoves.map_or(d.max_fullmoves, to_u32),
        max_seconds: doc.max_seconds.map_or(d.max_seconds, to_u32),
        limit_result: doc.limit_result.unwrap_or(d.limit_result),
        neighbour_radius: doc.neighbour_radius.map_or(d.neighbour_radius, to_u32),
        neighbours_enabled: doc.neighbours_enabled.unwrap_or(d.neighbours_enabled),
        event_label: doc.event_label.clone().unwrap_or(d.event_label),
    }
}

fn import_script(doc: &ScriptDoc) -> Option<ScriptOverride> {
    let name = doc.name.as_deref()?;
    if name.eq_ignore_ascii_case("none") {
        return Some(ScriptOverride::Clear);
    }
    let kind = ScriptKind::parse(name)?;
    Some(ScriptOverride::Set(Script::new(kind, doc.param.unwrap_or(0.0))))
}

fn import_chunk(doc: &ChunkDoc) -> Option<Chunk> {
    let [x1, y1, x2, y2] = doc.rect?;
    let mut chunk = Chunk::new(Rect::new(to_i32(x1)?, to_i32(y1)?, to_i32(x2)?, to_i32(y2)?));
    chunk.active = doc.active.unwrap_or(true);
    chunk.owner = doc
        .owner
        .as_deref()
        .and_then(ChunkOwner::parse)
        .unwrap_or_default();
    chunk.fill = doc.fill.as_ref().and_then(|fill| {
        Some(ChunkFill {
            color: Color::parse(fill.color.as_deref()?)?,
            type_name: fill.type_name.clone().filter(|t| !t.is_empty())?,
        })
    });
    chunk.enter_script = doc.enter_script.as_ref().and_then(import_script);
    chunk.leave_script = doc.leave_script.as_ref().and_then(import_script);
    Some(chunk)
}

fn bound(value: Option<i64>, default: i32) -> i32 {
    value.and_then(to_i32).unwrap_or(default)
}

fn import_trigger(doc: &TriggerDoc, chunks: &ChunkSet) -> Option<EdgeTrigger> {
    let filter = TypeFilter::parse(doc.type_name.as_deref().unwrap_or("any"));
    let distance = doc.dist.map_or(0, to_u32);
    let action = if doc.mode.as_deref() == Some("random") {
        EdgeAction::SpawnRandom(SpawnBounds::new(
            bound(doc.minw, 1),
            bound(doc.maxw, 1),
            bound(doc.minh, 1),
            bound(doc.maxh, 1),
        ))
    } else {
        let name = doc.chunk.clone()?;
        if !chunks.contains(&name) {
            warn!(chunk = %name, "dropping edge trigger for unknown chunk");
            return None;
        }
        EdgeAction::ToggleChunk(name)
    };
    Some(EdgeTrigger {
        filter,
        distance,
        action,
    })
}
