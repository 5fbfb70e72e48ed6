//! Text command adapter.
//!
//! Turns operator lines such as `rule capture normal` or `play d1 d7` into
//! calls on the structured [`Engine`] API. Parsing is separate from
//! execution: a line that does not parse never touches the engine.

use std::fmt::Write as _;
use std::path::Path;

use rand::Rng;

use crate::codec;
use crate::error::{EngineError, EngineResult};
use crate::game::{
    CaptureMode, ChunkFill, ChunkOwner, Color, Coord, Crossing, EdgeAction, EdgeReaction, EdgeTrigger, Engine,
    LimitOutcome, MoveOutcome, Rect, RuleChange, Script, ScriptKind, ScriptOverride, SpawnBounds, Toggle,
    TypeChange, TypeFilter, VictoryMode,
};
use crate::render;

/// Operator help text.
pub const HELP: &str = "\
commands:
  standard                        reset rules, types and position
  board W H                       empty board of W x H (hard reset)
  clear                           remove all pieces and damage
  add COLOR TYPE SQ [SYM]         place a piece (SQ is d4 or 3,3 or 3 3)
  remove SQ                       remove a piece
  move TYPE BASE                  TYPE moves like BASE
  ptype TYPE explode R            explosion radius override
  ptype TYPE immune|damaged_ok|royal|jump on|off
  ptype TYPE range N              max range (0 = unlimited)
  ptype TYPE dirs DX DY ...       overwrite directions
  ptype TYPE add_dir DX DY        append a direction
  ptype TYPE clear_dirs           remove all directions
  ptype TYPE script none|jitter P|stutter P|entropy P|decay N|charge N|heat N
  rule capture atomic|normal|none
  rule atomic_radius N
  rule center_damages|center_survives|damage_blocks on|off
  rule victory elimination|king|none
  rule max_moves N                full-move limit (0 disables)
  rule max_time S                 time limit in seconds (0 disables)
  rule limit_result draw|white|black
  notify radius N                 neighbour radius of move events
  notify neighbours on|off
  notify label TEXT...
  chunk define NAME X1 Y1 X2 Y2
  chunk fill NAME COLOR TYPE | chunk fill NAME none
  chunk owner NAME white|black|any
  chunk script NAME enter|leave none|MODE ARG
  chunk on|off|toggle NAME
  chunk reset                     drop all chunks and edge triggers
  edge add TYPE DIST CHUNK        TYPE may be 'any'
  edge random TYPE DIST MINW MAXW MINH MAXH
  edge clear
  play FROM TO                    make a move
  moves SQ                        list legal destinations
  save NAME | load NAME           configs/NAME.json
  show                            print the board";

/// Desired state of a chunk switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Switch {
    /// Activate if inactive.
    On,
    /// Deactivate if active.
    Off,
    /// Flip.
    Toggle,
}

/// Chunk subcommands.
#[derive(Debug, Clone, PartialEq)]
pub enum ChunkCommand {
    /// Define or redefine a chunk.
    Define {
        /// Chunk name.
        name: String,
        /// Region.
        rect: Rect,
    },
    /// Set or remove the fill.
    Fill {
        /// Chunk name.
        name: String,
        /// New fill.
        fill: Option<ChunkFill>,
    },
    /// Set the owner.
    Owner {
        /// Chunk name.
        name: String,
        /// New owner.
        owner: ChunkOwner,
    },
    /// Set an enter or leave script.
    Script {
        /// Chunk name.
        name: String,
        /// Which boundary.
        side: Crossing,
        /// Script change applied on crossing.
        script: ScriptOverride,
    },
    /// Switch a chunk.
    Switch {
        /// Chunk name.
        name: String,
        /// Requested state.
        switch: Switch,
    },
    /// Drop every chunk and trigger.
    Reset,
}

/// A parsed operator command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Print the help text.
    Help,
    /// Full reset to the standard game.
    Standard,
    /// Hard reset to an empty board.
    Board {
        /// Files.
        width: i32,
        /// Ranks.
        height: i32,
    },
    /// Remove all pieces and damage.
    Clear,
    /// Place a piece.
    Add {
        /// Side.
        color: Color,
        /// Piece type.
        type_name: String,
        /// Square.
        at: Coord,
        /// Display symbol.
        symbol: Option<String>,
    },
    /// Remove a piece.
    Remove(Coord),
    /// Copy movement from another type.
    MoveLike {
        /// Type to change or create.
        type_name: String,
        /// Type to copy.
        base: String,
    },
    /// Edit a piece type.
    PieceType {
        /// Type to edit.
        type_name: String,
        /// The edit.
        change: TypeChange,
    },
    /// Change a rule or notification setting.
    Rule(RuleChange),
    /// Chunk management.
    Chunk(ChunkCommand),
    /// Register an edge trigger.
    EdgeAdd(EdgeTrigger),
    /// Remove all edge triggers.
    EdgeClear,
    /// Attempt a move.
    Play {
        /// Source square.
        from: Coord,
        /// Destination square.
        to: Coord,
    },
    /// List legal destinations.
    Moves(Coord),
    /// Save the state document.
    Save(String),
    /// Load a state document.
    Load(String),
    /// Render the board.
    Show,
}

fn usage(text: &str) -> EngineError {
    EngineError::validation(format!("usage: {text}"))
}

fn int(token: &str, what: &str) -> EngineResult<i64> {
    token
        .parse()
        .map_err(|_| EngineError::validation(format!("{what} must be an integer, got '{token}'")))
}

fn count(token: &str, what: &str) -> EngineResult<u32> {
    Ok(u32::try_from(int(token, what)?.max(0)).unwrap_or(u32::MAX))
}

fn small(token: &str, what: &str) -> EngineResult<i32> {
    i32::try_from(int(token, what)?).map_err(|_| EngineError::validation(format!("{what} out of range")))
}

fn number(token: &str, what: &str) -> EngineResult<f64> {
    token
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| EngineError::validation(format!("{what} must be a number, got '{token}'")))
}

fn flag(token: &str) -> EngineResult<bool> {
    match token.to_ascii_lowercase().as_str() {
        "on" | "true" | "1" | "yes" => Ok(true),
        "off" | "false" | "0" | "no" => Ok(false),
        _ => Err(EngineError::validation(format!("expected on or off, got '{token}'"))),
    }
}

fn color(token: &str) -> EngineResult<Color> {
    Color::parse(token).ok_or_else(|| EngineError::validation(format!("colour must be white or black, got '{token}'")))
}

/// Parse a square from the front of `tokens`: `d4`, `3,3` or `3 3`.
///
/// Returns the square and the number of tokens used.
fn square(tokens: &[&str]) -> EngineResult<(Coord, usize)> {
    let first = tokens.first().ok_or_else(|| EngineError::validation("missing square"))?;
    if let Some((x, y)) = first.split_once(',') {
        return Ok((Coord::new(small(x, "x")?, small(y, "y")?), 1));
    }
    if first.parse::<i64>().is_ok() {
        let y = tokens.get(1).ok_or_else(|| EngineError::validation("missing y coordinate"))?;
        return Ok((Coord::new(small(first, "x")?, small(y, "y")?), 2));
    }
    Coord::parse_algebraic(first)
        .map(|c| (c, 1))
        .ok_or_else(|| EngineError::validation(format!("bad square '{first}'")))
}

fn only_square(tokens: &[&str]) -> EngineResult<Coord> {
    let (at, used) = square(tokens)?;
    if used != tokens.len() {
        return Err(EngineError::validation("unexpected text after square"));
    }
    Ok(at)
}

fn script(mode: &str, arg: Option<&&str>) -> EngineResult<Option<Script>> {
    if mode.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    let kind = ScriptKind::parse(mode)
        .ok_or_else(|| EngineError::validation(format!("unknown script '{mode}'")))?;
    let arg = arg.ok_or_else(|| EngineError::validation(format!("script {mode} needs a parameter")))?;
    let param = if kind.takes_count() {
        #[allow(clippy::cast_precision_loss)]
        let n = int(arg, "count")?.max(1) as f64;
        n
    } else {
        number(arg, "probability")?
    };
    Ok(Some(Script::new(kind, param)))
}

impl Command {
    /// Parse one line. Blank lines and `#` comments yield `None`.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for unknown commands or malformed arguments.
    pub fn parse(line: &str) -> EngineResult<Option<Self>> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let Some((&op, args)) = tokens.split_first() else {
            return Ok(None);
        };
        if op.starts_with('#') {
            return Ok(None);
        }
        let command = match (op.to_ascii_lowercase().as_str(), args) {
            ("help" | "?", _) => Self::Help,
            ("standard", []) => Self::Standard,
            ("board", [w, h]) => Self::Board {
                width: small(w, "width")?,
                height: small(h, "height")?,
            },
            ("board", _) => return Err(usage("board W H")),
            ("clear", []) => Self::Clear,
            ("add", [c, t, rest @ ..]) if !rest.is_empty() => {
                let (at, used) = square(rest)?;
                let symbol = match &rest[used..] {
                    [] => None,
                    [sym] => Some((*sym).to_string()),
                    _ => return Err(usage("add COLOR TYPE SQ [SYM]")),
                };
                Self::Add {
                    color: color(c)?,
                    type_name: t.to_ascii_lowercase(),
                    at,
                    symbol,
                }
            }
            ("add", _) => return Err(usage("add COLOR TYPE SQ [SYM]")),
            ("remove", rest) if !rest.is_empty() => Self::Remove(only_square(rest)?),
            ("remove", _) => return Err(usage("remove SQ")),
            ("move", [t, base]) => Self::MoveLike {
                type_name: t.to_ascii_lowercase(),
                base: base.to_ascii_lowercase(),
            },
            ("move", _) => return Err(usage("move TYPE BASE")),
            ("ptype", [t, sub, rest @ ..]) => Self::PieceType {
                type_name: t.to_ascii_lowercase(),
                change: parse_type_change(sub, rest)?,
            },
            ("ptype", _) => return Err(usage("ptype TYPE SUBCOMMAND ...")),
            ("rule", [key, rest @ ..]) => Self::Rule(parse_rule(key, rest)?),
            ("rule", _) => return Err(usage("rule KEY VALUE")),
            ("notify" | "osc", [key, rest @ ..]) => Self::Rule(parse_notify(key, rest)?),
            ("notify" | "osc", _) => return Err(usage("notify radius|neighbours|label VALUE")),
            ("chunk", [sub, rest @ ..]) => Self::Chunk(parse_chunk(sub, rest)?),
            ("chunk", _) => return Err(usage("chunk define|fill|owner|script|on|off|toggle|reset ...")),
            ("edge", [sub, rest @ ..]) => parse_edge(sub, rest)?,
            ("edge", _) => return Err(usage("edge add|random|clear ...")),
            ("play", rest) if !rest.is_empty() => {
                let (from, used) = square(rest)?;
                Self::Play {
                    from,
                    to: only_square(&rest[used..])?,
                }
            }
            ("play", _) => return Err(usage("play FROM TO")),
            ("moves", rest) if !rest.is_empty() => Self::Moves(only_square(rest)?),
            ("moves", _) => return Err(usage("moves SQ")),
            ("save", [name]) => Self::Save((*name).to_string()),
            ("save", _) => return Err(usage("save NAME")),
            ("load", [name]) => Self::Load((*name).to_string()),
            ("load", _) => return Err(usage("load NAME")),
            ("show", []) => Self::Show,
            _ => return Err(EngineError::validation(format!("unknown command '{}'", line.trim()))),
        };
        Ok(Some(command))
    }
}

fn parse_type_change(sub: &str, rest: &[&str]) -> EngineResult<TypeChange> {
    let change = match (sub.to_ascii_lowercase().as_str(), rest) {
        ("explode", [r]) => TypeChange::ExplosionRadius(count(r, "radius")?),
        ("immune", [v]) => TypeChange::Immune(flag(v)?),
        ("damaged_ok", [v]) => TypeChange::DamagedOk(flag(v)?),
        ("royal", [v]) => TypeChange::Royal(flag(v)?),
        ("range", [n]) => TypeChange::Range(count(n, "range")?),
        ("jump", [v]) => TypeChange::Jump(flag(v)?),
        ("dirs", pairs) if !pairs.is_empty() && pairs.len() % 2 == 0 => TypeChange::Directions(
            pairs
                .chunks(2)
                .map(|p| Ok((small(p[0], "dx")?, small(p[1], "dy")?)))
                .collect::<EngineResult<_>>()?,
        ),
        ("dirs", _) => return Err(usage("ptype TYPE dirs DX DY [DX DY ...]")),
        ("add_dir", [dx, dy]) => TypeChange::AddDirection(small(dx, "dx")?, small(dy, "dy")?),
        ("clear_dirs", []) => TypeChange::ClearDirections,
        ("script", [mode, arg @ ..]) if arg.len() <= 1 => TypeChange::Script(script(mode, arg.first())?),
        ("script", _) => return Err(usage("ptype TYPE script none|MODE ARG")),
        _ => return Err(EngineError::validation(format!("unknown ptype subcommand '{sub}'"))),
    };
    Ok(change)
}

fn parse_rule(key: &str, rest: &[&str]) -> EngineResult<RuleChange> {
    let [value] = rest else {
        return Err(usage("rule KEY VALUE"));
    };
    let change = match key.to_ascii_lowercase().as_str() {
        "capture" | "capture_mode" => RuleChange::CaptureMode(
            CaptureMode::parse(value).ok_or_else(|| usage("rule capture atomic|normal|none"))?,
        ),
        "atomic_radius" => RuleChange::AtomicRadius(count(value, "radius")?),
        "center_damages" => RuleChange::CenterDamages(flag(value)?),
        "center_survives" => RuleChange::CenterSurvives(flag(value)?),
        "damage_blocks" | "damage_blocks_move" => RuleChange::DamageBlocksMove(flag(value)?),
        "victory" => RuleChange::Victory(
            VictoryMode::parse(value).ok_or_else(|| usage("rule victory elimination|king|none"))?,
        ),
        "max_moves" | "max_fullmoves" => RuleChange::MaxFullmoves(count(value, "move limit")?),
        "max_time" | "max_seconds" => RuleChange::MaxSeconds(count(value, "time limit")?),
        "limit_result" => RuleChange::LimitResult(
            LimitOutcome::parse(value).ok_or_else(|| usage("rule limit_result draw|white|black"))?,
        ),
        _ => return Err(EngineError::validation(format!("unknown rule '{key}'"))),
    };
    Ok(change)
}

fn parse_notify(key: &str, rest: &[&str]) -> EngineResult<RuleChange> {
    let change = match (key.to_ascii_lowercase().as_str(), rest) {
        ("radius" | "neighbour_radius", [r]) => RuleChange::NeighbourRadius(count(r, "radius")?),
        ("neighbours", [v]) => RuleChange::Neighbours(flag(v)?),
        ("label", words) => RuleChange::EventLabel(words.join(" ")),
        _ => return Err(usage("notify radius N | notify neighbours on|off | notify label TEXT")),
    };
    Ok(change)
}

fn parse_chunk(sub: &str, rest: &[&str]) -> EngineResult<ChunkCommand> {
    let command = match (sub.to_ascii_lowercase().as_str(), rest) {
        ("define", [n, x1, y1, x2, y2]) => ChunkCommand::Define {
            name: (*n).to_string(),
            rect: Rect::new(small(x1, "x1")?, small(y1, "y1")?, small(x2, "x2")?, small(y2, "y2")?),
        },
        ("define", _) => return Err(usage("chunk define NAME X1 Y1 X2 Y2")),
        ("fill", [n, none]) if none.eq_ignore_ascii_case("none") => ChunkCommand::Fill {
            name: (*n).to_string(),
            fill: None,
        },
        ("fill", [n, c, t]) => ChunkCommand::Fill {
            name: (*n).to_string(),
            fill: Some(ChunkFill {
                color: color(c)?,
                type_name: t.to_ascii_lowercase(),
            }),
        },
        ("fill", _) => return Err(usage("chunk fill NAME COLOR TYPE")),
        ("owner", [n, o]) => ChunkCommand::Owner {
            name: (*n).to_string(),
            owner: ChunkOwner::parse(o).ok_or_else(|| usage("chunk owner NAME white|black|any"))?,
        },
        ("owner", _) => return Err(usage("chunk owner NAME white|black|any")),
        ("script", [n, phase, mode, arg @ ..]) if arg.len() <= 1 => {
            let side = match phase.to_ascii_lowercase().as_str() {
                "enter" => Crossing::Enter,
                "leave" => Crossing::Leave,
                _ => return Err(usage("chunk script NAME enter|leave MODE [ARG]")),
            };
            ChunkCommand::Script {
                name: (*n).to_string(),
                side,
                script: script(mode, arg.first())?.map_or(ScriptOverride::Clear, ScriptOverride::Set),
            }
        }
        ("script", _) => return Err(usage("chunk script NAME enter|leave MODE [ARG]")),
        ("on", [n]) => ChunkCommand::Switch {
            name: (*n).to_string(),
            switch: Switch::On,
        },
        ("off", [n]) => ChunkCommand::Switch {
            name: (*n).to_string(),
            switch: Switch::Off,
        },
        ("toggle", [n]) => ChunkCommand::Switch {
            name: (*n).to_string(),
            switch: Switch::Toggle,
        },
        ("reset", []) => ChunkCommand::Reset,
        _ => return Err(usage("chunk define|fill|owner|script|on|off|toggle|reset ...")),
    };
    Ok(command)
}

fn parse_edge(sub: &str, rest: &[&str]) -> EngineResult<Command> {
    let command = match (sub.to_ascii_lowercase().as_str(), rest) {
        ("add", [t, dist, chunk]) => Command::EdgeAdd(EdgeTrigger {
            filter: TypeFilter::parse(t),
            distance: count(dist, "distance")?,
            action: EdgeAction::ToggleChunk((*chunk).to_string()),
        }),
        ("random", [t, dist, minw, maxw, minh, maxh]) => Command::EdgeAdd(EdgeTrigger {
            filter: TypeFilter::parse(t),
            distance: count(dist, "distance")?,
            action: EdgeAction::SpawnRandom(SpawnBounds::new(
                small(minw, "min width")?,
                small(maxw, "max width")?,
                small(minh, "min height")?,
                small(maxh, "max height")?,
            )),
        }),
        ("clear", []) => Command::EdgeClear,
        _ => return Err(usage("edge add TYPE DIST CHUNK | edge random TYPE DIST MINW MAXW MINH MAXH | edge clear")),
    };
    Ok(command)
}

/// Execute a parsed command and describe the result.
///
/// # Errors
///
/// Propagates the engine's error; on error the engine state is unchanged.
pub fn execute<R: Rng>(engine: &mut Engine<R>, configs: &Path, command: Command) -> EngineResult<String> {
    let reply = match command {
        Command::Help => HELP.to_string(),
        Command::Standard => {
            engine.reset_standard();
            "standard position, rules and types; chunks and triggers cleared".to_string()
        }
        Command::Board { width, height } => {
            engine.resize(width, height);
            format!("board resized to {}x{}", engine.board().width(), engine.board().height())
        }
        Command::Clear => {
            engine.clear_board();
            "board cleared".to_string()
        }
        Command::Add {
            color,
            type_name,
            at,
            symbol,
        } => {
            let created = !engine.registry().contains(&type_name);
            engine.place_piece(at, color, &type_name, symbol.as_deref())?;
            let mut reply = format!("added {color} {type_name} at {at}");
            if created {
                reply.push_str(&format!(" (type '{type_name}' created, queen-like)"));
            }
            reply
        }
        Command::Remove(at) => match engine.remove_piece(at)? {
            Some(piece) => format!("removed {} from {at}", piece.label()),
            None => format!("{at} was empty"),
        },
        Command::MoveLike { type_name, base } => {
            engine.define_like(&type_name, &base)?;
            format!("type '{type_name}' now moves like '{base}'")
        }
        Command::PieceType { type_name, change } => {
            let what = format!("{change:?}");
            engine.modify_piece_type(&type_name, change)?;
            format!("type '{type_name}': {what}")
        }
        Command::Rule(change) => {
            let what = format!("{change:?}");
            engine.set_rule(change);
            format!("rule {what}")
        }
        Command::Chunk(chunk) => execute_chunk(engine, chunk)?,
        Command::EdgeAdd(trigger) => {
            let what = match &trigger.action {
                EdgeAction::ToggleChunk(chunk) => format!("toggle '{chunk}'"),
                EdgeAction::SpawnRandom(b) => format!("spawn {}-{} x {}-{}", b.min_w, b.max_w, b.min_h, b.max_h),
            };
            let reply = format!(
                "edge trigger added: type={} dist<={} {what}",
                trigger.filter.as_str(),
                trigger.distance
            );
            engine.add_edge_trigger(trigger)?;
            reply
        }
        Command::EdgeClear => {
            engine.clear_edge_triggers();
            "edge triggers cleared".to_string()
        }
        Command::Play { from, to } => describe_move(engine.attempt_move(from, to)?, from),
        Command::Moves(at) => {
            let moves = engine.legal_moves(at);
            if moves.is_empty() {
                format!("{at}: no moves")
            } else {
                let names: Vec<String> = moves.iter().map(|c| c.to_algebraic()).collect();
                format!("{at}: {}", names.join(" "))
            }
        }
        Command::Save(name) => {
            let path = codec::save(engine, configs, &name)?;
            format!("saved {}", path.display())
        }
        Command::Load(name) => {
            let path = codec::load(engine, configs, &name)?;
            format!("loaded {}", path.display())
        }
        Command::Show => render::render(engine),
    };
    Ok(reply)
}

fn execute_chunk<R: Rng>(engine: &mut Engine<R>, command: ChunkCommand) -> EngineResult<String> {
    let reply = match command {
        ChunkCommand::Define { name, rect } => {
            engine.define_chunk(&name, rect)?;
            let [x1, y1, x2, y2] = rect.corners();
            format!("chunk '{name}' defined at ({x1},{y1})..({x2},{y2}), active")
        }
        ChunkCommand::Fill { name, fill } => {
            let what = fill
                .as_ref()
                .map_or_else(|| "none".to_string(), |f| format!("{} {}", f.color, f.type_name));
            engine.set_chunk_fill(&name, fill)?;
            format!("chunk '{name}' fill = {what}")
        }
        ChunkCommand::Owner { name, owner } => {
            engine.set_chunk_owner(&name, owner)?;
            format!("chunk '{name}' owner = {}", owner.as_str())
        }
        ChunkCommand::Script { name, side, script } => {
            engine.set_chunk_script(&name, side, Some(script))?;
            let what = match script {
                ScriptOverride::Clear => "clears scripts".to_string(),
                ScriptOverride::Set(s) => format!("sets {} ({})", s.kind, s.param),
            };
            let side = match side {
                Crossing::Enter => "enter",
                Crossing::Leave => "leave",
            };
            format!("chunk '{name}' {side} {what}")
        }
        ChunkCommand::Switch { name, switch } => {
            let active = engine
                .chunks()
                .get(&name)
                .map(|c| c.active)
                .ok_or_else(|| EngineError::unknown_chunk(&name))?;
            let wanted = match switch {
                Switch::On => true,
                Switch::Off => false,
                Switch::Toggle => !active,
            };
            if wanted == active {
                format!("chunk '{name}' already {}", if active { "on" } else { "off" })
            } else {
                match engine.toggle_chunk(&name)? {
                    Toggle::Enabled => format!("chunk '{name}' on"),
                    Toggle::Disabled => format!("chunk '{name}' off"),
                    Toggle::Refused => format!("chunk '{name}' refused"),
                }
            }
        }
        ChunkCommand::Reset => {
            engine.reset_chunks();
            "chunks and edge triggers cleared".to_string()
        }
    };
    Ok(reply)
}

fn describe_move(outcome: MoveOutcome, from: Coord) -> String {
    let applied = match outcome {
        MoveOutcome::Cancelled => return format!("{from}: move cancelled by script"),
        MoveOutcome::Applied(applied) => applied,
    };
    let mut reply = format!("{}{}", applied.from, applied.to);
    if let Some(captured) = &applied.captured {
        let _ = write!(reply, " x {captured}");
    }
    if let Some(explosion) = applied.explosion {
        let _ = write!(reply, ", explosion r{} at {}", explosion.radius, explosion.center);
    }
    if !applied.survived {
        reply.push_str(", mover lost");
    }
    for reaction in &applied.reactions {
        match reaction {
            EdgeReaction::Toggled { chunk, result } => {
                let _ = write!(reply, ", edge toggled '{chunk}' ({result:?})");
            }
            EdgeReaction::Spawned { chunk, rect, edge } => {
                let [x1, y1, x2, y2] = rect.corners();
                let _ = write!(reply, ", edge spawned '{chunk}' ({x1},{y1})..({x2},{y2}) on {edge:?}");
            }
        }
    }
    if let Some(outcome) = applied.outcome {
        let _ = write!(reply, "; game over {} {}", outcome.result, outcome.reason);
    }
    reply
}

/// Parse and execute one line. Blank lines and comments yield `None`.
///
/// # Errors
///
/// Returns `Validation` for lines that do not parse, or the engine's error.
pub fn run_line<R: Rng>(engine: &mut Engine<R>, configs: &Path, line: &str) -> EngineResult<Option<String>> {
    match Command::parse(line)? {
        Some(command) => execute(engine, configs, command).map(Some),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(engine: &mut Engine, line: &str) -> EngineResult<Option<String>> {
        run_line(engine, Path::new("configs"), line)
    }

    #[test]
    fn test_squares() {
        assert_eq!(square(&["d7"]).unwrap(), (Coord::new(3, 6), 1));
        assert_eq!(square(&["3,6"]).unwrap(), (Coord::new(3, 6), 1));
        assert_eq!(square(&["3", "6", "Q"]).unwrap(), (Coord::new(3, 6), 2));
        assert!(square(&["zz"]).is_err());
        assert!(square(&["3"]).is_err());
    }

    #[test]
    fn test_blank_and_comment() {
        assert_eq!(Command::parse("   ").unwrap(), None);
        assert_eq!(Command::parse("# setup").unwrap(), None);
    }

    #[test]
    fn test_parse_forms() {
        assert_eq!(
            Command::parse("add White Dragon 2 2 D").unwrap(),
            Some(Command::Add {
                color: Color::White,
                type_name: "dragon".to_string(),
                at: Coord::new(2, 2),
                symbol: Some("D".to_string()),
            })
        );
        assert_eq!(
            Command::parse("ptype rook range 0").unwrap(),
            Some(Command::PieceType {
                type_name: "rook".to_string(),
                change: TypeChange::Range(0),
            })
        );
        assert_eq!(
            Command::parse("rule victory king").unwrap(),
            Some(Command::Rule(RuleChange::Victory(VictoryMode::RoyalCapture)))
        );
        assert_eq!(
            Command::parse("notify label night  shift").unwrap(),
            Some(Command::Rule(RuleChange::EventLabel("night shift".to_string())))
        );
        assert_eq!(
            Command::parse("ptype pawn script decay 0").unwrap(),
            Some(Command::PieceType {
                type_name: "pawn".to_string(),
                change: TypeChange::Script(Some(Script::new(ScriptKind::Decay, 1.0))),
            })
        );
    }

    #[test]
    fn test_malformed_input_is_validation() {
        for line in [
            "board 8",
            "board eight 8",
            "add purple rook a1",
            "ptype rook immune maybe",
            "ptype rook dirs 1 0 1",
            "ptype rook script jitter",
            "rule capture nuclear",
            "rule atomic_radius big",
            "chunk define z1 0 0 1",
            "edge random any 1 2 2 2",
            "play e2",
            "frobnicate",
        ] {
            assert!(
                matches!(Command::parse(line), Err(EngineError::Validation(_))),
                "{line} should be rejected"
            );
        }
    }

    #[test]
    fn test_errors_leave_state_unchanged() {
        let mut engine = Engine::with_seed(1);
        let before = engine.session().clone();
        assert!(run(&mut engine, "add white rook 9 9").is_err());
        assert!(run(&mut engine, "ptype ghost royal on").is_err());
        assert!(run(&mut engine, "chunk fill nowhere white pawn").is_err());
        assert!(run(&mut engine, "edge add any 1 nowhere").is_err());
        assert!(run(&mut engine, "play e7 e5").is_err());
        assert_eq!(engine.session(), &before);
    }

    #[test]
    fn test_script_session() {
        let mut engine = Engine::with_seed(1);
        for line in [
            "board 6 6",
            "add white king a1",
            "add black king f6",
            "add white rook 0,5",
            "chunk define z1 4 0 5 1",
            "chunk fill z1 black pawn",
            "chunk off z1",
        ] {
            run(&mut engine, line).unwrap();
        }
        assert_eq!(engine.board().damaged().count(), 4);
        assert_eq!(run(&mut engine, "chunk off z1").unwrap().unwrap(), "chunk 'z1' already off");
        run(&mut engine, "chunk on z1").unwrap();
        assert_eq!(engine.board().count(Color::Black), 5);

        let reply = run(&mut engine, "moves a6").unwrap().unwrap();
        assert!(reply.starts_with("a6: "));
        let reply = run(&mut engine, "play a6 a2").unwrap().unwrap();
        assert_eq!(reply, "a6a2");
        assert_eq!(engine.turn(), Color::Black);
    }

    #[test]
    fn test_show_and_help() {
        let mut engine = Engine::with_seed(1);
        assert!(run(&mut engine, "show").unwrap().unwrap().contains("a b c d e f g h"));
        assert!(run(&mut engine, "help").unwrap().unwrap().contains("chunk define"));
    }
}
