//! Save and load of state documents through the filesystem.
//!
//! Run with: cargo test persistence

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use std::fs;

use fission::codec::{self, config_path};
use fission::command::run_line;
use fission::game::{ChunkOwner, Color, Coord, Engine, Rect, RuleChange, TypeChange, VictoryMode};
use fission::EngineError;
use tempfile::TempDir;

fn configured_engine() -> Engine {
    let mut engine = Engine::with_seed(4);
    engine.set_rule(RuleChange::AtomicRadius(2));
    engine.set_rule(RuleChange::Victory(VictoryMode::RoyalCapture));
    engine.define_like("dragon", "knight").unwrap();
    engine.modify_piece_type("dragon", TypeChange::Immune(true)).unwrap();
    engine.place_piece(Coord::new(3, 3), Color::White, "dragon", Some("D")).unwrap();
    engine.define_chunk("mid", Rect::new(2, 2, 5, 5)).unwrap();
    engine.set_chunk_owner("mid", ChunkOwner::Side(Color::Black)).unwrap();
    engine.attempt_move(Coord::new(4, 1), Coord::new(4, 3)).unwrap();
    engine
}

#[test]
fn test_save_then_load_restores_session() {
    let dir = TempDir::new().unwrap();
    let engine = configured_engine();

    let path = codec::save(&engine, dir.path(), "opening").unwrap();
    assert_eq!(path, dir.path().join("opening.json"));
    assert!(path.exists());

    let mut other = Engine::with_seed(99);
    codec::load(&mut other, dir.path(), "opening").unwrap();
    assert_eq!(other.session(), engine.session());
    assert_eq!(other.turn(), Color::Black);
}

#[test]
fn test_save_creates_missing_directory() {
    let dir = TempDir::new().unwrap();
    let nested = dir.path().join("a").join("b");
    let path = codec::save(&Engine::with_seed(1), &nested, "x").unwrap();
    assert!(path.starts_with(&nested));
    assert!(path.exists());
}

#[test]
fn test_name_is_sanitized() {
    let dir = TempDir::new().unwrap();
    let path = codec::save(&Engine::with_seed(1), dir.path(), "../../etc/pass wd").unwrap();
    assert_eq!(path, dir.path().join("etcpasswd.json"));
    assert!(matches!(
        config_path(dir.path(), "../.."),
        Err(EngineError::Validation(_))
    ));
}

#[test]
fn test_missing_file_leaves_engine_untouched() {
    let dir = TempDir::new().unwrap();
    let mut engine = configured_engine();
    let before = engine.session().clone();

    let err = codec::load(&mut engine, dir.path(), "absent").unwrap_err();
    assert!(matches!(err, EngineError::Io { .. }));
    assert_eq!(engine.session(), &before);
}

#[test]
fn test_malformed_file_leaves_engine_untouched() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("broken.json"), "{ not json").unwrap();
    fs::write(dir.path().join("list.json"), "[1, 2, 3]").unwrap();
    let mut engine = configured_engine();
    let before = engine.session().clone();

    for name in ["broken", "list"] {
        let err = codec::load(&mut engine, dir.path(), name).unwrap_err();
        assert!(matches!(err, EngineError::ConfigMalformed(_)), "{name}: {err}");
        assert_eq!(engine.session(), &before);
    }
}

#[test]
fn test_hand_written_file_is_read_leniently() {
    let dir = TempDir::new().unwrap();
    let text = r#"{
        "cols": 6,
        "rows": "many",
        "turn": "black",
        "board": [
            {"x": 0, "y": 0, "color": "white", "type": "king"},
            {"x": 5, "y": 5, "color": "black", "type": "king"},
            {"x": 9, "y": 9, "color": "black", "type": "rook"},
            {"x": 1, "y": 1, "color": "purple", "type": "rook"}
        ],
        "rules": {"atomic_radius": 3, "victory": "nonsense"}
    }"#;
    fs::write(dir.path().join("hand.json"), text).unwrap();

    let mut engine = Engine::with_seed(1);
    codec::load(&mut engine, dir.path(), "hand").unwrap();
    assert_eq!((engine.board().width(), engine.board().height()), (6, 8));
    assert_eq!(engine.turn(), Color::Black);
    assert_eq!(engine.board().pieces().count(), 2);
    assert_eq!(engine.rules().atomic_radius, 3);
    assert_eq!(engine.rules().victory, VictoryMode::Elimination);
}

#[test]
fn test_save_and_load_commands() {
    let dir = TempDir::new().unwrap();
    let mut engine = configured_engine();
    let reply = run_line(&mut engine, dir.path(), "save slot1").unwrap().unwrap();
    assert!(reply.contains("slot1"));

    let mut other = Engine::with_seed(2);
    run_line(&mut other, dir.path(), "load slot1").unwrap();
    assert_eq!(other.session(), engine.session());

    assert!(matches!(
        run_line(&mut other, dir.path(), "load slot2"),
        Err(EngineError::Io { .. })
    ));
    assert_eq!(other.session(), engine.session());
}
