#![no_main]

//! Move pipeline fuzzer.
//!
//! Drives a standard game with arbitrary rule edits, chunk toggles and move
//! attempts. Rejected moves must leave the session untouched, and the
//! session must satisfy every invariant after each step.

use arbitrary::Arbitrary;
use fission::game::invariants::check_invariants;
use fission::game::{
    CaptureMode, Coord, EdgeAction, EdgeTrigger, Engine, Rect, RuleChange, SpawnBounds, TypeFilter,
};
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
enum Step {
    /// Attempt a move between two squares.
    Move { from: (u8, u8), to: (u8, u8) },
    /// Change the blast radius.
    Radius(u8),
    /// Switch between atomic and normal captures.
    Normal(bool),
    /// Allow moving onto damaged squares.
    DamageBlocks(bool),
    /// Define a chunk and toggle it.
    Chunk { corners: (u8, u8, u8, u8) },
    /// Add a random spawn trigger.
    Spawn { dist: u8, w: u8, h: u8 },
    /// Advance the limits check.
    Tick,
}

#[derive(Arbitrary, Debug)]
struct MovesInput {
    seed: u64,
    steps: Vec<Step>,
}

fn coord((x, y): (u8, u8)) -> Coord {
    Coord::new(i32::from(x % 10) - 1, i32::from(y % 10) - 1)
}

fuzz_target!(|input: MovesInput| {
    let mut engine = Engine::with_seed(input.seed);
    for (i, step) in input.steps.into_iter().take(200).enumerate() {
        match step {
            Step::Move { from, to } => {
                let before = engine.session().clone();
                if engine.attempt_move(coord(from), coord(to)).is_err() {
                    assert_eq!(engine.session(), &before, "rejected move changed the session");
                }
            }
            Step::Radius(r) => engine.set_rule(RuleChange::AtomicRadius(u32::from(r % 5))),
            Step::Normal(on) => engine.set_rule(RuleChange::CaptureMode(if on {
                CaptureMode::Normal
            } else {
                CaptureMode::Atomic
            })),
            Step::DamageBlocks(on) => engine.set_rule(RuleChange::DamageBlocksMove(on)),
            Step::Chunk { corners: (a, b, c, d) } => {
                let name = format!("c{i}");
                let rect = Rect::new(i32::from(a % 8), i32::from(b % 8), i32::from(c % 8), i32::from(d % 8));
                if engine.define_chunk(&name, rect).is_ok() {
                    let _ = engine.toggle_chunk(&name);
                }
            }
            Step::Spawn { dist, w, h } => {
                let w = i32::from(w % 4) + 1;
                let h = i32::from(h % 4) + 1;
                let _ = engine.add_edge_trigger(EdgeTrigger {
                    filter: TypeFilter::Any,
                    distance: u32::from(dist % 3),
                    action: EdgeAction::SpawnRandom(SpawnBounds::new(w, w, h, h)),
                });
            }
            Step::Tick => {
                engine.tick();
            }
        }
        let violations = check_invariants(engine.session());
        assert!(violations.is_empty(), "Invariants violated: {violations:?}");
        let _ = engine.drain_events();
    }
});
