//! Per-piece behaviour scripts.
//!
//! `stutter`, `jitter` and `entropy` act before a move is applied and may
//! cancel or redirect it. `decay`, `charge`, `heat` and the entropy counter
//! act after the move, on the piece's own state.

use rand::Rng;
use rand::seq::SliceRandom;

use crate::game::{Coord, Piece, PieceState, PieceType, Script, ScriptKind};

/// Entropy probability growth per completed move.
const ENTROPY_STEP: f64 = 0.1;

/// Outcome of the pre-move hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreMove {
    /// The move does not happen at all.
    Cancel,
    /// The move goes ahead to this square (possibly redirected).
    Proceed(Coord),
}

/// Outcome of the post-move hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostMove {
    /// The piece stays on the board.
    Survives,
    /// The piece's decay countdown ran out; it must be removed.
    Expired,
}

/// The script that applies to a piece: its override, else its type's default.
#[must_use]
pub fn effective_script(piece: &Piece, piece_type: Option<&PieceType>) -> Option<Script> {
    piece
        .state
        .script_override
        .or_else(|| piece_type.and_then(|pt| pt.script))
}

/// Run the pre-move hook for a move towards `target`.
///
/// `legal` is the full legal set the target was chosen from; redirects pick
/// uniformly from it.
pub fn pre_move<R: Rng>(
    script: Option<Script>,
    state: &PieceState,
    target: Coord,
    legal: &[Coord],
    rng: &mut R,
) -> PreMove {
    let Some(script) = script else {
        return PreMove::Proceed(target);
    };
    match script.kind {
        ScriptKind::Stutter => {
            if rng.gen_bool(script.probability()) {
                PreMove::Cancel
            } else {
                PreMove::Proceed(target)
            }
        }
        ScriptKind::Jitter => redirect(script.probability(), target, legal, rng),
        ScriptKind::Entropy => redirect(entropy_probability(script, state.entropy_level), target, legal, rng),
        ScriptKind::Decay | ScriptKind::Charge | ScriptKind::Heat => PreMove::Proceed(target),
    }
}

/// Redirect probability of an entropy script after `level` completed moves.
#[must_use]
pub fn entropy_probability(script: Script, level: u32) -> f64 {
    let base = if script.param.is_nan() { 0.0 } else { script.param };
    (base * (1.0 + ENTROPY_STEP * f64::from(level))).clamp(0.0, 1.0)
}

fn redirect<R: Rng>(probability: f64, target: Coord, legal: &[Coord], rng: &mut R) -> PreMove {
    if legal.is_empty() || !rng.gen_bool(probability) {
        return PreMove::Proceed(target);
    }
    PreMove::Proceed(legal.choose(rng).copied().unwrap_or(target))
}

/// Run the post-move hook on the state of a piece that completed a move.
pub fn post_move(script: Option<Script>, state: &mut PieceState) -> PostMove {
    let Some(script) = script else {
        return PostMove::Survives;
    };
    match script.kind {
        ScriptKind::Decay => {
            let left = state.decay_left.unwrap_or_else(|| script.count()).saturating_sub(1);
            state.decay_left = Some(left);
            if left == 0 {
                return PostMove::Expired;
            }
        }
        ScriptKind::Charge => {
            if step_counter(&mut state.charge_count, script.count()) {
                state.range_bonus = state.range_bonus.saturating_add(1);
            }
        }
        ScriptKind::Heat => {
            if step_counter(&mut state.heat_count, script.count()) {
                state.heat_bonus = state.heat_bonus.saturating_add(1);
            }
        }
        ScriptKind::Entropy => state.entropy_level = state.entropy_level.saturating_add(1),
        ScriptKind::Stutter | ScriptKind::Jitter => {}
    }
    PostMove::Survives
}

/// Advance a move counter; returns `true` (and resets it) when it reaches `threshold`.
fn step_counter(counter: &mut u32, threshold: u32) -> bool {
    *counter = counter.saturating_add(1);
    if *counter >= threshold {
        *counter = 0;
        true
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Color;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn script(kind: ScriptKind, param: f64) -> Option<Script> {
        Some(Script::new(kind, param))
    }

    #[test]
    fn test_override_beats_type_default() {
        let mut pt = PieceType::queen();
        pt.script = script(ScriptKind::Heat, 2.0);
        let mut piece = Piece::new(Color::White, "queen", None);
        assert_eq!(effective_script(&piece, Some(&pt)).map(|s| s.kind), Some(ScriptKind::Heat));

        piece.state.script_override = script(ScriptKind::Decay, 3.0);
        assert_eq!(effective_script(&piece, Some(&pt)).map(|s| s.kind), Some(ScriptKind::Decay));
        assert_eq!(effective_script(&Piece::new(Color::White, "x", None), None), None);
    }

    #[test]
    fn test_stutter_certain_cancels() {
        let mut rng = SmallRng::seed_from_u64(1);
        let state = PieceState::default();
        let target = Coord::new(1, 1);
        assert_eq!(
            pre_move(script(ScriptKind::Stutter, 100.0), &state, target, &[target], &mut rng),
            PreMove::Cancel
        );
        assert_eq!(
            pre_move(script(ScriptKind::Stutter, 0.0), &state, target, &[target], &mut rng),
            PreMove::Proceed(target)
        );
    }

    #[test]
    fn test_jitter_stays_within_legal_set() {
        let mut rng = SmallRng::seed_from_u64(7);
        let state = PieceState::default();
        let legal = [Coord::new(0, 1), Coord::new(0, 2), Coord::new(0, 3)];
        for _ in 0..50 {
            match pre_move(script(ScriptKind::Jitter, 1.0), &state, legal[0], &legal, &mut rng) {
                PreMove::Proceed(to) => assert!(legal.contains(&to)),
                PreMove::Cancel => panic!("jitter never cancels"),
            }
        }
    }

    #[test]
    fn test_jitter_with_empty_legal_set_keeps_target() {
        let mut rng = SmallRng::seed_from_u64(7);
        let target = Coord::new(4, 4);
        assert_eq!(
            pre_move(script(ScriptKind::Jitter, 1.0), &PieceState::default(), target, &[], &mut rng),
            PreMove::Proceed(target)
        );
    }

    #[test]
    fn test_entropy_probability_ramps() {
        let s = Script::new(ScriptKind::Entropy, 0.5);
        assert!((entropy_probability(s, 0) - 0.5).abs() < 1e-9);
        assert!((entropy_probability(s, 5) - 0.75).abs() < 1e-9);
        assert!((entropy_probability(s, 20) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_decay_counts_down() {
        let decay = script(ScriptKind::Decay, 2.0);
        let mut state = PieceState::default();
        assert_eq!(post_move(decay, &mut state), PostMove::Survives);
        assert_eq!(state.decay_left, Some(1));
        assert_eq!(post_move(decay, &mut state), PostMove::Expired);
    }

    #[test]
    fn test_charge_and_heat_bonus() {
        let mut state = PieceState::default();
        for _ in 0..6 {
            post_move(script(ScriptKind::Charge, 3.0), &mut state);
        }
        assert_eq!(state.range_bonus, 2);
        assert_eq!(state.charge_count, 0);

        post_move(script(ScriptKind::Heat, 1.0), &mut state);
        assert_eq!(state.heat_bonus, 1);
    }

    #[test]
    fn test_entropy_level_counts_every_move() {
        let mut state = PieceState::default();
        post_move(script(ScriptKind::Entropy, 0.0), &mut state);
        post_move(script(ScriptKind::Entropy, 0.0), &mut state);
        assert_eq!(state.entropy_level, 2);
    }
}
