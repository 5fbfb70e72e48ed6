//! Plain-text board dump for terminal viewing.

use rand::Rng;

use crate::game::{Board, ChunkSet, Color, Coord, Engine, EdgeAction};

/// Render the engine's position, status and chunks.
///
/// Output format:
/// ```text
/// white to move, move 1 (capture atomic r1, victory elimination)
///    +-----------------+
///  8 | r n b q k b n r |
///  7 | p p p p p p p p |
///  6 | . . . . . . . . |
///  ...
///  1 | R N B Q K B N R |
///    +-----------------+
///      a b c d e f g h
/// ```
///
/// Black pieces are shown in lowercase, empty damaged squares as `x`.
#[must_use]
pub fn render<R: Rng>(engine: &Engine<R>) -> String {
    let mut output = String::new();
    render_status(&mut output, engine);
    render_board(&mut output, engine.board(), engine.last_move());
    render_chunks(&mut output, engine.chunks());
    let triggers = engine.triggers();
    if !triggers.is_empty() {
        output.push_str(&format!("edge triggers: {}\n", triggers.len()));
        for trigger in triggers {
            let action = match &trigger.action {
                EdgeAction::ToggleChunk(chunk) => format!("toggle {chunk}"),
                EdgeAction::SpawnRandom(b) => {
                    format!("spawn {}-{} x {}-{}", b.min_w, b.max_w, b.min_h, b.max_h)
                }
            };
            output.push_str(&format!(
                "  {} within {}: {action}\n",
                trigger.filter.as_str(),
                trigger.distance
            ));
        }
    }
    output
}

fn render_status<R: Rng>(output: &mut String, engine: &Engine<R>) {
    let rules = engine.rules();
    match engine.outcome() {
        Some(outcome) => output.push_str(&format!("game over {} {}", outcome.result, outcome.reason)),
        None => output.push_str(&format!("{} to move, move {}", engine.turn(), engine.fullmove())),
    }
    output.push_str(&format!(
        " (capture {} r{}, victory {})\n",
        rules.capture_mode.as_str(),
        rules.atomic_radius,
        rules.victory.as_str()
    ));
}

/// Render the grid, top rank first.
fn render_board(output: &mut String, board: &Board, last_move: Option<(Coord, Coord)>) {
    let width = usize::try_from(board.width()).unwrap_or(0);
    let border = format!("   +{}+\n", "-".repeat(width * 2 + 1));

    output.push_str(&border);
    for y in (0..board.height()).rev() {
        output.push_str(&format!("{:>2} |", y + 1));
        for x in 0..board.width() {
            let coord = Coord::new(x, y);
            output.push(' ');
            output.push_str(&square(board, coord));
        }
        output.push_str(" |");
        if let Some((from, to)) = last_move {
            if to.y == y {
                output.push_str(&format!("  last {from}{to}"));
            }
        }
        output.push('\n');
    }
    output.push_str(&border);

    output.push_str("    ");
    for x in 0..board.width() {
        let name = Coord::new(x, 0).to_algebraic();
        output.push(' ');
        output.push_str(name.get(..1).unwrap_or("?"));
    }
    output.push('\n');
}

fn square(board: &Board, coord: Coord) -> String {
    match board.get(coord) {
        Some(piece) if piece.color == Color::Black => piece.symbol.to_lowercase(),
        Some(piece) => piece.symbol.to_uppercase(),
        None if board.is_damaged(coord) => "x".to_string(),
        None => ".".to_string(),
    }
}

fn render_chunks(output: &mut String, chunks: &ChunkSet) {
    if chunks.is_empty() {
        return;
    }
    output.push_str(&format!("chunks: {}\n", chunks.len()));
    for (name, chunk) in chunks.iter() {
        let [x1, y1, x2, y2] = chunk.rect.corners();
        output.push_str(&format!(
            "  {name} ({x1},{y1})..({x2},{y2}) {} owner={}",
            if chunk.active { "on" } else { "off" },
            chunk.owner.as_str()
        ));
        if let Some(fill) = &chunk.fill {
            output.push_str(&format!(" fill={} {}", fill.color, fill.type_name));
        }
        output.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Rect;

    #[test]
    fn test_render_standard() {
        let engine = Engine::with_seed(1);
        let text = render(&engine);
        assert!(text.starts_with("white to move, move 1 (capture atomic r1, victory elimination)"));
        assert!(text.contains(" 8 | r n b q k b n r |"));
        assert!(text.contains(" 1 | R N B Q K B N R |"));
        assert!(text.contains("     a b c d e f g h"));
        assert!(!text.contains("chunks"));
    }

    #[test]
    fn test_render_damage_and_chunks() {
        let mut engine = Engine::with_seed(1);
        engine.resize(3, 3);
        engine.define_chunk("z1", Rect::new(0, 0, 0, 0)).unwrap();
        engine.toggle_chunk("z1").unwrap();
        let text = render(&engine);
        assert!(text.contains(" 1 | x . . |"));
        assert!(text.contains("  z1 (0,0)..(0,0) off owner=any"));
    }
}
