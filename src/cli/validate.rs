//! State document validation command implementation.

use super::{read_document, CliError};
use fission::codec::{self, session_from_document};
use fission::game::invariants::check_invariants;
use std::path::PathBuf;

/// Execute the validate command.
///
/// Reports how many entries of each section survive a lenient import.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not a JSON object, or the
/// imported session breaks an engine invariant.
pub(crate) fn execute(file: PathBuf) -> Result<(), CliError> {
    println!("Validating: {}", file.display());
    println!();

    let doc = read_document(&file)?;
    print_check("JSON object", true);

    let session = session_from_document(&doc);
    let kept = codec::export_session(&session);

    print_count("piece types", doc.piece_types.len(), kept.piece_types.len());
    print_count("pieces", doc.board.len(), kept.board.len());
    print_count("damaged squares", doc.damaged.len(), kept.damaged.len());
    print_count("chunks", doc.chunks.len(), kept.chunks.len());
    print_count("edge triggers", doc.edge_triggers.len(), kept.edge_triggers.len());

    let violations = check_invariants(&session);
    print_check("engine invariants", violations.is_empty());
    if let Some(first) = violations.first() {
        return Err(CliError::new(first.to_string()));
    }

    println!();
    println!("Summary:");
    println!("  Board:  {}x{}", session.board.width(), session.board.height());
    println!("  Turn:   {} (move {})", session.turn, session.fullmove);
    println!("  Rules:  capture {}, victory {}", session.rules.capture_mode.as_str(), session.rules.victory.as_str());
    println!();
    println!("Validation successful!");

    Ok(())
}

fn print_check(name: &str, ok: bool) {
    let status = if ok { "OK" } else { "FAILED" };
    let symbol = if ok { "✓" } else { "✗" };
    println!("  {symbol} {name}: {status}");
}

fn print_count(name: &str, given: usize, kept: usize) {
    let symbol = if given == kept { "✓" } else { "!" };
    println!("  {symbol} {name}: {kept} of {given} kept");
}
