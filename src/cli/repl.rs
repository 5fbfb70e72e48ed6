//! Interactive command shell.

use super::output::format_event;
use super::{read_document, CliError, OutputFormat};
use fission::{codec, command, Engine};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::info;

/// Execute the repl command.
///
/// Each input line is one command. Replies go to stdout followed by any
/// events the command produced; rejected commands are reported on stderr and
/// the session continues.
///
/// # Errors
///
/// Returns an error if the initial document cannot be loaded or stdin/stdout fail.
pub(crate) fn execute(
    seed: Option<u64>,
    load: Option<PathBuf>,
    configs: PathBuf,
    format: OutputFormat,
) -> Result<(), CliError> {
    let mut engine = seed.map_or_else(Engine::new, Engine::with_seed);
    if let Some(path) = load {
        let doc = read_document(&path)?;
        codec::import(&mut engine, &doc);
        info!(path = %path.display(), "initial state imported");
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();
    for line in stdin.lock().lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.eq_ignore_ascii_case("quit") || trimmed.eq_ignore_ascii_case("exit") {
            break;
        }

        match command::run_line(&mut engine, &configs, trimmed) {
            Ok(Some(reply)) => writeln!(stdout, "{reply}")?,
            Ok(None) => {}
            Err(e) => eprintln!("error: {e}"),
        }
        engine.tick();
        for event in engine.drain_events() {
            writeln!(stdout, "{}", format_event(&event, format))?;
        }
        stdout.flush()?;
    }

    Ok(())
}
