//! Board dump of a state document.

use super::{read_document, CliError};
use fission::{codec, render, Engine};
use std::path::PathBuf;

/// Execute the show command.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a JSON object.
pub(crate) fn execute(file: PathBuf) -> Result<(), CliError> {
    let doc = read_document(&file)?;
    let mut engine = Engine::with_seed(0);
    codec::import(&mut engine, &doc);

    println!("{}", file.display());
    print!("{}", render::render(&engine));
    Ok(())
}
