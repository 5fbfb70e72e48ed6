//! Named state documents in a configs directory.
//!
//! Names are reduced to `[A-Za-z0-9_-]` and stored as `<name>.json`.

use std::fs;
use std::path::{Path, PathBuf};

use rand::Rng;
use tracing::{info, warn};

use crate::codec::{from_json, import, to_json};
use crate::error::{EngineError, EngineResult};
use crate::game::Engine;

/// Keep only ASCII letters, digits, `_` and `-`.
#[must_use]
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect()
}

/// File path for a named document in `dir`.
///
/// # Errors
///
/// Returns `Validation` if nothing of the name survives sanitizing.
pub fn config_path(dir: &Path, name: &str) -> EngineResult<PathBuf> {
    let clean = sanitize_name(name);
    if clean.is_empty() {
        return Err(EngineError::validation(format!("unusable config name '{name}'")));
    }
    Ok(dir.join(format!("{clean}.json")))
}

fn io_error(path: &Path, source: std::io::Error) -> EngineError {
    warn!(path = %path.display(), error = %source, "config file I/O failed");
    EngineError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Write the engine's session to `dir/<name>.json`, creating `dir` if needed.
///
/// # Errors
///
/// Returns `Validation` for an unusable name or `Io` if the file cannot be written.
pub fn save<R: Rng>(engine: &Engine<R>, dir: &Path, name: &str) -> EngineResult<PathBuf> {
    let path = config_path(dir, name)?;
    let text = to_json(engine)?;
    fs::create_dir_all(dir).map_err(|e| io_error(dir, e))?;
    fs::write(&path, text).map_err(|e| io_error(&path, e))?;
    info!(path = %path.display(), "state saved");
    Ok(path)
}

/// Replace the engine's session with the one stored in `dir/<name>.json`.
///
/// On any error the engine is left as it was.
///
/// # Errors
///
/// Returns `Validation` for an unusable name, `Io` if the file cannot be read,
/// or `ConfigMalformed` if it does not hold a JSON object.
pub fn load<R: Rng>(engine: &mut Engine<R>, dir: &Path, name: &str) -> EngineResult<PathBuf> {
    let path = config_path(dir, name)?;
    let text = fs::read_to_string(&path).map_err(|e| io_error(&path, e))?;
    let doc = from_json(&text).inspect_err(|e| warn!(path = %path.display(), error = %e, "config rejected"))?;
    import(engine, &doc);
    info!(path = %path.display(), "state loaded");
    Ok(path)
}
