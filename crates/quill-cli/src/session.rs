//! Session state persisted between CLI invocations.
//!
//! `generate` caches its article and raw response here so `render` and
//! `publish` can pick it up later; `publish` records the editor URL.

use crate::error::{CliError, Result};
use quill_generator::SessionState;
use std::fs;
use std::path::{Path, PathBuf};

/// Default session file path (`~/.quill/session.json`).
pub fn default_session_path() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
    Ok(home.join(".quill").join("session.json"))
}

/// Load the session at `path`, or an empty one when the file is absent.
pub fn load_session(path: &Path) -> Result<SessionState> {
    if !path.exists() {
        return Ok(SessionState::default());
    }
    let contents = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

/// Write the session to `path`, creating parent directories.
pub fn save_session(path: &Path, state: &SessionState) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string_pretty(state)?)?;
    Ok(())
}
