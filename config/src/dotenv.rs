//! Read a project `.env` into a key-value map without touching the process env.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::LoadError;

/// `.env` in `override_dir`, else in the current directory, if it is a file.
fn dotenv_path(override_dir: Option<&Path>) -> Option<PathBuf> {
    let dir = override_dir
        .map(Path::to_path_buf)
        .or_else(|| std::env::current_dir().ok())?;
    let path = dir.join(".env");
    path.is_file().then_some(path)
}

/// Parsed `.env` pairs. A missing file yields an empty map; a malformed line is an error.
pub fn load_env_map(override_dir: Option<&Path>) -> Result<HashMap<String, String>, LoadError> {
    let Some(path) = dotenv_path(override_dir) else {
        return Ok(HashMap::new());
    };
    let iter = dotenv::from_path_iter(&path)
        .map_err(|e| LoadError::Dotenv(format!("{}: {}", path.display(), e)))?;
    iter.map(|item| item.map_err(|e| LoadError::Dotenv(format!("{}: {}", path.display(), e))))
        .collect()
}
