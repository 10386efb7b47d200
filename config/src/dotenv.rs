//! Read a project `.env` into a key-value map without touching the process environment.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::LoadError;

/// `.env` in `override_dir`, else in the current directory; `None` if there is no such file.
fn dotenv_path(override_dir: Option<&Path>) -> Option<PathBuf> {
    let dir = override_dir
        .map(Path::to_path_buf)
        .or_else(|| std::env::current_dir().ok())?;
    let path = dir.join(".env");
    path.is_file().then_some(path)
}

/// Parses `.env` with the `dotenv` crate's line grammar. Missing file returns an empty map.
pub fn load_env_map(override_dir: Option<&Path>) -> Result<HashMap<String, String>, LoadError> {
    let Some(path) = dotenv_path(override_dir) else {
        return Ok(HashMap::new());
    };
    let dotenv_err = |e: dotenv::Error| LoadError::Dotenv {
        path: path.clone(),
        message: e.to_string(),
    };
    let mut out = HashMap::new();
    for item in dotenv::from_path_iter(&path).map_err(dotenv_err)? {
        let (key, value) = item.map_err(dotenv_err)?;
        out.insert(key, value);
    }
    Ok(out)
}
