//! `$XDG_CONFIG_HOME/<app>/config.toml`: the `[env]` table plus arbitrary named sections.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

use crate::LoadError;

/// `$XDG_CONFIG_HOME`, falling back to the platform config directory.
fn config_home() -> Result<PathBuf, LoadError> {
    match std::env::var_os("XDG_CONFIG_HOME") {
        Some(dir) if !dir.is_empty() => Ok(PathBuf::from(dir)),
        _ => dirs::config_dir()
            .ok_or_else(|| LoadError::ConfigPath("no config directory for this platform".into())),
    }
}

/// Path of the app's `config.toml`, whether or not it exists.
pub fn config_path(app_name: &str) -> Result<PathBuf, LoadError> {
    Ok(config_home()?.join(app_name).join("config.toml"))
}

/// Parsed file as a TOML table; `None` when the file does not exist.
pub fn read_table(path: &Path) -> Result<Option<toml::Table>, LoadError> {
    if !path.is_file() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(toml::from_str(&content)?))
}

/// Returns the `[env]` table. Missing file or missing section returns an empty map.
pub fn load_env_map(path: &Path) -> Result<HashMap<String, String>, LoadError> {
    let Some(mut table) = read_table(path)? else {
        return Ok(HashMap::new());
    };
    match table.remove("env") {
        Some(env) => Ok(env.try_into()?),
        None => Ok(HashMap::new()),
    }
}

/// Deserializes section `[name]`. `None` when the file or the section is absent.
pub fn load_section<T: DeserializeOwned>(path: &Path, name: &str) -> Result<Option<T>, LoadError> {
    let Some(mut table) = read_table(path)? else {
        return Ok(None);
    };
    match table.remove(name) {
        Some(section) => Ok(Some(section.try_into()?)),
        None => Ok(None),
    }
}
