//! Load configuration from XDG `config.toml` and project `.env`.
//!
//! Two things come out of one config file:
//!
//! - the `[env]` table, applied to the process environment with priority
//!   **existing env > .env > config.toml** (see [`load_and_apply`]);
//! - named sections such as `[search]`, deserialized on demand with [`load_section`].
//!
//! The file is `$XDG_CONFIG_HOME/<app>/config.toml` (platform config dir when unset), which may be
//! absent, or an explicit path given by the caller, which must exist.

mod dotenv;
mod xdg_toml;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use thiserror::Error;

pub use xdg_toml::config_path;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("config path: {0}")]
    ConfigPath(String),
    #[error("read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parse config toml: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("parse {path}: {message}")]
    Dotenv { path: PathBuf, message: String },
}

/// The implicit XDG file may be absent; a file the caller names must exist.
fn resolve(app_name: &str, config_file: Option<&Path>) -> Result<PathBuf, LoadError> {
    match config_file {
        Some(p) if !p.is_file() => Err(LoadError::Read {
            path: p.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "config file not found"),
        }),
        Some(p) => Ok(p.to_path_buf()),
        None => config_path(app_name),
    }
}

/// Sets environment variables from `.env` and the config file's `[env]` table, only for keys
/// that are **not** already set.
///
/// Precedence for a key missing from the process environment:
/// 1. project `.env` (in `dotenv_dir`, or the current directory)
/// 2. `[env]` of `config_file`, or of `$XDG_CONFIG_HOME/<app_name>/config.toml`
pub fn load_and_apply(
    app_name: &str,
    config_file: Option<&Path>,
    dotenv_dir: Option<&Path>,
) -> Result<(), LoadError> {
    let toml_map = xdg_toml::load_env_map(&resolve(app_name, config_file)?)?;
    let dotenv_map = dotenv::load_env_map(dotenv_dir)?;

    let mut keys: HashSet<&String> = toml_map.keys().collect();
    keys.extend(dotenv_map.keys());

    for key in keys {
        if std::env::var_os(key).is_some() {
            continue;
        }
        if let Some(v) = dotenv_map.get(key).or_else(|| toml_map.get(key)) {
            std::env::set_var(key, v);
        }
    }
    Ok(())
}

/// Deserializes section `[section]` of `config_file` (or the app's XDG config). Returns `None`
/// when the file or the section does not exist.
pub fn load_section<T: DeserializeOwned>(
    app_name: &str,
    config_file: Option<&Path>,
    section: &str,
) -> Result<Option<T>, LoadError> {
    xdg_toml::load_section(&resolve(app_name, config_file)?, section)
}
