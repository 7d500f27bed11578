//! Configuration for braid.
//!
//! [`load_and_apply`] merges the XDG `config.toml` `[env]` table and the
//! project `.env` into the process environment with priority
//! **existing env > .env > XDG**. Typed settings ([`ExecutorSettings`],
//! [`LlmSettings`]) are then read from the environment.

mod dotenv;
mod settings;
mod xdg_toml;

use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use thiserror::Error;

pub use settings::{
    waqi_token, waqi_token_from_lookup, ExecutorSettings, LlmSettings, DEFAULT_BASE_URL,
    DEFAULT_MAX_ITERATIONS, DEFAULT_MODEL, DEFAULT_TERMINAL_TOOL, DEFAULT_TOOL_CHOICE,
    ENV_API_KEY, ENV_BASE_URL, ENV_GROQ_API_KEY, ENV_MAX_ITERATIONS, ENV_MODEL,
    ENV_TERMINAL_TOOL, ENV_TOOL_CHOICE, ENV_WAQI_TOKEN,
};
pub use xdg_toml::config_file;

/// App name used for the XDG config path (`~/.config/braid/config.toml`).
pub const APP_NAME: &str = "braid";

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("xdg config path: {0}")]
    XdgPath(String),
    #[error("read xdg config: {0}")]
    XdgRead(std::io::Error),
    #[error("parse xdg toml: {0}")]
    XdgParse(#[from] toml::de::Error),
    #[error("read .env: {0}")]
    Dotenv(String),
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },
    #[error("missing required setting: {0}")]
    Missing(String),
}

/// Picks, for every key in `.env` or XDG that `is_set` reports unset, the
/// `.env` value if any, else the XDG value. Sorted by key.
fn resolve(
    is_set: impl Fn(&str) -> bool,
    dotenv_map: &HashMap<String, String>,
    xdg_map: &HashMap<String, String>,
) -> Vec<(String, String)> {
    let keys: BTreeSet<&String> = dotenv_map.keys().chain(xdg_map.keys()).collect();
    keys.into_iter()
        .filter(|k| !is_set(k))
        .filter_map(|k| {
            dotenv_map
                .get(k)
                .or_else(|| xdg_map.get(k))
                .map(|v| (k.clone(), v.clone()))
        })
        .collect()
}

/// Loads `<config dir>/<app_name>/config.toml` and the `.env` in `override_dir`
/// (or the current directory), then sets every variable that is not already set.
///
/// Returns the names of the variables it set.
pub fn load_and_apply(
    app_name: &str,
    override_dir: Option<&Path>,
) -> Result<Vec<String>, LoadError> {
    let xdg_map = xdg_toml::load_env_map(app_name)?;
    let dotenv_map = dotenv::load_env_map(override_dir)?;

    let pending = resolve(|k| std::env::var_os(k).is_some(), &dotenv_map, &xdg_map);
    let mut applied = Vec::with_capacity(pending.len());
    for (key, value) in pending {
        std::env::set_var(&key, value);
        applied.push(key);
    }
    Ok(applied)
}
