//! Read the `[env]` table of `<config dir>/<app>/config.toml`.
//!
//! The config dir is `$XDG_CONFIG_HOME` when set, else the platform default
//! from `dirs` (`~/.config` on Linux).

use std::collections::HashMap;
use std::path::PathBuf;

use serde::Deserialize;

use crate::LoadError;

/// Platform config directory, honoring `XDG_CONFIG_HOME` on every platform.
pub fn config_home() -> Result<PathBuf, LoadError> {
    if let Some(dir) = std::env::var_os("XDG_CONFIG_HOME").filter(|d| !d.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    dirs::config_dir()
        .ok_or_else(|| LoadError::XdgPath("no config directory for this platform".into()))
}

/// Path of the app's config file (which may not exist).
pub fn config_file(app_name: &str) -> Result<PathBuf, LoadError> {
    Ok(config_home()?.join(app_name).join("config.toml"))
}

#[derive(Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    env: HashMap<String, String>,
}

/// `[env]` pairs; a missing file or section yields an empty map.
pub fn load_env_map(app_name: &str) -> Result<HashMap<String, String>, LoadError> {
    let path = config_file(app_name)?;
    if !path.is_file() {
        return Ok(HashMap::new());
    }
    let content = std::fs::read_to_string(&path).map_err(LoadError::XdgRead)?;
    parse_env_table(&content)
}

/// Parses the `[env]` table of a TOML document.
pub(crate) fn parse_env_table(content: &str) -> Result<HashMap<String, String>, LoadError> {
    let config: ConfigFile = toml::from_str(content)?;
    Ok(config.env)
}
