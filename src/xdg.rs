//! XDG Base Directory support for devstart
//!
//! Only the configuration directory is used: `$XDG_CONFIG_HOME/devstart/`
//! (default: `~/.config/devstart/`) holds the user-wide fallback config.

use std::path::PathBuf;

/// Get the devstart configuration directory
///
/// Respects `XDG_CONFIG_HOME`. Falls back to `$HOME/.config/devstart`.
/// Returns `None` when neither is available.
pub fn config_dir() -> Option<PathBuf> {
    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
        if !xdg_config.is_empty() {
            return Some(PathBuf::from(xdg_config).join("devstart"));
        }
    }
    dirs::home_dir().map(|home| home.join(".config").join("devstart"))
}

/// Path of the user-wide config file
pub fn global_config_file() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}
