use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::config::{DevstartConfig, CONFIG_FILE_NAME};
use crate::xdg;

/// Where a config file was found and which directory it anchors
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredConfig {
    pub path: PathBuf,
    /// Directory that relative paths and spawned programs resolve against
    pub root: PathBuf,
}

/// A loaded configuration together with its origin
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: DevstartConfig,
    /// `None` when built-in defaults are in use
    pub path: Option<PathBuf>,
    pub root: PathBuf,
}

/// Discovers devstart configuration by traversing up the directory tree
///
/// A project file anchors the project root at its own directory. The global
/// fallback (`~/.config/devstart/config.toml`) anchors it at `start_dir`.
pub fn discover_config(start_dir: &Path) -> Result<Option<DiscoveredConfig>> {
    let mut current = start_dir.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.is_file() {
            return Ok(Some(DiscoveredConfig {
                path: config_path,
                root: current,
            }));
        }

        match current.parent() {
            Some(parent) => current = parent.to_path_buf(),
            None => break,
        }
    }

    if let Some(global_config) = xdg::global_config_file() {
        if global_config.is_file() {
            return Ok(Some(DiscoveredConfig {
                path: global_config,
                root: start_dir.to_path_buf(),
            }));
        }
    }

    Ok(None)
}

/// Loads configuration with auto-discovery support
///
/// If `explicit_path` is provided, loads config from that path and anchors the
/// project root at its directory. Otherwise, auto-discovers from `cwd`. With
/// nothing found, returns the defaults rooted at `cwd`.
pub fn load_config_with_discovery(explicit_path: Option<&str>, cwd: &Path) -> Result<LoadedConfig> {
    if let Some(config_path) = explicit_path {
        let path = absolutize(Path::new(config_path), cwd);
        let config = DevstartConfig::from_file(&path)?;
        let root = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| cwd.to_path_buf());

        return Ok(LoadedConfig {
            config,
            path: Some(path),
            root,
        });
    }

    match discover_config(cwd)? {
        Some(found) => {
            tracing::info!("Using config: {}", found.path.display());
            Ok(LoadedConfig {
                config: DevstartConfig::from_file(&found.path)?,
                path: Some(found.path),
                root: found.root,
            })
        }
        None => {
            tracing::debug!("No {} found, using defaults", CONFIG_FILE_NAME);
            Ok(LoadedConfig {
                config: DevstartConfig::default(),
                path: None,
                root: cwd.to_path_buf(),
            })
        }
    }
}

/// Same as [`load_config_with_discovery`], starting from the process cwd
pub fn load_from_current_dir(explicit_path: Option<&str>) -> Result<LoadedConfig> {
    let cwd = std::env::current_dir()
        .context("Failed to get current directory for config discovery")?;
    load_config_with_discovery(explicit_path, &cwd)
}

fn absolutize(path: &Path, cwd: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}
