use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Component, Path};

/// File name looked up by config discovery
pub const CONFIG_FILE_NAME: &str = "devstart.toml";

/// Complete devstart configuration (loaded from TOML file)
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct DevstartConfig {
    #[serde(default)]
    pub clean: CleanConfig,

    #[serde(default)]
    pub seed: SeedConfig,

    #[serde(default)]
    pub server: ServerConfig,

    /// Extra environment variables for the seed and server processes
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

/// Bytecode cache cleanup
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CleanConfig {
    /// Paths or glob patterns, relative to the project root
    #[serde(default = "default_clean_paths")]
    pub paths: Vec<String>,
}

impl Default for CleanConfig {
    fn default() -> Self {
        Self {
            paths: default_clean_paths(),
        }
    }
}

/// What to do when the seed program fails
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SeedFailurePolicy {
    /// Stop before starting the server
    #[default]
    Abort,
    /// Log a warning and start the server anyway
    Continue,
}

impl std::fmt::Display for SeedFailurePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Abort => write!(f, "abort"),
            Self::Continue => write!(f, "continue"),
        }
    }
}

/// Database seeding program
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SeedConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_seed_program")]
    pub program: String,

    #[serde(default = "default_seed_args")]
    pub args: Vec<String>,

    #[serde(default)]
    pub on_failure: SeedFailurePolicy,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            program: default_seed_program(),
            args: default_seed_args(),
            on_failure: SeedFailurePolicy::default(),
        }
    }
}

/// Development server launcher
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    #[serde(default = "default_server_program")]
    pub program: String,

    #[serde(default = "default_server_args")]
    pub args: Vec<String>,

    /// Append `debug_flag` to the arguments
    #[serde(default = "default_true")]
    pub debug: bool,

    #[serde(default = "default_debug_flag")]
    pub debug_flag: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            program: default_server_program(),
            args: default_server_args(),
            debug: true,
            debug_flag: default_debug_flag(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_clean_paths() -> Vec<String> {
    vec!["Onboarding/__pycache".to_string(), "__pycache__".to_string()]
}

fn default_seed_program() -> String {
    "python".to_string()
}

fn default_seed_args() -> Vec<String> {
    vec!["seed.py".to_string()]
}

fn default_server_program() -> String {
    "flask".to_string()
}

fn default_server_args() -> Vec<String> {
    vec!["--app".to_string(), "app".to_string(), "run".to_string()]
}

fn default_debug_flag() -> String {
    "--debug".to_string()
}

impl DevstartConfig {
    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: DevstartConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;

        Ok(config)
    }

    /// Default configuration rendered as a commented TOML file
    pub fn example() -> String {
        format!(
            r#"# devstart configuration
# Paths are relative to the directory holding this file.

[clean]
# Bytecode cache directories (glob patterns allowed)
paths = ["Onboarding/__pycache", "__pycache__"]

[seed]
enabled = true
program = "python"
args = ["seed.py"]
# abort: do not start the server when seeding fails
# continue: start the server anyway
on_failure = "{}"

[server]
program = "flask"
args = ["--app", "app", "run"]
debug = true
debug_flag = "--debug"

[env]
# FLASK_RUN_PORT = "5000"
"#,
            SeedFailurePolicy::default()
        )
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        for entry in &self.clean.paths {
            validate_clean_path(entry)?;
        }

        if self.seed.enabled && self.seed.program.trim().is_empty() {
            anyhow::bail!("seed.program must be set when seeding is enabled");
        }

        if self.server.program.trim().is_empty() {
            anyhow::bail!("server.program must be set");
        }

        if self.server.debug && self.server.debug_flag.trim().is_empty() {
            anyhow::bail!("server.debug_flag must be set when server.debug is true");
        }

        for key in self.env.keys() {
            if key.is_empty() || key.contains('=') || key.contains('\0') {
                anyhow::bail!("env contains an invalid variable name: {:?}", key);
            }
        }

        Ok(())
    }
}

/// Clean entries must stay inside the project root
fn validate_clean_path(entry: &str) -> Result<()> {
    if entry.trim().is_empty() {
        anyhow::bail!("clean.paths must not contain empty entries");
    }

    let path = Path::new(entry);
    for component in path.components() {
        match component {
            Component::Normal(_) | Component::CurDir => {}
            Component::ParentDir => {
                anyhow::bail!("clean.paths entry must not contain '..': {}", entry)
            }
            Component::RootDir | Component::Prefix(_) => {
                anyhow::bail!("clean.paths entry must be relative: {}", entry)
            }
        }
    }

    if path.components().all(|c| matches!(c, Component::CurDir)) {
        anyhow::bail!("clean.paths entry must not be the project root: {}", entry);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_matches_dev_script() {
        let config = DevstartConfig::default();
        assert_eq!(config.clean.paths, vec!["Onboarding/__pycache", "__pycache__"]);
        assert_eq!(config.seed.program, "python");
        assert_eq!(config.seed.args, vec!["seed.py"]);
        assert_eq!(config.seed.on_failure, SeedFailurePolicy::Abort);
        assert_eq!(config.server.program, "flask");
        assert_eq!(config.server.args, vec!["--app", "app", "run"]);
        assert!(config.server.debug);
        assert_eq!(config.server.debug_flag, "--debug");
    }

    #[test]
    fn test_validate_default_config() {
        assert!(DevstartConfig::default().validate().is_ok());
    }

    #[test]
    fn test_example_parses_to_default() {
        let parsed: DevstartConfig = toml::from_str(&DevstartConfig::example()).unwrap();
        assert_eq!(parsed, DevstartConfig::default());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILE_NAME);
        fs::write(
            &path,
            r#"
[seed]
on_failure = "continue"

[env]
FLASK_RUN_PORT = "5050"
"#,
        )
        .unwrap();

        let config = DevstartConfig::from_file(&path).unwrap();
        assert_eq!(config.seed.on_failure, SeedFailurePolicy::Continue);
        assert_eq!(config.seed.program, "python");
        assert_eq!(config.server.program, "flask");
        assert_eq!(config.env.get("FLASK_RUN_PORT").map(String::as_str), Some("5050"));
    }

    #[test]
    fn test_unknown_policy_is_rejected() {
        let result: Result<DevstartConfig, _> = toml::from_str("[seed]\non_failure = \"retry\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_error_names_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "[clean\n").unwrap();

        let err = DevstartConfig::from_file(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_clean_paths_must_stay_in_root() {
        let mut config = DevstartConfig::default();

        config.clean.paths = vec!["../outside".to_string()];
        assert!(config.validate().is_err());

        config.clean.paths = vec!["/tmp/__pycache__".to_string()];
        assert!(config.validate().is_err());

        config.clean.paths = vec![".".to_string()];
        assert!(config.validate().is_err());

        config.clean.paths = vec!["**/__pycache__".to_string()];
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_programs_are_rejected() {
        let mut config = DevstartConfig::default();
        config.server.program = " ".to_string();
        assert!(config.validate().is_err());

        let mut config = DevstartConfig::default();
        config.seed.program = String::new();
        assert!(config.validate().is_err());

        config.seed.enabled = false;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_env_name() {
        let mut config = DevstartConfig::default();
        config.env.insert("A=B".to_string(), "x".to_string());
        assert!(config.validate().is_err());
    }
}
