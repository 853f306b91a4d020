//! Configuration loading and root folder resolution
//!
//! Missing or malformed TOML never aborts startup: callers get compiled
//! defaults and a warning instead.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Environment variable overriding the root folder
pub const ROOT_FOLDER_ENV: &str = "FLEETCODE_ROOT";

/// Database file name inside the root folder
pub const DATABASE_FILE_NAME: &str = "fleetcode.db";

/// Top-level TOML configuration file
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TomlConfig {
    /// Folder holding the SQLite database
    pub root_folder: Option<String>,
    pub logging: LoggingConfig,
    pub classifier: ClassifierConfig,
}

/// `[logging]` section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default tracing filter when `RUST_LOG` is unset
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// `[classifier]` section: external text-classification service used for
/// low-confidence escalation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClassifierConfig {
    pub enabled: bool,
    /// OpenAI-compatible chat completions endpoint
    pub endpoint: String,
    pub model: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key: None,
            timeout_secs: 30,
        }
    }
}

impl TomlConfig {
    /// Parse a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
    }

    /// Load the explicit path, or the platform default path, falling back to
    /// defaults when neither can be read
    pub fn load_or_default(explicit: Option<&Path>) -> Self {
        let path = match explicit.map(Path::to_path_buf).or_else(default_config_path) {
            Some(path) => path,
            None => {
                warn!("No config file found, using compiled defaults");
                return Self::default();
            }
        };

        match Self::load(&path) {
            Ok(config) => config,
            Err(e) => {
                warn!("{}; using compiled defaults", e);
                Self::default()
            }
        }
    }
}

/// Platform config file location
///
/// Linux checks `~/.config/fleetcode/config.toml` then `/etc/fleetcode/config.toml`.
/// Returns None when no file exists.
pub fn default_config_path() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("fleetcode").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/fleetcode/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// Root folder resolution, highest priority first:
/// 1. Command-line argument
/// 2. `FLEETCODE_ROOT` environment variable
/// 3. TOML `root_folder`
/// 4. OS-dependent compiled default
pub struct RootFolderResolver<'a> {
    cli_arg: Option<&'a str>,
    toml_config: &'a TomlConfig,
}

impl<'a> RootFolderResolver<'a> {
    pub fn new(cli_arg: Option<&'a str>, toml_config: &'a TomlConfig) -> Self {
        Self {
            cli_arg,
            toml_config,
        }
    }

    pub fn resolve(&self) -> PathBuf {
        if let Some(path) = self.cli_arg {
            return PathBuf::from(path);
        }

        if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
            if !path.trim().is_empty() {
                return PathBuf::from(path);
            }
        }

        if let Some(path) = &self.toml_config.root_folder {
            return PathBuf::from(path);
        }

        default_root_folder()
    }

    /// Resolve and make sure the folder exists
    pub fn resolve_and_create(&self) -> Result<PathBuf> {
        let root = self.resolve();
        std::fs::create_dir_all(&root)?;
        Ok(root)
    }
}

/// Database path inside a root folder
pub fn database_path(root_folder: &Path) -> PathBuf {
    root_folder.join(DATABASE_FILE_NAME)
}

/// OS-dependent default root folder path
pub fn default_root_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        dirs::data_local_dir()
            .map(|d| d.join("fleetcode"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/fleetcode"))
    } else if cfg!(target_os = "macos") {
        dirs::data_dir()
            .map(|d| d.join("fleetcode"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/fleetcode"))
    } else if cfg!(target_os = "windows") {
        dirs::data_local_dir()
            .map(|d| d.join("fleetcode"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\fleetcode"))
    } else {
        PathBuf::from("./fleetcode_data")
    }
}
