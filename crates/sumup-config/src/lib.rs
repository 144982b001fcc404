//! CLI configuration stored as JSON under the user's config directory
//!
//! The file lives at `$XDG_CONFIG_HOME/sumup/sumup.json` (falling back to
//! `~/.config/sumup/sumup.json`), or `%APPDATA%\sumup\sumup.json` on Windows.

mod store;

pub use store::{ContextStore, FileContextStore, MemoryContextStore};

use atomicwrites::{AtomicFile, OverwriteBehavior};
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::ffi::OsString;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CONFIG_FILE_NAME: &str = "sumup.json";
const APP_DIR_NAME: &str = "sumup";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unable to determine config directory")]
    NoConfigDir,

    #[error("Failed to read config file {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse config file {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write config file {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_merchant_code: Option<String>,
    /// Keys this version does not know, written back untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Config {
    /// Read the config at `path`; a missing file is an empty config.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!("no config at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        let mut config: Config =
            serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        // An empty string on disk means "unset"
        config.current_merchant_code = config
            .current_merchant_code
            .filter(|code| !code.is_empty());
        Ok(config)
    }

    /// Write the config to `path` atomically, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let write_err = |source: io::Error| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        let mut contents =
            serde_json::to_string_pretty(self).map_err(|err| write_err(err.into()))?;
        contents.push('\n');

        AtomicFile::new(path, OverwriteBehavior::AllowOverwrite)
            .write(|f| {
                f.write_all(contents.as_bytes())?;
                f.flush()
            })
            .map_err(|err| write_err(io::Error::other(err.to_string())))?;
        debug!("wrote config to {}", path.display());
        Ok(())
    }
}

/// Platform config directory for the CLI
pub fn config_dir() -> Result<PathBuf> {
    if cfg!(windows) {
        let base = non_empty_env("APPDATA")
            .map(PathBuf::from)
            .or_else(dirs::config_dir)
            .ok_or(ConfigError::NoConfigDir)?;
        return Ok(base.join(APP_DIR_NAME));
    }
    resolve_unix_config_dir(non_empty_env("XDG_CONFIG_HOME"), dirs::home_dir())
}

pub fn config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

fn resolve_unix_config_dir(
    xdg_config_home: Option<OsString>,
    home: Option<PathBuf>,
) -> Result<PathBuf> {
    let base = match xdg_config_home {
        Some(dir) => PathBuf::from(dir),
        None => home.ok_or(ConfigError::NoConfigDir)?.join(".config"),
    };
    Ok(base.join(APP_DIR_NAME))
}

fn non_empty_env(key: &str) -> Option<OsString> {
    std::env::var_os(key).filter(|value| !value.is_empty())
}
