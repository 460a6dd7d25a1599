//! Server configuration.

use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::game::STARTING_MANA;

/// Default turn deadline in seconds.
pub const DEFAULT_TURN_TIMEOUT_SECS: u64 = 120;

/// Errors loading a config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        /// Config file.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
    /// The file is not valid config JSON.
    #[error("invalid config {path}: {source}")]
    Parse {
        /// Config file.
        path: PathBuf,
        /// Underlying error.
        source: serde_json::Error,
    },
}

/// Settings for `lanewar serve`. Every field has a default, so a config
/// file only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Listen address.
    pub bind: SocketAddr,
    /// Player accounts file.
    pub players: PathBuf,
    /// Troop stat file; built-in roster when absent.
    pub troops: Option<PathBuf>,
    /// Tower stat file; built-in towers when absent.
    pub towers: Option<PathBuf>,
    /// Seconds a player may hold the turn. `0` disables the deadline.
    pub turn_timeout_secs: u64,
    /// Seed for critical-hit rolls; random when absent.
    pub seed: Option<u64>,
    /// Mana each player starts with.
    pub starting_mana: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 9000)),
            players: PathBuf::from("data/players.json"),
            troops: None,
            towers: None,
            turn_timeout_secs: DEFAULT_TURN_TIMEOUT_SECS,
            seed: None,
            starting_mana: STARTING_MANA,
        }
    }
}

impl ServerConfig {
    /// Read a JSON config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is unreadable or not valid config JSON.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// The turn deadline, if enabled.
    #[must_use]
    pub const fn turn_timeout(&self) -> Option<Duration> {
        if self.turn_timeout_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(self.turn_timeout_secs))
        }
    }
}
