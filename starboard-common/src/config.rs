//! Configuration loading
//!
//! Environment variables take priority over the optional TOML config file;
//! built-in defaults fill the rest. The resolved [`Config`] is constructed
//! once at startup and passed by reference into the feed client and cache
//! constructors.

use std::path::PathBuf;

use serde::Deserialize;

use crate::engine::RankingPolicy;
use crate::{Error, Result};

/// Default cache directory relative to the working directory
pub const DEFAULT_CACHE_DIR: &str = "./cache";

/// Resolved runtime configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Private leaderboard identifier on the contest site
    pub board_id: u64,
    /// Opaque session cookie for the contest site (secret)
    pub session_cookie: String,
    /// Directory holding cache entries
    pub cache_dir: PathBuf,
    /// Scoring policy applied to computed snapshots
    pub policy: RankingPolicy,
}

/// On-disk TOML configuration. All fields optional; environment wins.
#[derive(Debug, Default, Deserialize)]
struct TomlConfig {
    board_id: Option<u64>,
    session_cookie: Option<String>,
    cache_dir: Option<PathBuf>,
    policy: Option<RankingPolicy>,
}

impl Config {
    /// Resolve configuration from the environment over the optional TOML
    /// file at `~/.config/starboard/config.toml`.
    pub fn load() -> Result<Self> {
        Self::from_toml_tier(load_toml_config()?)
    }

    fn from_toml_tier(file: TomlConfig) -> Result<Self> {
        let board_id = match std::env::var("STARBOARD_BOARD_ID") {
            Ok(raw) => raw.parse().map_err(|_| {
                Error::Config(format!("invalid STARBOARD_BOARD_ID: {raw:?}"))
            })?,
            Err(_) => file.board_id.ok_or_else(|| {
                Error::Config(
                    "board id not configured (set STARBOARD_BOARD_ID or board_id in config.toml)"
                        .to_string(),
                )
            })?,
        };

        let session_cookie = std::env::var("STARBOARD_SESSION")
            .ok()
            .or(file.session_cookie)
            .ok_or_else(|| {
                Error::Config(
                    "session cookie not configured (set STARBOARD_SESSION or session_cookie in config.toml)"
                        .to_string(),
                )
            })?;

        let cache_dir = std::env::var("STARBOARD_CACHE_DIR")
            .map(PathBuf::from)
            .ok()
            .or(file.cache_dir)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CACHE_DIR));

        Ok(Self {
            board_id,
            session_cookie,
            cache_dir,
            policy: file.policy.unwrap_or_default(),
        })
    }
}

/// Read the TOML tier. Absent file resolves to defaults; a file that
/// exists but does not parse is a configuration error.
fn load_toml_config() -> Result<TomlConfig> {
    let Some(path) = dirs::config_dir().map(|d| d.join("starboard").join("config.toml")) else {
        return Ok(TomlConfig::default());
    };
    if !path.exists() {
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(&path)?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("failed to parse {}: {}", path.display(), e)))
}
