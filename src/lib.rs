//! gmscreen - game master's screen
//!
//! Combat tracker for tabletop role-playing: dice rolling with an exploding
//! d10 check die, initiative and turn order, timed conditions, and a combat
//! log, plus JSON save files.

pub mod combat;
pub mod persist;

use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

/// Prefix for configuration environment variables (e.g. `GMSCREEN_SAVE_PATH`)
pub const ENV_PREFIX: &str = "GMSCREEN_";

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where encounters are saved
    pub save_path: PathBuf,
    /// How many free-standing dice rolls to remember
    pub dice_history_limit: usize,
    /// Largest save file accepted, in bytes
    pub max_save_bytes: usize,
    /// Tracing filter used when `RUST_LOG` is not set
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            save_path: PathBuf::from("gmscreen.json"),
            dice_history_limit: 50,
            max_save_bytes: 5 * 1024 * 1024,
            log_filter: "gmscreen=info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration: defaults, then an optional TOML file, then
    /// `GMSCREEN_*` environment variables
    pub fn load(file: Option<&Path>) -> Result<Self, figment::Error> {
        Self::figment(file).extract()
    }

    fn figment(file: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(path) = file {
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX))
    }
}
