//! Game configuration loaded from `config.json`.
//!
//! Missing keys take the documented defaults; a missing, empty or malformed file
//! falls back to `GameConfig::default()` with a log line instead of failing the run.

mod window;

pub use window::WindowConfig;

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// File name looked up by [`GameConfig::load_from_dir`].
pub const CONFIG_FILE_NAME: &str = "config.json";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Save directory name.
    #[serde(default)]
    pub identity: Option<String>,

    /// Engine version the game was made for.
    #[serde(default)]
    pub version: Option<String>,

    /// Attach a console window (Windows only).
    #[serde(default)]
    pub console: bool,

    #[serde(default)]
    pub window: WindowConfig,

    #[serde(default)]
    pub modules: ModulesConfig,
}

/// Engine modules to enable. Disabled modules skip their native subsystems.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModulesConfig {
    #[serde(default = "enabled")]
    pub window: bool,

    #[serde(default = "enabled")]
    pub event: bool,

    #[serde(default = "enabled")]
    pub joystick: bool,

    #[serde(default = "enabled")]
    pub keyboard: bool,

    #[serde(default = "enabled")]
    pub mouse: bool,

    #[serde(default = "enabled")]
    pub timer: bool,
}

fn enabled() -> bool {
    true
}

impl Default for ModulesConfig {
    fn default() -> Self {
        Self {
            window: true,
            event: true,
            joystick: true,
            keyboard: true,
            mouse: true,
            timer: true,
        }
    }
}

impl GameConfig {
    /// Strict parser.
    pub fn from_json_str(text: &str) -> EngineResult<Self> {
        serde_json::from_str(text).map_err(|e| EngineError::Config(e.to_string()))
    }

    /// Reads `config.json` from `dir`, falling back to defaults.
    pub fn load_from_dir(dir: impl AsRef<Path>) -> Self {
        let path = dir.as_ref().join(CONFIG_FILE_NAME);

        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::info!("{} not found; using default configuration", path.display());
                return Self::default();
            }
            Err(e) => {
                log::error!("failed to read {}: {e}; using default configuration", path.display());
                return Self::default();
            }
        };

        if text.trim().is_empty() {
            log::warn!("{} is empty; using default configuration", path.display());
            return Self::default();
        }

        match Self::from_json_str(&text) {
            Ok(config) => {
                log::info!("loaded configuration from {}", path.display());
                config
            }
            Err(e) => {
                log::error!("{}: {e}; using default configuration", path.display());
                Self::default()
            }
        }
    }
}
