//! Application configuration
//!
//! Stored as TOML. Missing fields take their defaults, and a missing file
//! is the default config.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Persistent console settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Command scripts run at start, relative to the config file's directory
    #[serde(default)]
    pub startup_scripts: Vec<PathBuf>,
    /// Print each script line before running it
    #[serde(default)]
    pub echo_commands: bool,
    /// Interactive prompt
    #[serde(default = "default_prompt")]
    pub prompt: String,
}

fn default_prompt() -> String {
    "> ".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            startup_scripts: Vec::new(),
            echo_commands: false,
            prompt: default_prompt(),
        }
    }
}

impl AppConfig {
    /// Get the default config file path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("shockmap")
            .join("shockmap.toml")
    }

    /// Load config from a file, or return default if not found
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: AppConfig = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to a file
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Startup scripts with relative paths resolved against `config_path`'s
    /// directory
    pub fn startup_script_paths(&self, config_path: &Path) -> Vec<PathBuf> {
        let base = config_path.parent().unwrap_or_else(|| Path::new("."));
        self.startup_scripts
            .iter()
            .map(|script| {
                if script.is_absolute() {
                    script.clone()
                } else {
                    base.join(script)
                }
            })
            .collect()
    }
}
