use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

/// Backend address used when neither the CLI, the environment, nor the
/// config file provides one.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct Config {
    /// Base URL of the summarizer backend.
    pub api_url: Option<String>,
    pub default_provider: Option<String>,
    /// Per-provider model overrides, keyed by provider ID.
    #[serde(default)]
    pub default_models: HashMap<String, String>,
}

impl Config {
    pub fn load() -> Result<Config, Box<dyn std::error::Error>> {
        let config_path = Self::get_config_path();
        Self::load_from_path(&config_path)
    }

    pub fn load_from_path(config_path: &PathBuf) -> Result<Config, Box<dyn std::error::Error>> {
        if config_path.exists() {
            let contents = fs::read_to_string(config_path)?;
            let config: Config = toml::from_str(&contents)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save_to_path(&self, config_path: &PathBuf) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)?;
        fs::write(config_path, contents)?;
        Ok(())
    }

    fn get_config_path() -> PathBuf {
        let proj_dirs = ProjectDirs::from("org", "permacommons", "websum")
            .expect("Failed to determine config directory");
        proj_dirs.config_dir().join("config.toml")
    }

    pub fn default_model_for(&self, provider_id: &str) -> Option<&str> {
        self.default_models.get(provider_id).map(String::as_str)
    }
}
