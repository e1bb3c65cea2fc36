use anyhow::{Context, Result};
use arc_teleport::TeleportSettings;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const DEFAULT_PATHS: [&str; 2] = ["arc_teleport.toml", "tools/navmesh_query/arc_teleport.toml"];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub teleport: TeleportSettings,
}

impl Config {
    /// Load configuration from file or use defaults
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        for path in DEFAULT_PATHS {
            let path = Path::new(path);
            if path.exists() {
                return Self::load_from_file(path);
            }
        }

        Ok(Self::default())
    }

    fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        tracing::debug!("Loaded settings from {}", path.display());
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration")
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_toml()?)
            .with_context(|| format!("Failed to write config file: {}", path.display()))
    }
}
