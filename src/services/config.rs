use crate::models::config::AppConfig;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Configuration manager for the service settings file
pub struct ConfigManager {
    config_dir: PathBuf,
    config_path: PathBuf,
}

impl ConfigManager {
    /// Manager for the platform config file (`<config_dir>/captcha-bench/config.json`)
    ///
    /// Nothing is created on disk until [`ConfigManager::save`] is called.
    pub fn new() -> Result<Self, String> {
        let config_dir = dirs::config_dir()
            .ok_or("Failed to determine config directory")?
            .join("captcha-bench");

        let config_path = config_dir.join("config.json");

        Ok(Self {
            config_dir,
            config_path,
        })
    }

    /// Manager for an explicit config file path
    pub fn with_path(path: impl AsRef<Path>) -> Self {
        let config_path = path.as_ref().to_path_buf();
        let config_dir = config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        Self {
            config_dir,
            config_path,
        }
    }

    /// Write `config` as pretty JSON, creating the parent directory if needed
    pub fn save(&self, config: &AppConfig) -> Result<(), String> {
        let mut json = serde_json::to_string_pretty(config)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;
        json.push('\n');

        if !self.config_dir.as_os_str().is_empty() {
            fs::create_dir_all(&self.config_dir).map_err(|e| {
                format!("Failed to create config directory {}: {}", self.config_dir.display(), e)
            })?;
        }

        fs::write(&self.config_path, json)
            .map_err(|e| format!("Failed to write {}: {}", self.config_path.display(), e))
    }

    /// Read the config file; a missing file yields the defaults
    pub fn load(&self) -> Result<AppConfig, String> {
        let content = match fs::read_to_string(&self.config_path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No config at {}, using defaults", self.config_path.display());
                return Ok(AppConfig::default());
            }
            Err(e) => return Err(format!("Failed to read {}: {}", self.config_path.display(), e)),
        };

        serde_json::from_str(&content)
            .map_err(|e| format!("Failed to parse config file {}: {}", self.config_path.display(), e))
    }

    pub fn config_file_path(&self) -> &Path {
        &self.config_path
    }

    pub fn config_exists(&self) -> bool {
        self.config_path.is_file()
    }
}
