use clap::Parser;
use std::path::PathBuf;

use crate::models::config::{AppConfig, LogFormat, LogLevel};
use crate::services::config::ConfigManager;

#[derive(Parser, Debug)]
#[command(name = "captcha-bench")]
#[command(about = "Compare two OCR methods on CAPTCHA images")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Args {
    /// Configuration file (defaults to the platform config directory)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Address to bind
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(long)]
    pub port: Option<u16>,

    /// Directory for in-flight uploads
    #[arg(long)]
    pub upload_dir: Option<PathBuf>,

    /// Base URL of the model server
    #[arg(long)]
    pub model_server_url: Option<String>,

    /// Log level
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Log output format
    #[arg(long, value_enum)]
    pub log_format: Option<LogFormat>,
}

impl Args {
    /// Load the config file, then apply command line overrides
    pub fn load_config(&self) -> Result<AppConfig, String> {
        let manager = match &self.config {
            Some(path) => {
                if !path.exists() {
                    return Err(format!("Config file not found: {}", path.display()));
                }
                ConfigManager::with_path(path)
            }
            None => ConfigManager::new()?,
        };

        let mut config = manager.load()?;
        self.apply(&mut config);
        Ok(config)
    }

    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(dir) = &self.upload_dir {
            config.upload.dir = dir.clone();
        }
        if let Some(url) = &self.model_server_url {
            config.model_server.base_url = url.clone();
        }
        if let Some(level) = self.log_level {
            config.logging.level = level;
        }
        if let Some(format) = self.log_format {
            config.logging.format = format;
        }
    }
}
