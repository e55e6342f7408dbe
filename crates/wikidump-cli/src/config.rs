//! Configuration loading from TOML files

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use wikidump_core::{DEFAULT_CHANNEL_CAPACITY, DEFAULT_MAX_LINE_BYTES, DEFAULT_PROGRESS_EVERY};
use wikidump_tables::DEFAULT_BASE_URL;

/// Global configuration for wikidump
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub dump: DumpConfig,
    pub convert: ConvertConfig,
    pub download: DownloadConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DumpConfig {
    pub root: PathBuf,
    pub language: String,
    /// `YYYYMMDD` or `latest`
    pub date: String,
}

impl Default for DumpConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("./data"),
            language: "en".to_string(),
            date: "latest".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct ConvertConfig {
    pub channel_capacity: usize,
    pub progress_every: usize,
    pub max_line_bytes: usize,
    pub compression_level: i32,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            progress_every: DEFAULT_PROGRESS_EVERY,
            max_line_bytes: DEFAULT_MAX_LINE_BYTES,
            compression_level: 3,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    pub base_url: String,
    /// Seconds without data before a transfer counts as stalled
    pub read_timeout: u64,
    pub connect_timeout: u64,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            read_timeout: 30,
            connect_timeout: 30,
        }
    }
}

impl Config {
    /// Load configuration from default locations
    ///
    /// Search order:
    /// 1. ./wikidump.toml (current directory)
    /// 2. ~/.config/wikidump/config.toml
    ///
    /// If no config file found, returns default config.
    pub fn load() -> Result<Self> {
        let local_config = PathBuf::from("wikidump.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = directories::ProjectDirs::from("", "", "wikidump") {
            let user_config = config_dir.config_dir().join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        log::debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        log::info!("Loaded config from {}", path.display());
        Ok(config.normalized())
    }

    /// Raise values below their floors
    fn normalized(mut self) -> Self {
        if self.convert.max_line_bytes < DEFAULT_MAX_LINE_BYTES {
            log::warn!(
                "convert.max_line_bytes = {} is below the minimum, using {DEFAULT_MAX_LINE_BYTES}",
                self.convert.max_line_bytes
            );
            self.convert.max_line_bytes = DEFAULT_MAX_LINE_BYTES;
        }
        self
    }
}
