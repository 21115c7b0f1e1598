//! Application configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::assets::fonts::FontSources;
use crate::foundation::error::{TbiError, TbiResult};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "TEXTBEHIND_CONFIG";

/// Global application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Font lookup sources.
    pub fonts: FontSources,
    /// Background-removal collaborator.
    pub segmenter: SegmenterConfig,
    /// Logging configuration.
    pub logging: LoggingConfig,
    /// Rendering and worker settings.
    pub render: RenderConfig,
}

/// External segmentation program.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SegmenterConfig {
    /// Argument vector, e.g. `["rembg", "i", "{input}", "{output}"]`. `None` disables it.
    pub command: Option<Vec<String>>,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "textbehind=debug,warn").
    pub level: String,
    /// Whether to output structured JSON logs.
    pub json: bool,
}

/// Worker settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    /// Threads used for segmentation requests.
    pub threads: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            fonts: FontSources::system(),
            segmenter: SegmenterConfig::default(),
            logging: LoggingConfig::default(),
            render: RenderConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self { threads: 1 }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let path = config_file_path(|k| std::env::var(k).ok());
        if !path.exists() {
            return Self::default();
        }
        match Self::from_path(&path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Failed to load config at {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    /// Parse a config file.
    pub fn from_path(path: &Path) -> TbiResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            TbiError::validation(format!("read config '{}': {e}", path.display()))
        })?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to `path`.
    pub fn save(&self, path: &Path) -> TbiResult<()> {
        crate::encode::png::ensure_parent_dir(path)?;
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|e| {
            TbiError::validation(format!("write config '{}': {e}", path.display()))
        })
    }

    fn validate(&self) -> TbiResult<()> {
        if self.render.threads == 0 {
            return Err(TbiError::validation("render.threads must be >= 1"));
        }
        if let Some(cmd) = &self.segmenter.command
            && cmd.first().is_none_or(|p| p.trim().is_empty())
        {
            return Err(TbiError::validation(
                "segmenter.command must start with a program name",
            ));
        }
        Ok(())
    }
}

/// Config file location: `$TEXTBEHIND_CONFIG`, else `$XDG_CONFIG_HOME/textbehind/config.json`,
/// else `~/.config/textbehind/config.json`.
pub fn config_file_path<F>(env: F) -> PathBuf
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(explicit) = env(CONFIG_ENV_VAR).filter(|p| !p.is_empty()) {
        return PathBuf::from(explicit);
    }
    let base = env("XDG_CONFIG_HOME")
        .filter(|p| !p.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            let home = env("HOME").unwrap_or_else(|| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("textbehind").join("config.json")
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
