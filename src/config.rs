// Configuration loaded from config.toml
//
// Every section falls back to its defaults, so a missing file or a partial one still gives a
// usable configuration.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

use crate::core::RendererConfiguration;
use crate::enums::PresentMode;
use crate::error::{Error, Result};

/// Root configuration structure
#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub renderer: RendererSection,
    pub graphics: GraphicsConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Vulkan,
    Gl,
}

/// Instance and device selection settings
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct RendererSection {
    pub backend: Backend,
    pub app_name: String,
    pub engine_name: String,
    pub validation: bool,
    /// `None` picks the highest-scored GPU.
    pub device_index: Option<u32>,
}

impl Default for RendererSection {
    fn default() -> Self {
        let defaults = RendererConfiguration::default();
        Self {
            backend: Backend::Vulkan,
            app_name: defaults.app_name,
            engine_name: defaults.engine_name,
            validation: defaults.enable_validation,
            device_index: None,
        }
    }
}

/// Graphics settings
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct GraphicsConfig {
    pub present_mode: String,
}

impl Default for GraphicsConfig {
    fn default() -> Self {
        Self {
            present_mode: "fifo".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogTarget {
    #[default]
    Stderr,
    Stdout,
}

/// Logging settings
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// `error`, `warn`, `info`, `debug` or `trace`. `RUST_LOG` takes precedence.
    pub level: String,
    pub target: LogTarget,
    pub log_to_file: bool,
    pub log_file: PathBuf,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            target: LogTarget::Stderr,
            log_to_file: false,
            log_file: PathBuf::from("renderer_hal.log"),
        }
    }
}

impl Config {
    /// Load configuration from config.toml, falling back to defaults on any error
    pub fn load() -> Self {
        Self::load_from_path("config.toml").unwrap_or_else(|e| {
            log::warn!("Failed to load config.toml: {}. Using defaults.", e);
            Config::default()
        })
    }

    /// Load configuration from a specific path. A missing file gives the defaults.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            log::info!("Config file not found at {:?}, using defaults", path);
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))
            .map_err(Error::Config)?;
        let config = Self::parse(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))
            .map_err(Error::Config)?;

        log::info!("Loaded configuration from {:?}", path);
        log::debug!("Config: {:?}", config);

        Ok(config)
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// The immutable instance settings handed to a renderer.
    pub fn renderer_configuration(&self) -> RendererConfiguration {
        RendererConfiguration {
            app_name: self.renderer.app_name.clone(),
            engine_name: self.renderer.engine_name.clone(),
            enable_validation: self.renderer.validation,
        }
    }

    /// Get the configured present mode, FIFO when unknown
    pub fn present_mode(&self) -> PresentMode {
        match self.graphics.present_mode.to_lowercase().as_str() {
            "immediate" => PresentMode::Immediate,
            "mailbox" => PresentMode::Mailbox,
            "fifo" => PresentMode::Fifo,
            "fifo_relaxed" => PresentMode::FifoRelaxed,
            _ => {
                log::warn!(
                    "Unknown present mode '{}', defaulting to FIFO",
                    self.graphics.present_mode
                );
                PresentMode::Fifo
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sections_fall_back_to_defaults() {
        let config = Config::parse(
            r#"
            [renderer]
            backend = "gl"
            device_index = 1

            [logging]
            level = "debug"
            "#,
        )
        .unwrap();

        assert_eq!(config.renderer.backend, Backend::Gl);
        assert_eq!(config.renderer.device_index, Some(1));
        assert_eq!(config.renderer.app_name, "renderer-hal");
        assert_eq!(config.graphics, GraphicsConfig::default());
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.target, LogTarget::Stderr);
    }

    #[test]
    fn present_modes_are_parsed_leniently() {
        let mut config = Config::default();
        config.graphics.present_mode = "Mailbox".to_string();
        assert_eq!(config.present_mode(), PresentMode::Mailbox);
        config.graphics.present_mode = "vsync".to_string();
        assert_eq!(config.present_mode(), PresentMode::Fifo);
    }

    #[test]
    fn unknown_backends_are_rejected() {
        assert!(Config::parse("[renderer]\nbackend = \"d3d\"").is_err());
    }

    #[test]
    fn missing_files_give_defaults() {
        let config = Config::load_from_path("does/not/exist.toml").unwrap();
        assert_eq!(config, Config::default());
    }
}
