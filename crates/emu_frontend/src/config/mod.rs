//! Configuration system
//!
//! Frontend settings are plain serde structures stored as TOML (or RON, picked
//! by file extension). Every field has a default so partial files load.

use std::path::Path;

pub use serde::{Deserialize, Serialize};

use crate::audio::NATIVE_SAMPLE_RATE;

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(ConfigError::Io)?;

        match Format::of(path)? {
            Format::Toml => {
                toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
            }
            Format::Ron => ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string())),
        }
    }

    /// Save configuration to file
    fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let contents = match Format::of(path)? {
            Format::Toml => {
                toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
            }
            Format::Ron => ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?,
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

enum Format {
    Toml,
    Ron,
}

impl Format {
    fn of(path: &Path) -> Result<Self, ConfigError> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(Self::Toml),
            Some("ron") => Ok(Self::Ron),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// Top-level frontend configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontendConfig {
    /// Render window settings
    pub window: WindowConfig,
    /// Audio output settings
    pub audio: AudioConfig,
    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config for FrontendConfig {}

impl FrontendConfig {
    /// Load `path`, or fall back to defaults when the file does not exist
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            log::info!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load_from_file(path)
    }
}

/// Render window settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Base window title; the frame-rate display appends to it
    pub title: String,
    /// Initial client width in screen coordinates
    pub width: u32,
    /// Initial client height in screen coordinates
    pub height: u32,
    /// Enter fullscreen right after creation
    pub fullscreen: bool,
    /// Smallest client area the window may be resized to, `[width, height]`
    pub min_client_area: [u32; 2],
    /// Interval between frame-rate title refreshes
    pub title_refresh_ms: u64,
}

/// Top screen width of the emulated console
pub const SCREEN_TOP_WIDTH: u32 = 400;
/// Top screen height of the emulated console
pub const SCREEN_TOP_HEIGHT: u32 = 240;
/// Bottom screen height of the emulated console
pub const SCREEN_BOTTOM_HEIGHT: u32 = 240;

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
            width: SCREEN_TOP_WIDTH,
            height: SCREEN_TOP_HEIGHT + SCREEN_BOTTOM_HEIGHT,
            fullscreen: false,
            min_client_area: [SCREEN_TOP_WIDTH, SCREEN_TOP_HEIGHT + SCREEN_BOTTOM_HEIGHT],
            title_refresh_ms: 2000,
        }
    }
}

/// Audio output settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Output device id, or `"auto"` for the system default
    pub output_device: String,
    /// Requested stream sample rate
    pub sample_rate: u32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            output_device: crate::audio::AUTO_DEVICE_NAME.to_string(),
            sample_rate: NATIVE_SAMPLE_RATE,
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `env_logger` filter used when `RUST_LOG` is unset
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}
