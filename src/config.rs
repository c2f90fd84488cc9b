use crate::defaults;
use crate::error::{MicnoteError, Result as MicnoteResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub upload: UploadConfig,
    pub audio: AudioConfig,
    pub export: ExportConfig,
}

/// Upload configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct UploadConfig {
    /// Base URL of the transcription server.
    pub server: String,
    /// Maximum asset size accepted for upload, in bytes.
    pub max_asset_bytes: u64,
    /// Request timeout as a humantime string (e.g., "60s", "2m").
    pub request_timeout: String,
}

/// Audio capture configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AudioConfig {
    /// Input device name; the recorder default when unset.
    pub device: Option<String>,
    /// Recorder command template; `{device}` is substituted.
    pub recorder: String,
}

/// Transcript export configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExportConfig {
    /// Directory the transcript file is written into.
    pub directory: PathBuf,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            server: defaults::SERVER_URL.to_string(),
            max_asset_bytes: defaults::MAX_ASSET_BYTES,
            request_timeout: format!("{}s", defaults::REQUEST_TIMEOUT.as_secs()),
        }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            device: None,
            recorder: defaults::RECORDER_COMMAND.to_string(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
        }
    }
}

impl UploadConfig {
    /// Parse the configured request timeout.
    pub fn request_timeout(&self) -> MicnoteResult<Duration> {
        humantime::parse_duration(self.request_timeout.trim()).map_err(|e| {
            MicnoteError::ConfigInvalidValue {
                key: "upload.request_timeout".to_string(),
                message: e.to_string(),
            }
        })
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns an error if the file contains invalid TOML.
    /// Missing fields will use default values.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if file doesn't exist
    ///
    /// Only returns defaults if the file is missing.
    /// Returns errors for invalid TOML.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                if e.downcast_ref::<std::io::Error>()
                    .map(|io_err| io_err.kind() == std::io::ErrorKind::NotFound)
                    .unwrap_or(false)
                {
                    Self::default()
                } else {
                    // Re-panic on invalid TOML or other errors
                    panic!("Failed to load config from {}: {}", path.display(), e);
                }
            }
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - MICNOTE_SERVER → upload.server
    /// - MICNOTE_AUDIO_DEVICE → audio.device
    /// - MICNOTE_MAX_ASSET_BYTES → upload.max_asset_bytes
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(server) = std::env::var("MICNOTE_SERVER")
            && !server.is_empty()
        {
            self.upload.server = server;
        }

        if let Ok(device) = std::env::var("MICNOTE_AUDIO_DEVICE")
            && !device.is_empty()
        {
            self.audio.device = Some(device);
        }

        if let Ok(max) = std::env::var("MICNOTE_MAX_ASSET_BYTES")
            && let Ok(max) = max.trim().parse::<u64>()
        {
            self.upload.max_asset_bytes = max;
        }

        self
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/micnote/config.toml on Linux
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .expect("Could not determine config directory")
            .join("micnote")
            .join("config.toml")
    }

    /// Render the full configuration as TOML.
    pub fn to_display_toml(&self) -> MicnoteResult<String> {
        toml::to_string_pretty(self).map_err(|e| MicnoteError::Other(e.to_string()))
    }

    /// A commented template of the default configuration.
    pub fn dump_template() -> String {
        let defaults = Self::default()
            .to_display_toml()
            .unwrap_or_default();
        format!(
            "# micnote configuration (~/.config/micnote/config.toml)\n\
             # All keys are optional; unset keys use these defaults.\n\n{defaults}"
        )
    }
}
