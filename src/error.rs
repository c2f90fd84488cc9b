//! Error types for micnote.

use crate::session::state::{SessionEvent, SessionState};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MicnoteError {
    // Capture acquisition errors
    #[error("Microphone permission denied: {message}")]
    PermissionDenied { message: String },

    #[error("No usable audio input: {message}")]
    DeviceUnavailable { message: String },

    // Session state machine errors
    #[error("Not recording")]
    NotRecording,

    #[error("Event {event} not accepted in state {state}")]
    InvalidTransition {
        state: SessionState,
        event: SessionEvent,
    },

    #[error("Recording is {size} bytes, above the {max} byte upload limit")]
    AssetTooLarge { size: u64, max: u64 },

    // Upload errors
    #[error("Transcription failed: {cause}")]
    TranscriptionFailed { cause: String },

    // Export errors
    #[error("Nothing to export")]
    NothingToExport,

    #[error("Export failed: {message}")]
    Export { message: String },

    // Audio capture errors
    #[error("Audio capture failed: {message}")]
    Capture { message: String },

    // Configuration errors
    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // IPC errors
    #[error("IPC socket error: {message}")]
    IpcSocket { message: String },

    #[error("IPC protocol error: {message}")]
    IpcProtocol { message: String },

    #[error("IPC connection failed: {message}")]
    IpcConnection { message: String },

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Generic error for cases not covered above
    #[error("{0}")]
    Other(String),
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, MicnoteError>;
