//! JSON message protocol for IPC communication between CLI and daemon.

use crate::session::state::{ControlSet, SessionState};
use serde::{Deserialize, Serialize};

/// Commands sent by the CLI to the daemon, one per session control.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    /// Start a new recording
    Start,
    /// Stop recording and finalize the asset
    Stop,
    /// Upload the asset and wait for the transcript
    Transcribe,
    /// Export the transcript to a file
    Export,
    /// Get session status
    Status,
    /// Shutdown the daemon
    Shutdown,
}

impl Command {
    /// Serialize command to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize command from JSON string.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

/// Responses sent by the daemon to the CLI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    /// Command succeeded
    Ok,
    /// Recording finalized; the asset holds `bytes` bytes
    Stopped { bytes: u64 },
    /// Transcription succeeded
    Transcript { text: String },
    /// Transcript exported to `path`
    Exported { path: String },
    /// Current session status
    Status {
        state: SessionState,
        controls: ControlSet,
        asset_bytes: Option<u64>,
    },
    /// Error occurred
    Error { message: String },
}

impl Response {
    /// Serialize response to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize response from JSON string.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}
