//! micnote - voice notes transcribed by a remote speech service
//!
//! Records microphone audio into a single uploadable asset, submits
//! it to a transcription endpoint, and prints or exports the text.

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod app;
pub mod audio;
pub mod cli;
pub mod config;
pub mod daemon;
pub mod defaults;
pub mod error;
pub mod export;
pub mod ipc;
pub mod remote;
pub mod session;

// Core seams (capture → session → remote → export)
pub use audio::source::AudioSource;
pub use remote::backend::TranscriptionBackend;
pub use session::controller::SessionController;
pub use session::session::{Asset, Session};
pub use session::state::{ControlSet, SessionEvent, SessionState};

// Error handling
pub use error::{MicnoteError, Result};

// Config
pub use config::Config;

// Export
pub use export::TranscriptExporter;

/// Build version string with optional git commit hash.
///
/// Returns `"0.1.0+abc1234"` when git hash is available, `"0.1.0"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_string_starts_with_cargo_version() {
        let ver = version_string();
        assert!(
            ver.starts_with(env!("CARGO_PKG_VERSION")),
            "version_string should start with CARGO_PKG_VERSION, got: {}",
            ver
        );
    }
}
