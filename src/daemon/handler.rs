//! Command handler mapping IPC commands onto the recording session.

use crate::daemon::DaemonState;
use crate::error::MicnoteError;
use crate::ipc::protocol::{Command, Response};
use crate::ipc::server::CommandHandler;
use std::sync::Arc;

/// Command handler for daemon IPC commands.
pub struct SessionCommandHandler {
    state: Arc<DaemonState>,
}

impl SessionCommandHandler {
    /// Creates a new command handler.
    pub fn new(state: DaemonState) -> Self {
        Self {
            state: Arc::new(state),
        }
    }

    /// Start a new recording.
    async fn start(&self) -> Response {
        let mut controller = self.state.controller.lock().await;
        match controller.start() {
            Ok(()) => Response::Ok,
            Err(e) => error_response(e),
        }
    }

    /// Stop recording and finalize the asset.
    async fn stop(&self) -> Response {
        let mut controller = self.state.controller.lock().await;
        match controller.stop() {
            Ok(bytes) => Response::Stopped { bytes },
            Err(e) => error_response(e),
        }
    }

    /// Upload the asset and wait for the transcript.
    ///
    /// The session lock is held only around the transitions, never
    /// across the HTTP exchange: a command arriving mid-upload
    /// observes `Transcribing` and is rejected instead of queueing.
    async fn transcribe(&self) -> Response {
        let (asset, generation, backend) = {
            let mut controller = self.state.controller.lock().await;
            match controller.begin_transcription() {
                Ok((asset, generation)) => (asset, generation, controller.backend()),
                Err(e) => return error_response(e),
            }
        };

        let outcome = backend.transcribe(&asset).await;

        let mut controller = self.state.controller.lock().await;
        match controller.apply_transcription(generation, outcome) {
            Ok(Some(text)) => Response::Transcript { text },
            Ok(None) => Response::Error {
                message: "transcription superseded by a new recording".to_string(),
            },
            Err(e) => error_response(e),
        }
    }

    /// Export the transcript.
    async fn export(&self) -> Response {
        let controller = self.state.controller.lock().await;
        match controller.export() {
            Ok(path) => Response::Exported {
                path: path.display().to_string(),
            },
            Err(e) => error_response(e),
        }
    }

    /// Get session status.
    async fn status(&self) -> Response {
        let mut controller = self.state.controller.lock().await;
        // Keep the session buffer current while recording.
        if let Err(e) = controller.poll_fragments() {
            eprintln!("micnote: {e}");
        }
        Response::Status {
            state: controller.state(),
            controls: controller.controls(),
            asset_bytes: controller.asset_size(),
        }
    }
}

/// Map an error onto the wire, logging state-desync errors.
///
/// `InvalidTransition` and `NotRecording` mean the control surface got
/// out of sync with the session; a well-formed surface never triggers
/// them, so they are logged for diagnosis.
fn error_response(e: MicnoteError) -> Response {
    if matches!(
        e,
        MicnoteError::InvalidTransition { .. } | MicnoteError::NotRecording
    ) {
        eprintln!("micnote: rejected command: {e}");
    }
    Response::Error {
        message: e.to_string(),
    }
}

#[async_trait::async_trait]
impl CommandHandler for SessionCommandHandler {
    async fn handle(&self, command: Command) -> Response {
        match command {
            Command::Start => self.start().await,
            Command::Stop => self.stop().await,
            Command::Transcribe => self.transcribe().await,
            Command::Export => self.export().await,
            Command::Status => self.status().await,
            Command::Shutdown => {
                // Shutdown is handled by the IPC server loop.
                Response::Ok
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::source::MockAudioSource;
    use crate::export::TranscriptExporter;
    use crate::remote::backend::MockTranscriptionBackend;
    use crate::session::controller::SessionController;
    use crate::session::state::SessionState;
    use tempfile::TempDir;

    fn handler_with(
        source: MockAudioSource,
        backend: MockTranscriptionBackend,
        dir: &TempDir,
    ) -> SessionCommandHandler {
        let controller = SessionController::new(
            Box::new(source),
            Arc::new(backend),
            TranscriptExporter::new(dir.path()),
            1024,
        );
        SessionCommandHandler::new(DaemonState::new(controller))
    }

    #[tokio::test]
    async fn status_starts_idle_with_record_enabled() {
        let dir = TempDir::new().unwrap();
        let handler = handler_with(
            MockAudioSource::new(),
            MockTranscriptionBackend::new(),
            &dir,
        );

        match handler.handle(Command::Status).await {
            Response::Status {
                state,
                controls,
                asset_bytes,
            } => {
                assert_eq!(state, SessionState::Idle);
                assert!(controls.record);
                assert!(!controls.stop);
                assert!(!controls.transcribe);
                assert!(!controls.export);
                assert_eq!(asset_bytes, None);
            }
            other => panic!("Expected Status response, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn stop_without_recording_is_an_error() {
        let dir = TempDir::new().unwrap();
        let handler = handler_with(
            MockAudioSource::new(),
            MockTranscriptionBackend::new(),
            &dir,
        );

        match handler.handle(Command::Stop).await {
            Response::Error { message } => {
                assert!(message.contains("stop"), "got: {message}");
            }
            other => panic!("Expected Error response, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn full_command_sequence_reaches_done() {
        let dir = TempDir::new().unwrap();
        let handler = handler_with(
            MockAudioSource::new().with_fragments(vec![b"note".to_vec()]),
            MockTranscriptionBackend::new().with_response("hello world"),
            &dir,
        );

        assert_eq!(handler.handle(Command::Start).await, Response::Ok);
        assert_eq!(
            handler.handle(Command::Stop).await,
            Response::Stopped { bytes: 4 }
        );
        assert_eq!(
            handler.handle(Command::Transcribe).await,
            Response::Transcript {
                text: "hello world".to_string()
            }
        );

        match handler.handle(Command::Export).await {
            Response::Exported { path } => {
                assert!(path.ends_with("transcript.txt"));
                assert_eq!(
                    std::fs::read_to_string(path).unwrap(),
                    "hello world"
                );
            }
            other => panic!("Expected Exported response, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn double_start_is_rejected() {
        let dir = TempDir::new().unwrap();
        let handler = handler_with(
            MockAudioSource::new(),
            MockTranscriptionBackend::new(),
            &dir,
        );

        assert_eq!(handler.handle(Command::Start).await, Response::Ok);
        match handler.handle(Command::Start).await {
            Response::Error { message } => {
                assert!(message.contains("start"), "got: {message}");
            }
            other => panic!("Expected Error response, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn failed_transcription_allows_retry() {
        let dir = TempDir::new().unwrap();
        let handler = handler_with(
            MockAudioSource::new().with_fragments(vec![b"note".to_vec()]),
            MockTranscriptionBackend::new()
                .with_response("take two")
                .with_failures_before_success(1),
            &dir,
        );

        handler.handle(Command::Start).await;
        handler.handle(Command::Stop).await;

        match handler.handle(Command::Transcribe).await {
            Response::Error { message } => {
                assert!(message.contains("Transcription failed"), "got: {message}");
            }
            other => panic!("Expected Error response, got {other:?}"),
        }

        // Back in Stopped; a user-issued retry succeeds.
        match handler.handle(Command::Status).await {
            Response::Status { state, .. } => assert_eq!(state, SessionState::Stopped),
            other => panic!("Expected Status response, got {other:?}"),
        }
        assert_eq!(
            handler.handle(Command::Transcribe).await,
            Response::Transcript {
                text: "take two".to_string()
            }
        );
    }

    #[tokio::test]
    async fn shutdown_returns_ok() {
        let dir = TempDir::new().unwrap();
        let handler = handler_with(
            MockAudioSource::new(),
            MockTranscriptionBackend::new(),
            &dir,
        );
        assert_eq!(handler.handle(Command::Shutdown).await, Response::Ok);
    }
}
