//! Daemon mode: the recording session behind the IPC control surface.

mod handler;

pub use handler::SessionCommandHandler;

use crate::audio::capture::RecorderProcess;
use crate::config::Config;
use crate::export::TranscriptExporter;
use crate::ipc::server::IpcServer;
use crate::remote::http::HttpTranscriptionBackend;
use crate::session::controller::SessionController;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Shared daemon state: the single recording session.
pub struct DaemonState {
    pub(crate) controller: Mutex<SessionController>,
}

impl DaemonState {
    pub fn new(controller: SessionController) -> Self {
        Self {
            controller: Mutex::new(controller),
        }
    }
}

/// Run the daemon until a `shutdown` command arrives.
pub async fn run_daemon(config: Config, socket: Option<PathBuf>) -> anyhow::Result<()> {
    let source = RecorderProcess::new(&config.audio.recorder, config.audio.device.as_deref())?;
    let backend = HttpTranscriptionBackend::new(
        &config.upload.server,
        config.upload.request_timeout()?,
    )?;
    let exporter = TranscriptExporter::new(&config.export.directory);
    let controller = SessionController::new(
        Box::new(source),
        Arc::new(backend),
        exporter,
        config.upload.max_asset_bytes,
    );

    let socket_path = socket.unwrap_or_else(IpcServer::default_socket_path);
    eprintln!("micnote: listening on {}", socket_path.display());

    let server = IpcServer::new(socket_path)?;
    let handler = SessionCommandHandler::new(DaemonState::new(controller));
    server.start(handler).await?;
    Ok(())
}
