//! Composition root for the interactive one-shot session.
//!
//! Wires the real capture backend, the HTTP transcription backend and
//! the exporter into a `SessionController` and drives one complete
//! session: record until Enter, stop, upload, print, optionally
//! export. Transcription failures keep the finalized asset and offer
//! an inline retry, matching the daemon's retry semantics.

use crate::audio::capture::RecorderProcess;
use crate::config::Config;
use crate::error::MicnoteError;
use crate::export::TranscriptExporter;
use crate::remote::http::HttpTranscriptionBackend;
use crate::session::controller::SessionController;
use owo_colors::OwoColorize;
use std::sync::Arc;

/// Run one interactive recording session.
pub async fn run_record_command(
    config: Config,
    device: Option<String>,
    server: Option<String>,
    export: bool,
    quiet: bool,
) -> anyhow::Result<()> {
    let device = device.or_else(|| config.audio.device.clone());
    let server = server.unwrap_or_else(|| config.upload.server.clone());

    let source = RecorderProcess::new(&config.audio.recorder, device.as_deref())?;
    let backend = HttpTranscriptionBackend::new(&server, config.upload.request_timeout()?)?;
    let exporter = TranscriptExporter::new(&config.export.directory);
    let mut controller = SessionController::new(
        Box::new(source),
        Arc::new(backend),
        exporter,
        config.upload.max_asset_bytes,
    );

    if let Err(e) = controller.start() {
        eprintln!("{}", format!("Error: {e}").red());
        std::process::exit(1);
    }

    if !quiet {
        eprintln!("{}", "Recording — press Enter to stop".green());
    }
    wait_for_enter().await?;

    let bytes = controller.stop()?;
    if !quiet {
        eprintln!("Captured {bytes} bytes");
    }

    loop {
        match controller.transcribe().await {
            Ok(text) => {
                println!("{text}");
                if export {
                    let path = controller.export()?;
                    if !quiet {
                        eprintln!("Transcript saved to {}", path.display());
                    }
                }
                return Ok(());
            }
            Err(e @ MicnoteError::AssetTooLarge { .. }) => {
                // The size guard blocks this asset for good; only a
                // shorter recording can proceed.
                eprintln!("{}", format!("Error: {e}").red());
                eprintln!("Record a shorter note and try again.");
                std::process::exit(1);
            }
            Err(MicnoteError::TranscriptionFailed { cause }) => {
                eprintln!("{}", format!("Transcription failed: {cause}").red());
                eprint!("The recording is kept — press Enter to retry, Ctrl-C to give up: ");
                if !wait_for_enter().await? {
                    std::process::exit(1);
                }
            }
            Err(e) => return Err(e.into()),
        }
    }
}

/// Block until the user presses Enter.
///
/// Returns `false` when stdin is closed (EOF), so non-interactive
/// callers cannot spin.
async fn wait_for_enter() -> anyhow::Result<bool> {
    let read = tokio::task::spawn_blocking(|| {
        let mut line = String::new();
        std::io::stdin().read_line(&mut line)
    })
    .await??;
    Ok(read > 0)
}
