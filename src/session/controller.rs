//! Session orchestration.
//!
//! `SessionController` owns the audio source, the transcription
//! backend and the exporter, and drives the `Session` through its
//! transitions. The transcription API is split into `begin` / `apply`
//! so a caller holding the controller behind a lock can run the HTTP
//! exchange outside it; `transcribe` composes the two for
//! single-owner callers.

use crate::audio::source::AudioSource;
use crate::error::{MicnoteError, Result};
use crate::export::TranscriptExporter;
use crate::remote::backend::TranscriptionBackend;
use crate::session::session::{Asset, Session};
use crate::session::state::{ControlSet, SessionEvent, SessionState};
use std::path::PathBuf;
use std::sync::Arc;

pub struct SessionController {
    session: Session,
    source: Box<dyn AudioSource>,
    backend: Arc<dyn TranscriptionBackend>,
    exporter: TranscriptExporter,
    max_asset_bytes: u64,
}

impl SessionController {
    pub fn new(
        source: Box<dyn AudioSource>,
        backend: Arc<dyn TranscriptionBackend>,
        exporter: TranscriptExporter,
        max_asset_bytes: u64,
    ) -> Self {
        Self {
            session: Session::new(),
            source,
            backend,
            exporter,
            max_asset_bytes,
        }
    }

    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    pub fn controls(&self) -> ControlSet {
        self.session.controls()
    }

    pub fn transcript(&self) -> Option<&str> {
        self.session.transcript()
    }

    /// Size of the finalized asset, if one exists.
    pub fn asset_size(&self) -> Option<u64> {
        self.session.asset().map(Asset::size)
    }

    /// The transcription backend, for callers that run the exchange
    /// outside a lock.
    pub fn backend(&self) -> Arc<dyn TranscriptionBackend> {
        Arc::clone(&self.backend)
    }

    /// Start a new recording.
    ///
    /// Acquisition failures abort the transition: the session keeps
    /// its previous state and content.
    pub fn start(&mut self) -> Result<()> {
        self.session.ensure_accepts(SessionEvent::Start)?;
        self.source.acquire()?;
        if let Err(e) = self.source.start() {
            // Release the device; a failed start must not leak capture.
            let _ = self.source.stop();
            return Err(e);
        }
        self.session.begin_recording()?;
        Ok(())
    }

    /// Move fragments emitted so far into the session buffer.
    ///
    /// Returns the number of bytes moved. A no-op outside `Recording`.
    pub fn poll_fragments(&mut self) -> Result<u64> {
        if self.session.state() != SessionState::Recording {
            return Ok(0);
        }
        let mut moved = 0u64;
        for fragment in self.source.read_fragments()? {
            moved += fragment.len() as u64;
            self.session.push_fragment(fragment)?;
        }
        Ok(moved)
    }

    /// Stop the recording and finalize the asset.
    ///
    /// Returns the asset size in bytes.
    pub fn stop(&mut self) -> Result<u64> {
        self.session.ensure_accepts(SessionEvent::Stop)?;
        self.poll_fragments()?;
        self.source.stop()?;
        // The encoder flushes its trailer on shutdown; drain it.
        for fragment in self.source.read_fragments()? {
            self.session.push_fragment(fragment)?;
        }
        let asset = self.session.finish_recording()?;
        Ok(asset.size())
    }

    /// Enter `Transcribing` and hand out the asset to upload.
    ///
    /// Applies the size guard; an oversized asset routes the session
    /// to `TooLarge` and the returned error carries both sizes.
    pub fn begin_transcription(&mut self) -> Result<(Asset, u64)> {
        self.session.begin_transcription(self.max_asset_bytes)
    }

    /// Apply the outcome of an upload started with
    /// [`SessionController::begin_transcription`].
    ///
    /// Stale outcomes (superseded generation) are logged and
    /// discarded; the call then returns `Ok(None)`.
    pub fn apply_transcription(
        &mut self,
        generation: u64,
        outcome: Result<String>,
    ) -> Result<Option<String>> {
        match outcome {
            Ok(text) => {
                if self.session.complete_transcription(generation, text) {
                    Ok(self.session.transcript().map(str::to_string))
                } else {
                    eprintln!("micnote: discarding stale transcription result");
                    Ok(None)
                }
            }
            Err(e) => {
                if self.session.fail_transcription(generation) {
                    Err(e)
                } else {
                    eprintln!("micnote: discarding stale transcription failure");
                    Ok(None)
                }
            }
        }
    }

    /// Upload the asset and wait for the transcript.
    pub async fn transcribe(&mut self) -> Result<String> {
        let (asset, generation) = self.begin_transcription()?;
        let backend = Arc::clone(&self.backend);
        let outcome = backend.transcribe(&asset).await;
        match self.apply_transcription(generation, outcome)? {
            Some(text) => Ok(text),
            // Single-owner callers cannot be superseded mid-flight.
            None => Err(MicnoteError::Other(
                "transcription result discarded".to_string(),
            )),
        }
    }

    /// Export the transcript to the configured directory.
    pub fn export(&self) -> Result<PathBuf> {
        self.session.ensure_accepts(SessionEvent::Export)?;
        let text = self
            .session
            .transcript()
            .ok_or(MicnoteError::NothingToExport)?;
        self.exporter.export(text)
    }
}
