//! The recording session: fragment buffer, finalized asset, transcript
//! and the guarded transitions between lifecycle states.
//!
//! `Session` holds no I/O handles. The controller feeds it fragments
//! and drives transitions; everything here is synchronous and
//! deterministic so the state machine can be tested exhaustively.

use crate::defaults;
use crate::error::{MicnoteError, Result};
use crate::session::state::{ControlSet, SessionEvent, SessionState};

/// The finalized, immutable audio object produced when capture stops.
///
/// Built once from the session's fragment buffer; only read access is
/// exposed afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    bytes: Vec<u8>,
}

impl Asset {
    fn from_fragments(fragments: &[Vec<u8>]) -> Self {
        let total = fragments.iter().map(Vec::len).sum();
        let mut bytes = Vec::with_capacity(total);
        for fragment in fragments {
            bytes.extend_from_slice(fragment);
        }
        Self { bytes }
    }

    /// Raw asset bytes, in fragment emission order.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Asset size in bytes.
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// MIME type of the asset container.
    pub fn mime(&self) -> &'static str {
        defaults::ASSET_MIME
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Build an asset directly from bytes. Test seam for exercising the
    /// size guard without a capture source.
    #[doc(hidden)]
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }
}

/// The single active recording session.
///
/// A new accepted `start` replaces the prior content wholesale; no
/// session history is retained.
#[derive(Debug)]
pub struct Session {
    state: SessionState,
    generation: u64,
    chunks: Vec<Vec<u8>>,
    asset: Option<Asset>,
    transcript: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            state: SessionState::Idle,
            generation: 0,
            chunks: Vec::new(),
            asset: None,
            transcript: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Enabled/disabled projection of the controls for the current state.
    pub fn controls(&self) -> ControlSet {
        ControlSet::for_state(self.state)
    }

    /// Generation of the current recording attempt. Bumped on every
    /// accepted `start`; used to discard stale async completions.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn asset(&self) -> Option<&Asset> {
        self.asset.as_ref()
    }

    pub fn transcript(&self) -> Option<&str> {
        self.transcript.as_deref()
    }

    /// Check that `event` is accepted in the current state.
    ///
    /// The controller calls this before performing the side effects of
    /// a transition, so a failed side effect leaves the session
    /// untouched.
    pub fn ensure_accepts(&self, event: SessionEvent) -> Result<()> {
        if self.state.accepts(event) {
            Ok(())
        } else {
            Err(MicnoteError::InvalidTransition {
                state: self.state,
                event,
            })
        }
    }

    /// Enter `Recording`, discarding all prior session content.
    ///
    /// Returns the new generation.
    pub fn begin_recording(&mut self) -> Result<u64> {
        self.ensure_accepts(SessionEvent::Start)?;
        self.chunks.clear();
        self.asset = None;
        self.transcript = None;
        self.generation += 1;
        self.state = SessionState::Recording;
        Ok(self.generation)
    }

    /// Append one captured fragment. Only legal while `Recording`.
    pub fn push_fragment(&mut self, fragment: Vec<u8>) -> Result<()> {
        if self.state != SessionState::Recording {
            return Err(MicnoteError::NotRecording);
        }
        if !fragment.is_empty() {
            self.chunks.push(fragment);
        }
        Ok(())
    }

    /// Finalize capture: concatenate the buffered fragments into the
    /// immutable asset and enter `Stopped`.
    pub fn finish_recording(&mut self) -> Result<&Asset> {
        self.ensure_accepts(SessionEvent::Stop)?;
        let asset = Asset::from_fragments(&self.chunks);
        self.chunks.clear();
        self.state = SessionState::Stopped;
        Ok(self.asset.insert(asset))
    }

    /// Apply the size guard and enter `Transcribing`.
    ///
    /// On success returns a copy of the asset to upload together with
    /// the generation to hand back to [`Session::complete_transcription`].
    /// An oversized asset moves the session to `TooLarge` instead and
    /// the error carries both sizes for the user-facing warning.
    pub fn begin_transcription(&mut self, max_bytes: u64) -> Result<(Asset, u64)> {
        self.ensure_accepts(SessionEvent::Transcribe)?;
        let asset = match &self.asset {
            Some(asset) => asset,
            // ensure_accepts only passes in Stopped, where the asset
            // invariant holds; treat a violation as a desync.
            None => {
                return Err(MicnoteError::Other(
                    "no asset in stopped session".to_string(),
                ));
            }
        };
        let size = asset.size();
        if size > max_bytes {
            self.state = SessionState::TooLarge;
            return Err(MicnoteError::AssetTooLarge {
                size,
                max: max_bytes,
            });
        }
        let asset = asset.clone();
        self.state = SessionState::Transcribing;
        Ok((asset, self.generation))
    }

    /// Record a successful transcription for `generation`.
    ///
    /// Returns `false` when the completion is stale (the generation no
    /// longer matches, or the session is no longer `Transcribing`); a
    /// stale completion is discarded without touching the session.
    pub fn complete_transcription(&mut self, generation: u64, text: String) -> bool {
        if generation != self.generation || self.state != SessionState::Transcribing {
            return false;
        }
        self.transcript = Some(text);
        self.state = SessionState::Done;
        true
    }

    /// Record a failed transcription for `generation`, returning the
    /// session to `Stopped` so the user may retry.
    ///
    /// Returns `false` when the failure is stale and was discarded.
    pub fn fail_transcription(&mut self, generation: u64) -> bool {
        if generation != self.generation || self.state != SessionState::Transcribing {
            return false;
        }
        self.state = SessionState::Stopped;
        true
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
