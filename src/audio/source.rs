//! Audio source abstraction.
//!
//! Sources emit encoded container fragments; the session treats them
//! as opaque bytes and never assumes a fixed fragment size or cadence.

use crate::error::{MicnoteError, Result};

/// Trait for audio capture sources.
///
/// This trait allows swapping implementations (external recorder
/// process vs mock). The lifecycle is `acquire` → `start` →
/// `read_fragments`* → `stop` → one final `read_fragments` to drain
/// the encoder's trailing bytes.
pub trait AudioSource: Send {
    /// Request access to the capture device.
    ///
    /// # Errors
    /// `PermissionDenied` if access is refused, `DeviceUnavailable` if
    /// no usable input exists. Both leave the source inert, so a
    /// failed acquisition has no lingering side effects.
    fn acquire(&mut self) -> Result<()>;

    /// Begin continuous capture.
    fn start(&mut self) -> Result<()>;

    /// Drain the fragments emitted since the previous call.
    ///
    /// Non-blocking; an empty vec just means the encoder has not
    /// produced anything yet.
    fn read_fragments(&mut self) -> Result<Vec<Vec<u8>>>;

    /// Finalize capture and release the device.
    ///
    /// After this returns no further fragments are emitted; whatever
    /// the encoder flushed on shutdown is available through one more
    /// `read_fragments` call.
    ///
    /// # Errors
    /// `NotRecording` when no capture is active.
    fn stop(&mut self) -> Result<()>;
}

/// Mock audio source for testing.
///
/// Emits a configured fragment sequence: everything but the final
/// fragment is available while recording, the final fragment only
/// after `stop` (mirroring an encoder flushing its container trailer).
#[derive(Debug, Clone)]
pub struct MockAudioSource {
    fragments: Vec<Vec<u8>>,
    acquired: bool,
    started: bool,
    emitted: bool,
    acquire_error: Option<MockAcquireError>,
    should_fail_stop: bool,
}

#[derive(Debug, Clone, Copy)]
enum MockAcquireError {
    PermissionDenied,
    DeviceUnavailable,
}

impl MockAudioSource {
    /// Create a mock emitting a single small fragment.
    pub fn new() -> Self {
        Self {
            fragments: vec![vec![0u8; 160]],
            acquired: false,
            started: false,
            emitted: false,
            acquire_error: None,
            should_fail_stop: false,
        }
    }

    /// Configure the fragment sequence the mock emits.
    pub fn with_fragments(mut self, fragments: Vec<Vec<u8>>) -> Self {
        self.fragments = fragments;
        self
    }

    /// Configure acquisition to fail with `PermissionDenied`.
    pub fn with_permission_denied(mut self) -> Self {
        self.acquire_error = Some(MockAcquireError::PermissionDenied);
        self
    }

    /// Configure acquisition to fail with `DeviceUnavailable`.
    pub fn with_device_unavailable(mut self) -> Self {
        self.acquire_error = Some(MockAcquireError::DeviceUnavailable);
        self
    }

    /// Configure the mock to fail on stop.
    pub fn with_stop_failure(mut self) -> Self {
        self.should_fail_stop = true;
        self
    }

    /// Whether capture is currently running.
    pub fn is_started(&self) -> bool {
        self.started
    }
}

impl Default for MockAudioSource {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioSource for MockAudioSource {
    fn acquire(&mut self) -> Result<()> {
        match self.acquire_error {
            Some(MockAcquireError::PermissionDenied) => Err(MicnoteError::PermissionDenied {
                message: "mock permission denied".to_string(),
            }),
            Some(MockAcquireError::DeviceUnavailable) => Err(MicnoteError::DeviceUnavailable {
                message: "mock device unavailable".to_string(),
            }),
            None => {
                self.acquired = true;
                Ok(())
            }
        }
    }

    fn start(&mut self) -> Result<()> {
        if !self.acquired {
            return Err(MicnoteError::Capture {
                message: "start before acquire".to_string(),
            });
        }
        self.started = true;
        self.emitted = false;
        Ok(())
    }

    fn read_fragments(&mut self) -> Result<Vec<Vec<u8>>> {
        if self.started {
            // While recording, hold back the last fragment as the
            // encoder's unflushed trailer.
            if self.emitted || self.fragments.len() <= 1 {
                Ok(Vec::new())
            } else {
                self.emitted = true;
                Ok(self.fragments[..self.fragments.len() - 1].to_vec())
            }
        } else if self.acquired && !self.fragments.is_empty() {
            // Post-stop drain: the trailer fragment.
            let trailer = vec![self.fragments[self.fragments.len() - 1].clone()];
            self.fragments.clear();
            Ok(trailer)
        } else {
            Ok(Vec::new())
        }
    }

    fn stop(&mut self) -> Result<()> {
        if !self.started {
            return Err(MicnoteError::NotRecording);
        }
        if self.should_fail_stop {
            return Err(MicnoteError::Capture {
                message: "mock stop failure".to_string(),
            });
        }
        self.started = false;
        Ok(())
    }
}
