//! Transcription backend abstraction.

use crate::error::{MicnoteError, Result};
use crate::session::session::Asset;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Trait for transcription backends.
///
/// This trait allows swapping implementations (remote HTTP service vs
/// mock). One call performs one complete request/response exchange;
/// retries are always a new call.
#[async_trait::async_trait]
pub trait TranscriptionBackend: Send + Sync {
    /// Transcribe a finalized asset to text.
    ///
    /// # Errors
    /// `TranscriptionFailed` for any transport, status or decoding
    /// failure.
    async fn transcribe(&self, asset: &Asset) -> Result<String>;

    /// Human-readable description of where transcripts come from.
    fn describe(&self) -> String;
}

/// Mock transcription backend for testing.
#[derive(Debug)]
pub struct MockTranscriptionBackend {
    response: String,
    always_fail: bool,
    remaining_failures: AtomicUsize,
}

impl MockTranscriptionBackend {
    pub fn new() -> Self {
        Self {
            response: "mock transcription".to_string(),
            always_fail: false,
            remaining_failures: AtomicUsize::new(0),
        }
    }

    /// Configure the text returned on success.
    pub fn with_response(mut self, response: &str) -> Self {
        self.response = response.to_string();
        self
    }

    /// Configure every call to fail.
    pub fn with_failure(mut self) -> Self {
        self.always_fail = true;
        self
    }

    /// Configure the first `n` calls to fail, then succeed, so the
    /// user-retry path can be exercised.
    pub fn with_failures_before_success(self, n: usize) -> Self {
        self.remaining_failures.store(n, Ordering::SeqCst);
        self
    }
}

impl Default for MockTranscriptionBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl TranscriptionBackend for MockTranscriptionBackend {
    async fn transcribe(&self, _asset: &Asset) -> Result<String> {
        if self.always_fail {
            return Err(MicnoteError::TranscriptionFailed {
                cause: "mock transcription failure".to_string(),
            });
        }
        let remaining = self.remaining_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.remaining_failures.store(remaining - 1, Ordering::SeqCst);
            return Err(MicnoteError::TranscriptionFailed {
                cause: "mock transient failure".to_string(),
            });
        }
        Ok(self.response.clone())
    }

    fn describe(&self) -> String {
        "mock".to_string()
    }
}
