//! HTTP transcription backend.
//!
//! One multipart POST to `<server>/transcribe` per call. The wire
//! contract is fixed: file field `audio`, filename `recording.webm`,
//! content type `audio/webm`; the server answers `200 OK` with
//! `{"text": "..."}`. Anything else is a `TranscriptionFailed` and the
//! caller decides whether to retry.

use crate::defaults;
use crate::error::{MicnoteError, Result};
use crate::remote::backend::TranscriptionBackend;
use crate::session::session::Asset;
use serde::Deserialize;
use std::time::Duration;

/// Response body of the transcription endpoint.
#[derive(Debug, Deserialize)]
struct TranscribeResponse {
    text: String,
}

/// Transcription backend talking to the remote HTTP service.
pub struct HttpTranscriptionBackend {
    client: reqwest::Client,
    url: String,
}

impl HttpTranscriptionBackend {
    /// Create a backend for the given server base URL.
    ///
    /// `server` is the base (e.g. `http://127.0.0.1:5000`); the
    /// endpoint path is fixed.
    pub fn new(server: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MicnoteError::Other(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            url: endpoint_url(server),
        })
    }

    /// The full endpoint URL this backend posts to.
    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Join the server base URL with the fixed endpoint path.
fn endpoint_url(server: &str) -> String {
    format!(
        "{}{}",
        server.trim_end_matches('/'),
        defaults::TRANSCRIBE_PATH
    )
}

#[async_trait::async_trait]
impl TranscriptionBackend for HttpTranscriptionBackend {
    async fn transcribe(&self, asset: &Asset) -> Result<String> {
        let part = reqwest::multipart::Part::bytes(asset.bytes().to_vec())
            .file_name(defaults::UPLOAD_FILENAME)
            .mime_str(asset.mime())
            .map_err(|e| MicnoteError::Other(format!("invalid asset MIME type: {e}")))?;
        let form = reqwest::multipart::Form::new().part(defaults::UPLOAD_FIELD, part);

        let response = self
            .client
            .post(&self.url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| MicnoteError::TranscriptionFailed {
                cause: format!("request failed: {e}"),
            })?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(MicnoteError::TranscriptionFailed {
                cause: format!("server returned {status}"),
            });
        }

        let body: TranscribeResponse =
            response
                .json()
                .await
                .map_err(|e| MicnoteError::TranscriptionFailed {
                    cause: format!("malformed response body: {e}"),
                })?;
        Ok(body.text)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}
