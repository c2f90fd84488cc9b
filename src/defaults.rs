//! Default configuration constants for micnote.
//!
//! This module provides shared constants used across configuration,
//! upload and export so the wire protocol is defined in one place.

use std::time::Duration;

/// Relative path of the transcription endpoint on the configured server.
pub const TRANSCRIBE_PATH: &str = "/transcribe";

/// Multipart form field name the server expects the audio file under.
pub const UPLOAD_FIELD: &str = "audio";

/// Filename sent with the uploaded asset.
pub const UPLOAD_FILENAME: &str = "recording.webm";

/// MIME type of the finalized audio asset.
///
/// The capture backend delegates container encoding to an external
/// encoder, so the asset arrives already in this format.
pub const ASSET_MIME: &str = "audio/webm";

/// Filename of the exported transcript artifact.
pub const EXPORT_FILENAME: &str = "transcript.txt";

/// Maximum asset size accepted for upload, in bytes (10 MiB).
///
/// Assets above this are refused client-side rather than rejected by
/// the server after a wasted upload.
pub const MAX_ASSET_BYTES: u64 = 10 * 1024 * 1024;

/// Default base URL of the transcription server.
pub const SERVER_URL: &str = "http://127.0.0.1:5000";

/// Default timeout for the transcription request.
///
/// Transcription of a multi-minute recording can take a while on a
/// CPU-only server; 60s leaves headroom without hanging forever.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Default recorder command template.
///
/// `{device}` is replaced with the configured input device name. The
/// command must write a container stream to stdout and finalize it
/// when terminated with SIGTERM.
pub const RECORDER_COMMAND: &str =
    "ffmpeg -hide_banner -loglevel error -f pulse -i {device} -ac 1 -c:a libopus -f webm pipe:1";

/// Device name substituted into the recorder command when none is configured.
pub const RECORDER_DEVICE: &str = "default";
