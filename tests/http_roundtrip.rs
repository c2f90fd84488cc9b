//! Wire-level tests for the HTTP transcription backend.
//!
//! A one-shot TCP fixture server stands in for the transcription
//! service so the exact multipart contract can be asserted on the
//! request the backend actually sends.

use micnote::remote::backend::TranscriptionBackend;
use micnote::remote::http::HttpTranscriptionBackend;
use micnote::session::session::Asset;
use micnote::MicnoteError;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

const TIMEOUT: Duration = Duration::from_secs(5);

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// Serve exactly one HTTP exchange, answering with `response`.
///
/// Returns the server's base URL and a handle resolving to the raw
/// request bytes the client sent.
async fn serve_once(response: &'static str) -> (String, tokio::task::JoinHandle<Vec<u8>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 4096];

        // Read headers.
        let (body_start, content_length) = loop {
            let n = stream.read(&mut buf).await.unwrap();
            assert!(n > 0, "client closed before sending headers");
            request.extend_from_slice(&buf[..n]);
            if let Some(pos) = find_subslice(&request, b"\r\n\r\n") {
                let headers = String::from_utf8_lossy(&request[..pos]).to_string();
                let content_length = headers
                    .lines()
                    .find_map(|line| {
                        let (name, value) = line.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                break (pos + 4, content_length);
            }
        };

        // Read the body.
        while request.len() < body_start + content_length {
            let n = stream.read(&mut buf).await.unwrap();
            assert!(n > 0, "client closed before sending full body");
            request.extend_from_slice(&buf[..n]);
        }

        stream.write_all(response.as_bytes()).await.unwrap();
        stream.shutdown().await.unwrap();
        request
    });

    (format!("http://{}", addr), handle)
}

fn asset() -> Asset {
    Asset::from_bytes(b"fake webm container bytes".to_vec())
}

#[tokio::test]
async fn posts_the_exact_multipart_contract_and_returns_the_text() {
    let (server, request) = serve_once(
        "HTTP/1.1 200 OK\r\n\
         Content-Type: application/json\r\n\
         Content-Length: 23\r\n\
         Connection: close\r\n\
         \r\n\
         {\"text\": \"hello world\"}",
    )
    .await;

    let backend = HttpTranscriptionBackend::new(&server, TIMEOUT).unwrap();
    let text = backend.transcribe(&asset()).await.unwrap();
    assert_eq!(text, "hello world");

    let request = request.await.unwrap();
    let head = String::from_utf8_lossy(&request);

    assert!(
        head.starts_with("POST /transcribe HTTP/1.1"),
        "unexpected request line: {}",
        head.lines().next().unwrap_or_default()
    );
    assert!(
        head.to_lowercase()
            .contains("content-type: multipart/form-data; boundary="),
        "missing multipart content type"
    );
    assert!(
        find_subslice(&request, b"name=\"audio\"").is_some(),
        "missing audio form field"
    );
    assert!(
        find_subslice(&request, b"filename=\"recording.webm\"").is_some(),
        "missing fixed filename"
    );
    assert!(
        find_subslice(&request, b"audio/webm").is_some(),
        "missing part content type"
    );
    assert!(
        find_subslice(&request, b"fake webm container bytes").is_some(),
        "asset bytes missing from body"
    );
}

#[tokio::test]
async fn non_200_status_fails_and_names_the_status() {
    let (server, request) = serve_once(
        "HTTP/1.1 500 INTERNAL SERVER ERROR\r\n\
         Content-Type: application/json\r\n\
         Content-Length: 26\r\n\
         Connection: close\r\n\
         \r\n\
         {\"error\": \"model crashed\"}",
    )
    .await;

    let backend = HttpTranscriptionBackend::new(&server, TIMEOUT).unwrap();
    let err = backend.transcribe(&asset()).await.unwrap_err();

    match err {
        MicnoteError::TranscriptionFailed { cause } => {
            assert!(cause.contains("500"), "cause should name the status: {cause}");
        }
        other => panic!("expected TranscriptionFailed, got {other:?}"),
    }
    let _ = request.await.unwrap();
}

#[tokio::test]
async fn malformed_json_body_fails() {
    let (server, request) = serve_once(
        "HTTP/1.1 200 OK\r\n\
         Content-Type: application/json\r\n\
         Content-Length: 8\r\n\
         Connection: close\r\n\
         \r\n\
         not json",
    )
    .await;

    let backend = HttpTranscriptionBackend::new(&server, TIMEOUT).unwrap();
    let err = backend.transcribe(&asset()).await.unwrap_err();

    match err {
        MicnoteError::TranscriptionFailed { cause } => {
            assert!(
                cause.contains("malformed"),
                "cause should mention the malformed body: {cause}"
            );
        }
        other => panic!("expected TranscriptionFailed, got {other:?}"),
    }
    let _ = request.await.unwrap();
}

#[tokio::test]
async fn missing_text_field_fails() {
    let (server, request) = serve_once(
        "HTTP/1.1 200 OK\r\n\
         Content-Type: application/json\r\n\
         Content-Length: 18\r\n\
         Connection: close\r\n\
         \r\n\
         {\"words\": \"hello\"}",
    )
    .await;

    let backend = HttpTranscriptionBackend::new(&server, TIMEOUT).unwrap();
    let err = backend.transcribe(&asset()).await.unwrap_err();
    assert!(matches!(err, MicnoteError::TranscriptionFailed { .. }));
    let _ = request.await.unwrap();
}

#[tokio::test]
async fn unreachable_server_fails_as_transcription_failed() {
    // Bind then drop a listener so the port is free but nothing answers.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let backend =
        HttpTranscriptionBackend::new(&format!("http://{}", addr), TIMEOUT).unwrap();
    let err = backend.transcribe(&asset()).await.unwrap_err();
    assert!(matches!(err, MicnoteError::TranscriptionFailed { .. }));
}
