//! Async Unix socket IPC server for daemon control.

use crate::error::{MicnoteError, Result};
use crate::ipc::protocol::{Command, Response};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::Mutex;

/// Handler trait for processing IPC commands.
#[async_trait::async_trait]
pub trait CommandHandler: Send + Sync {
    /// Handle a command and return a response.
    async fn handle(&self, command: Command) -> Response;
}

/// State for managing server shutdown.
#[derive(Debug, Clone)]
struct ServerState {
    shutdown: Arc<Mutex<bool>>,
}

impl ServerState {
    fn new() -> Self {
        Self {
            shutdown: Arc::new(Mutex::new(false)),
        }
    }

    async fn is_shutdown(&self) -> bool {
        *self.shutdown.lock().await
    }

    async fn set_shutdown(&self) {
        *self.shutdown.lock().await = true;
    }
}

/// IPC server exposing the recording session over a Unix socket.
pub struct IpcServer {
    socket_path: PathBuf,
    state: ServerState,
}

impl IpcServer {
    /// Create a new IPC server bound to the specified socket path.
    pub fn new(socket_path: PathBuf) -> Result<Self> {
        Ok(Self {
            socket_path,
            state: ServerState::new(),
        })
    }

    /// Get the socket path this server is using.
    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Get the default socket path based on XDG_RUNTIME_DIR or fallback.
    pub fn default_socket_path() -> PathBuf {
        if let Ok(xdg_runtime) = std::env::var("XDG_RUNTIME_DIR") {
            PathBuf::from(xdg_runtime).join("micnote.sock")
        } else {
            let uid = unsafe { libc::getuid() };
            PathBuf::from(format!("/tmp/micnote-{}.sock", uid))
        }
    }

    /// Start the IPC server and handle incoming connections.
    ///
    /// Returns after a `shutdown` command has been served.
    pub async fn start<H>(&self, handler: H) -> Result<()>
    where
        H: CommandHandler + 'static,
    {
        // Clean up any existing socket file
        if self.socket_path.exists() {
            std::fs::remove_file(&self.socket_path).map_err(|e| MicnoteError::IpcSocket {
                message: format!("Failed to remove existing socket: {}", e),
            })?;
        }

        let listener =
            UnixListener::bind(&self.socket_path).map_err(|e| MicnoteError::IpcSocket {
                message: format!("Failed to bind to socket: {}", e),
            })?;

        let handler = Arc::new(handler);

        loop {
            if self.state.is_shutdown().await {
                break;
            }

            // Accept with a timeout so the shutdown flag is re-checked.
            let accept_result =
                tokio::time::timeout(tokio::time::Duration::from_millis(100), listener.accept())
                    .await;

            match accept_result {
                Ok(Ok((stream, _))) => {
                    let handler = Arc::clone(&handler);
                    let state = self.state.clone();
                    tokio::spawn(async move {
                        if let Err(e) = handle_client(stream, handler, state).await {
                            eprintln!("micnote: error handling IPC client: {}", e);
                        }
                    });
                }
                Ok(Err(e)) => {
                    return Err(MicnoteError::IpcConnection {
                        message: format!("Failed to accept connection: {}", e),
                    });
                }
                Err(_) => {
                    // Timeout - check shutdown flag again
                    continue;
                }
            }
        }

        self.cleanup_socket();
        Ok(())
    }

    /// Stop the IPC server and clean up the socket file.
    pub async fn stop(&self) -> Result<()> {
        self.state.set_shutdown().await;
        self.cleanup_socket();
        Ok(())
    }

    fn cleanup_socket(&self) {
        if self.socket_path.exists() {
            let _ = std::fs::remove_file(&self.socket_path);
        }
    }
}

/// Serve one client connection: newline-delimited JSON commands in,
/// one JSON response line out per command.
async fn handle_client<H>(
    stream: UnixStream,
    handler: Arc<H>,
    state: ServerState,
) -> Result<()>
where
    H: CommandHandler,
{
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);
    let mut line = String::new();

    loop {
        line.clear();
        let read = reader
            .read_line(&mut line)
            .await
            .map_err(|e| MicnoteError::IpcConnection {
                message: format!("Failed to read command: {}", e),
            })?;
        if read == 0 {
            return Ok(()); // Client disconnected
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let response = match Command::from_json(trimmed) {
            Ok(command) => {
                let response = handler.handle(command.clone()).await;
                if command == Command::Shutdown {
                    state.set_shutdown().await;
                }
                response
            }
            Err(e) => Response::Error {
                message: format!("Invalid command: {}", e),
            },
        };

        let response_json = response.to_json().map_err(|e| MicnoteError::IpcProtocol {
            message: format!("Failed to serialize response: {}", e),
        })?;

        writer
            .write_all(response_json.as_bytes())
            .await
            .map_err(|e| MicnoteError::IpcConnection {
                message: format!("Failed to write response: {}", e),
            })?;
        writer
            .write_all(b"\n")
            .await
            .map_err(|e| MicnoteError::IpcConnection {
                message: format!("Failed to write newline: {}", e),
            })?;
        writer
            .flush()
            .await
            .map_err(|e| MicnoteError::IpcConnection {
                message: format!("Failed to flush writer: {}", e),
            })?;
    }
}
