//! Command-line interface for micnote
//!
//! Provides argument parsing using clap derive macros.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Voice notes transcribed by a remote speech service
#[derive(Parser, Debug)]
#[command(
    name = "micnote",
    version,
    about = "Record a voice note and transcribe it with a remote speech service"
)]
pub struct Cli {
    /// Subcommand to execute; without one, run an interactive session
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Suppress progress output (the transcript is still printed)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Audio input device (see `micnote devices`)
    #[arg(long, value_name = "DEVICE")]
    pub device: Option<String>,

    /// Transcription server base URL
    #[arg(long, value_name = "URL")]
    pub server: Option<String>,

    /// Export transcript.txt after a successful transcription
    #[arg(short, long)]
    pub export: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List available audio input devices
    Devices,

    /// Start the daemon (foreground process for systemd)
    Daemon {
        /// Path to Unix socket (default: $XDG_RUNTIME_DIR/micnote.sock)
        #[arg(long, value_name = "PATH")]
        socket: Option<PathBuf>,
    },

    /// Start recording via IPC
    Start {
        /// Path to Unix socket (default: $XDG_RUNTIME_DIR/micnote.sock)
        #[arg(long, value_name = "PATH")]
        socket: Option<PathBuf>,
    },

    /// Stop recording and finalize the asset via IPC
    Stop {
        /// Path to Unix socket (default: $XDG_RUNTIME_DIR/micnote.sock)
        #[arg(long, value_name = "PATH")]
        socket: Option<PathBuf>,
    },

    /// Upload the recording and print the transcript via IPC
    Transcribe {
        /// Path to Unix socket (default: $XDG_RUNTIME_DIR/micnote.sock)
        #[arg(long, value_name = "PATH")]
        socket: Option<PathBuf>,
    },

    /// Export the transcript to transcript.txt via IPC
    Export {
        /// Path to Unix socket (default: $XDG_RUNTIME_DIR/micnote.sock)
        #[arg(long, value_name = "PATH")]
        socket: Option<PathBuf>,
    },

    /// Get session status via IPC
    Status {
        /// Path to Unix socket (default: $XDG_RUNTIME_DIR/micnote.sock)
        #[arg(long, value_name = "PATH")]
        socket: Option<PathBuf>,
    },

    /// Shut the daemon down via IPC
    Shutdown {
        /// Path to Unix socket (default: $XDG_RUNTIME_DIR/micnote.sock)
        #[arg(long, value_name = "PATH")]
        socket: Option<PathBuf>,
    },

    /// Show or inspect the configuration
    Config {
        /// Action to perform
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Configuration inspection actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Print the configuration file path
    Path,
    /// Print a commented default configuration template
    Dump,
}
