//! Microphone capture via an external encoder process.
//!
//! The recorder command (ffmpeg by default) owns the device and the
//! container encoding; this module owns the process lifecycle and
//! hands its stdout to the session as opaque fragments. Terminating
//! the child with SIGTERM lets the encoder flush the container
//! trailer, so the finalized asset is a complete WebM file.

use crate::audio::source::AudioSource;
use crate::defaults;
use crate::error::{MicnoteError, Result};
use cpal::traits::{DeviceTrait, HostTrait};
use crossbeam_channel::{Receiver, unbounded};
use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

/// Upper bound on a single stdout read. Fragment sizes below this are
/// entirely up to the encoder's write pattern.
const FRAGMENT_READ_BYTES: usize = 8 * 1024;

/// How long `acquire` waits before concluding the recorder survived
/// startup. Device/permission failures make ffmpeg exit immediately.
const SPAWN_GRACE: Duration = Duration::from_millis(150);

/// How long `stop` waits for the encoder to flush and exit after
/// SIGTERM before resorting to SIGKILL.
const SHUTDOWN_WAIT: Duration = Duration::from_secs(2);

/// Real capture source backed by an external recorder process.
pub struct RecorderProcess {
    argv: Vec<String>,
    child: Option<Child>,
    fragments: Option<Receiver<Vec<u8>>>,
    reader: Option<JoinHandle<()>>,
}

impl RecorderProcess {
    /// Build a recorder from the configured command template.
    ///
    /// `{device}` in the template is replaced with `device` (or the
    /// default device name).
    pub fn new(command_template: &str, device: Option<&str>) -> Result<Self> {
        let argv = build_argv(command_template, device)?;
        Ok(Self {
            argv,
            child: None,
            fragments: None,
            reader: None,
        })
    }

    /// Classify an immediate recorder exit into the capture taxonomy.
    fn classify_startup_failure(stderr: &str) -> MicnoteError {
        let lower = stderr.to_lowercase();
        if lower.contains("permission denied") || lower.contains("access denied") {
            MicnoteError::PermissionDenied {
                message: stderr_tail(stderr),
            }
        } else {
            MicnoteError::DeviceUnavailable {
                message: stderr_tail(stderr),
            }
        }
    }
}

/// Split the command template into argv, substituting the device name.
fn build_argv(template: &str, device: Option<&str>) -> Result<Vec<String>> {
    let device = device.unwrap_or(defaults::RECORDER_DEVICE);
    let argv: Vec<String> = template
        .split_whitespace()
        .map(|arg| arg.replace("{device}", device))
        .collect();
    if argv.is_empty() {
        return Err(MicnoteError::ConfigInvalidValue {
            key: "audio.recorder".to_string(),
            message: "recorder command is empty".to_string(),
        });
    }
    Ok(argv)
}

/// Check whether the recorder binary is reachable.
fn binary_available(name: &str) -> bool {
    if name.contains('/') {
        return Path::new(name).exists();
    }
    std::env::var_os("PATH")
        .map(|paths| std::env::split_paths(&paths).any(|dir| dir.join(name).exists()))
        .unwrap_or(false)
}

/// Last few lines of recorder stderr, for error messages.
fn stderr_tail(stderr: &str) -> String {
    let tail: Vec<&str> = stderr.lines().rev().take(3).collect();
    let mut lines: Vec<&str> = tail.into_iter().rev().collect();
    if lines.is_empty() {
        lines.push("recorder exited during startup");
    }
    lines.join(" | ")
}

impl AudioSource for RecorderProcess {
    fn acquire(&mut self) -> Result<()> {
        let binary = &self.argv[0];
        if !binary_available(binary) {
            return Err(MicnoteError::DeviceUnavailable {
                message: format!("recorder command not found: {binary}"),
            });
        }

        let mut child = Command::new(binary)
            .args(&self.argv[1..])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => MicnoteError::DeviceUnavailable {
                    message: format!("recorder command not found: {binary}"),
                },
                std::io::ErrorKind::PermissionDenied => MicnoteError::PermissionDenied {
                    message: format!("cannot execute recorder: {binary}"),
                },
                _ => MicnoteError::Capture {
                    message: format!("failed to spawn recorder: {e}"),
                },
            })?;

        // Device and permission failures surface as an immediate exit;
        // give the recorder a moment to hit them before reporting the
        // acquisition as successful.
        std::thread::sleep(SPAWN_GRACE);
        match child.try_wait() {
            Ok(Some(_status)) => {
                let mut stderr = String::new();
                if let Some(mut pipe) = child.stderr.take() {
                    let _ = pipe.read_to_string(&mut stderr);
                }
                Err(Self::classify_startup_failure(&stderr))
            }
            Ok(None) => {
                self.child = Some(child);
                Ok(())
            }
            Err(e) => {
                let _ = child.kill();
                Err(MicnoteError::Capture {
                    message: format!("failed to poll recorder: {e}"),
                })
            }
        }
    }

    fn start(&mut self) -> Result<()> {
        let child = self.child.as_mut().ok_or_else(|| MicnoteError::Capture {
            message: "start before acquire".to_string(),
        })?;
        let mut stdout = child.stdout.take().ok_or_else(|| MicnoteError::Capture {
            message: "recorder stdout not piped".to_string(),
        })?;

        let (tx, rx) = unbounded();
        let reader = std::thread::spawn(move || {
            let mut buf = [0u8; FRAGMENT_READ_BYTES];
            loop {
                match stdout.read(&mut buf) {
                    Ok(0) => break,
                    Ok(n) => {
                        if tx.send(buf[..n].to_vec()).is_err() {
                            break;
                        }
                    }
                    Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                    Err(_) => break,
                }
            }
        });

        self.fragments = Some(rx);
        self.reader = Some(reader);
        Ok(())
    }

    fn read_fragments(&mut self) -> Result<Vec<Vec<u8>>> {
        match &self.fragments {
            Some(rx) => Ok(rx.try_iter().collect()),
            None => Ok(Vec::new()),
        }
    }

    fn stop(&mut self) -> Result<()> {
        let mut child = self.child.take().ok_or(MicnoteError::NotRecording)?;

        // SIGTERM asks the encoder to flush the container trailer;
        // SIGKILL after the deadline would truncate the asset.
        // SAFETY: pid comes from a child we spawned and still own.
        unsafe {
            libc::kill(child.id() as libc::pid_t, libc::SIGTERM);
        }

        let deadline = Instant::now() + SHUTDOWN_WAIT;
        loop {
            match child.try_wait() {
                Ok(Some(_)) => break,
                Ok(None) if Instant::now() >= deadline => {
                    let _ = child.kill();
                    let _ = child.wait();
                    break;
                }
                Ok(None) => std::thread::sleep(Duration::from_millis(25)),
                Err(e) => {
                    let _ = child.kill();
                    return Err(MicnoteError::Capture {
                        message: format!("failed to wait for recorder: {e}"),
                    });
                }
            }
        }

        // The reader thread sees EOF once the child exits; its channel
        // keeps the trailing fragments for the caller's final drain.
        if let Some(reader) = self.reader.take() {
            let _ = reader.join();
        }
        Ok(())
    }
}

impl Drop for RecorderProcess {
    fn drop(&mut self) {
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

/// Input device names cpal reports that are never useful for voice
/// capture.
const FILTERED_PATTERNS: &[&str] = &["surround", "hdmi", "s/pdif", "front:", "rear:"];

/// List available audio input devices for the `devices` subcommand.
///
/// # Errors
/// Returns `MicnoteError::Capture` if device enumeration fails. cpal
/// may print harmless backend-probing warnings to stderr while
/// enumerating.
pub fn list_devices() -> Result<Vec<String>> {
    let host = cpal::default_host();
    let devices = host.input_devices().map_err(|e| MicnoteError::Capture {
        message: format!("failed to enumerate input devices: {e}"),
    })?;

    let names = devices
        .filter_map(|device| device.name().ok())
        .filter(|name| {
            let lower = name.to_lowercase();
            !FILTERED_PATTERNS.iter().any(|p| lower.contains(p))
        })
        .collect();
    Ok(names)
}
