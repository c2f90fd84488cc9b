//! Transcript export to a plain-text file.

use crate::defaults;
use crate::error::{MicnoteError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Writes the displayed transcript to `transcript.txt`.
pub struct TranscriptExporter {
    directory: PathBuf,
}

impl TranscriptExporter {
    /// Create an exporter writing into `directory`.
    pub fn new(directory: &Path) -> Self {
        Self {
            directory: directory.to_path_buf(),
        }
    }

    /// Write `text` verbatim to the export file and return its path.
    ///
    /// The write goes through a temporary file in the same directory
    /// which is renamed into place on success and removed on failure,
    /// so the temporary never outlives the call and a concurrent
    /// reader never sees a half-written transcript.
    ///
    /// # Errors
    /// `NothingToExport` when `text` is empty; `Export` when the
    /// filesystem refuses.
    pub fn export(&self, text: &str) -> Result<PathBuf> {
        if text.is_empty() {
            return Err(MicnoteError::NothingToExport);
        }

        let target = self.directory.join(defaults::EXPORT_FILENAME);
        let staging = self
            .directory
            .join(format!(".{}.{}", defaults::EXPORT_FILENAME, std::process::id()));

        fs::write(&staging, text).map_err(|e| MicnoteError::Export {
            message: format!("failed to write {}: {e}", staging.display()),
        })?;

        match fs::rename(&staging, &target) {
            Ok(()) => Ok(target),
            Err(e) => {
                let _ = fs::remove_file(&staging);
                Err(MicnoteError::Export {
                    message: format!("failed to move transcript into place: {e}"),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn export_writes_verbatim_text() {
        let dir = TempDir::new().unwrap();
        let exporter = TranscriptExporter::new(dir.path());

        let path = exporter.export("abc").unwrap();
        assert_eq!(path, dir.path().join("transcript.txt"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "abc");
    }

    #[test]
    fn export_empty_text_fails() {
        let dir = TempDir::new().unwrap();
        let exporter = TranscriptExporter::new(dir.path());

        let err = exporter.export("").unwrap_err();
        assert!(matches!(err, MicnoteError::NothingToExport));
        assert!(!dir.path().join("transcript.txt").exists());
    }

    #[test]
    fn export_overwrites_previous_transcript() {
        let dir = TempDir::new().unwrap();
        let exporter = TranscriptExporter::new(dir.path());

        exporter.export("first").unwrap();
        let path = exporter.export("second").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
    }

    #[test]
    fn export_leaves_no_staging_file_behind() {
        let dir = TempDir::new().unwrap();
        let exporter = TranscriptExporter::new(dir.path());

        exporter.export("abc").unwrap();
        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_name() != "transcript.txt")
            .collect();
        assert!(leftovers.is_empty(), "staging files left: {leftovers:?}");
    }

    #[test]
    fn export_to_missing_directory_fails_cleanly() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        let exporter = TranscriptExporter::new(&missing);

        let err = exporter.export("abc").unwrap_err();
        assert!(matches!(err, MicnoteError::Export { .. }));
    }

    #[test]
    fn export_preserves_unicode_and_newlines() {
        let dir = TempDir::new().unwrap();
        let exporter = TranscriptExporter::new(dir.path());

        let text = "Ein Test.\nZwei Zeilen — äöü.";
        let path = exporter.export(text).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), text);
    }
}
