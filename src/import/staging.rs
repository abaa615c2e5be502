use std::path::{Path, PathBuf};

use tempfile::TempDir;

use super::{sanitize_filename, ImportError};

/// An uploaded file copied into its own temporary directory.
///
/// The directory (and the report written next to it) is removed when the
/// value is dropped, whether processing succeeded or not.
#[derive(Debug)]
pub struct StagedUpload {
    dir: TempDir,
    input_path: PathBuf,
    file_name: String,
}

impl StagedUpload {
    /// Write `bytes` under a fresh directory in `root` (system temp if `None`).
    pub fn stage(
        bytes: &[u8],
        original_name: &str,
        max_bytes: u64,
        root: Option<&Path>,
    ) -> Result<Self, ImportError> {
        let size = bytes.len() as u64;
        if size > max_bytes {
            return Err(ImportError::FileTooLarge {
                size_mb: size as f64 / (1024.0 * 1024.0),
                max_mb: max_bytes / (1024 * 1024),
            });
        }

        let mut builder = tempfile::Builder::new();
        builder.prefix("esam-upload-");
        let dir = match root {
            Some(root) => {
                std::fs::create_dir_all(root)?;
                builder.tempdir_in(root)?
            }
            None => builder.tempdir()?,
        };

        let file_name = sanitize_filename(original_name);
        let input_path = dir.path().join(&file_name);
        std::fs::write(&input_path, bytes)?;

        tracing::debug!(
            file = %file_name,
            size,
            dir = %dir.path().display(),
            "Upload staged"
        );

        Ok(Self {
            dir,
            input_path,
            file_name,
        })
    }

    pub fn input_path(&self) -> &Path {
        &self.input_path
    }

    /// Sanitized name the upload was staged under.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Where the report for this upload is written, inside the staging dir.
    pub fn report_path(&self, report_name: &str) -> PathBuf {
        self.dir.path().join(report_name)
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    /// Remove the staging directory now and surface any error.
    pub fn close(self) -> Result<(), ImportError> {
        self.dir.close()?;
        Ok(())
    }
}
