//! Copying an output directory to a remote with rclone.

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Runs `rclone copy <folder> <remote_name>:<remote_path>`.
#[derive(Debug, Clone)]
pub struct Uploader {
    program: PathBuf,
}

impl Uploader {
    /// Use `rclone` from `PATH`.
    pub fn new() -> Self {
        Self {
            program: PathBuf::from("rclone"),
        }
    }

    /// Use a specific executable.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Remote destination in rclone's `name:path` syntax.
    pub fn destination(remote_name: &str, remote_path: &str) -> String {
        format!("{}:{}", remote_name, remote_path)
    }

    /// Copy `folder` to the remote and return rclone's exit status
    /// (0 on success).
    ///
    /// Arguments go straight to the process, so paths with spaces or shell
    /// metacharacters need no quoting. Only a failure to start the program
    /// is an error; a non-zero status is returned for the caller to judge.
    pub fn upload_folder(&self, folder: &Path, remote_name: &str, remote_path: &str) -> Result<i32> {
        let destination = Self::destination(remote_name, remote_path);
        log::info!(
            "uploading {} to {} with {}",
            folder.display(),
            destination,
            self.program.display()
        );

        let status = Command::new(&self.program)
            .arg("copy")
            .arg(folder)
            .arg(&destination)
            .stdin(Stdio::null())
            .status()
            .map_err(|e| Error::Upload(format!("failed to run {}: {}", self.program.display(), e)))?;

        // Killed by a signal: no code, report as a generic failure.
        let code = status.code().unwrap_or(-1);
        if code != 0 {
            log::error!("{} exited with {}", self.program.display(), status);
        }
        Ok(code)
    }
}

impl Default for Uploader {
    fn default() -> Self {
        Self::new()
    }
}

/// Copy `folder` to `remote_name:remote_path` with the default `rclone`.
pub fn upload_folder(folder: &Path, remote_name: &str, remote_path: &str) -> Result<i32> {
    Uploader::new().upload_folder(folder, remote_name, remote_path)
}
