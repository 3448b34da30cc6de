//! git-cliff spawning.
//!
//! All operations shell out to the `git-cliff` binary inside the repository
//! root so the project's own `cliff.toml` (or `[workspace.metadata.git-cliff]`)
//! drives commit parsing, bump rules and rendering.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::debug;

use crate::error::CliffError;
use crate::fsutil::write_atomic;

use super::ChangelogEngine;

/// Changelog engine backed by the git-cliff CLI.
#[derive(Debug, Clone)]
pub struct GitCliff {
    program: String,
    root: PathBuf,
}

impl GitCliff {
    pub fn new(program: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            root: root.into(),
        }
    }

    /// Check that the git-cliff executable can be found.
    ///
    /// Uses the `which` crate for cross-platform executable detection.
    pub fn check_installed(&self) -> Result<(), CliffError> {
        which::which(&self.program)
            .map(|path| debug!(path = %path.display(), "Found changelog engine"))
            .map_err(|_| CliffError::NotInstalled(self.program.clone()))
    }

    /// Run git-cliff with `args` and return its stdout.
    fn run(&self, args: &[&str]) -> Result<String, CliffError> {
        debug!(program = %self.program, ?args, "Running changelog engine");

        let output = Command::new(&self.program)
            .args(args)
            .current_dir(&self.root)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| CliffError::SpawnFailed {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let code = output.status.code().unwrap_or(-1);
            return Err(CliffError::NonZeroExit {
                program: self.program.clone(),
                code,
                stderr,
            });
        }

        String::from_utf8(output.stdout).map_err(|_| CliffError::InvalidOutput(self.program.clone()))
    }

    fn resolve(&self, output: &Path) -> PathBuf {
        if output.is_absolute() {
            output.to_path_buf()
        } else {
            self.root.join(output)
        }
    }
}

impl ChangelogEngine for GitCliff {
    fn bumped_version(&self) -> Result<String, CliffError> {
        let stdout = self.run(&["--bumped-version"])?;
        let version = stdout.trim();
        if version.is_empty() {
            return Err(CliffError::EmptyVersion(self.program.clone()));
        }
        Ok(version.to_string())
    }

    fn regenerate(&self, tag: &str, output: &Path) -> Result<(), CliffError> {
        // Rendered to stdout and written here so the file is replaced in one rename.
        let changelog = self.run(&["--tag", tag])?;
        let path = self.resolve(output);
        write_atomic(&path, &changelog).map_err(|source| CliffError::WriteFailed { path, source })
    }

    fn release_notes(&self, tag: &str) -> Result<String, CliffError> {
        self.run(&["--unreleased", "--tag", tag, "--strip", "header"])
    }
}
