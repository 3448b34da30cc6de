//! Version manifest editing.
//!
//! Rewrites the project's declared version, plus any lock file that records
//! it, to the release version.

pub mod lockfile;
pub mod version_files;

use std::path::PathBuf;

use semver::Version;
use tracing::{debug, info};

use crate::error::ManifestError;

use self::lockfile::render_lock_file;
use self::version_files::{detect_version_files, render_version_file, write_file};

/// Operations the release pipeline needs from a manifest editor.
#[cfg_attr(test, mockall::automock)]
pub trait ManifestEditor {
    /// Set the project version to `version` (bare, e.g. `1.2.0`).
    ///
    /// Returns every file that was rewritten, for staging.
    fn set_version(&self, version: &str) -> Result<Vec<PathBuf>, ManifestError>;
}

/// Manifest editor for the manifests found at a project root.
#[derive(Debug, Clone)]
pub struct ProjectManifest {
    root: PathBuf,
}

impl ProjectManifest {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ManifestEditor for ProjectManifest {
    fn set_version(&self, version: &str) -> Result<Vec<PathBuf>, ManifestError> {
        let new_version =
            Version::parse(version).map_err(|_| ManifestError::InvalidVersion(version.to_string()))?;

        let version_files = detect_version_files(&self.root)?;

        // Render every manifest and lock file before writing any, so a
        // malformed file fails the step with nothing touched.
        let mut pending = Vec::new();
        for vf in &version_files {
            pending.push((vf.path.clone(), render_version_file(vf, &new_version)?));
            if let Some(lock) = render_lock_file(vf, &new_version)? {
                pending.push(lock);
            }
        }

        for (path, content) in &pending {
            write_file(path, content)?;
        }

        for vf in &version_files {
            info!(
                file = %vf.kind,
                from = %vf.current_version,
                to = %new_version,
                "Updated version"
            );
        }

        let touched: Vec<PathBuf> = pending.into_iter().map(|(path, _)| path).collect();
        debug!(files = touched.len(), "Manifest files rewritten");
        Ok(touched)
    }
}
