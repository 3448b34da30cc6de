//! Error types for release-prep modules using thiserror.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from the git-cliff changelog engine.
#[derive(Error, Debug)]
pub enum CliffError {
    #[error("{0} not found. Install with: cargo install git-cliff")]
    NotInstalled(String),

    #[error("Failed to spawn {program}: {source}")]
    SpawnFailed {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with code {code}: {stderr}")]
    NonZeroExit {
        program: String,
        code: i32,
        stderr: String,
    },

    #[error("{0} produced output that is not valid UTF-8")]
    InvalidOutput(String),

    #[error("{0} did not report a next version (no releasable commits?)")]
    EmptyVersion(String),

    #[error("'{version}' is not a semantic version: {source}")]
    InvalidVersion {
        version: String,
        #[source]
        source: semver::Error,
    },

    #[error("Failed to write changelog {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors from version manifest and lock file updates.
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("No version manifest found (looked for Cargo.toml, package.json, pyproject.toml)")]
    NoVersionFiles,

    #[error("Failed to update {path}: {reason}")]
    UpdateFailed { path: PathBuf, reason: String },

    #[error("'{0}' is not a valid bare semantic version")]
    InvalidVersion(String),
}

/// Errors from git operations.
#[derive(Error, Debug)]
pub enum GitError {
    #[error("Not a git repository: {0}")]
    OpenRepository(#[source] git2::Error),

    #[error("Bare repository not supported")]
    BareRepository,

    #[error("Failed to look up tag '{0}': {1}")]
    TagLookup(String, #[source] git2::Error),

    #[error("Failed to run git {operation}: {source}")]
    SpawnFailed {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("git {operation} failed: {stderr}")]
    CommandFailed { operation: String, stderr: String },

    #[error("No files to stage")]
    NothingToStage,
}

/// Errors from the release pipeline.
///
/// Each variant corresponds to the step that failed. Collaborator errors are
/// carried as the source unchanged.
#[derive(Error, Debug)]
pub enum ReleaseError {
    #[error("Could not compute the next version: {0}")]
    VersionComputation(#[source] CliffError),

    #[error("Tag {0} already exists; this version has already been released")]
    AlreadyReleased(String),

    #[error("Could not update the version manifest: {0}")]
    ManifestUpdate(#[from] ManifestError),

    #[error("Could not generate the changelog: {0}")]
    ChangelogGeneration(#[source] CliffError),

    #[error("Version control operation failed: {0}")]
    VersionControl(#[from] GitError),
}
