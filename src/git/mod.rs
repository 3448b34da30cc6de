//! Version-control operations used by the release pipeline.

pub mod system;

use std::path::PathBuf;

use crate::error::GitError;

pub use system::SystemGit;

/// Operations the release pipeline needs from version control.
#[cfg_attr(test, mockall::automock)]
pub trait VersionControl {
    /// Whether a tag named exactly `tag` exists.
    fn tag_exists(&self, tag: &str) -> Result<bool, GitError>;

    /// Add `files` to the index.
    fn stage(&self, files: &[PathBuf]) -> Result<(), GitError>;

    /// Commit the index with `message`.
    fn commit(&self, message: &str) -> Result<(), GitError>;

    /// Create an annotated tag on HEAD. `message` is kept literally, including
    /// lines that start with `#`.
    fn create_annotated_tag(&self, tag: &str, message: &str) -> Result<(), GitError>;
}
