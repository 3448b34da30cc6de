//! Changelog engine: next-version queries, changelog rendering, release notes.

pub mod cliff;

use std::path::Path;

use crate::error::CliffError;

pub use cliff::GitCliff;

/// Operations the release pipeline needs from a changelog generator.
///
/// This abstraction allows mocking the git-cliff subprocess in tests.
#[cfg_attr(test, mockall::automock)]
pub trait ChangelogEngine {
    /// Next version implied by the unreleased commits, e.g. `v1.2.0`.
    fn bumped_version(&self) -> Result<String, CliffError>;

    /// Render the full changelog with the unreleased range attributed to
    /// `tag` and replace the file at `output`.
    fn regenerate(&self, tag: &str, output: &Path) -> Result<(), CliffError>;

    /// Render only the unreleased range, attributed to `tag`, without the
    /// changelog header.
    fn release_notes(&self, tag: &str) -> Result<String, CliffError>;
}
