//! release-prep - prepare a release commit and tag from conventional commits.
//!
//! # Overview
//!
//! release-prep asks git-cliff for the next version, refuses to continue if
//! that version is already tagged, bumps the project manifests, regenerates
//! CHANGELOG.md, and records the result as one commit plus an annotated tag
//! whose message is the new changelog section.

pub mod changelog;
pub mod config;
pub mod error;
pub mod fsutil;
pub mod git;
pub mod manifest;
pub mod release;
pub mod version;

// Re-export commonly used types
pub use changelog::{ChangelogEngine, GitCliff};
pub use config::Settings;
pub use error::{CliffError, GitError, ManifestError, ReleaseError};
pub use git::{SystemGit, VersionControl};
pub use manifest::{ManifestEditor, ProjectManifest};
pub use release::{PreparedRelease, ReleaseContext, prepare_release};
pub use version::NextVersion;
