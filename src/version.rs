//! The version a release is prepared for.

use std::fmt;

use semver::Version;

use crate::error::CliffError;

/// Next version as reported by the changelog engine.
///
/// Keeps the engine's spelling for the tag (`v1.2.0`) next to the bare form
/// written into manifests (`1.2.0`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NextVersion {
    tag: String,
    version: Version,
}

impl NextVersion {
    /// Parse the engine's output. Surrounding whitespace is ignored and a
    /// single leading `v`/`V` is treated as a prefix.
    pub fn parse(raw: &str) -> Result<Self, CliffError> {
        let tag = raw.trim();
        let bare = strip_version_prefix(tag);
        let version = Version::parse(bare).map_err(|source| CliffError::InvalidVersion {
            version: tag.to_string(),
            source,
        })?;

        Ok(Self {
            tag: tag.to_string(),
            version,
        })
    }

    /// Tag name, exactly as the engine spelled the version.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Version without its prefix, for manifests.
    pub fn bare(&self) -> &str {
        strip_version_prefix(&self.tag)
    }

    pub fn version(&self) -> &Version {
        &self.version
    }
}

impl fmt::Display for NextVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tag)
    }
}

/// Strip one leading `v` or `V`.
pub fn strip_version_prefix(version: &str) -> &str {
    version
        .strip_prefix('v')
        .or_else(|| version.strip_prefix('V'))
        .unwrap_or(version)
}
