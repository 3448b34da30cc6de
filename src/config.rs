//! Runtime settings read from the environment.
//!
//! The CLI takes no flags; the few knobs that exist are environment variables
//! with defaults. Invalid values are logged and replaced by the default.

use std::env;
use std::path::PathBuf;

use tracing::warn;

/// Environment variable overriding the changelog path.
pub const CHANGELOG_ENV_VAR: &str = "RELEASE_PREP_CHANGELOG";

/// Environment variable overriding the changelog engine executable.
pub const CLIFF_BIN_ENV_VAR: &str = "RELEASE_PREP_CLIFF_BIN";

/// Environment variable overriding the comment char used when tagging.
pub const COMMENT_CHAR_ENV_VAR: &str = "RELEASE_PREP_COMMENT_CHAR";

pub const DEFAULT_CHANGELOG: &str = "CHANGELOG.md";
pub const DEFAULT_CLIFF_BIN: &str = "git-cliff";
pub const DEFAULT_COMMENT_CHAR: char = '@';

/// Settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Changelog path, relative to the repository root unless absolute.
    pub changelog: PathBuf,
    /// git-cliff executable name or path.
    pub cliff_bin: String,
    /// Comment char handed to `git -c core.commentChar`.
    pub comment_char: char,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            changelog: PathBuf::from(DEFAULT_CHANGELOG),
            cliff_bin: DEFAULT_CLIFF_BIN.to_string(),
            comment_char: DEFAULT_COMMENT_CHAR,
        }
    }
}

impl Settings {
    /// Read settings from the process environment.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let changelog = non_empty_var(CHANGELOG_ENV_VAR)
            .map(PathBuf::from)
            .unwrap_or(defaults.changelog);

        let cliff_bin = non_empty_var(CLIFF_BIN_ENV_VAR).unwrap_or(defaults.cliff_bin);

        let comment_char = match non_empty_var(COMMENT_CHAR_ENV_VAR) {
            Some(v) => parse_comment_char(&v).unwrap_or_else(|| {
                warn!(
                    "Invalid {} value '{}', using default '{}'",
                    COMMENT_CHAR_ENV_VAR, v, DEFAULT_COMMENT_CHAR
                );
                DEFAULT_COMMENT_CHAR
            }),
            None => defaults.comment_char,
        };

        Self {
            changelog,
            cliff_bin,
            comment_char,
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// A usable comment char is a single character that is neither `#` nor
/// whitespace, since release notes start with markdown headings.
fn parse_comment_char(value: &str) -> Option<char> {
    let mut chars = value.chars();
    let c = chars.next()?;
    if chars.next().is_some() || c == '#' || c.is_whitespace() {
        return None;
    }
    Some(c)
}
