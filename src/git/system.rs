//! Version control backed by git2 for lookups and the system `git` binary for
//! writes.
//!
//! Writes shell out so they inherit the user's git config, hooks and signing
//! setup, the same as running the commands by hand.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::Command;

use git2::{ErrorCode, Repository};
use tracing::debug;

use crate::error::GitError;

use super::VersionControl;

/// A git working tree.
pub struct SystemGit {
    repo: Repository,
    root: PathBuf,
    comment_char: char,
}

impl SystemGit {
    /// Find the repository containing `path`.
    ///
    /// `comment_char` is used as `core.commentChar` while creating tags.
    pub fn discover(path: &Path, comment_char: char) -> Result<Self, GitError> {
        let repo = Repository::discover(path).map_err(GitError::OpenRepository)?;
        let root = repo
            .workdir()
            .ok_or(GitError::BareRepository)?
            .to_path_buf();

        debug!(root = %root.display(), "Opened repository");

        Ok(Self {
            repo,
            root,
            comment_char,
        })
    }

    /// Working tree root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Run a git command in the working tree and return success or a
    /// descriptive error carrying git's stderr.
    fn run_git<I, S>(&self, args: I, operation: &str) -> Result<(), GitError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let args: Vec<OsString> = args.into_iter().map(|a| a.as_ref().to_owned()).collect();
        debug!(?args, "Running git {}", operation);

        let output = Command::new("git")
            .args(&args)
            .current_dir(&self.root)
            .output()
            .map_err(|source| GitError::SpawnFailed {
                operation: operation.to_string(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(GitError::CommandFailed {
                operation: operation.to_string(),
                stderr: stderr.trim().to_string(),
            });
        }

        Ok(())
    }
}

impl VersionControl for SystemGit {
    fn tag_exists(&self, tag: &str) -> Result<bool, GitError> {
        match self.repo.find_reference(&format!("refs/tags/{}", tag)) {
            Ok(_) => Ok(true),
            Err(e) if e.code() == ErrorCode::NotFound => Ok(false),
            Err(e) => Err(GitError::TagLookup(tag.to_string(), e)),
        }
    }

    fn stage(&self, files: &[PathBuf]) -> Result<(), GitError> {
        if files.is_empty() {
            return Err(GitError::NothingToStage);
        }

        let add_args = [OsStr::new("add"), OsStr::new("--")]
            .into_iter()
            .chain(files.iter().map(|p| p.as_os_str()));

        self.run_git(add_args, "add")
    }

    fn commit(&self, message: &str) -> Result<(), GitError> {
        self.run_git(["commit", "-m", message], "commit")
    }

    fn create_annotated_tag(&self, tag: &str, message: &str) -> Result<(), GitError> {
        // The note must land in the tag exactly as it appears in the changelog,
        // so no cleanup. The comment char still moves off `#` for editors and
        // hooks that read it.
        let comment_char = format!("core.commentChar={}", self.comment_char);
        self.run_git(
            [
                "-c",
                comment_char.as_str(),
                "tag",
                "-a",
                "--cleanup=verbatim",
                tag,
                "-m",
                message,
            ],
            "tag",
        )
    }
}
