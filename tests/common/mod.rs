//! Shared test utilities for integration tests.
//!
//! Not all functions are used by every test file, but they're shared across tests.
#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use git2::{Oid, Repository, Signature};

use release_prep::{ChangelogEngine, CliffError, GitError, VersionControl};

/// Create a temporary directory for test output.
pub fn temp_test_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("Failed to create temp directory")
}

/// A test git repository builder for integration tests.
pub struct TestRepo {
    pub dir: tempfile::TempDir,
    pub repo: Repository,
}

impl TestRepo {
    /// Create a new empty git repository in a temp directory, with a local
    /// identity and signing disabled so the system `git` can commit and tag.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp directory");
        let repo = Repository::init(dir.path()).expect("Failed to init git repo");
        {
            let mut config = repo.config().expect("Failed to open repo config");
            config.set_str("user.name", "Test User").unwrap();
            config.set_str("user.email", "test@example.com").unwrap();
            config.set_bool("commit.gpgsign", false).unwrap();
            config.set_bool("tag.gpgsign", false).unwrap();
        }
        Self { dir, repo }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Get the test signature for commits.
    fn signature(&self) -> Signature<'_> {
        Signature::now("Test User", "test@example.com").expect("Failed to create signature")
    }

    /// Write `files` into the working tree and commit them. Returns the commit OID.
    pub fn commit_files(&self, files: &[(&str, &str)], message: &str) -> Oid {
        let sig = self.signature();

        let mut index = self.repo.index().expect("Failed to get index");
        for (name, content) in files {
            std::fs::write(self.dir.path().join(name), content).expect("Failed to write file");
            index.add_path(Path::new(name)).expect("Failed to add file");
        }
        index.write().expect("Failed to write index");
        let tree_id = index.write_tree().expect("Failed to write tree");
        let tree = self.repo.find_tree(tree_id).expect("Failed to find tree");

        // Get parent commit if exists
        let parent = self.repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();

        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .expect("Failed to create commit")
    }

    /// Create an annotated tag pointing to the given OID.
    pub fn tag_annotated(&self, name: &str, oid: Oid, message: &str) {
        let sig = self.signature();
        let obj = self.repo.find_object(oid, None).expect("Failed to find object");
        self.repo
            .tag(name, &obj, &sig, message, false)
            .expect("Failed to create annotated tag");
    }

    pub fn head_oid(&self) -> Oid {
        self.repo
            .head()
            .expect("HEAD should exist")
            .target()
            .expect("HEAD should point at a commit")
    }

    pub fn head_message(&self) -> String {
        self.repo
            .head()
            .and_then(|h| h.peel_to_commit())
            .map(|c| c.message().unwrap_or_default().to_string())
            .expect("Failed to read HEAD commit")
    }

    pub fn tag_names(&self) -> Vec<String> {
        self.repo
            .tag_names(None)
            .expect("Failed to list tags")
            .iter()
            .flatten()
            .map(String::from)
            .collect()
    }

    /// Message of an annotated tag.
    pub fn tag_message(&self, name: &str) -> String {
        let reference = self
            .repo
            .find_reference(&format!("refs/tags/{}", name))
            .expect("Tag should exist");
        let tag = reference.peel_to_tag().expect("Tag should be annotated");
        tag.message().unwrap_or_default().to_string()
    }

    /// Commit the tag points at.
    pub fn tag_target(&self, name: &str) -> Oid {
        self.repo
            .find_reference(&format!("refs/tags/{}", name))
            .and_then(|r| r.peel_to_commit())
            .map(|c| c.id())
            .expect("Tag should point at a commit")
    }

    pub fn read(&self, name: &str) -> String {
        std::fs::read_to_string(self.dir.path().join(name))
            .unwrap_or_else(|e| panic!("Failed to read {}: {}", name, e))
    }

    /// Whether the working tree has uncommitted changes to tracked files.
    pub fn is_dirty(&self) -> bool {
        let mut opts = git2::StatusOptions::new();
        opts.include_untracked(false);
        let statuses = self.repo.statuses(Some(&mut opts)).expect("Failed to get status");
        !statuses.is_empty()
    }
}

/// Changelog section produced for `tag` by the fakes below.
pub fn section(tag: &str) -> String {
    format!(
        "## [{}] - 2026-10-17\n\n### Features\n\n- Add release preparation\n",
        tag.trim_start_matches('v')
    )
}

pub const CHANGELOG_HEADER: &str = "# Changelog\n\nAll notable changes to this project will be documented in this file.\n\n";

pub const PREVIOUS_RELEASE: &str = "## [1.1.0] - 2026-01-01\n\n### Bug Fixes\n\n- Fix old bug\n";

/// In-memory changelog engine that renders a fixed history.
pub struct FakeEngine {
    pub next: String,
}

impl ChangelogEngine for FakeEngine {
    fn bumped_version(&self) -> Result<String, CliffError> {
        Ok(self.next.clone())
    }

    fn regenerate(&self, tag: &str, output: &Path) -> Result<(), CliffError> {
        let content = format!("{}{}\n{}", CHANGELOG_HEADER, section(tag), PREVIOUS_RELEASE);
        std::fs::write(output, content).map_err(|source| CliffError::WriteFailed {
            path: output.to_path_buf(),
            source,
        })
    }

    fn release_notes(&self, tag: &str) -> Result<String, CliffError> {
        Ok(section(tag))
    }
}

/// A call recorded by [`FakeVcs`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VcsCall {
    Stage(Vec<PathBuf>),
    Commit(String),
    Tag { name: String, message: String },
}

/// In-memory version control that records mutations.
#[derive(Default)]
pub struct FakeVcs {
    pub tags: RefCell<BTreeSet<String>>,
    pub calls: RefCell<Vec<VcsCall>>,
}

impl FakeVcs {
    pub fn with_tags(tags: &[&str]) -> Self {
        Self {
            tags: RefCell::new(tags.iter().map(|t| t.to_string()).collect()),
            calls: RefCell::default(),
        }
    }
}

impl VersionControl for FakeVcs {
    fn tag_exists(&self, tag: &str) -> Result<bool, GitError> {
        Ok(self.tags.borrow().contains(tag))
    }

    fn stage(&self, files: &[PathBuf]) -> Result<(), GitError> {
        self.calls.borrow_mut().push(VcsCall::Stage(files.to_vec()));
        Ok(())
    }

    fn commit(&self, message: &str) -> Result<(), GitError> {
        self.calls
            .borrow_mut()
            .push(VcsCall::Commit(message.to_string()));
        Ok(())
    }

    fn create_annotated_tag(&self, tag: &str, message: &str) -> Result<(), GitError> {
        if !self.tags.borrow_mut().insert(tag.to_string()) {
            return Err(GitError::CommandFailed {
                operation: "tag".into(),
                stderr: format!("fatal: tag '{}' already exists", tag),
            });
        }
        self.calls.borrow_mut().push(VcsCall::Tag {
            name: tag.to_string(),
            message: message.to_string(),
        });
        Ok(())
    }
}

/// Write an executable stand-in for git-cliff into `dir` that renders the
/// same history as [`FakeEngine`] with `next` as the bumped version.
#[cfg(unix)]
pub fn fake_cliff_script(dir: &Path, next: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("git-cliff");
    let script = format!(
        r#"#!/bin/sh
SECTION='{section}'
case "$1" in
  --bumped-version) echo "{next}" ;;
  --tag) printf '%s%s\n%s' '{header}' "$SECTION" '{previous}' ;;
  --unreleased) printf '%s' "$SECTION" ;;
  *) echo "unexpected arguments: $*" >&2; exit 3 ;;
esac
"#,
        section = section(next),
        next = next,
        header = CHANGELOG_HEADER,
        previous = PREVIOUS_RELEASE,
    );
    std::fs::write(&path, script).expect("Failed to write fake git-cliff");
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
        .expect("Failed to make fake git-cliff executable");
    path
}

/// Write a stand-in for git-cliff that always fails with `stderr`.
#[cfg(unix)]
pub fn failing_cliff_script(dir: &Path, stderr: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("git-cliff");
    std::fs::write(&path, format!("#!/bin/sh\necho '{}' >&2\nexit 1\n", stderr))
        .expect("Failed to write fake git-cliff");
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
        .expect("Failed to make fake git-cliff executable");
    path
}
