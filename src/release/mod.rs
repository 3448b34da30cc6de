//! Release pipeline: compute the next version, bump manifests, regenerate the
//! changelog, then commit and tag.
//!
//! Every step is a gate. A failing step stops the pipeline and its error is
//! returned unchanged; nothing is retried or rolled back. If a step after the
//! manifest bump fails, the working tree keeps the edits made so far and must
//! be inspected (or reset) by hand.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::changelog::{ChangelogEngine, GitCliff};
use crate::config::Settings;
use crate::error::ReleaseError;
use crate::git::{SystemGit, VersionControl};
use crate::manifest::{ManifestEditor, ProjectManifest};
use crate::version::NextVersion;

/// The repository a release is prepared in.
#[derive(Debug, Clone)]
pub struct ReleaseContext {
    /// Working tree root.
    pub root: PathBuf,
    /// Changelog path, relative to `root` unless absolute.
    pub changelog: PathBuf,
}

impl ReleaseContext {
    pub fn new(root: impl Into<PathBuf>, changelog: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            changelog: changelog.into(),
        }
    }

    /// Absolute changelog path.
    pub fn changelog_path(&self) -> PathBuf {
        if self.changelog.is_absolute() {
            self.changelog.clone()
        } else {
            self.root.join(&self.changelog)
        }
    }
}

/// What a successful run produced.
#[derive(Debug, Clone)]
pub struct PreparedRelease {
    pub version: NextVersion,
    pub commit_message: String,
    /// Tag message: the new changelog section without the changelog header.
    pub release_notes: String,
    /// Files that went into the release commit.
    pub staged: Vec<PathBuf>,
}

/// Message of the release commit.
pub fn commit_message(version: &NextVersion) -> String {
    format!("chore(release): prepare for {}", version.tag())
}

/// Prepare a release in the repository containing `cwd`, using git-cliff,
/// the project manifests and the system git.
pub fn run(settings: &Settings, cwd: &Path) -> Result<PreparedRelease, ReleaseError> {
    let git = SystemGit::discover(cwd, settings.comment_char)?;
    let ctx = ReleaseContext::new(git.root(), &settings.changelog);

    let cliff = GitCliff::new(&settings.cliff_bin, &ctx.root);
    cliff
        .check_installed()
        .map_err(ReleaseError::VersionComputation)?;

    let manifest = ProjectManifest::new(&ctx.root);

    prepare_release(&ctx, &cliff, &manifest, &git)
}

/// Run the release pipeline against the given collaborators.
///
/// Steps:
/// 1. Ask the changelog engine for the next version
/// 2. Stop with `AlreadyReleased` if that tag exists (nothing is touched)
/// 3. Write the bare version into the manifest(s)
/// 4. Regenerate the changelog with the unreleased range tagged as the version
/// 5. Render the same range again, header stripped, as the release notes
/// 6. Stage manifests + changelog and commit
/// 7. Create the annotated tag with the release notes as its message
pub fn prepare_release<C, M, V>(
    ctx: &ReleaseContext,
    engine: &C,
    manifest: &M,
    vcs: &V,
) -> Result<PreparedRelease, ReleaseError>
where
    C: ChangelogEngine + ?Sized,
    M: ManifestEditor + ?Sized,
    V: VersionControl + ?Sized,
{
    // ── Step 1: Next version ──
    let raw = engine
        .bumped_version()
        .map_err(ReleaseError::VersionComputation)?;
    let version = NextVersion::parse(&raw).map_err(ReleaseError::VersionComputation)?;
    let tag = version.tag();
    info!(tag = %tag, "Computed next version");

    // ── Step 2: Duplicate guard ──
    if vcs.tag_exists(tag)? {
        return Err(ReleaseError::AlreadyReleased(tag.to_string()));
    }

    // ── Step 3: Manifest bump ──
    let mut staged = manifest.set_version(version.bare())?;
    println!("  [DONE] Set version to {}", version.bare());

    // ── Step 4: Changelog regeneration ──
    let changelog_path = ctx.changelog_path();
    engine
        .regenerate(tag, &changelog_path)
        .map_err(ReleaseError::ChangelogGeneration)?;
    println!("  [DONE] Regenerated {}", ctx.changelog.display());

    // ── Step 5: Release notes (same range + tag as step 4) ──
    let release_notes = engine
        .release_notes(tag)
        .map_err(ReleaseError::ChangelogGeneration)?;
    check_notes_match_changelog(&release_notes, &changelog_path);

    // ── Step 6: Stage & commit ──
    if !staged.contains(&changelog_path) {
        staged.push(changelog_path);
    }
    vcs.stage(&staged)?;

    let commit_message = commit_message(&version);
    vcs.commit(&commit_message)?;
    println!("  [DONE] Created commit: {}", commit_message);

    // ── Step 7: Tag ──
    vcs.create_annotated_tag(tag, &release_notes)?;
    println!("  [DONE] Created tag: {}", tag);

    info!(tag = %tag, files = staged.len(), "Release prepared");

    Ok(PreparedRelease {
        version,
        commit_message,
        release_notes,
        staged,
    })
}

/// Warn when the release notes are not part of the changelog just written.
///
/// The engine can add a footer to both renders, so a mismatch is reported
/// rather than treated as fatal.
fn check_notes_match_changelog(notes: &str, changelog_path: &Path) {
    let trimmed = notes.trim();
    match std::fs::read_to_string(changelog_path) {
        Ok(changelog) if changelog.contains(trimmed) => {}
        Ok(_) => warn!(
            path = %changelog_path.display(),
            "Release notes are not a verbatim part of the regenerated changelog"
        ),
        Err(e) => warn!(
            path = %changelog_path.display(),
            error = %e,
            "Could not read back the regenerated changelog"
        ),
    }
}
