//! Lock files that record the project's own version.

use std::path::{Path, PathBuf};

use semver::Version;
use tracing::debug;

use crate::error::ManifestError;

use super::version_files::{
    VersionFile, VersionFileKind, parse_json, parse_toml, read_file, render_json,
};

/// Render the lock file belonging to `file` bumped to the new version.
///
/// Returns the lock file path and its new contents, or `None` when there is
/// no lock file or it does not record the project's version. Nothing is
/// written.
pub fn render_lock_file(
    file: &VersionFile,
    new_version: &Version,
) -> Result<Option<(PathBuf, String)>, ManifestError> {
    let Some(dir) = file.path.parent() else {
        return Ok(None);
    };

    match file.kind {
        VersionFileKind::CargoToml | VersionFileKind::CargoWorkspace => {
            let lock = dir.join("Cargo.lock");
            if !lock.exists() {
                return Ok(None);
            }
            let rendered = render_cargo_lock(&lock, file, new_version)?;
            Ok(rendered.map(|content| (lock, content)))
        }
        VersionFileKind::PackageJson => {
            let lock = dir.join("package-lock.json");
            if !lock.exists() {
                return Ok(None);
            }
            let content = render_package_lock(&lock, new_version)?;
            Ok(Some((lock, content)))
        }
        // Python lock files do not record the project's own version.
        VersionFileKind::PyprojectToml => Ok(None),
    }
}

/// Rewrite the workspace's own `[[package]]` entries in Cargo.lock.
///
/// Local packages have no `source`. For a plain package manifest the entry is
/// matched by name; for a workspace, every local entry still at the old
/// workspace version is bumped.
fn render_cargo_lock(
    path: &Path,
    file: &VersionFile,
    new_version: &Version,
) -> Result<Option<String>, ManifestError> {
    let content = read_file(path)?;
    let mut doc = parse_toml(path, &content)?;

    let old_version = file.current_version.to_string();
    let new_version = new_version.to_string();

    let Some(packages) = doc
        .get_mut("package")
        .and_then(|p| p.as_array_of_tables_mut())
    else {
        return Err(ManifestError::UpdateFailed {
            path: path.to_path_buf(),
            reason: "No [[package]] entries".into(),
        });
    };

    let mut updated = 0usize;
    for entry in packages.iter_mut() {
        if entry.contains_key("source") {
            continue;
        }

        let matches = match (&file.kind, &file.package_name) {
            (VersionFileKind::CargoToml, Some(name)) => {
                entry.get("name").and_then(|n| n.as_str()) == Some(name.as_str())
            }
            _ => entry.get("version").and_then(|v| v.as_str()) == Some(old_version.as_str()),
        };

        if matches {
            entry["version"] = toml_edit::value(new_version.as_str());
            updated += 1;
        }
    }

    debug!(path = %path.display(), entries = updated, "Matched Cargo.lock entries");

    Ok((updated > 0).then(|| doc.to_string()))
}

/// Rewrite the top-level version and the root `packages[""]` entry.
fn render_package_lock(path: &Path, new_version: &Version) -> Result<String, ManifestError> {
    let content = read_file(path)?;
    let mut json = parse_json(path, &content)?;

    let version = serde_json::Value::String(new_version.to_string());

    if let Some(top) = json.get_mut("version") {
        *top = version.clone();
    }

    if let Some(root) = json
        .get_mut("packages")
        .and_then(|p| p.get_mut(""))
        .and_then(|r| r.get_mut("version"))
    {
        *root = version;
    }

    render_json(path, &content, &json)
}
