//! Version file detection and update across ecosystems.
//!
//! Supports Cargo.toml (package or workspace), package.json, and
//! pyproject.toml (PEP 621 + Poetry). Only the version value is touched;
//! comments, ordering and every other field survive the rewrite.

use std::path::{Path, PathBuf};

use semver::Version;

use serde::Serialize;

use crate::error::ManifestError;
use crate::fsutil::write_atomic;

/// The kind of version file detected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionFileKind {
    /// `[package].version`
    CargoToml,
    /// `[workspace.package].version`, inherited by members.
    CargoWorkspace,
    PackageJson,
    PyprojectToml,
}

impl std::fmt::Display for VersionFileKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VersionFileKind::CargoToml => write!(f, "Cargo.toml"),
            VersionFileKind::CargoWorkspace => write!(f, "Cargo.toml (workspace)"),
            VersionFileKind::PackageJson => write!(f, "package.json"),
            VersionFileKind::PyprojectToml => write!(f, "pyproject.toml"),
        }
    }
}

/// A detected version file with its current version.
#[derive(Debug, Clone)]
pub struct VersionFile {
    pub path: PathBuf,
    pub kind: VersionFileKind,
    pub current_version: Version,
    /// Package name, used to find the matching lock file entry.
    pub package_name: Option<String>,
}

/// Detect version files in the project root.
///
/// Checks for Cargo.toml, package.json, and pyproject.toml in order.
/// Returns all found files. Returns `ManifestError::NoVersionFiles` if none found.
pub fn detect_version_files(root: &Path) -> Result<Vec<VersionFile>, ManifestError> {
    let mut files = Vec::new();

    let cargo_path = root.join("Cargo.toml");
    if cargo_path.exists() {
        if let Some(file) = read_cargo_manifest(&cargo_path)? {
            files.push(file);
        }
    }

    let package_path = root.join("package.json");
    if package_path.exists() {
        if let Some(file) = read_package_json(&package_path)? {
            files.push(file);
        }
    }

    let pyproject_path = root.join("pyproject.toml");
    if pyproject_path.exists() {
        if let Some(file) = read_pyproject(&pyproject_path)? {
            files.push(file);
        }
    }

    if files.is_empty() {
        return Err(ManifestError::NoVersionFiles);
    }

    Ok(files)
}

/// Render the contents of a version file bumped to the new version.
///
/// Nothing is written; the caller persists the result.
pub fn render_version_file(
    file: &VersionFile,
    new_version: &Version,
) -> Result<String, ManifestError> {
    match file.kind {
        VersionFileKind::CargoToml => {
            render_toml_version(&file.path, new_version, &["package", "version"])
        }
        VersionFileKind::CargoWorkspace => {
            render_toml_version(&file.path, new_version, &["workspace", "package", "version"])
        }
        VersionFileKind::PackageJson => render_package_json(&file.path, new_version),
        VersionFileKind::PyprojectToml => render_pyproject_toml(&file.path, new_version),
    }
}

// --- Cargo.toml ---

fn read_cargo_manifest(path: &Path) -> Result<Option<VersionFile>, ManifestError> {
    let content = read_file(path)?;
    let doc = parse_toml(path, &content)?;

    // `version.workspace = true` is a table, not a string, and falls through
    // to the workspace lookup.
    let package = doc.get("package");
    if let Some(version) = package
        .and_then(|p| p.get("version"))
        .and_then(|v| v.as_str())
        .and_then(|s| Version::parse(s).ok())
    {
        let package_name = package
            .and_then(|p| p.get("name"))
            .and_then(|n| n.as_str())
            .map(String::from);
        return Ok(Some(VersionFile {
            path: path.to_path_buf(),
            kind: VersionFileKind::CargoToml,
            current_version: version,
            package_name,
        }));
    }

    let workspace_version = doc
        .get("workspace")
        .and_then(|w| w.get("package"))
        .and_then(|p| p.get("version"))
        .and_then(|v| v.as_str())
        .and_then(|s| Version::parse(s).ok());

    Ok(workspace_version.map(|version| VersionFile {
        path: path.to_path_buf(),
        kind: VersionFileKind::CargoWorkspace,
        current_version: version,
        package_name: None,
    }))
}

// --- package.json ---

fn read_package_json(path: &Path) -> Result<Option<VersionFile>, ManifestError> {
    let content = read_file(path)?;
    let json = parse_json(path, &content)?;

    let version = json
        .get("version")
        .and_then(|v| v.as_str())
        .and_then(|s| Version::parse(s).ok());

    Ok(version.map(|version| VersionFile {
        path: path.to_path_buf(),
        kind: VersionFileKind::PackageJson,
        current_version: version,
        package_name: json.get("name").and_then(|n| n.as_str()).map(String::from),
    }))
}

fn render_package_json(path: &Path, new_version: &Version) -> Result<String, ManifestError> {
    let content = read_file(path)?;
    let mut json = parse_json(path, &content)?;

    json["version"] = serde_json::Value::String(new_version.to_string());

    render_json(path, &content, &json)
}

// --- pyproject.toml ---

fn read_pyproject(path: &Path) -> Result<Option<VersionFile>, ManifestError> {
    let content = read_file(path)?;
    let doc = parse_toml(path, &content)?;

    // PEP 621: [project].version
    let version = doc
        .get("project")
        .and_then(|p| p.get("version"))
        .and_then(|v| v.as_str())
        // Poetry fallback: [tool.poetry].version
        .or_else(|| {
            doc.get("tool")
                .and_then(|t| t.get("poetry"))
                .and_then(|p| p.get("version"))
                .and_then(|v| v.as_str())
        })
        .and_then(|s| Version::parse(s).ok());

    Ok(version.map(|version| VersionFile {
        path: path.to_path_buf(),
        kind: VersionFileKind::PyprojectToml,
        current_version: version,
        package_name: None,
    }))
}

fn render_pyproject_toml(path: &Path, new_version: &Version) -> Result<String, ManifestError> {
    let content = read_file(path)?;
    let doc = parse_toml(path, &content)?;

    let key_path: &[&str] = if doc.get("project").and_then(|p| p.get("version")).is_some() {
        &["project", "version"]
    } else if doc
        .get("tool")
        .and_then(|t| t.get("poetry"))
        .and_then(|p| p.get("version"))
        .is_some()
    {
        &["tool", "poetry", "version"]
    } else {
        return Err(ManifestError::UpdateFailed {
            path: path.to_path_buf(),
            reason: "No version field found in [project] or [tool.poetry]".into(),
        });
    };

    render_toml_version(path, new_version, key_path)
}

// --- Shared helpers ---

/// Set the string at `keys` (tables then the final key) to `new_version`,
/// keeping the existing value's decoration.
fn render_toml_version(
    path: &Path,
    new_version: &Version,
    keys: &[&str],
) -> Result<String, ManifestError> {
    let content = read_file(path)?;
    let mut doc = parse_toml(path, &content)?;

    let Some((last, tables)) = keys.split_last() else {
        return Err(ManifestError::UpdateFailed {
            path: path.to_path_buf(),
            reason: "Unsupported key path".into(),
        });
    };

    let mut item = doc.as_item_mut();
    for table in tables {
        item = match item.get_mut(*table) {
            Some(next) => next,
            None => {
                return Err(ManifestError::UpdateFailed {
                    path: path.to_path_buf(),
                    reason: format!("Missing table [{}]", tables.join(".")),
                });
            }
        };
    }

    let Some(value) = item.get_mut(*last).and_then(|v| v.as_value_mut()) else {
        return Err(ManifestError::UpdateFailed {
            path: path.to_path_buf(),
            reason: format!("Missing key {}", keys.join(".")),
        });
    };

    let decor = value.decor().clone();
    *value = toml_edit::Value::from(new_version.to_string());
    *value.decor_mut() = decor;

    Ok(doc.to_string())
}

pub(crate) fn parse_toml(path: &Path, content: &str) -> Result<toml_edit::DocumentMut, ManifestError> {
    content
        .parse::<toml_edit::DocumentMut>()
        .map_err(|e| ManifestError::UpdateFailed {
            path: path.to_path_buf(),
            reason: format!("Invalid TOML: {}", e),
        })
}

pub(crate) fn parse_json(path: &Path, content: &str) -> Result<serde_json::Value, ManifestError> {
    serde_json::from_str(content).map_err(|e| ManifestError::UpdateFailed {
        path: path.to_path_buf(),
        reason: format!("Invalid JSON: {}", e),
    })
}

/// Serialize `json` pretty-printed with the indentation `original` uses.
pub(crate) fn render_json(
    path: &Path,
    original: &str,
    json: &serde_json::Value,
) -> Result<String, ManifestError> {
    let indent = detect_indent(original);
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(indent.as_bytes());
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    json.serialize(&mut ser)
        .map_err(|e| ManifestError::UpdateFailed {
            path: path.to_path_buf(),
            reason: format!("Failed to serialize JSON: {}", e),
        })?;

    let mut output = String::from_utf8(buf).map_err(|e| ManifestError::UpdateFailed {
        path: path.to_path_buf(),
        reason: format!("Failed to serialize JSON: {}", e),
    })?;
    // npm uses trailing newline
    if original.ends_with('\n') {
        output.push('\n');
    }
    Ok(output)
}

/// Leading whitespace of the first indented line, or two spaces.
fn detect_indent(content: &str) -> &str {
    content
        .lines()
        .skip(1)
        .map(|line| &line[..line.len() - line.trim_start().len()])
        .find(|indent| !indent.is_empty())
        .unwrap_or("  ")
}

pub(crate) fn read_file(path: &Path) -> Result<String, ManifestError> {
    std::fs::read_to_string(path).map_err(|e| ManifestError::UpdateFailed {
        path: path.to_path_buf(),
        reason: format!("Failed to read: {}", e),
    })
}

pub(crate) fn write_file(path: &Path, content: &str) -> Result<(), ManifestError> {
    write_atomic(path, content).map_err(|e| ManifestError::UpdateFailed {
        path: path.to_path_buf(),
        reason: format!("Failed to write: {}", e),
    })
}
