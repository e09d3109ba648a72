//! Patch-only version bumping for npm manifests.
//!
//! Every release produced by this tool is a patch release. Minor and major
//! bumps are left to a human after the pre-release PR is merged.
use semver::Version as SemVer;
use serde_json::{Value, json};

use crate::{PrereleaseError, Result};

/// Manifest content after the version bump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BumpedManifest {
    pub current: SemVer,
    pub bumped: SemVer,
    /// Manifest text with only `version` changed.
    pub content: String,
}

/// A package identified by name and repository folder, with its current and
/// next versions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageRelease {
    pub name: String,
    pub folder: String,
    pub current_version: SemVer,
    pub bumped_version: SemVer,
}

impl PackageRelease {
    pub fn new(name: &str, folder: &str, manifest: &BumpedManifest) -> Self {
        Self {
            name: name.to_string(),
            folder: folder.to_string(),
            current_version: manifest.current.clone(),
            bumped_version: manifest.bumped.clone(),
        }
    }
}

/// Parse a `MAJOR.MINOR.PATCH` version made of plain integers.
pub fn parse_version(raw: &str) -> Result<SemVer> {
    let parts = raw.split('.').collect::<Vec<&str>>();

    if parts.len() != 3 {
        return Err(PrereleaseError::manifest(format!(
            "expected MAJOR.MINOR.PATCH version but found: {raw}"
        )));
    }

    let mut numbers = [0u64; 3];

    for (idx, part) in parts.iter().enumerate() {
        numbers[idx] = part.parse::<u64>().map_err(|e| {
            PrereleaseError::manifest(format!(
                "invalid version component '{part}' in {raw}: {e}"
            ))
        })?;
    }

    Ok(SemVer::new(numbers[0], numbers[1], numbers[2]))
}

/// Increment the patch component, leaving major and minor untouched.
pub fn next_patch(version: &SemVer) -> Result<SemVer> {
    let patch = version.patch.checked_add(1).ok_or_else(|| {
        PrereleaseError::manifest(format!(
            "patch component of {version} cannot be incremented"
        ))
    })?;

    Ok(SemVer::new(version.major, version.minor, patch))
}

/// Rewrite a package.json document with its patch version incremented.
pub fn bump_version(manifest: &str) -> Result<BumpedManifest> {
    let mut doc: Value = serde_json::from_str(manifest)?;

    let raw = doc
        .get("version")
        .and_then(Value::as_str)
        .ok_or_else(|| {
            PrereleaseError::manifest("manifest has no string version field")
        })?;

    let current = parse_version(raw)?;
    let bumped = next_patch(&current)?;

    doc["version"] = json!(bumped.to_string());

    let mut content = serde_json::to_string_pretty(&doc)?;
    content.push('\n');

    Ok(BumpedManifest {
        current,
        bumped,
        content,
    })
}
