//! Structural diff between a published package and its repository folder.
//!
//! The published artifact is installed into a fresh [`sandbox::Sandbox`] so
//! the comparison reflects exactly what is live in the registry. The result
//! is normalized so that identical content always yields identical text,
//! which is what lets the reconciler detect "nothing changed" by comparing
//! pull request bodies.

/// Installing the published package.
pub mod installer;

/// Volatile detail removal.
pub mod normalize;

/// Temporary install directory guard.
pub mod sandbox;

/// File tree comparison.
pub mod tree;

/// Diff result and rendering.
pub mod types;

use log::*;
use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::{
    PrereleaseError, Result,
    diff::{
        installer::Installer,
        normalize::{PathLabels, normalize},
        sandbox::Sandbox,
        tree::MANIFEST_FILE,
        types::DiffResult,
    },
};

/// Default directory holding the generated packages.
pub const DEFAULT_PACKAGES_DIR: &str = "packages";

pub struct DiffEngine {
    repo_root: PathBuf,
    packages_dir: String,
    installer: Box<dyn Installer>,
}

impl DiffEngine {
    pub fn new(
        repo_root: impl Into<PathBuf>,
        packages_dir: impl Into<String>,
        installer: Box<dyn Installer>,
    ) -> Self {
        Self {
            repo_root: repo_root.into(),
            packages_dir: packages_dir.into(),
            installer,
        }
    }

    /// Repository-relative path of a package folder, e.g. `packages/sdk`.
    pub fn package_path(&self, folder: &str) -> String {
        format!("{}/{}", self.packages_dir.trim_end_matches('/'), folder)
    }

    /// Compare the published `name` with `packages/<folder>`.
    pub async fn compute(&self, name: &str, folder: &str) -> Result<DiffResult> {
        let package_path = self.package_path(folder);
        let repository = self.repo_root.join(&package_path);

        if !repository.is_dir() {
            return Err(PrereleaseError::configuration(format!(
                "package folder does not exist: {}",
                repository.display()
            )));
        }

        let sandbox = Sandbox::new()?;

        let published = self.installer.install(name, sandbox.path()).await?;
        let published_version = read_published_version(name, &published)?;

        info!("installed {name}@{published_version} for comparison");

        let comparison = tree::compare(&published, &repository)?;

        debug!("raw diff for {name}:\n{}", comparison.raw_diff);

        let content = normalize(
            &comparison.raw_diff,
            &PathLabels {
                sandbox: sandbox.path(),
                published: &published,
                repository: &repository,
                repository_label: &package_path,
            },
        );

        Ok(DiffResult {
            content,
            added_files: comparison.added_files,
            deleted_files: comparison.deleted_files,
            readme_changed: comparison.readme_changed,
            license_changed: comparison.license_changed,
            published_version,
        })
    }
}

fn read_published_version(name: &str, published: &Path) -> Result<String> {
    let path = published.join(MANIFEST_FILE);

    let content = std::fs::read_to_string(&path).map_err(|e| {
        PrereleaseError::install(
            name,
            format!("unable to read {}: {e}", path.display()),
        )
    })?;

    let doc: Value = serde_json::from_str(&content)?;

    doc.get("version")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| {
            PrereleaseError::install(name, "installed manifest has no version")
        })
}
