//! Installs the currently published package into a sandbox.
use async_trait::async_trait;
use log::*;
#[cfg(test)]
use mockall::automock;
use std::path::{Path, PathBuf};
use tokio::process::Command;

use crate::{PrereleaseError, Result};

/// Default npm client binary.
pub const DEFAULT_NPM: &str = "npm";

#[cfg_attr(test, automock)]
#[async_trait]
pub trait Installer: Send + Sync {
    /// Install the latest published `name` under `dest` and return the
    /// directory holding the installed package.
    async fn install(&self, name: &str, dest: &Path) -> Result<PathBuf>;
}

/// Installs from the registry with the npm client, bypassing any local
/// checkout so the comparison reflects what is live.
pub struct NpmInstaller {
    program: String,
}

impl NpmInstaller {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for NpmInstaller {
    fn default() -> Self {
        Self::new(DEFAULT_NPM)
    }
}

#[async_trait]
impl Installer for NpmInstaller {
    async fn install(&self, name: &str, dest: &Path) -> Result<PathBuf> {
        let spec = format!("{name}@latest");

        info!(
            "installing published {spec} into {} with {}",
            dest.display(),
            self.program
        );

        let output = Command::new(&self.program)
            .arg("install")
            .arg(&spec)
            .arg("--prefix")
            .arg(dest)
            .args([
                "--no-save",
                "--no-package-lock",
                "--ignore-scripts",
                "--no-audit",
                "--no-fund",
            ])
            .output()
            .await
            .map_err(|e| {
                PrereleaseError::install(
                    name,
                    format!("failed to run {}: {e}", self.program),
                )
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PrereleaseError::install(name, stderr.trim()));
        }

        let installed = dest.join("node_modules").join(name);

        if !installed.is_dir() {
            return Err(PrereleaseError::install(
                name,
                format!(
                    "install succeeded but {} does not exist",
                    installed.display()
                ),
            ));
        }

        Ok(installed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn missing_program_is_an_install_error() {
        let tmp = TempDir::new().unwrap();
        let installer = NpmInstaller::new("definitely-not-a-real-npm-binary");

        let err = installer.install("sdk", tmp.path()).await.unwrap_err();

        assert!(matches!(err, PrereleaseError::Install { .. }));
    }
}
