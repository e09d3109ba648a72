//! Scoped temporary directory for installing the published package.
use log::*;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::Result;

const SANDBOX_PREFIX: &str = "prerelease-";

/// Temporary directory removed when the guard is dropped, on success and
/// failure paths alike. Removal errors are logged and otherwise ignored.
#[derive(Debug)]
pub struct Sandbox {
    path: PathBuf,
    dir: Option<TempDir>,
}

impl Sandbox {
    pub fn new() -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix(SANDBOX_PREFIX)
            .tempdir()?;

        let path = dir.path().to_path_buf();

        debug!("created sandbox: {}", path.display());

        Ok(Self {
            path,
            dir: Some(dir),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for Sandbox {
    fn drop(&mut self) {
        let Some(dir) = self.dir.take() else {
            return;
        };

        match dir.close() {
            Ok(()) => debug!("removed sandbox: {}", self.path.display()),
            Err(err) => warn!(
                "failed to remove sandbox {}: {err}",
                self.path.display()
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn removes_directory_on_drop() {
        let sandbox = Sandbox::new().unwrap();
        let path = sandbox.path().to_path_buf();
        fs::create_dir_all(path.join("node_modules/sdk")).unwrap();
        fs::write(path.join("node_modules/sdk/index.js"), "x").unwrap();

        assert!(path.exists());
        drop(sandbox);
        assert!(!path.exists());
    }

    #[test]
    fn drop_tolerates_directory_already_gone() {
        let sandbox = Sandbox::new().unwrap();
        fs::remove_dir_all(sandbox.path()).unwrap();
        drop(sandbox);
    }
}
