//! Common test helper functions shared across test modules.
//!
//! This module provides reusable utilities for creating test fixtures and mock
//! objects, reducing code duplication across different test suites.
use secrecy::SecretString;
use std::{fs, path::Path};

use crate::{
    diff::installer::MockInstaller,
    forge::{
        config::RemoteConfig,
        request::{FileContent, PullRequest},
    },
};

/// Creates a test RemoteConfig with sensible defaults.
pub fn create_test_remote_config() -> RemoteConfig {
    RemoteConfig {
        host: "github.com".to_string(),
        scheme: "https".to_string(),
        owner: "test".to_string(),
        repo: "repo".to_string(),
        path: "test/repo".to_string(),
        token: SecretString::from("test-token".to_string()),
    }
}

/// Writes `(relative path, content)` pairs under `root`, creating parent
/// directories as needed.
pub fn write_files(root: &Path, files: &[(&str, &str)]) {
    for (rel, content) in files {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }
}

/// Creates a MockInstaller that "installs" `files` as the published package.
///
/// # Example
/// ```ignore
/// let installer = installer_with_files("sdk", &[("index.js", "x\n")]);
/// ```
pub fn installer_with_files(
    name: &str,
    files: &[(&str, &str)],
) -> MockInstaller {
    let expected = name.to_string();
    let files = files
        .iter()
        .map(|(p, c)| (p.to_string(), c.to_string()))
        .collect::<Vec<(String, String)>>();

    let mut installer = MockInstaller::new();
    installer
        .expect_install()
        .withf(move |name, _| name.to_string() == expected)
        .returning(move |name, dest| {
            let installed = dest.join("node_modules").join(name);
            let borrowed = files
                .iter()
                .map(|(p, c)| (p.as_str(), c.as_str()))
                .collect::<Vec<(&str, &str)>>();
            write_files(&installed, &borrowed);
            Ok(installed)
        });

    installer
}

/// Creates an open pre-release PullRequest.
pub fn create_test_pr(number: u64, title: &str, body: &str) -> PullRequest {
    PullRequest {
        number,
        title: title.to_string(),
        body: body.to_string(),
        head_branch: format!("release-sdk-{number}"),
    }
}

/// Creates the package.json FileContent returned by the forge.
pub fn create_test_manifest(folder: &str, version: &str) -> FileContent {
    FileContent {
        path: format!("packages/{folder}/package.json"),
        content: format!(
            "{{\n  \"name\": \"{folder}\",\n  \"version\": \"{version}\"\n}}\n"
        ),
        sha: "manifest-blob-sha".to_string(),
    }
}
