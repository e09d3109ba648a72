//! Configuration loading for `prerelease.toml`.
//!
//! Every field is optional. A missing file is equivalent to an empty one.
use log::*;
use secrecy::SecretString;
use serde::{Deserialize, Deserializer};
use std::{fs, io::ErrorKind, path::Path};

use crate::{
    Result,
    diff::{DEFAULT_PACKAGES_DIR, installer::DEFAULT_NPM},
};

/// Default configuration filename.
pub const DEFAULT_CONFIG_FILE: &str = "prerelease.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)] // Use default for missing fields
pub struct Config {
    /// GitHub access token. Takes precedence over GITHUB_TOKEN.
    #[serde(deserialize_with = "deserialize_token")]
    pub token: Option<SecretString>,
    /// Repository url, e.g. https://github.com/owner/repo.
    pub repo: Option<String>,
    /// Directory holding one folder per package (default: "packages").
    pub packages_dir: String,
    /// Program used to install the published package (default: "npm").
    pub npm: String,
    /// Base branch for the pre-release PR. Defaults to the repository's
    /// default branch.
    pub base_branch: Option<String>,
    /// Tera template for the PR title.
    pub title_template: Option<String>,
    /// Tera template for the PR body.
    pub body_template: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            token: None,
            repo: None,
            packages_dir: DEFAULT_PACKAGES_DIR.to_string(),
            npm: DEFAULT_NPM.to_string(),
            base_branch: None,
            title_template: None,
            body_template: None,
        }
    }
}

impl Config {
    /// Load configuration from `path`, falling back to defaults when the
    /// file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(content) => {
                info!("using configuration file: {}", path.display());
                Self::parse(&content)
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(
                    "configuration file not found, using defaults: {}",
                    path.display()
                );
                Ok(Self::default())
            }
            Err(err) => Err(err.into()),
        }
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }
}

fn deserialize_token<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<SecretString>, D::Error>
where
    D: Deserializer<'de>,
{
    let token = Option::<String>::deserialize(deserializer)?;
    Ok(token.filter(|t| !t.is_empty()).map(SecretString::from))
}
