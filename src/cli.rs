//! CLI argument parsing and GitHub remote resolution.
use clap::Parser;
use git_url_parse::GitUrl;
use secrecy::{ExposeSecret, SecretString};
use std::{env, path::PathBuf};

use crate::{
    PrereleaseError, Result,
    config::{Config, DEFAULT_CONFIG_FILE},
    forge::config::RemoteConfig,
};

/// Package reconciled when none is given on the command line.
pub const DEFAULT_PACKAGE_NAME: &str = "sdk";

/// Host assumed for `owner/repo` values taken from GITHUB_REPOSITORY.
pub const DEFAULT_GITHUB_HOST: &str = "github.com";

/// Keeps one pre-release pull request per npm package in sync with what
/// changed since the last publish.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Published npm package name.
    #[arg(default_value = DEFAULT_PACKAGE_NAME)]
    pub name: String,

    /// Package folder under the packages directory. Defaults to the package
    /// name without its npm scope.
    pub folder: Option<String>,

    #[arg(long, default_value = "")]
    /// GitHub repository URL (https://github.com/owner/repo). Falls back to
    /// the config file, then GITHUB_REPOSITORY.
    pub github_repo: String,

    #[arg(long, default_value = "")]
    /// GitHub personal access token. Falls back to the config file, then
    /// GITHUB_TOKEN.
    pub github_token: String,

    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    /// Path to the configuration file.
    pub config: PathBuf,

    #[arg(long, default_value = ".")]
    /// Root of the local repository checkout.
    pub repo_root: PathBuf,

    #[arg(long, default_value_t = false)]
    /// Log every mutating call instead of performing it.
    pub dry_run: bool,

    #[arg(long, default_value_t = false)]
    /// Enable debug logging.
    pub debug: bool,
}

impl Args {
    /// Package folder, derived from the name when not given.
    pub fn folder(&self) -> String {
        match &self.folder {
            Some(folder) => folder.clone(),
            None => default_folder(&self.name),
        }
    }

    /// Configure remote repository connection from CLI arguments, the config
    /// file and the environment, in that order.
    pub fn get_remote(&self, config: &Config) -> Result<RemoteConfig> {
        let repo = self.resolve_repo(config)?;
        let parsed = GitUrl::parse(&repo)?;

        validate_scheme(parsed.scheme)?;

        let mut token = self.github_token.clone();

        if token.is_empty()
            && let Some(config_token) = config.token.as_ref()
        {
            token = config_token.expose_secret().to_string();
        }

        if token.is_empty()
            && let Some(parsed_token) = parsed.token
        {
            token = parsed_token;
        }

        if token.is_empty()
            && let Ok(env_var_token) = env::var("GITHUB_TOKEN")
        {
            token = env_var_token;
        }

        if token.is_empty() {
            return Err(PrereleaseError::configuration(
                "must set github token: use --github-token, the config file or GITHUB_TOKEN",
            ));
        }

        let host = parsed.host.ok_or_else(|| {
            PrereleaseError::configuration(
                "unable to parse host from github repo",
            )
        })?;

        let owner = parsed.owner.ok_or_else(|| {
            PrereleaseError::configuration(
                "unable to parse owner from github repo",
            )
        })?;

        let path = parsed
            .path
            .strip_prefix("/")
            .unwrap_or(parsed.path.as_str())
            .trim_end_matches(".git")
            .to_string();

        Ok(RemoteConfig {
            host,
            scheme: parsed.scheme.to_string(),
            owner,
            repo: parsed.name,
            path,
            token: SecretString::from(token),
        })
    }

    fn resolve_repo(&self, config: &Config) -> Result<String> {
        if !self.github_repo.is_empty() {
            return Ok(self.github_repo.clone());
        }

        if let Some(repo) = config.repo.as_ref().filter(|r| !r.is_empty()) {
            return Ok(repo.clone());
        }

        if let Ok(slug) = env::var("GITHUB_REPOSITORY")
            && !slug.is_empty()
        {
            return Ok(format!("https://{DEFAULT_GITHUB_HOST}/{slug}"));
        }

        Err(PrereleaseError::configuration(
            "must configure a repository: use --github-repo, the config file or GITHUB_REPOSITORY",
        ))
    }
}

/// `@scope/name` and `name` both map to the folder `name`.
pub fn default_folder(package_name: &str) -> String {
    package_name
        .rsplit('/')
        .next()
        .unwrap_or(package_name)
        .to_string()
}

/// Validate repository URL uses HTTP or HTTPS scheme.
fn validate_scheme(scheme: git_url_parse::Scheme) -> Result<()> {
    match scheme {
        git_url_parse::Scheme::Http => Ok(()),
        git_url_parse::Scheme::Https => Ok(()),
        _ => Err(PrereleaseError::configuration(
            "only http and https schemes are supported for repo urls",
        )),
    }
}
