//! Configuration for the remote repository connection.
use secrecy::SecretString;

/// Branch name prefix for pre-release PRs. The full prefix for a package is
/// `release-<package-slug>-`.
pub const DEFAULT_PR_BRANCH_PREFIX: &str = "release";

/// Remote repository connection configuration for authenticating and
/// interacting with the forge.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// Remote forge host (e.g., "github.com").
    pub host: String,
    /// URL scheme (http or https).
    pub scheme: String,
    /// Repository owner.
    pub owner: String,
    /// Repository name.
    pub repo: String,
    /// Full repository path.
    pub path: String,
    /// Access token for authentication.
    pub token: SecretString,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            host: "".to_string(),
            scheme: "".to_string(),
            owner: "".to_string(),
            repo: "".to_string(),
            path: "".to_string(),
            token: SecretString::from("".to_string()),
        }
    }
}

/// Branch-safe version of a package name. The scope keeps its own path
/// segment so `@scope/name` becomes `scope/name` and never collides with an
/// unscoped `scope-name`.
pub fn branch_slug(package_name: &str) -> String {
    package_name.trim_start_matches('@').to_string()
}

/// Head branch prefix identifying the pre-release PR of a package.
pub fn pr_branch_prefix(package_name: &str) -> String {
    format!("{DEFAULT_PR_BRANCH_PREFIX}-{}-", branch_slug(package_name))
}

/// Whether `branch` is `<prefix><unix millis>`. A bare prefix match would
/// also accept neighbours such as `release-sdk-core-...` for `sdk`.
pub fn is_pr_branch(prefix: &str, branch: &str) -> bool {
    branch.strip_prefix(prefix).is_some_and(|suffix| {
        !suffix.is_empty() && suffix.bytes().all(|b| b.is_ascii_digit())
    })
}
