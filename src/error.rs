//! Error types for the pre-release reconciler.
//!
//! Every variant is fatal: a run either reconciles the pull request fully or
//! aborts and exits non-zero so that the calling automation can re-trigger it.

use thiserror::Error;

/// Main error type for pre-release operations.
#[derive(Error, Debug)]
pub enum PrereleaseError {
    // Configuration errors
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("Git URL parse error: {0}")]
    GitUrlError(#[from] git_url_parse::GitUrlParseError),

    // Sandbox install errors
    #[error("Failed to install published package {package}: {reason}")]
    Install { package: String, reason: String },

    // Forge errors
    #[error("Forge operation failed: {0}")]
    Gateway(String),

    #[error("API rate limit exceeded")]
    RateLimitExceeded,

    // Manifest errors
    #[error("Invalid manifest: {0}")]
    ManifestParse(String),

    #[error("Template rendering failed: {0}")]
    TemplateError(#[from] tera::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(#[from] toml::de::Error),

    #[error("JSON parse error: {0}")]
    JsonParseError(#[from] serde_json::Error),

    #[error("Directory walk failed: {0}")]
    WalkError(#[from] walkdir::Error),

    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] log::SetLoggerError),

    #[error(transparent)]
    Other(#[from] color_eyre::Report),
}

/// Result type alias using PrereleaseError
pub type Result<T> = std::result::Result<T, PrereleaseError>;

impl PrereleaseError {
    /// Create a configuration error
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create an install error for the given package
    pub fn install(package: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Install {
            package: package.into(),
            reason: reason.into(),
        }
    }

    /// Create a gateway error with context
    pub fn gateway(msg: impl Into<String>) -> Self {
        Self::Gateway(msg.into())
    }

    /// Create a manifest parse error
    pub fn manifest(msg: impl Into<String>) -> Self {
        Self::ManifestParse(msg.into())
    }
}

// Generic I/O failures are wrapped rather than given their own variant
impl From<std::io::Error> for PrereleaseError {
    fn from(err: std::io::Error) -> Self {
        Self::Other(color_eyre::Report::from(err))
    }
}

impl From<octocrab::Error> for PrereleaseError {
    fn from(err: octocrab::Error) -> Self {
        match &err {
            octocrab::Error::GitHub { source, .. }
                if source.message.contains("rate limit") =>
            {
                Self::RateLimitExceeded
            }
            _ => Self::Gateway(format!("GitHub API error: {}", err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_formats() {
        let err = PrereleaseError::gateway("API call failed");
        assert_eq!(err.to_string(), "Forge operation failed: API call failed");

        let err = PrereleaseError::configuration("missing token");
        assert_eq!(err.to_string(), "Invalid configuration: missing token");

        let err = PrereleaseError::install("left-pad", "E404");
        assert_eq!(
            err.to_string(),
            "Failed to install published package left-pad: E404"
        );
    }

    #[test]
    fn test_error_helpers() {
        let err = PrereleaseError::manifest("bad version");
        assert!(matches!(err, PrereleaseError::ManifestParse(_)));

        let err = PrereleaseError::install("pkg", "boom");
        assert!(matches!(err, PrereleaseError::Install { .. }));
    }

    #[test]
    fn test_from_conversions() {
        let json_err = serde_json::from_str::<serde_json::Value>("{");
        let err: PrereleaseError = json_err.unwrap_err().into();
        assert!(matches!(err, PrereleaseError::JsonParseError(_)));

        let io_err = std::io::Error::other("disk gone");
        let err: PrereleaseError = io_err.into();
        assert!(matches!(err, PrereleaseError::Other(_)));
    }
}
