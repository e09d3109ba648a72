//! Remote repository gateway used by the reconciler.
//!
//! Provides token-based authentication, pull request search and mutation,
//! branch ref management and file content read/write through a common trait.

/// Connection settings and naming constants for the remote repository.
pub mod config;

/// GitHub API client implementation for GitHub.com and Enterprise.
pub mod github;

/// Dry-run aware wrapper around a forge implementation.
pub mod manager;

/// Request and response types shared by all forge operations.
pub mod request;

/// Common trait for forge platform abstraction.
pub mod traits;
