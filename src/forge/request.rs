use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Pull request as seen by the reconciler.
pub struct PullRequest {
    pub number: u64,
    pub title: String,
    pub body: String,
    /// Name of the head branch, without `refs/heads/`.
    pub head_branch: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrState {
    Open,
    Closed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Request to create a new pull request.
pub struct CreatePrRequest {
    pub head_branch: String,
    pub base_branch: String,
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
/// Request to update existing pull request. Fields left as `None` are not
/// sent.
pub struct UpdatePrRequest {
    pub pr_number: u64,
    pub title: Option<String>,
    pub body: Option<String>,
    pub state: Option<PrState>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Request to add a comment to a pull request.
pub struct CommentRequest {
    pub pr_number: u64,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Request to create a branch pointing at a commit.
pub struct CreateRefRequest {
    pub branch: String,
    pub sha: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Request to move an existing branch to a commit.
pub struct UpdateRefRequest {
    pub branch: String,
    pub sha: String,
    pub force: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Request to get file content, optionally from a specific branch.
pub struct GetFileContentRequest {
    pub branch: Option<String>,
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Decoded file content plus the blob sha needed to update it.
pub struct FileContent {
    pub path: String,
    pub content: String,
    pub sha: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Request to replace a file's content on a branch, producing one commit.
pub struct PutFileRequest {
    pub branch: String,
    pub path: String,
    pub message: String,
    /// Plain text content. Implementations encode it as the API requires.
    pub content: String,
    /// Blob sha of the content being replaced.
    pub sha: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Commit {
    pub sha: String,
}
