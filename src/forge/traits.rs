//! Traits related to remote git forges
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::{
    Result,
    forge::request::{
        CommentRequest, Commit, CreatePrRequest, CreateRefRequest,
        FileContent, GetFileContentRequest, PullRequest, PutFileRequest,
        UpdatePrRequest, UpdateRefRequest,
    },
};

/// Operations the reconciler needs from the hosted repository. Every call is
/// awaited before the next one is issued and no call is retried.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Forge: Send + Sync {
    async fn default_branch(&self) -> Result<String>;
    async fn branch_sha(&self, branch: &str) -> Result<String>;
    /// Open pull requests whose head branch is `head_prefix` followed by a
    /// unix millisecond timestamp.
    async fn find_open_prs(&self, head_prefix: &str)
    -> Result<Vec<PullRequest>>;
    async fn get_pr(&self, pr_number: u64) -> Result<PullRequest>;
    async fn create_pr(&self, req: CreatePrRequest) -> Result<PullRequest>;
    async fn update_pr(&self, req: UpdatePrRequest) -> Result<()>;
    async fn comment_on_pr(&self, req: CommentRequest) -> Result<()>;
    async fn create_ref(&self, req: CreateRefRequest) -> Result<()>;
    async fn update_ref(&self, req: UpdateRefRequest) -> Result<()>;
    async fn delete_ref(&self, branch: &str) -> Result<()>;
    async fn get_file_content(
        &self,
        req: GetFileContentRequest,
    ) -> Result<Option<FileContent>>;
    async fn put_file(&self, req: PutFileRequest) -> Result<Commit>;
}
