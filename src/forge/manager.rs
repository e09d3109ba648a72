//! Manager that wraps forge implementations
use log::*;

use crate::{
    Result,
    forge::{
        request::{
            CommentRequest, Commit, CreatePrRequest, CreateRefRequest,
            FileContent, GetFileContentRequest, PullRequest, PutFileRequest,
            UpdatePrRequest, UpdateRefRequest,
        },
        traits::Forge,
    },
};

/// Placeholder sha returned by suppressed commit operations.
pub const DRY_RUN_SHA: &str = "fff";

#[derive(Debug, Clone, Copy, Default)]
pub struct ForgeOptions {
    /// Log mutating calls instead of issuing them.
    pub dry_run: bool,
}

/// Passes reads straight through to the forge and suppresses every mutating
/// call when running in dry-run mode.
pub struct ForgeManager {
    forge: Box<dyn Forge>,
    options: ForgeOptions,
}

impl ForgeManager {
    pub fn new(forge: Box<dyn Forge>, options: ForgeOptions) -> Self {
        Self { forge, options }
    }

    pub fn dry_run(&self) -> bool {
        self.options.dry_run
    }

    pub async fn default_branch(&self) -> Result<String> {
        self.forge.default_branch().await
    }

    pub async fn branch_sha(&self, branch: &str) -> Result<String> {
        debug!("looking up head commit of branch: {branch}");
        self.forge.branch_sha(branch).await
    }

    pub async fn find_open_prs(
        &self,
        head_prefix: &str,
    ) -> Result<Vec<PullRequest>> {
        self.forge.find_open_prs(head_prefix).await
    }

    pub async fn get_pr(&self, pr_number: u64) -> Result<PullRequest> {
        self.forge.get_pr(pr_number).await
    }

    pub async fn get_file_content(
        &self,
        req: GetFileContentRequest,
    ) -> Result<Option<FileContent>> {
        self.forge.get_file_content(req).await
    }

    pub async fn create_pr(&self, req: CreatePrRequest) -> Result<PullRequest> {
        if self.options.dry_run {
            warn!("dry_run: would create PR: req: {:#?}", req);
            return Ok(PullRequest {
                number: 0,
                title: req.title,
                body: req.body,
                head_branch: req.head_branch,
            });
        }

        self.forge.create_pr(req).await
    }

    pub async fn update_pr(&self, req: UpdatePrRequest) -> Result<()> {
        if self.options.dry_run {
            warn!("dry_run: would update PR: req: {:#?}", req);
            return Ok(());
        }
        self.forge.update_pr(req).await
    }

    pub async fn comment_on_pr(&self, req: CommentRequest) -> Result<()> {
        if self.options.dry_run {
            warn!("dry_run: would comment on PR: req: {:#?}", req);
            return Ok(());
        }
        self.forge.comment_on_pr(req).await
    }

    pub async fn create_ref(&self, req: CreateRefRequest) -> Result<()> {
        if self.options.dry_run {
            warn!("dry_run: would create branch: req: {:#?}", req);
            return Ok(());
        }
        self.forge.create_ref(req).await
    }

    pub async fn update_ref(&self, req: UpdateRefRequest) -> Result<()> {
        if self.options.dry_run {
            warn!("dry_run: would move branch: req: {:#?}", req);
            return Ok(());
        }
        self.forge.update_ref(req).await
    }

    pub async fn delete_ref(&self, branch: &str) -> Result<()> {
        if self.options.dry_run {
            warn!("dry_run: would delete branch: {branch}");
            return Ok(());
        }
        self.forge.delete_ref(branch).await
    }

    pub async fn put_file(&self, req: PutFileRequest) -> Result<Commit> {
        if self.options.dry_run {
            warn!(
                "dry_run: would commit {} to {}: message: {}",
                req.path, req.branch, req.message
            );
            return Ok(Commit {
                sha: DRY_RUN_SHA.into(),
            });
        }
        self.forge.put_file(req).await
    }
}
