//! Implements the Forge trait for Github
use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use log::*;
use octocrab::{
    Octocrab,
    models::{pulls::PullRequest as GithubPullRequest, repos::Object},
    params::{self, repos::Reference},
};
use reqwest::StatusCode;
use serde::Deserialize;

use crate::{
    PrereleaseError, Result,
    forge::{
        config::{RemoteConfig, is_pr_branch},
        request::{
            CommentRequest, Commit, CreatePrRequest, CreateRefRequest,
            FileContent, GetFileContentRequest, PrState, PullRequest,
            PutFileRequest, UpdatePrRequest, UpdateRefRequest,
        },
        traits::Forge,
    },
};

#[derive(Debug, Deserialize)]
struct FileCommitResponse {
    pub commit: Commit,
}

impl From<GithubPullRequest> for PullRequest {
    fn from(pr: GithubPullRequest) -> Self {
        Self {
            number: pr.number,
            title: pr.title.unwrap_or_default(),
            body: pr.body.unwrap_or_default(),
            head_branch: pr.head.ref_field,
        }
    }
}

/// GitHub forge implementation using Octocrab for pull request, ref and
/// content API interactions.
pub struct Github {
    config: RemoteConfig,
    base_uri: String,
    instance: Octocrab,
}

impl Github {
    /// Create GitHub client with personal access token authentication and API
    /// base URL configuration.
    pub fn new(config: RemoteConfig) -> Result<Self> {
        let base_uri = format!("{}://api.{}", config.scheme, config.host);
        let builder = Octocrab::builder()
            .personal_token(config.token.clone())
            .base_uri(base_uri.clone())?;
        let instance = builder.build()?;

        Ok(Self {
            config,
            base_uri,
            instance,
        })
    }

    fn ref_endpoint(&self, branch: &str) -> String {
        format!(
            "{}/repos/{}/{}/git/refs/heads/{}",
            self.base_uri, self.config.owner, self.config.repo, branch
        )
    }
}

#[async_trait]
impl Forge for Github {
    async fn default_branch(&self) -> Result<String> {
        let repo = self
            .instance
            .repos(&self.config.owner, &self.config.repo)
            .get()
            .await?;

        repo.default_branch.ok_or_else(|| {
            PrereleaseError::gateway(format!(
                "failed to find default branch for github repo: {}",
                self.config.path
            ))
        })
    }

    async fn branch_sha(&self, branch: &str) -> Result<String> {
        let branch_ref = self
            .instance
            .repos(&self.config.owner, &self.config.repo)
            .get_ref(&Reference::Branch(branch.to_string()))
            .await?;

        match branch_ref.object {
            Object::Commit { sha, .. } => Ok(sha),
            _ => Err(PrereleaseError::gateway(format!(
                "failed to find sha of branch: {branch}"
            ))),
        }
    }

    async fn find_open_prs(
        &self,
        head_prefix: &str,
    ) -> Result<Vec<PullRequest>> {
        let page = self
            .instance
            .pulls(&self.config.owner, &self.config.repo)
            .list()
            .state(params::State::Open)
            .per_page(100)
            .send()
            .await?;

        let prs = self.instance.all_pages(page).await?;

        debug!("found {} open prs in {}", prs.len(), self.config.path);

        Ok(prs
            .into_iter()
            .filter(|pr| is_pr_branch(head_prefix, &pr.head.ref_field))
            .map(PullRequest::from)
            .collect())
    }

    async fn get_pr(&self, pr_number: u64) -> Result<PullRequest> {
        let pr = self
            .instance
            .pulls(&self.config.owner, &self.config.repo)
            .get(pr_number)
            .await?;

        Ok(pr.into())
    }

    async fn create_pr(&self, req: CreatePrRequest) -> Result<PullRequest> {
        let pr = self
            .instance
            .pulls(&self.config.owner, &self.config.repo)
            .create(req.title, req.head_branch, req.base_branch)
            .body(req.body)
            .send()
            .await?;

        Ok(pr.into())
    }

    async fn update_pr(&self, req: UpdatePrRequest) -> Result<()> {
        let handler = self.instance.pulls(&self.config.owner, &self.config.repo);

        let mut builder = handler.update(req.pr_number);

        if let Some(title) = req.title {
            builder = builder.title(title);
        }

        if let Some(body) = req.body {
            builder = builder.body(body);
        }

        if let Some(state) = req.state {
            builder = builder.state(match state {
                PrState::Open => params::pulls::State::Open,
                PrState::Closed => params::pulls::State::Closed,
            });
        }

        builder.send().await?;

        Ok(())
    }

    async fn comment_on_pr(&self, req: CommentRequest) -> Result<()> {
        self.instance
            .issues(&self.config.owner, &self.config.repo)
            .create_comment(req.pr_number, req.body)
            .await?;

        Ok(())
    }

    async fn create_ref(&self, req: CreateRefRequest) -> Result<()> {
        info!("creating branch {} at {}", req.branch, req.sha);

        self.instance
            .repos(&self.config.owner, &self.config.repo)
            .create_ref(&Reference::Branch(req.branch), req.sha)
            .await?;

        Ok(())
    }

    async fn update_ref(&self, req: UpdateRefRequest) -> Result<()> {
        let endpoint = self.ref_endpoint(&req.branch);

        let _: serde_json::Value = self
            .instance
            .patch(
                endpoint,
                Some(&serde_json::json!({
                  "sha": req.sha,
                  "force": req.force
                })),
            )
            .await?;

        Ok(())
    }

    async fn delete_ref(&self, branch: &str) -> Result<()> {
        self.instance
            .repos(&self.config.owner, &self.config.repo)
            .delete_ref(&Reference::Branch(branch.to_string()))
            .await?;

        Ok(())
    }

    async fn get_file_content(
        &self,
        req: GetFileContentRequest,
    ) -> Result<Option<FileContent>> {
        let handler = self.instance.repos(&self.config.owner, &self.config.repo);

        let mut builder = handler.get_content().path(&req.path);

        if let Some(branch) = &req.branch {
            builder = builder.r#ref(branch);
        }

        let result = builder.send().await;

        match result {
            Err(octocrab::Error::GitHub { source, .. })
                if source.status_code == StatusCode::NOT_FOUND =>
            {
                info!("no file found for path: {}", req.path);
                Ok(None)
            }
            Err(err) => {
                let msg = format!(
                    "encountered error getting file contents for path: {}: {err}",
                    req.path
                );
                error!("{msg}");
                Err(PrereleaseError::gateway(msg))
            }
            Ok(mut data) => {
                let items = data.take_items();

                let Some(item) = items.into_iter().next() else {
                    info!("no file found for path: {}", req.path);
                    return Ok(None);
                };

                let content = item.decoded_content().ok_or_else(|| {
                    PrereleaseError::gateway(format!(
                        "failed to decode file content for path: {}",
                        req.path
                    ))
                })?;

                Ok(Some(FileContent {
                    path: req.path,
                    content,
                    sha: item.sha,
                }))
            }
        }
    }

    async fn put_file(&self, req: PutFileRequest) -> Result<Commit> {
        let endpoint = format!(
            "{}/repos/{}/{}/contents/{}",
            self.base_uri, self.config.owner, self.config.repo, req.path
        );

        let body = serde_json::json!({
          "message": req.message,
          "content": BASE64.encode(req.content.as_bytes()),
          "sha": req.sha,
          "branch": req.branch,
        });

        let response: FileCommitResponse =
            self.instance.put(endpoint, Some(&body)).await?;

        info!(
            "committed {} to {}: sha: {}",
            req.path, req.branch, response.commit.sha
        );

        Ok(response.commit)
    }
}
