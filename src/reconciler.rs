//! Keeps a single pre-release pull request per package in sync with the
//! drift between the published package and its repository folder.
//!
//! Each run reads the current state (diff, pending PR, manifest), derives a
//! [`DiffState`], asks [`decide`] for an [`Action`] and then executes that
//! action as an explicit sequence of forge calls.

/// Pure decision table.
pub mod action;

/// Title and body rendering.
pub mod template;

use chrono::Utc;
use color_eyre::eyre::eyre;
use derive_builder::Builder;
use log::*;

use crate::{
    PrereleaseError, Result,
    diff::{DiffEngine, tree::MANIFEST_FILE, types::DiffResult},
    forge::{
        config::{is_pr_branch, pr_branch_prefix},
        manager::ForgeManager,
        request::{
            CommentRequest, CreatePrRequest, CreateRefRequest, FileContent,
            GetFileContentRequest, PrState, PullRequest, PutFileRequest,
            UpdatePrRequest, UpdateRefRequest,
        },
    },
    version::{PackageRelease, bump_version},
};

pub use action::{Action, DiffState, decide};
pub use template::{RenderedPr, TemplateContext, Templates};

/// What a reconciliation run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Nothing,
    Closed(PullRequest),
    Created(PullRequest),
    UpToDate(PullRequest),
    Rebased(PullRequest),
}

/// Everything needed to (re)build the release commit and PR.
#[derive(Debug, Clone)]
struct ReleasePlan {
    release: PackageRelease,
    base_branch: String,
    base_sha: String,
    manifest: FileContent,
    bumped_content: String,
    rendered: RenderedPr,
}

/// Builder parameters for constructing a Reconciler.
#[derive(Builder)]
#[builder(
    pattern = "owned",
    setter(into),
    build_fn(private, name = "_build")
)]
pub struct ReconcilerParams {
    forge: ForgeManager,
    diff_engine: DiffEngine,
    #[builder(default)]
    templates: Templates,
    /// Overrides the repository's default branch as the PR base.
    #[builder(default)]
    base_branch: Option<String>,
}

impl ReconcilerParamsBuilder {
    pub fn build(self) -> Result<Reconciler> {
        let params = self._build().map_err(|e| {
            PrereleaseError::configuration(format!(
                "Failed to build reconciler: {e}"
            ))
        })?;
        Ok(Reconciler::new(params))
    }
}

pub struct Reconciler {
    forge: ForgeManager,
    diff_engine: DiffEngine,
    templates: Templates,
    base_branch: Option<String>,
}

impl Reconciler {
    pub fn builder() -> ReconcilerParamsBuilder {
        ReconcilerParamsBuilder::default()
    }

    pub fn new(params: ReconcilerParams) -> Self {
        Self {
            forge: params.forge,
            diff_engine: params.diff_engine,
            templates: params.templates,
            base_branch: params.base_branch,
        }
    }

    /// Bring the pre-release PR for `name` (sourced from
    /// `packages/<folder>`) in line with the current diff.
    pub async fn reconcile(&self, name: &str, folder: &str) -> Result<Outcome> {
        info!("computing diff for {name} against {}", self.manifest_dir(folder));

        let diff = self.diff_engine.compute(name, folder).await?;

        if diff.is_empty() {
            info!("no differences found for {name}");
        } else {
            info!("diff for {name}:\n{}", diff.text());
        }

        let pending = self.find_pending_pr(name).await?;

        let plan = if diff.is_empty() {
            None
        } else {
            Some(self.prepare(name, folder, &diff).await?)
        };

        let state = match (&plan, &pending) {
            (None, _) => DiffState::Empty,
            (Some(plan), Some(pr))
                if pr.title == plan.rendered.title
                    && pr.body == plan.rendered.body =>
            {
                DiffState::Unchanged
            }
            _ => DiffState::Changed,
        };

        let action = decide(pending.is_some(), state);

        info!("{name}: {action}");

        self.execute(action, name, &diff, pending, plan).await
    }

    ////////////////////////////////////////////////////////////////////////////
    //// Private
    ////////////////////////////////////////////////////////////////////////////

    fn manifest_dir(&self, folder: &str) -> String {
        self.diff_engine.package_path(folder)
    }

    async fn find_pending_pr(&self, name: &str) -> Result<Option<PullRequest>> {
        let prefix = pr_branch_prefix(name);
        let mut open = self.forge.find_open_prs(&prefix).await?;

        open.retain(|pr| {
            let owned = is_pr_branch(&prefix, &pr.head_branch);
            if !owned {
                debug!(
                    "ignoring PR #{} with head {}: not a pre-release branch of {name}",
                    pr.number, pr.head_branch
                );
            }
            owned
        });

        if open.is_empty() {
            debug!("no open pre-release PR with head prefix {prefix}");
            return Ok(None);
        }

        open.sort_by_key(|pr| pr.number);

        // Highest number is the most recently opened
        let Some(latest) = open.pop() else {
            return Ok(None);
        };

        if !open.is_empty() {
            let others = open
                .iter()
                .map(|pr| format!("#{}", pr.number))
                .collect::<Vec<String>>()
                .join(", ");
            warn!(
                "found multiple open pre-release PRs for {name}: using #{}, ignoring {others}",
                latest.number
            );
        }

        info!("found pending PR #{} for {name}", latest.number);

        // The listing can be stale; re-read the PR for its current title/body
        let pr = self.forge.get_pr(latest.number).await?;

        Ok(Some(pr))
    }

    async fn prepare(
        &self,
        name: &str,
        folder: &str,
        diff: &DiffResult,
    ) -> Result<ReleasePlan> {
        let base_branch = match &self.base_branch {
            Some(branch) => branch.clone(),
            None => self.forge.default_branch().await?,
        };

        let base_sha = self.forge.branch_sha(&base_branch).await?;

        let path = format!("{}/{MANIFEST_FILE}", self.manifest_dir(folder));

        let manifest = self
            .forge
            .get_file_content(GetFileContentRequest {
                branch: Some(base_branch.clone()),
                path: path.clone(),
            })
            .await?
            .ok_or_else(|| {
                PrereleaseError::manifest(format!(
                    "{path} not found on branch {base_branch}"
                ))
            })?;

        let bumped = bump_version(&manifest.content)?;
        let release = PackageRelease::new(name, folder, &bumped);

        info!(
            "bumped {name} from {} to {}",
            release.current_version, release.bumped_version
        );

        let rendered_diff = diff.render();

        if rendered_diff.truncated {
            warn!("diff for {name} truncated in PR body, see log for the full diff");
        }

        let rendered = self.templates.render(&TemplateContext {
            name,
            version: release.current_version.to_string(),
            bumped_version: release.bumped_version.to_string(),
            published_version: &diff.published_version,
            diff: &rendered_diff.text,
            truncated: rendered_diff.truncated,
            commit_sha: &base_sha,
        })?;

        Ok(ReleasePlan {
            release,
            base_branch,
            base_sha,
            manifest,
            bumped_content: bumped.content,
            rendered,
        })
    }

    async fn execute(
        &self,
        action: Action,
        name: &str,
        diff: &DiffResult,
        pending: Option<PullRequest>,
        plan: Option<ReleasePlan>,
    ) -> Result<Outcome> {
        match (action, pending, plan) {
            (Action::Nothing, None, None) => Ok(Outcome::Nothing),
            (Action::Close, Some(pr), None) => {
                self.close(name, diff, pr).await.map(Outcome::Closed)
            }
            (Action::Create, None, Some(plan)) => {
                self.create(plan).await.map(Outcome::Created)
            }
            (Action::UpToDate, Some(pr), Some(_)) => Ok(Outcome::UpToDate(pr)),
            (Action::Rebase, Some(pr), Some(plan)) => {
                self.rebase(pr, plan).await.map(Outcome::Rebased)
            }
            (action, pending, plan) => Err(eyre!(
                "inconsistent reconciliation state: action: {action}, pending PR: {}, plan: {}",
                pending.is_some(),
                plan.is_some()
            )
            .into()),
        }
    }

    async fn close(
        &self,
        name: &str,
        diff: &DiffResult,
        pr: PullRequest,
    ) -> Result<PullRequest> {
        info!("closing PR #{}: {name} matches the published package", pr.number);

        self.forge
            .comment_on_pr(CommentRequest {
                pr_number: pr.number,
                body: format!(
                    "Closing: `{name}` in the repository now matches the published version `{}`, there is nothing left to release.",
                    diff.published_version
                ),
            })
            .await?;

        self.forge
            .update_pr(UpdatePrRequest {
                pr_number: pr.number,
                state: Some(PrState::Closed),
                ..Default::default()
            })
            .await?;

        Ok(pr)
    }

    async fn create(&self, plan: ReleasePlan) -> Result<PullRequest> {
        let branch = new_branch_name(&plan.release.name);

        info!("creating branch {branch} at {}", plan.base_sha);

        self.forge
            .create_ref(CreateRefRequest {
                branch: branch.clone(),
                sha: plan.base_sha.clone(),
            })
            .await?;

        self.commit_manifest(&branch, &plan).await?;

        let pr = self
            .forge
            .create_pr(CreatePrRequest {
                head_branch: branch,
                base_branch: plan.base_branch.clone(),
                title: plan.rendered.title.clone(),
                body: plan.rendered.body.clone(),
            })
            .await?;

        info!("opened PR #{}: {}", pr.number, pr.title);

        Ok(pr)
    }

    async fn rebase(
        &self,
        pr: PullRequest,
        plan: ReleasePlan,
    ) -> Result<PullRequest> {
        let scratch = new_branch_name(&plan.release.name);

        info!(
            "rebuilding release commit for PR #{} on scratch branch {scratch}",
            pr.number
        );

        self.forge
            .create_ref(CreateRefRequest {
                branch: scratch.clone(),
                sha: plan.base_sha.clone(),
            })
            .await?;

        let commit = self.commit_manifest(&scratch, &plan).await?;

        info!("moving {} to {commit}", pr.head_branch);

        self.forge
            .update_ref(UpdateRefRequest {
                branch: pr.head_branch.clone(),
                sha: commit,
                force: true,
            })
            .await?;

        self.forge.delete_ref(&scratch).await?;

        self.forge
            .update_pr(UpdatePrRequest {
                pr_number: pr.number,
                title: Some(plan.rendered.title.clone()),
                body: Some(plan.rendered.body.clone()),
                state: None,
            })
            .await?;

        info!("updated PR #{}", pr.number);

        Ok(PullRequest {
            title: plan.rendered.title,
            body: plan.rendered.body,
            ..pr
        })
    }

    /// Commit the bumped manifest to `branch`, returning the new commit sha.
    async fn commit_manifest(
        &self,
        branch: &str,
        plan: &ReleasePlan,
    ) -> Result<String> {
        let message = format!(
            "chore(release): {}@{}",
            plan.release.name, plan.release.bumped_version
        );

        let commit = self
            .forge
            .put_file(PutFileRequest {
                branch: branch.to_string(),
                path: plan.manifest.path.clone(),
                message,
                content: plan.bumped_content.clone(),
                sha: plan.manifest.sha.clone(),
            })
            .await?;

        info!("committed {} to {branch}: {}", plan.manifest.path, commit.sha);

        Ok(commit.sha)
    }
}

fn new_branch_name(name: &str) -> String {
    format!("{}{}", pr_branch_prefix(name), Utc::now().timestamp_millis())
}
