//! GitHub collaborators for the review pipeline.
//!
//! Supplies the diff listing (ordered changed-file list with trunk-content
//! locations built structurally from repository coordinates), the
//! issue-comment report emitter, and the webhook payload models.

/// Crate-level error type.
pub mod error;
/// Webhook payload and REST wire models.
pub mod models;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::Serialize;
use tracing::debug;
use url::Url;

use vigil_review::{ChangeKind, ChangedFile, EmitError, ReportEmitter};

pub use error::{GithubError, GithubResult};
pub use models::{
    Account, Label, PullRequestEvent, PullRequestFile, PullRequestInfo, RepoRef, RepositoryInfo,
};

/// Webhook header naming the delivered event.
pub const HEADER_GITHUB_EVENT: &str = "x-github-event";

/// Endpoint configuration for the GitHub REST and raw-content hosts.
#[derive(Debug, Clone)]
pub struct GithubConfig {
    /// REST API base, e.g. `https://api.github.com/`.
    pub api_base: Url,
    /// Raw-content base, e.g. `https://raw.githubusercontent.com/`.
    pub raw_base: Url,
    /// Trunk branch treated as ground truth for prior ownership.
    pub trunk_branch: String,
    /// Bearer token for authenticated calls, if configured.
    pub token: Option<String>,
}

/// Client for the GitHub collaborator endpoints the reviewer consumes.
#[derive(Debug, Clone)]
pub struct GithubClient {
    client: Client,
    config: GithubConfig,
}

#[derive(Serialize)]
struct CommentBody<'a> {
    body: &'a str,
}

impl GithubClient {
    /// Construct a client from a shared HTTP client and endpoint config.
    #[must_use]
    pub const fn new(client: Client, config: GithubConfig) -> Self {
        Self { client, config }
    }

    /// List the pull request's changed files, in diff order.
    ///
    /// The trunk-content location of each entry is built from the repository
    /// coordinates and configured trunk branch rather than derived from the
    /// revision-scoped raw URL.
    ///
    /// # Errors
    ///
    /// Returns a [`GithubError`] on transport failure, a non-success status,
    /// or an undecodable listing.
    pub async fn list_changed_files(
        &self,
        repo: &RepoRef,
        number: u64,
    ) -> GithubResult<Vec<ChangedFile>> {
        let operation = "pulls.list_files";
        let url = self.endpoint(
            operation,
            &format!("repos/{}/{}/pulls/{number}/files", repo.owner, repo.repo),
        )?;

        let response = self
            .authorized(self.client.get(url.clone()))
            .send()
            .await
            .map_err(|source| GithubError::Transport {
                operation,
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(GithubError::Status {
                operation,
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let entries: Vec<PullRequestFile> = response
            .json()
            .await
            .map_err(|source| GithubError::Decode { operation, source })?;
        debug!(count = entries.len(), number, "listed changed files");

        entries
            .into_iter()
            .map(|entry| self.changed_file(repo, entry))
            .collect()
    }

    /// Post a comment on an issue or pull request.
    ///
    /// # Errors
    ///
    /// Returns a [`GithubError`] on transport failure or a non-success
    /// status.
    pub async fn post_comment(
        &self,
        repo: &RepoRef,
        issue_number: u64,
        body: &str,
    ) -> GithubResult<()> {
        let operation = "issues.create_comment";
        let url = self.endpoint(
            operation,
            &format!(
                "repos/{}/{}/issues/{issue_number}/comments",
                repo.owner, repo.repo
            ),
        )?;

        let response = self
            .authorized(self.client.post(url.clone()))
            .json(&CommentBody { body })
            .send()
            .await
            .map_err(|source| GithubError::Transport {
                operation,
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(GithubError::Status {
                operation,
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(())
    }

    /// Trunk-branch content location for a repository path.
    ///
    /// # Errors
    ///
    /// Returns a [`GithubError::InvalidUrl`] when the path cannot be joined
    /// onto the raw-content base.
    pub fn trunk_content_url(&self, repo: &RepoRef, path: &str) -> GithubResult<String> {
        let url = self
            .config
            .raw_base
            .join(&format!(
                "{}/{}/{}/{path}",
                repo.owner, repo.repo, self.config.trunk_branch
            ))
            .map_err(|source| GithubError::InvalidUrl {
                operation: "raw.trunk_url",
                source,
            })?;
        Ok(url.to_string())
    }

    fn changed_file(&self, repo: &RepoRef, entry: PullRequestFile) -> GithubResult<ChangedFile> {
        let trunk_url = self.trunk_content_url(repo, &entry.filename)?;
        let newly_tracked = matches!(entry.status.as_str(), "added" | "renamed");
        Ok(ChangedFile {
            kind: ChangeKind::from_status(&entry.status),
            path: entry.filename,
            raw_url: entry.raw_url,
            trunk_url,
            diff_url: entry.blob_url,
            newly_tracked,
        })
    }

    fn endpoint(&self, operation: &'static str, path: &str) -> GithubResult<Url> {
        self.config
            .api_base
            .join(path)
            .map_err(|source| GithubError::InvalidUrl { operation, source })
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.config.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

/// Report emitter that posts pipeline reports as issue comments.
pub struct IssueCommenter {
    github: GithubClient,
    repo: RepoRef,
}

impl IssueCommenter {
    /// Bind a GitHub client to a target repository.
    #[must_use]
    pub const fn new(github: GithubClient, repo: RepoRef) -> Self {
        Self { github, repo }
    }
}

#[async_trait]
impl ReportEmitter for IssueCommenter {
    async fn emit(&self, issue_number: u64, body: &str) -> Result<(), EmitError> {
        self.github
            .post_comment(&self.repo, issue_number, body)
            .await
            .map_err(EmitError::new)
    }
}
