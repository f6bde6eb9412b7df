//! Wire models for GitHub webhook payloads and REST responses.

use serde::Deserialize;

/// Repository coordinates used to address REST endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    /// Repository owner login.
    pub owner: String,
    /// Repository name.
    pub repo: String,
}

/// `pull_request` webhook event payload.
#[derive(Debug, Clone, Deserialize)]
pub struct PullRequestEvent {
    /// Event action, e.g. `opened` or `closed`.
    pub action: String,
    /// Pull request number.
    pub number: u64,
    /// Pull request details.
    pub pull_request: PullRequestInfo,
    /// Repository the event was delivered for.
    pub repository: RepositoryInfo,
}

/// Pull request details carried by the webhook payload.
#[derive(Debug, Clone, Deserialize)]
pub struct PullRequestInfo {
    /// Author account.
    pub user: Account,
    /// Pull request title.
    pub title: String,
    /// Labels currently applied.
    #[serde(default)]
    pub labels: Vec<Label>,
    /// Whether a `closed` event was a merge.
    #[serde(default)]
    pub merged: bool,
}

/// Account reference.
#[derive(Debug, Clone, Deserialize)]
pub struct Account {
    /// Account login.
    pub login: String,
}

/// Label applied to a pull request.
#[derive(Debug, Clone, Deserialize)]
pub struct Label {
    /// Label name.
    pub name: String,
}

/// Repository reference carried by the webhook payload.
#[derive(Debug, Clone, Deserialize)]
pub struct RepositoryInfo {
    /// Repository name.
    pub name: String,
    /// Repository owner.
    pub owner: Account,
    /// Trunk branch name as configured on the repository.
    pub default_branch: String,
}

impl RepositoryInfo {
    /// REST coordinates for this repository.
    #[must_use]
    pub fn repo_ref(&self) -> RepoRef {
        RepoRef {
            owner: self.owner.login.clone(),
            repo: self.name.clone(),
        }
    }
}

/// One entry of the pull request diff listing.
#[derive(Debug, Clone, Deserialize)]
pub struct PullRequestFile {
    /// Repository-relative path.
    pub filename: String,
    /// Change status string as reported by the API.
    pub status: String,
    /// Location of the file's content at the head revision.
    pub raw_url: String,
    /// Link to the rendered diff view.
    pub blob_url: String,
}
