//! [`ProviderClient`] dispatches the VCS adapter interface to one of the
//! three platform clients by enum match rather than `dyn Trait` — the set
//! of providers is closed and known at compile time.

use reqwest::Client as HttpClient;

use crate::config::ProviderConfig;
use crate::errors::VcsResult;
use crate::providers::{bitbucket::BitbucketClient, github::GitHubClient, gitlab::GitLabClient};
use crate::types::{Diff, PostedComment, ProviderKind, PullRequest, ReviewSubmission, Severity};

pub enum ProviderClient {
    GitLab(GitLabClient),
    GitHub(GitHubClient),
    Bitbucket(BitbucketClient),
}

impl ProviderClient {
    pub fn new(config: &ProviderConfig) -> Self {
        let http = HttpClient::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .unwrap_or_default();

        match config.kind {
            ProviderKind::GitLab => ProviderClient::GitLab(GitLabClient::new(http, config.base_api.clone(), config.token.clone())),
            ProviderKind::GitHub => ProviderClient::GitHub(GitHubClient::new(http, config.base_api.clone(), config.token.clone())),
            ProviderKind::Bitbucket => ProviderClient::Bitbucket(BitbucketClient::new(http, config.base_api.clone(), config.token.clone())),
        }
    }

    pub fn kind(&self) -> ProviderKind {
        match self {
            ProviderClient::GitLab(_) => ProviderKind::GitLab,
            ProviderClient::GitHub(_) => ProviderKind::GitHub,
            ProviderClient::Bitbucket(_) => ProviderKind::Bitbucket,
        }
    }

    /// Only GitLab exposes MR "versions"; this is what the Review Runner's
    /// iteration gate keys off. Other platforms are not iteration-based.
    pub fn is_iteration_based(&self) -> bool {
        matches!(self, ProviderClient::GitLab(_))
    }

    pub async fn get_pr(&self, project: &str, id: u64) -> VcsResult<PullRequest> {
        match self {
            ProviderClient::GitLab(c) => c.get_pr(project, id).await,
            ProviderClient::GitHub(c) => c.get_pr(project, id).await,
            ProviderClient::Bitbucket(c) => c.get_pr(project, id).await,
        }
    }

    pub async fn get_diff(&self, project: &str, id: u64, compare_to_iteration: Option<u64>) -> VcsResult<Diff> {
        match self {
            ProviderClient::GitLab(c) => c.get_diff(project, id, compare_to_iteration).await,
            ProviderClient::GitHub(c) => c.get_diff(project, id).await,
            ProviderClient::Bitbucket(c) => c.get_diff(project, id).await,
        }
    }

    pub async fn add_inline_comment(&self, project: &str, id: u64, path: &str, line: u32, body: &str, severity: Severity) -> VcsResult<()> {
        match self {
            ProviderClient::GitLab(c) => c.add_inline_comment(project, id, path, line, body, severity).await,
            ProviderClient::GitHub(c) => c.add_inline_comment(project, id, path, line, body, severity).await,
            ProviderClient::Bitbucket(c) => c.add_inline_comment(project, id, path, line, body, severity).await,
        }
    }

    pub async fn submit_review(&self, project: &str, id: u64, review: &ReviewSubmission) -> VcsResult<()> {
        match self {
            ProviderClient::GitLab(c) => c.submit_review(project, id, review).await,
            ProviderClient::GitHub(c) => c.submit_review(project, id, review).await,
            ProviderClient::Bitbucket(c) => c.submit_review(project, id, review).await,
        }
    }

    pub async fn get_review_comments(&self, project: &str, id: u64) -> VcsResult<Vec<PostedComment>> {
        self.get_pr_comments(project, id).await
    }

    pub async fn get_pr_comments(&self, project: &str, id: u64) -> VcsResult<Vec<PostedComment>> {
        match self {
            ProviderClient::GitLab(c) => c.get_pr_comments(project, id).await,
            ProviderClient::GitHub(c) => c.get_pr_comments(project, id).await,
            ProviderClient::Bitbucket(c) => c.get_pr_comments(project, id).await,
        }
    }

    /// `None` for non-iteration-based platforms; the runner treats that as
    /// "always execute, never gate".
    pub async fn get_latest_iteration_id(&self, project: &str, id: u64) -> VcsResult<Option<u64>> {
        match self {
            ProviderClient::GitLab(c) => c.get_latest_iteration_id(project, id).await.map(Some),
            _ => Ok(None),
        }
    }
}
