//! GitHub provider (REST v3). Not iteration-based: the runner executes
//! unconditionally on every qualifying event for this platform.

use reqwest::Client;
use serde::Deserialize;

use crate::diff::parse_diff;
use crate::errors::VcsResult;
use crate::types::{Diff, PostedComment, PullRequest, ReviewSubmission, Severity, Verdict};

#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: Client,
    base_api: String,
    token: String,
}

#[derive(Deserialize)]
struct GitHubPr {
    number: u64,
    title: String,
    html_url: String,
    base: GitHubRef,
    head: GitHubRef,
}

#[derive(Deserialize)]
struct GitHubRef {
    #[serde(rename = "ref")]
    reference: String,
}

impl GitHubClient {
    pub fn new(http: Client, base_api: String, token: String) -> Self {
        Self { http, base_api, token }
    }

    fn repo_url(&self, repo: &str, suffix: &str) -> String {
        format!("{}/repos/{repo}/pulls/{suffix}", self.base_api)
    }

    pub async fn get_pr(&self, repo: &str, number: u64) -> VcsResult<PullRequest> {
        let pr: GitHubPr = self
            .http
            .get(self.repo_url(repo, &number.to_string()))
            .bearer_auth(&self.token)
            .header("User-Agent", "review-orchestrator")
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(PullRequest {
            id: pr.number,
            title: pr.title,
            base_branch: pr.base.reference,
            source_branch: pr.head.reference,
            web_url: pr.html_url,
        })
    }

    pub async fn get_diff(&self, repo: &str, number: u64) -> VcsResult<Diff> {
        let raw = self
            .http
            .get(self.repo_url(repo, &number.to_string()))
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github.v3.diff")
            .header("User-Agent", "review-orchestrator")
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(parse_diff(&raw))
    }

    pub async fn add_inline_comment(&self, repo: &str, number: u64, path: &str, line: u32, body: &str, severity: Severity) -> VcsResult<()> {
        let url = format!("{}/repos/{repo}/pulls/{number}/comments", self.base_api);
        let tagged = format!("[{}] {body}", severity_label(severity));
        self.http
            .post(url)
            .bearer_auth(&self.token)
            .header("User-Agent", "review-orchestrator")
            .json(&serde_json::json!({ "body": tagged, "path": path, "line": line, "side": "RIGHT" }))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    pub async fn submit_review(&self, repo: &str, number: u64, review: &ReviewSubmission) -> VcsResult<()> {
        let url = format!("{}/repos/{repo}/pulls/{number}/reviews", self.base_api);
        let comments: Vec<_> = review
            .comments
            .iter()
            .map(|c| serde_json::json!({ "path": c.path, "line": c.line, "body": format!("[{}] {}", severity_label(c.severity), c.body) }))
            .collect();
        self.http
            .post(url)
            .bearer_auth(&self.token)
            .header("User-Agent", "review-orchestrator")
            .json(&serde_json::json!({
                "body": review.summary,
                "event": verdict_event(review.verdict),
                "comments": comments,
            }))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    pub async fn get_pr_comments(&self, repo: &str, number: u64) -> VcsResult<Vec<PostedComment>> {
        let url = format!("{}/repos/{repo}/issues/{number}/comments", self.base_api);
        let raw: Vec<serde_json::Value> = self
            .http
            .get(url)
            .bearer_auth(&self.token)
            .header("User-Agent", "review-orchestrator")
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(raw
            .into_iter()
            .filter_map(|n| Some(PostedComment { path: String::new(), line: 0, body: n.get("body")?.as_str()?.to_string(), severity: Severity::Info }))
            .collect())
    }
}

fn severity_label(severity: Severity) -> &'static str {
    match severity {
        Severity::Info => "info",
        Severity::Warning => "warning",
        Severity::Error => "error",
    }
}

fn verdict_event(verdict: Verdict) -> &'static str {
    match verdict {
        Verdict::Approve => "APPROVE",
        Verdict::RequestChanges => "REQUEST_CHANGES",
        Verdict::Comment => "COMMENT",
    }
}
