//! Bitbucket Cloud provider (REST 2.0). Not iteration-based.

use reqwest::Client;
use serde::Deserialize;

use crate::diff::parse_diff;
use crate::errors::VcsResult;
use crate::types::{Diff, PostedComment, PullRequest, ReviewSubmission, Severity};

#[derive(Debug, Clone)]
pub struct BitbucketClient {
    http: Client,
    base_api: String,
    token: String,
}

#[derive(Deserialize)]
struct BitbucketPr {
    id: u64,
    title: String,
    links: BitbucketLinks,
    source: BitbucketBranchRef,
    destination: BitbucketBranchRef,
}

#[derive(Deserialize)]
struct BitbucketLinks {
    html: BitbucketHref,
}

#[derive(Deserialize)]
struct BitbucketHref {
    href: String,
}

#[derive(Deserialize)]
struct BitbucketBranchRef {
    branch: BitbucketBranchName,
}

#[derive(Deserialize)]
struct BitbucketBranchName {
    name: String,
}

impl BitbucketClient {
    pub fn new(http: Client, base_api: String, token: String) -> Self {
        Self { http, base_api, token }
    }

    fn pr_url(&self, repo: &str, id: u64, suffix: &str) -> String {
        format!("{}/repositories/{repo}/pullrequests/{id}{suffix}", self.base_api)
    }

    pub async fn get_pr(&self, repo: &str, id: u64) -> VcsResult<PullRequest> {
        let pr: BitbucketPr = self.http.get(self.pr_url(repo, id, "")).bearer_auth(&self.token).send().await?.error_for_status()?.json().await?;
        Ok(PullRequest {
            id: pr.id,
            title: pr.title,
            base_branch: pr.destination.branch.name,
            source_branch: pr.source.branch.name,
            web_url: pr.links.html.href,
        })
    }

    pub async fn get_diff(&self, repo: &str, id: u64) -> VcsResult<Diff> {
        let raw = self.http.get(self.pr_url(repo, id, "/diff")).bearer_auth(&self.token).send().await?.error_for_status()?.text().await?;
        Ok(parse_diff(&raw))
    }

    pub async fn add_inline_comment(&self, repo: &str, id: u64, path: &str, line: u32, body: &str, severity: Severity) -> VcsResult<()> {
        let url = self.pr_url(repo, id, "/comments");
        let tagged = format!("[{}] {body}", severity_label(severity));
        self.http
            .post(url)
            .bearer_auth(&self.token)
            .json(&serde_json::json!({
                "content": { "raw": tagged },
                "inline": { "to": line, "path": path },
            }))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    pub async fn submit_review(&self, repo: &str, id: u64, review: &ReviewSubmission) -> VcsResult<()> {
        for comment in &review.comments {
            self.add_inline_comment(repo, id, &comment.path, comment.line, &comment.body, comment.severity).await?;
        }
        let url = self.pr_url(repo, id, "/comments");
        self.http
            .post(url)
            .bearer_auth(&self.token)
            .json(&serde_json::json!({ "content": { "raw": review.summary } }))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    pub async fn get_pr_comments(&self, repo: &str, id: u64) -> VcsResult<Vec<PostedComment>> {
        let url = self.pr_url(repo, id, "/comments");
        let raw: serde_json::Value = self.http.get(url).bearer_auth(&self.token).send().await?.error_for_status()?.json().await?;
        Ok(raw
            .get("values")
            .and_then(|v| v.as_array())
            .into_iter()
            .flatten()
            .filter_map(|n| {
                let body = n.get("content")?.get("raw")?.as_str()?.to_string();
                Some(PostedComment { path: String::new(), line: 0, body, severity: Severity::Info })
            })
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
