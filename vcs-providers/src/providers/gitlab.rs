//! GitLab provider (REST v4). Iteration-based: every new "version" of a
//! merge request's diff is numbered, which is what the Review Runner's
//! iteration gate compares against.

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;

use crate::diff::parse_diff;
use crate::errors::{ProviderError, VcsResult};
use crate::types::{Diff, PostedComment, PullRequest, ReviewSubmission, Severity};

#[derive(Debug, Clone)]
pub struct GitLabClient {
    http: Client,
    base_api: String,
    token: String,
}

#[derive(Deserialize)]
struct GitLabMr {
    iid: u64,
    title: String,
    web_url: String,
    source_branch: String,
    target_branch: String,
}

#[derive(Deserialize)]
struct GitLabVersion {
    id: u64,
    #[allow(dead_code)]
    created_at: DateTime<Utc>,
}

impl GitLabClient {
    pub fn new(http: Client, base_api: String, token: String) -> Self {
        Self { http, base_api, token }
    }

    fn project_url(&self, project: &str, suffix: &str) -> String {
        format!("{}/projects/{}/merge_requests/{}", self.base_api, urlencoding::encode(project), suffix)
    }

    pub async fn get_pr(&self, project: &str, iid: u64) -> VcsResult<PullRequest> {
        let url = self.project_url(project, &iid.to_string());
        let mr: GitLabMr = self.http.get(url).header("PRIVATE-TOKEN", &self.token).send().await?.error_for_status()?.json().await?;
        Ok(PullRequest {
            id: mr.iid,
            title: mr.title,
            base_branch: mr.target_branch,
            source_branch: mr.source_branch,
            web_url: mr.web_url,
        })
    }

    pub async fn get_diff(&self, project: &str, iid: u64, compare_to_iteration: Option<u64>) -> VcsResult<Diff> {
        let url = if let Some(since) = compare_to_iteration {
            format!("{}/raw_diffs?start_version={since}", self.project_url(project, &iid.to_string()))
        } else {
            format!("{}/raw_diffs", self.project_url(project, &iid.to_string()))
        };
        let raw = self.http.get(url).header("PRIVATE-TOKEN", &self.token).send().await?.error_for_status()?.text().await?;
        Ok(parse_diff(&raw))
    }

    pub async fn add_inline_comment(&self, project: &str, iid: u64, path: &str, line: u32, body: &str, severity: Severity) -> VcsResult<()> {
        let url = format!("{}/discussions", self.project_url(project, &iid.to_string()));
        let tagged = format!("[{}] {body}", severity_label(severity));
        let payload = serde_json::json!({
            "body": tagged,
            "position": {
                "position_type": "text",
                "new_path": path,
                "new_line": line,
            }
        });
        self.http
            .post(url)
            .header("PRIVATE-TOKEN", &self.token)
            .json(&payload)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    pub async fn submit_review(&self, project: &str, iid: u64, review: &ReviewSubmission) -> VcsResult<()> {
        for comment in &review.comments {
            self.add_inline_comment(project, iid, &comment.path, comment.line, &comment.body, comment.severity).await?;
        }

        let note_url = format!("{}/notes", self.project_url(project, &iid.to_string()));
        self.http
            .post(&note_url)
            .header("PRIVATE-TOKEN", &self.token)
            .json(&serde_json::json!({ "body": review.summary }))
            .send()
            .await?
            .error_for_status()?;

        match review.verdict {
            crate::types::Verdict::Approve => {
                let approve_url = format!("{}/approve", self.project_url(project, &iid.to_string()));
                let _ = self.http.post(approve_url).header("PRIVATE-TOKEN", &self.token).send().await;
            }
            crate::types::Verdict::RequestChanges | crate::types::Verdict::Comment => {}
        }
        Ok(())
    }

    pub async fn get_review_comments(&self, project: &str, iid: u64) -> VcsResult<Vec<PostedComment>> {
        self.get_pr_comments(project, iid).await
    }

    pub async fn get_pr_comments(&self, project: &str, iid: u64) -> VcsResult<Vec<PostedComment>> {
        let url = format!("{}/notes", self.project_url(project, &iid.to_string()));
        let notes: Vec<serde_json::Value> = self.http.get(url).header("PRIVATE-TOKEN", &self.token).send().await?.error_for_status()?.json().await?;
        Ok(notes
            .into_iter()
            .filter_map(|n| {
                let body = n.get("body")?.as_str()?.to_string();
                Some(PostedComment { path: String::new(), line: 0, body, severity: Severity::Info })
            })
            .collect())
    }

    pub async fn get_latest_iteration_id(&self, project: &str, iid: u64) -> VcsResult<u64> {
        let url = format!("{}/versions", self.project_url(project, &iid.to_string()));
        let versions: Vec<GitLabVersion> = self.http.get(url).header("PRIVATE-TOKEN", &self.token).send().await?.error_for_status()?.json().await?;
        versions.first().map(|v| v.id).ok_or_else(|| ProviderError::InvalidResponse("no MR versions".into()).into())
    }
}

fn severity_label(severity: Severity) -> &'static str {
    match severity {
        Severity::Info => "info",
        Severity::Warning => "warning",
        Severity::Error => "error",
    }
}
