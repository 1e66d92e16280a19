use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct TriggerReviewRequest {
    pub platform: String,
    pub repo: String,
    pub pr: u64,
    pub base_branch: String,
    #[serde(default)]
    pub dry_run: bool,
    #[serde(default = "default_true")]
    pub incremental: bool,
    #[serde(default)]
    pub force_full: bool,
}

#[derive(Debug, Serialize)]
pub struct PostedCommentView {
    pub path: String,
    pub line: u64,
    pub body: String,
    pub severity: &'static str,
    pub confidence: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct ReviewOutcomeView {
    pub verdict: &'static str,
    pub comment_count: usize,
    pub review_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<Vec<PostedCommentView>>,
}

impl From<review_runner::ReviewOutcome> for ReviewOutcomeView {
    fn from(outcome: review_runner::ReviewOutcome) -> Self {
        Self {
            verdict: outcome.verdict.as_str(),
            comment_count: outcome.comment_count,
            review_id: outcome.review_id,
            comments: outcome.comments.map(|comments| {
                comments
                    .into_iter()
                    .map(|c| PostedCommentView { path: c.path, line: c.line, body: c.body, severity: c.severity.as_str(), confidence: c.confidence })
                    .collect()
            }),
        }
    }
}
