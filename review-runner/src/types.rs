use retriever::RetrieverConfig;
use store::Verdict;

#[derive(Debug, Clone)]
pub struct ReviewRequest {
    pub repo_id: String,
    pub pr_number: i64,
    pub base_branch: String,
    pub platform: String,
    pub dry_run: bool,
    pub incremental_diff: bool,
    pub retrieval: RetrieverConfig,
    pub precision_threshold: f64,
}

#[derive(Debug, Clone)]
pub struct PostedCommentResult {
    pub path: String,
    pub line: u64,
    pub body: String,
    pub severity: store::Severity,
    pub confidence: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct ReviewOutcome {
    pub verdict: Verdict,
    pub comment_count: usize,
    pub review_id: String,
    /// Populated only for `dryRun` invocations.
    pub comments: Option<Vec<PostedCommentResult>>,
}

impl ReviewOutcome {
    pub fn skipped() -> Self {
        Self { verdict: Verdict::Comment, comment_count: 0, review_id: String::new(), comments: None }
    }
}
