//! The state machine that turns a webhook event into a posted (or
//! dry-run) review. This is the orchestration point every other crate in
//! the workspace ultimately feeds.
//!
//! The VCS adapter is passed in per call rather than held on the struct:
//! one process serves every configured platform, and which adapter
//! applies is a property of the incoming request, not of the runner.

use std::sync::Arc;

use embedding_adapter::EmbeddingAdapter;
use graph_cache::GraphCache;
use llm_service::LlmServiceProfiles;
use store::{CommentRow, ReviewRow, Store};
use tracing::info;
use uuid::Uuid;
use vcs_providers::{PostedComment, ProviderClient, ReviewSubmission};

use crate::convert::{severity_to_store, severity_to_vcs, verdict_to_store, verdict_to_vcs};
use crate::diff_validate::validate_against_diff;
use crate::errors::RunnerResult;
use crate::feedback_link::{mint, strip_footer, FeedbackLinkConfig};
use crate::iteration_gate::{self, GateDecision};
use crate::lock::PerPrLock;
use crate::precision::filter_by_confidence;
use crate::prompt::{build_review_prompt, render_diff_for_prompt};
use crate::rag::lookup_prior_examples;
use crate::types::{PostedCommentResult, ReviewOutcome, ReviewRequest};

pub struct ReviewRunner {
    store: Arc<Store>,
    graph_cache: Arc<GraphCache>,
    llm: Arc<LlmServiceProfiles>,
    embeddings: Option<Arc<EmbeddingAdapter>>,
    locks: PerPrLock,
    feedback_link: Option<FeedbackLinkConfig>,
}

impl ReviewRunner {
    pub fn new(store: Arc<Store>, graph_cache: Arc<GraphCache>, llm: Arc<LlmServiceProfiles>, embeddings: Option<Arc<EmbeddingAdapter>>, feedback_link: Option<FeedbackLinkConfig>) -> Self {
        Self { store, graph_cache, llm, embeddings, locks: PerPrLock::new(), feedback_link }
    }

    pub async fn execute(&self, request: ReviewRequest, vcs: &ProviderClient) -> RunnerResult<ReviewOutcome> {
        let gate = iteration_gate::evaluate(vcs, &self.store, &request.repo_id, request.pr_number, &request.platform, request.incremental_diff).await?;

        let compare_to_iteration = match gate {
            GateDecision::Skip => {
                info!(repo_id = %request.repo_id, pr_number = request.pr_number, "iteration already reviewed, skipping");
                return Ok(ReviewOutcome::skipped());
            }
            GateDecision::Proceed { compare_to_iteration } => compare_to_iteration,
        };

        let _guard = self.locks.acquire(&request.repo_id, request.pr_number).await;

        // Re-check under the lock: a concurrent webhook for the same PR
        // may have already advanced the iteration state while we waited.
        let gate = iteration_gate::evaluate(vcs, &self.store, &request.repo_id, request.pr_number, &request.platform, request.incremental_diff).await?;
        let compare_to_iteration = match gate {
            GateDecision::Skip => return Ok(ReviewOutcome::skipped()),
            GateDecision::Proceed { compare_to_iteration } => compare_to_iteration,
        };

        let outcome = self.run_review(&request, vcs, compare_to_iteration).await?;

        if !request.dry_run {
            if let Some(latest) = vcs.get_latest_iteration_id(&request.repo_id, request.pr_number as u64).await? {
                iteration_gate::record(&self.store, &request.repo_id, request.pr_number, &request.platform, latest).await?;
            }
        }

        Ok(outcome)
    }

    async fn run_review(&self, request: &ReviewRequest, vcs: &ProviderClient, compare_to_iteration: Option<u64>) -> RunnerResult<ReviewOutcome> {
        let diff = vcs.get_diff(&request.repo_id, request.pr_number as u64, compare_to_iteration).await?;
        if diff.files.is_empty() {
            return Ok(ReviewOutcome { verdict: store::Verdict::Comment, comment_count: 0, review_id: String::new(), comments: request.dry_run.then(Vec::new) });
        }

        let rendered_diff = render_diff_for_prompt(&diff, usize::MAX);

        let mut context = match self.graph_cache.get_repo(&request.repo_id, &request.base_branch).await {
            Some(entry) => {
                let graph = entry.graph.read().await;
                retriever::get_review_context(&rendered_diff, &graph, request.retrieval, self.embeddings.as_deref(), &request.repo_id, &request.base_branch).await?
            }
            // PR targets a branch we have never indexed: review with no
            // graph context rather than failing outright.
            None => retriever::ReviewContext::default(),
        };

        let (prior, rejected) = lookup_prior_examples(&self.store, self.embeddings.as_deref(), &request.repo_id, &rendered_diff).await?;
        context.prior_examples = Some(prior);
        context.rejected_examples = Some(rejected);

        let prompt = build_review_prompt(&diff, &context);
        let model_review = self.llm.generate_review(&prompt).await?;

        let kept = filter_by_confidence(model_review.comments, request.precision_threshold);
        let kept = validate_against_diff(kept, &diff);

        if request.dry_run {
            let comments = kept
                .into_iter()
                .map(|c| PostedCommentResult { path: c.path, line: c.line, body: c.body, severity: severity_to_store(c.severity), confidence: c.confidence })
                .collect();
            return Ok(ReviewOutcome { verdict: verdict_to_store(model_review.verdict), comment_count: 0, review_id: String::new(), comments: Some(comments) });
        }

        let review_id = Uuid::new_v4();
        self.store
            .save_review(&ReviewRow { review_id, repo_id: request.repo_id.clone(), pr_number: request.pr_number, verdict: verdict_to_store(model_review.verdict), comment_count: kept.len() as i64 })
            .await?;

        let mut posted_comments = Vec::with_capacity(kept.len());
        for comment in &kept {
            let (comment_id, body) = match &self.feedback_link {
                Some(config) => mint(config, &comment.body),
                None => (Uuid::new_v4(), comment.body.clone()),
            };

            let embedding = match &self.embeddings {
                Some(adapter) => adapter.embed(&[strip_footer(&body).to_string()]).await.ok().and_then(|mut v| v.pop()),
                None => None,
            };

            self.store
                .save_comment(&CommentRow {
                    id: comment_id,
                    review_id,
                    repo_id: request.repo_id.clone(),
                    pr_number: request.pr_number,
                    path: comment.path.clone(),
                    line: comment.line as i64,
                    body: body.clone(),
                    severity: severity_to_store(comment.severity),
                    confidence: comment.confidence,
                    embedding,
                })
                .await?;

            posted_comments.push(PostedComment { path: comment.path.clone(), line: comment.line as u32, body, severity: severity_to_vcs(comment.severity) });
        }

        vcs.submit_review(&request.repo_id, request.pr_number as u64, &ReviewSubmission { summary: model_review.summary, comments: posted_comments, verdict: verdict_to_vcs(model_review.verdict) })
            .await?;

        Ok(ReviewOutcome { verdict: verdict_to_store(model_review.verdict), comment_count: kept.len(), review_id: review_id.to_string(), comments: None })
    }
}
