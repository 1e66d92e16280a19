//! RAG step (spec §4.8 step 3): embed the leading slice of a diff and pull
//! the nearest accepted/rejected prior comments for this repo, to feed
//! back into the prompt as positive/negative examples.

use embedding_adapter::{cosine_similarity, EmbeddingAdapter};
use retriever::FeedbackExample;
use store::{FeedbackSignal, Store};

use crate::errors::RunnerResult;
use crate::feedback_link::strip_footer;

const DIFF_EMBED_BYTES: usize = 8 * 1024;
const ACCEPTED_LIMIT: usize = 5;
const REJECTED_LIMIT: usize = 3;

pub async fn lookup_prior_examples(store: &Store, embeddings: Option<&EmbeddingAdapter>, repo_id: &str, diff_text: &str) -> RunnerResult<(Vec<FeedbackExample>, Vec<FeedbackExample>)> {
    let Some(embeddings) = embeddings else {
        return Ok((Vec::new(), Vec::new()));
    };

    let truncated = truncate_bytes(diff_text, DIFF_EMBED_BYTES).to_string();
    let query = embeddings.embed(&[truncated]).await?.into_iter().next().unwrap_or_default();

    let accepted = store.load_comments_with_feedback(repo_id, FeedbackSignal::Accepted).await?;
    let rejected = store.load_comments_with_feedback(repo_id, FeedbackSignal::Rejected).await?;

    Ok((rank_and_take(accepted, &query, ACCEPTED_LIMIT), rank_and_take(rejected, &query, REJECTED_LIMIT)))
}

fn rank_and_take(rows: Vec<store::CommentRow>, query: &[f32], limit: usize) -> Vec<FeedbackExample> {
    let mut scored: Vec<(f32, store::CommentRow)> = rows.into_iter().filter_map(|c| c.embedding.clone().as_deref().map(|v| (cosine_similarity(query, v), c))).collect();
    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
    scored.into_iter().take(limit).map(|(_, c)| FeedbackExample { path: c.path, line: c.line, body: strip_footer(&c.body).to_string() }).collect()
}

fn truncate_bytes(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_bytes_respects_char_boundaries() {
        let s = "é".repeat(10);
        let truncated = truncate_bytes(&s, 5);
        assert!(truncated.len() <= 5);
        assert!(std::str::from_utf8(truncated.as_bytes()).is_ok());
    }
}
