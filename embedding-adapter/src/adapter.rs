//! Bulk embedding, per-symbol upsert, and cosine-neighbor search, scoped
//! by repo and backed by the store's embedding table. The provider (Ollama
//! or OpenAI) sits behind [`llm_service::LlmServiceProfiles`]; this crate
//! only ever talks to it through `embed`.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use llm_service::LlmServiceProfiles;
use store::Store;
use tracing::{debug, info};

use crate::errors::EmbedResult;
use crate::similarity::cosine_similarity;

/// Neighbor search hit: the symbol (or comment) id paired with cosine score.
#[derive(Debug, Clone, PartialEq)]
pub struct Neighbor {
    pub id: String,
    pub score: f32,
}

const DEFAULT_CONCURRENCY: usize = 8;

pub struct EmbeddingAdapter {
    llm: Arc<LlmServiceProfiles>,
    store: Arc<Store>,
    concurrency: usize,
}

impl EmbeddingAdapter {
    pub fn new(llm: Arc<LlmServiceProfiles>, store: Arc<Store>) -> Self {
        Self { llm, store, concurrency: DEFAULT_CONCURRENCY }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Embeds a batch of texts, order-preserving. A failure on any single
    /// text fails the whole batch — callers retry at the batch level.
    pub async fn embed(&self, texts: &[String]) -> EmbedResult<Vec<Vec<f32>>> {
        let results: Vec<EmbedResult<(usize, Vec<f32>)>> = stream::iter(texts.iter().enumerate())
            .map(|(i, text)| {
                let llm = Arc::clone(&self.llm);
                async move {
                    let v = llm.embed(text).await?;
                    Ok((i, v))
                }
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        let mut ordered: Vec<(usize, Vec<f32>)> = results.into_iter().collect::<EmbedResult<_>>()?;
        ordered.sort_by_key(|(i, _)| *i);
        Ok(ordered.into_iter().map(|(_, v)| v).collect())
    }

    /// Embeds one symbol's text and stores the vector, checking/recording
    /// the provider's dimension first.
    pub async fn upsert(&self, symbol_id: &str, repo_id: &str, branch: &str, text: &str) -> EmbedResult<()> {
        let vector = self.llm.embed(text).await?;
        self.store.ensure_embedding_dim(self.llm.embedding_dim_hint(), vector.len()).await?;
        self.store.upsert_embedding(symbol_id, repo_id, branch, &vector).await?;
        Ok(())
    }

    /// Embeds and upserts many (id, text) pairs in batches of `batch_size`,
    /// reporting progress via `on_batch` after each batch completes.
    pub async fn upsert_batch<F>(&self, repo_id: &str, branch: &str, items: &[(String, String)], batch_size: usize, mut on_batch: F) -> EmbedResult<()>
    where
        F: FnMut(usize, usize),
    {
        let batch_size = batch_size.max(1);
        let total = items.len();
        let mut done = 0;

        for chunk in items.chunks(batch_size) {
            let texts: Vec<String> = chunk.iter().map(|(_, t)| t.clone()).collect();
            let vectors = self.embed(&texts).await?;

            for ((id, _), vector) in chunk.iter().zip(vectors.into_iter()) {
                self.store.ensure_embedding_dim(self.llm.embedding_dim_hint(), vector.len()).await?;
                self.store.upsert_embedding(id, repo_id, branch, &vector).await?;
            }

            done += chunk.len();
            debug!(repo_id, done, total, "embedded batch");
            on_batch(done, total);
        }

        info!(repo_id, total, "embedding batch upsert complete");
        Ok(())
    }

    /// Cosine-neighbor search against every embedding stored for this repo,
    /// sorted descending, capped at `top_k`.
    pub async fn search(&self, query_vector: &[f32], repo_id: &str, branch: &str, top_k: usize) -> EmbedResult<Vec<Neighbor>> {
        let stored = self.store.load_embeddings(repo_id, branch).await?;
        let mut scored: Vec<Neighbor> = stored.into_iter().map(|(id, v)| Neighbor { id, score: cosine_similarity(query_vector, &v) }).collect();
        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);
        Ok(scored)
    }

    /// Embeds `text` then searches, collapsing the common "embed a query,
    /// find its neighbors" call into one step.
    pub async fn search_text(&self, text: &str, repo_id: &str, branch: &str, top_k: usize) -> EmbedResult<Vec<Neighbor>> {
        let query = self.llm.embed(text).await?;
        self.search(&query, repo_id, branch, top_k).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neighbor_equality_is_structural() {
        let a = Neighbor { id: "x".into(), score: 0.5 };
        let b = Neighbor { id: "x".into(), score: 0.5 };
        assert_eq!(a, b);
    }
}
