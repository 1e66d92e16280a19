use serde::{Deserialize, Serialize};
use symbol_graph::{BlastRadius, Symbol};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetrievalDepth {
    Fast,
    Standard,
    Deep,
}

impl RetrievalDepth {
    /// Caller BFS hop count: `fast` stays at 1 hop, everything else goes
    /// to 2.
    pub fn caller_hops(self) -> usize {
        match self {
            RetrievalDepth::Fast => 1,
            RetrievalDepth::Standard | RetrievalDepth::Deep => 2,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RetrieverConfig {
    pub depth: RetrievalDepth,
    pub top_k: usize,
}

impl Default for RetrieverConfig {
    fn default() -> Self {
        Self { depth: RetrievalDepth::Standard, top_k: 10 }
    }
}

/// A semantic neighbor surfaced by the deep-retrieval rerank, kept
/// alongside the score that produced its rank.
#[derive(Debug, Clone)]
pub struct SemanticNeighbor {
    pub symbol: Symbol,
    pub cosine: f32,
    pub min_graph_distance: u32,
    pub combined_score: f32,
}

/// An example comment pulled from prior review history via the Review
/// Runner's RAG step; `priorExamples`/`rejectedExamples` in the spec.
#[derive(Debug, Clone)]
pub struct FeedbackExample {
    pub path: String,
    pub line: i64,
    pub body: String,
}

#[derive(Debug, Clone, Default)]
pub struct ReviewContext {
    pub changed_symbols: Vec<Symbol>,
    pub callers: Vec<Symbol>,
    pub callees: Vec<Symbol>,
    pub blast_radius: Option<BlastRadius>,
    pub semantic_neighbors: Vec<SemanticNeighbor>,
    pub prior_examples: Option<Vec<FeedbackExample>>,
    pub rejected_examples: Option<Vec<FeedbackExample>>,
}
