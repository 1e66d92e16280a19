//! Builds a [`ReviewContext`] from a unified diff and a symbol graph
//! (component C7): the changed symbols, their immediate blast radius in
//! the call graph, and — at `deep` depth — a semantically reranked set of
//! neighbors that the diff doesn't directly touch.

use std::collections::HashSet;

use embedding_adapter::{average, EmbeddingAdapter};
use symbol_graph::{Graph, Symbol};
use tracing::debug;
use vcs_providers::changed_file_paths;

use crate::errors::RetrieverResult;
use crate::types::{ReviewContext, RetrievalDepth, RetrieverConfig, SemanticNeighbor};

const SEMANTIC_CANDIDATE_MULTIPLIER: usize = 3;

pub async fn get_review_context(diff_text: &str, graph: &Graph, config: RetrieverConfig, embeddings: Option<&EmbeddingAdapter>, repo_id: &str, branch: &str) -> RetrieverResult<ReviewContext> {
    let changed_files = changed_file_paths(diff_text);

    let changed_symbols: Vec<Symbol> = graph.all_symbols().into_iter().filter(|s| changed_files.contains(&s.file_path)).cloned().collect();

    let changed_ids: HashSet<String> = changed_symbols.iter().map(|s| s.id.clone()).collect();
    let hops = config.depth.caller_hops();

    let mut callers = Vec::new();
    let mut callees = Vec::new();
    let mut seen_callers = HashSet::new();
    let mut seen_callees = HashSet::new();

    for symbol in &changed_symbols {
        for caller in graph.get_callers(&symbol.id, hops) {
            if !changed_ids.contains(&caller.id) && seen_callers.insert(caller.id.clone()) {
                callers.push(caller);
            }
        }
        for callee in graph.get_callees(&symbol.id, 1) {
            if !changed_ids.contains(&callee.id) && seen_callees.insert(callee.id.clone()) {
                callees.push(callee);
            }
        }
    }

    let semantic_neighbors = if config.depth == RetrievalDepth::Deep {
        match embeddings {
            Some(adapter) if !changed_symbols.is_empty() => {
                semantic_rerank(&changed_symbols, &changed_ids, &seen_callers, &seen_callees, graph, adapter, repo_id, branch, config.top_k).await?
            }
            _ => Vec::new(),
        }
    } else {
        Vec::new()
    };

    let blast_radius = if changed_ids.is_empty() { None } else { Some(graph.get_blast_radius(&changed_ids.iter().cloned().collect::<Vec<_>>())) };

    debug!(changed = changed_symbols.len(), callers = callers.len(), callees = callees.len(), semantic = semantic_neighbors.len(), "built review context");

    Ok(ReviewContext { changed_symbols, callers, callees, blast_radius, semantic_neighbors, prior_examples: None, rejected_examples: None })
}

#[allow(clippy::too_many_arguments)]
async fn semantic_rerank(
    changed_symbols: &[Symbol],
    changed_ids: &HashSet<String>,
    known_callers: &HashSet<String>,
    known_callees: &HashSet<String>,
    graph: &Graph,
    embeddings: &EmbeddingAdapter,
    repo_id: &str,
    branch: &str,
    top_k: usize,
) -> RetrieverResult<Vec<SemanticNeighbor>> {
    let texts: Vec<String> = changed_symbols.iter().map(symbol_embedding_text).collect();
    let vectors = embeddings.embed(&texts).await?;
    let query = average(&vectors);

    let candidates = embeddings.search(&query, repo_id, branch, top_k * SEMANTIC_CANDIDATE_MULTIPLIER).await?;

    let mut reranked = Vec::new();
    for candidate in candidates {
        if changed_ids.contains(&candidate.id) || known_callers.contains(&candidate.id) || known_callees.contains(&candidate.id) {
            continue;
        }
        let Some(symbol) = graph.get_symbol(&candidate.id) else { continue };

        let min_distance = min_graph_distance(graph, changed_ids, &candidate.id);
        let combined_score = candidate.score * (1.0 / (min_distance as f32 + 1.0));

        reranked.push(SemanticNeighbor { symbol: symbol.clone(), cosine: candidate.score, min_graph_distance: min_distance, combined_score });
    }

    reranked.sort_by(|a, b| b.combined_score.partial_cmp(&a.combined_score).unwrap_or(std::cmp::Ordering::Equal));
    reranked.truncate(top_k);
    Ok(reranked)
}

/// Minimum hop distance from `candidate_id` to any changed symbol, probed
/// at 1 and 2 hops via both caller and callee edges. Capped at 3 (the
/// spec's "otherwise unrelated" bucket) when nothing closer is found.
fn min_graph_distance(graph: &Graph, changed_ids: &HashSet<String>, candidate_id: &str) -> u32 {
    for hops in [1usize, 2] {
        let callers = graph.get_callers(candidate_id, hops);
        let callees = graph.get_callees(candidate_id, hops);
        if callers.iter().chain(callees.iter()).any(|s| changed_ids.contains(&s.id)) {
            return hops as u32;
        }
    }
    3
}

fn symbol_embedding_text(symbol: &Symbol) -> String {
    match &symbol.doc_comment {
        Some(doc) => format!("{}\n{}", symbol.signature, doc),
        None => symbol.signature.clone(),
    }
}
