//! Full and incremental indexing pipelines: walk a checked-out repository,
//! parse each file via the Parser Registry, and keep the in-memory graph
//! and the durable store in lockstep.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use embedding_adapter::EmbeddingAdapter;
use parser_registry::ParserRegistry;
use store::Store;
use symbol_graph::{Edge, Graph, Symbol};
use tracing::{debug, warn};

use crate::errors::IndexResult;
use crate::scan::scan_repo_files;
use crate::types::{IndexProgress, IndexStats};

const EMBED_BATCH_SIZE: usize = 32;

pub struct Indexer {
    store: Arc<Store>,
    parsers: Arc<ParserRegistry>,
    embeddings: Option<Arc<EmbeddingAdapter>>,
}

impl Indexer {
    pub fn new(store: Arc<Store>, parsers: Arc<ParserRegistry>, embeddings: Option<Arc<EmbeddingAdapter>>) -> Self {
        Self { store, parsers, embeddings }
    }

    /// Wipes existing `(repo_id, branch)` rows, walks `repo_path`, parses
    /// every accepted file, writes symbols/edges incrementally, then
    /// snapshots and (optionally) embeds.
    pub async fn full_index<F>(&self, repo_path: &Path, repo_id: &str, branch: &str, mut on_progress: F) -> IndexResult<IndexStats>
    where
        F: FnMut(IndexProgress) + Send,
    {
        let started = Instant::now();
        self.store.delete_all_for_branch(repo_id, branch).await?;
        self.store.register_branch(repo_id, branch).await?;

        let mut graph = Graph::new();
        let files = scan_repo_files(repo_path);
        let total = files.len();

        for (i, path) in files.iter().enumerate() {
            let rel = path.strip_prefix(repo_path).unwrap_or(path).to_string_lossy().to_string();
            on_progress(IndexProgress::parsing(&rel, i + 1, total));

            let content = match tokio::fs::read_to_string(path).await {
                Ok(c) => c,
                Err(e) => {
                    warn!(file = %rel, error = %e, "skipping unreadable file");
                    continue;
                }
            };

            match self.parsers.parse(&rel, &content, repo_id) {
                Ok(Some(parsed)) => {
                    self.apply_parse(&mut graph, repo_id, branch, &rel, parsed.symbols, parsed.edges).await?;
                }
                Ok(None) => {}
                Err(e) => {
                    warn!(file = %rel, error = %e, "skipping unparsable file");
                }
            }
        }

        let snapshot = graph.serialize()?;
        self.store.save_graph_snapshot(repo_id, branch, &serde_json::from_str(&snapshot)?).await?;

        if let Some(embeddings) = &self.embeddings {
            self.embed_all_symbols(&graph, repo_id, branch, embeddings, &mut on_progress).await?;
        }

        let stats = IndexStats { symbol_count: graph.len_symbols(), edge_count: graph.len_edges(), file_count: total, duration_ms: started.elapsed().as_millis() as u64 };
        on_progress(IndexProgress::done(stats.symbol_count, stats.edge_count, stats.duration_ms));
        Ok(stats)
    }

    /// Re-parses exactly the files listed in `changed_files`. Files that
    /// fail to read or parse are logged and skipped; the remainder still
    /// proceeds and a fresh snapshot is written at the end.
    pub async fn incremental_update(&self, graph: &mut Graph, repo_path: &Path, changed_files: &[String], repo_id: &str, branch: &str) -> IndexResult<()> {
        let mut new_symbol_ids = Vec::new();

        for rel in changed_files {
            graph.remove_file(rel);
            self.store.delete_by_file(rel, repo_id, branch).await?;

            let full_path = repo_path.join(rel);
            let content = match tokio::fs::read_to_string(&full_path).await {
                Ok(c) => c,
                Err(e) => {
                    warn!(file = rel, error = %e, "skipping unreadable file in incremental update");
                    continue;
                }
            };

            match self.parsers.parse(rel, &content, repo_id) {
                Ok(Some(parsed)) => {
                    new_symbol_ids.extend(parsed.symbols.iter().map(|s| s.id.clone()));
                    self.apply_parse(graph, repo_id, branch, rel, parsed.symbols, parsed.edges).await?;
                }
                Ok(None) => {}
                Err(e) => {
                    warn!(file = rel, error = %e, "skipping unparsable file in incremental update");
                }
            }
        }

        let snapshot = graph.serialize()?;
        self.store.save_graph_snapshot(repo_id, branch, &serde_json::from_str(&snapshot)?).await?;

        if let Some(embeddings) = &self.embeddings {
            let items: Vec<(String, String)> = new_symbol_ids
                .iter()
                .filter_map(|id| graph.get_symbol(id))
                .map(|s| (s.id.clone(), symbol_embedding_text(s)))
                .collect();
            if !items.is_empty() {
                embeddings.upsert_batch(repo_id, branch, &items, EMBED_BATCH_SIZE, |_, _| {}).await?;
            }
        }

        Ok(())
    }

    /// Prefers the serialized snapshot; falls back to rehydrating from
    /// row-level storage if no snapshot has been written yet. Mutates
    /// `graph` additively, tolerating duplicate adds from a non-empty
    /// starting graph.
    pub async fn load_from_storage(&self, graph: &mut Graph, repo_id: &str, branch: &str) -> IndexResult<()> {
        if let Some(json) = self.store.load_graph_snapshot(repo_id, branch).await? {
            let snapshot = serde_json::from_value(json)?;
            let loaded = Graph::from_snapshot(snapshot);
            graph.merge_from(&loaded);
            return Ok(());
        }

        debug!(repo_id, branch, "no snapshot found, rehydrating from row storage");
        let (symbols, edges) = self.store.load_all(repo_id, branch).await?;
        for symbol in symbols {
            graph.add_symbol(symbol);
        }
        for edge in edges {
            graph.add_edge(edge);
        }
        Ok(())
    }

    async fn apply_parse(&self, graph: &mut Graph, repo_id: &str, branch: &str, file: &str, symbols: Vec<Symbol>, edges: Vec<Edge>) -> IndexResult<()> {
        debug!(file, symbols = symbols.len(), edges = edges.len(), "applying parse result");
        self.store.save_symbols(&symbols, repo_id, branch).await?;
        self.store.save_edges(&edges, repo_id, branch).await?;
        for symbol in symbols {
            graph.add_symbol(symbol);
        }
        for edge in edges {
            graph.add_edge(edge);
        }
        Ok(())
    }

    async fn embed_all_symbols<F>(&self, graph: &Graph, repo_id: &str, branch: &str, embeddings: &EmbeddingAdapter, on_progress: &mut F) -> IndexResult<()>
    where
        F: FnMut(IndexProgress),
    {
        let items: Vec<(String, String)> = graph.all_symbols().into_iter().map(|s| (s.id.clone(), symbol_embedding_text(s))).collect();
        let total = items.len();
        embeddings
            .upsert_batch(repo_id, branch, &items, EMBED_BATCH_SIZE, |done, total| {
                on_progress(IndexProgress::embedding(done, total));
            })
            .await?;
        debug!(repo_id, total, "embedded all symbols");
        Ok(())
    }
}

fn symbol_embedding_text(symbol: &Symbol) -> String {
    match &symbol.doc_comment {
        Some(doc) => format!("{}\n{}", symbol.signature, doc),
        None => symbol.signature.clone(),
    }
}
