//! Process-wide `(repoId, branch) -> Graph` mirror (component C6).
//!
//! Not a write-through cache: the Indexer writes to the store and mutates
//! the cached graph directly. Readers may observe a graph mid-mutation;
//! that race is accepted here and resolved one layer up by the Review
//! Runner's per-PR lock.

use std::collections::HashMap;
use std::sync::Arc;

use indexer::Indexer;
use store::Store;
use symbol_graph::Graph;
use tokio::sync::RwLock;
use tracing::{info, warn};

#[derive(Clone)]
pub struct CacheEntry {
    pub graph: Arc<RwLock<Graph>>,
}

fn cache_key(repo_id: &str, branch: &str) -> String {
    format!("{repo_id}:{branch}")
}

pub struct GraphCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    store: Arc<Store>,
    indexer: Arc<Indexer>,
}

impl GraphCache {
    pub fn new(store: Arc<Store>, indexer: Arc<Indexer>) -> Self {
        Self { entries: RwLock::new(HashMap::new()), store, indexer }
    }

    /// Loads every `(repoId, branch)` pair registered in the store,
    /// concurrently. A single load failure is logged and does not abort
    /// the rest. If no branch has ever been registered (first-time
    /// deployment), this is a no-op — there is nothing yet to warm up.
    pub async fn warmup_all_repos(&self) -> usize {
        let pairs = match self.store.list_branches().await {
            Ok(pairs) => pairs,
            Err(e) => {
                warn!(error = %e, "failed to list branches during warmup");
                return 0;
            }
        };

        if pairs.is_empty() {
            info!("no registered branches found, skipping warmup");
            return 0;
        }

        let loads = pairs.into_iter().map(|(repo_id, branch)| {
            let this = self;
            async move {
                match this.get_or_load_repo(&repo_id, &branch).await {
                    Ok(_) => true,
                    Err(e) => {
                        warn!(repo_id, branch, error = %e, "failed to warm up repo, skipping");
                        false
                    }
                }
            }
        });

        let results = futures::future::join_all(loads).await;
        let loaded = results.into_iter().filter(|ok| *ok).count();
        info!(loaded, "graph cache warmup complete");
        loaded
    }

    pub async fn get_repo(&self, repo_id: &str, branch: &str) -> Option<CacheEntry> {
        self.entries.read().await.get(&cache_key(repo_id, branch)).cloned()
    }

    /// Returns the cached entry, loading from storage on miss.
    pub async fn get_or_load_repo(&self, repo_id: &str, branch: &str) -> indexer::IndexResult<CacheEntry> {
        if let Some(entry) = self.get_repo(repo_id, branch).await {
            return Ok(entry);
        }

        let mut graph = Graph::new();
        self.indexer.load_from_storage(&mut graph, repo_id, branch).await?;
        let entry = CacheEntry { graph: Arc::new(RwLock::new(graph)) };

        self.entries.write().await.insert(cache_key(repo_id, branch), entry.clone());
        Ok(entry)
    }

    /// With a branch, evicts that one entry. Without, evicts every entry
    /// for the repo regardless of branch.
    pub async fn evict_repo(&self, repo_id: &str, branch: Option<&str>) {
        let mut entries = self.entries.write().await;
        match branch {
            Some(branch) => {
                entries.remove(&cache_key(repo_id, branch));
            }
            None => {
                let prefix = format!("{repo_id}:");
                entries.retain(|key, _| !key.starts_with(&prefix));
            }
        }
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}
