//! Latest-value progress map (component C9). The Indexer calls `set` as it
//! walks a repo; the API's progress route polls `get` to drive an SSE
//! stream or a plain polling endpoint. There is no history, only the most
//! recent event per `(repoId, branch)`.

use std::collections::HashMap;
use std::sync::Arc;

use indexer::IndexProgress;
use tokio::sync::RwLock;

fn key(repo_id: &str, branch: &str) -> String {
    format!("{repo_id}:{branch}")
}

#[derive(Clone, Default)]
pub struct ProgressBus {
    latest: Arc<RwLock<HashMap<String, IndexProgress>>>,
}

impl ProgressBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set(&self, repo_id: &str, branch: &str, progress: IndexProgress) {
        self.latest.write().await.insert(key(repo_id, branch), progress);
    }

    pub async fn get(&self, repo_id: &str, branch: &str) -> Option<IndexProgress> {
        self.latest.read().await.get(&key(repo_id, branch)).cloned()
    }

    pub async fn clear(&self, repo_id: &str, branch: &str) {
        self.latest.write().await.remove(&key(repo_id, branch));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexer::{IndexProgress, IndexStep};

    #[tokio::test]
    async fn set_then_get_returns_latest_value_only() {
        let bus = ProgressBus::new();
        bus.set("r1", "main", IndexProgress::parsing("a.ts", 1, 10)).await;
        bus.set("r1", "main", IndexProgress::parsing("b.ts", 2, 10)).await;

        let latest = bus.get("r1", "main").await.unwrap();
        assert!(matches!(latest.step, IndexStep::Parsing));
        assert_eq!(latest.file.as_deref(), Some("b.ts"));
    }

    #[tokio::test]
    async fn unknown_key_returns_none() {
        let bus = ProgressBus::new();
        assert!(bus.get("missing", "main").await.is_none());
    }
}
