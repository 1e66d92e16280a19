//! Per-`(repoId, prNumber)` serialization. New arrivals for the same key
//! block on the same async mutex; whichever holder drops the guard last
//! and finds no other `Arc` reference outstanding removes the map entry so
//! the map doesn't grow unbounded across a long-running process.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};

use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Default)]
pub struct PerPrLock {
    entries: StdMutex<HashMap<String, Arc<Mutex<()>>>>,
}

fn key(repo_id: &str, pr_number: i64) -> String {
    format!("{repo_id}:{pr_number}")
}

impl PerPrLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquires the lock for `(repo_id, pr_number)`, blocking until any
    /// in-flight review for the same PR completes.
    pub async fn acquire(&self, repo_id: &str, pr_number: i64) -> PrLockGuard<'_> {
        let key = key(repo_id, pr_number);
        let entry = {
            let mut entries = self.entries.lock().expect("pr lock map poisoned");
            entries.entry(key.clone()).or_insert_with(|| Arc::new(Mutex::new(()))).clone()
        };

        let guard = entry.clone().lock_owned().await;
        PrLockGuard { _guard: guard, entry, key, map: &self.entries }
    }
}

pub struct PrLockGuard<'a> {
    _guard: OwnedMutexGuard<()>,
    entry: Arc<Mutex<()>>,
    key: String,
    map: &'a StdMutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl Drop for PrLockGuard<'_> {
    fn drop(&mut self) {
        let mut entries = self.map.lock().expect("pr lock map poisoned");
        // 2 == this guard's clone + the map's own entry; if nothing else
        // is waiting, we're the tail and can reclaim the slot.
        if Arc::strong_count(&self.entry) <= 2 {
            entries.remove(&self.key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn same_pr_serializes_concurrent_acquires() {
        let lock = Arc::new(PerPrLock::new());
        let counter = Arc::new(AtomicUsize::new(0));
        let max_concurrent = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let lock = lock.clone();
            let counter = counter.clone();
            let max_concurrent = max_concurrent.clone();
            handles.push(tokio::spawn(async move {
                let _guard = lock.acquire("repo1", 42).await;
                let now = counter.fetch_add(1, Ordering::SeqCst) + 1;
                max_concurrent.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(std::time::Duration::from_millis(5)).await;
                counter.fetch_sub(1, Ordering::SeqCst);
            }));
        }

        for h in handles {
            h.await.unwrap();
        }

        assert_eq!(max_concurrent.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn different_prs_run_concurrently() {
        let lock = Arc::new(PerPrLock::new());
        let max_concurrent = Arc::new(AtomicUsize::new(0));
        let counter = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for pr in 0..4i64 {
            let lock = lock.clone();
            let counter = counter.clone();
            let max_concurrent = max_concurrent.clone();
            handles.push(tokio::spawn(async move {
                let _guard = lock.acquire("repo1", pr).await;
                let now = counter.fetch_add(1, Ordering::SeqCst) + 1;
                max_concurrent.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(std::time::Duration::from_millis(20)).await;
                counter.fetch_sub(1, Ordering::SeqCst);
            }));
        }

        for h in handles {
            h.await.unwrap();
        }

        assert!(max_concurrent.load(Ordering::SeqCst) > 1);
    }
}
