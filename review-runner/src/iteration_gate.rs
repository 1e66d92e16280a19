//! Iteration gate (spec §4.8): applies only to the iteration-based
//! platform when incremental diffing is requested. Skips a review whose
//! latest iteration has already been reviewed.

use store::Store;
use vcs_providers::ProviderClient;

use crate::errors::RunnerResult;

pub enum GateDecision {
    /// Not iteration-gated (non-iteration platform, or incremental not
    /// requested) — execute unconditionally.
    Proceed { compare_to_iteration: Option<u64> },
    /// `latestIteration <= lastReviewed` — skip without touching the DB.
    Skip,
}

pub async fn evaluate(client: &ProviderClient, store: &Store, repo_id: &str, pr_number: i64, platform: &str, incremental_diff: bool) -> RunnerResult<GateDecision> {
    if !incremental_diff || !client.is_iteration_based() {
        return Ok(GateDecision::Proceed { compare_to_iteration: None });
    }

    let Some(latest) = client.get_latest_iteration_id(repo_id, pr_number as u64).await? else {
        return Ok(GateDecision::Proceed { compare_to_iteration: None });
    };

    let last_reviewed = store.read_iteration_state(repo_id, pr_number, platform).await?.unwrap_or(0) as u64;

    if latest <= last_reviewed {
        Ok(GateDecision::Skip)
    } else {
        Ok(GateDecision::Proceed { compare_to_iteration: Some(last_reviewed) })
    }
}

pub async fn record(store: &Store, repo_id: &str, pr_number: i64, platform: &str, iteration: u64) -> RunnerResult<()> {
    store.write_iteration_state(repo_id, pr_number, platform, iteration as i64).await?;
    Ok(())
}
