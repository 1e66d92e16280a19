//! Local `git` invocations needed by the push path: listing files changed
//! between two refs in an already-checked-out working tree. Repository
//! clone/fetch lifecycle belongs to the Indexer, not here.

use tokio::process::Command;
use tracing::warn;

use crate::errors::{ProviderError, VcsResult};

/// Runs `git diff --name-only <from>..<to>` in `repo_path` and returns the
/// changed file paths. A `from` of `None` diffs the empty tree (initial
/// push).
pub async fn get_changed_files_from_git(repo_path: &str, from: Option<&str>, to: &str) -> VcsResult<Vec<String>> {
    let range = match from {
        Some(from) => format!("{from}..{to}"),
        None => to.to_string(),
    };

    let output = Command::new("git")
        .arg("-C")
        .arg(repo_path)
        .arg("diff")
        .arg("--name-only")
        .arg(&range)
        .output()
        .await
        .map_err(|e| ProviderError::Network(e.to_string()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        warn!(repo_path, range, %stderr, "git diff --name-only failed");
        return Err(ProviderError::InvalidResponse(stderr.into_owned()).into());
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    Ok(stdout.lines().filter(|l| !l.is_empty()).map(str::to_string).collect())
}
