//! Repository clone/fetch lifecycle. The Indexer owns a repo's on-disk
//! checkout; everything downstream of that (the VCS adapter's diff and
//! comment calls) treats `repoPath` as already-materialized.

use std::path::Path;

use git2::{Cred, FetchOptions, RemoteCallbacks, Repository};
use tracing::{info, warn};

use crate::errors::IndexResult;

fn auth_callbacks(token: Option<String>) -> RemoteCallbacks<'static> {
    let mut callbacks = RemoteCallbacks::new();
    callbacks.credentials(move |_url, username_from_url, _allowed| {
        if let Some(token) = &token {
            Cred::userpass_plaintext(username_from_url.unwrap_or("oauth2"), token)
        } else {
            Cred::default()
        }
    });
    callbacks
}

/// Clones into `target_dir` if it doesn't exist, otherwise fetches and
/// hard-resets to the remote tip of `branch`.
pub fn clone_or_fetch(repo_url: &str, target_dir: &Path, branch: &str, token: Option<String>) -> IndexResult<()> {
    if target_dir.join(".git").is_dir() {
        fetch_and_reset(target_dir, branch, token)
    } else {
        clone(repo_url, target_dir, branch, token)
    }
}

fn clone(repo_url: &str, target_dir: &Path, branch: &str, token: Option<String>) -> IndexResult<()> {
    info!(repo_url, target = %target_dir.display(), branch, "cloning repository");
    let mut fetch_options = FetchOptions::new();
    fetch_options.remote_callbacks(auth_callbacks(token));

    let mut builder = git2::build::RepoBuilder::new();
    builder.fetch_options(fetch_options);
    builder.branch(branch);
    builder.clone(repo_url, target_dir)?;
    Ok(())
}

fn fetch_and_reset(target_dir: &Path, branch: &str, token: Option<String>) -> IndexResult<()> {
    let repo = Repository::open(target_dir)?;
    let mut remote = repo.find_remote("origin")?;

    let mut fetch_options = FetchOptions::new();
    fetch_options.remote_callbacks(auth_callbacks(token));
    remote.fetch(&[branch], Some(&mut fetch_options), None)?;

    let reference = repo.find_reference(&format!("refs/remotes/origin/{branch}")).or_else(|_| repo.find_reference("FETCH_HEAD"))?;
    let commit = reference.peel_to_commit()?;
    repo.reset(commit.as_object(), git2::ResetType::Hard, None)?;
    Ok(())
}

pub fn changed_files_since(target_dir: &Path, from: Option<&str>, to: &str) -> IndexResult<Vec<String>> {
    let repo = Repository::open(target_dir)?;
    let to_tree = repo.revparse_single(to)?.peel_to_tree()?;
    let from_tree = match from {
        Some(from) => match repo.revparse_single(from) {
            Ok(obj) => Some(obj.peel_to_tree()?),
            Err(e) => {
                warn!(from, error = %e, "could not resolve base revision, treating as full diff");
                None
            }
        },
        None => None,
    };

    let diff = repo.diff_tree_to_tree(from_tree.as_ref(), Some(&to_tree), None)?;
    let mut paths = Vec::new();
    diff.foreach(
        &mut |delta, _| {
            if let Some(path) = delta.new_file().path().and_then(|p| p.to_str()) {
                paths.push(path.to_string());
            }
            true
        },
        None,
        None,
        None,
    )?;
    Ok(paths)
}
