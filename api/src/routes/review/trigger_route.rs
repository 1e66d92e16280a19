//! `POST /api/review` — the server side of the CLI's `--server` delegate
//! mode. Unlike the webhook routes this runs synchronously: the caller is
//! a human or a CI job waiting on the outcome, not a VCS platform that
//! needs a fast 200.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use review_runner::ReviewRequest;
use vcs_providers::{ProviderClient, ProviderKind};

use crate::core::app_state::AppState;
use crate::core::slug::normalize_slug;
use crate::error_handler::AppError;
use crate::routes::review::dto::{ReviewOutcomeView, TriggerReviewRequest};

fn parse_platform(raw: &str) -> Result<ProviderKind, AppError> {
    match raw.to_lowercase().as_str() {
        "gitlab" => Ok(ProviderKind::GitLab),
        "github" => Ok(ProviderKind::GitHub),
        "bitbucket" => Ok(ProviderKind::Bitbucket),
        other => Err(AppError::BadRequest(format!("unknown platform: {other}"))),
    }
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), AppError> {
    let provided = headers.get("x-api-key").and_then(|v| v.to_str().ok()).unwrap_or("");
    if provided != state.trigger_api_key {
        return Err(AppError::BadRequest("invalid or missing X-Api-Key".into()));
    }
    Ok(())
}

pub async fn trigger_review(State(state): State<Arc<AppState>>, headers: HeaderMap, Json(body): Json<TriggerReviewRequest>) -> Result<Json<ReviewOutcomeView>, AppError> {
    authorize(&state, &headers)?;

    let kind = parse_platform(&body.platform)?;
    let provider_config = state.providers.get(&kind).ok_or_else(|| AppError::BadRequest(format!("platform {:?} is not configured", kind)))?;
    let vcs = ProviderClient::new(provider_config);

    let repo_id = normalize_slug(&body.repo);

    if body.force_full {
        reindex_full(&state, &vcs, provider_config, &repo_id, &body.base_branch, &body.repo).await?;
    }

    let request = ReviewRequest {
        repo_id,
        pr_number: body.pr as i64,
        base_branch: body.base_branch,
        platform: format!("{kind:?}"),
        dry_run: body.dry_run,
        incremental_diff: body.incremental,
        retrieval: state.review.retrieval,
        precision_threshold: state.review.precision_threshold,
    };

    let outcome = state.runner.execute(request, &vcs).await?;
    Ok(Json(outcome.into()))
}

async fn reindex_full(state: &AppState, _vcs: &ProviderClient, provider_config: &vcs_providers::ProviderConfig, repo_id: &str, branch: &str, repo_url: &str) -> Result<(), AppError> {
    let repo_path = state.workdir.root.join(repo_id);
    let token = Some(provider_config.token.clone());

    tokio::task::spawn_blocking({
        let repo_path = repo_path.clone();
        let repo_url = repo_url.to_string();
        let branch = branch.to_string();
        move || indexer::clone_or_fetch(&repo_url, &repo_path, &branch, token)
    })
    .await
    .map_err(|e| AppError::BadRequest(format!("clone task panicked: {e}")))??;

    state.indexer.full_index(&repo_path, repo_id, branch, |_| {}).await?;
    state.graph_cache.evict_repo(repo_id, Some(branch)).await;
    Ok(())
}
