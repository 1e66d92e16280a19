//! `POST /webhook/:platform` — one endpoint per platform, dispatching on
//! the event-type header each platform sends. Authentication happens
//! before the body is parsed as JSON; everything after that degrades to a
//! 200 no-op rather than a 4xx/5xx, since a malformed payload is the
//! producer's problem, not ours to relitigate over HTTP.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use indexer::IndexProgress;
use review_runner::ReviewRequest;
use tracing::{info, warn};
use vcs_providers::ProviderClient;

use crate::core::app_state::AppState;
use crate::core::slug::normalize_slug;
use crate::routes::webhook::auth::verify_webhook;
use crate::routes::webhook::payload::{parse_pull_request, parse_push};

fn platform_from_path(raw: &str) -> Option<vcs_providers::ProviderKind> {
    match raw {
        "gitlab" => Some(vcs_providers::ProviderKind::GitLab),
        "github" => Some(vcs_providers::ProviderKind::GitHub),
        "bitbucket" => Some(vcs_providers::ProviderKind::Bitbucket),
        _ => None,
    }
}

fn event_type(kind: vcs_providers::ProviderKind, headers: &HeaderMap) -> Option<String> {
    let name = match kind {
        vcs_providers::ProviderKind::GitHub => "x-github-event",
        vcs_providers::ProviderKind::GitLab => "x-gitlab-event",
        vcs_providers::ProviderKind::Bitbucket => "x-event-key",
    };
    headers.get(name)?.to_str().ok().map(str::to_lowercase)
}

fn auth_header<'a>(kind: vcs_providers::ProviderKind, headers: &'a HeaderMap) -> Option<&'a str> {
    let name = match kind {
        vcs_providers::ProviderKind::GitHub => "x-hub-signature-256",
        vcs_providers::ProviderKind::GitLab => "x-gitlab-token",
        vcs_providers::ProviderKind::Bitbucket => "x-hub-signature",
    };
    headers.get(name)?.to_str().ok()
}

pub async fn receive_webhook(State(state): State<Arc<AppState>>, Path(platform): Path<String>, headers: HeaderMap, body: Bytes) -> StatusCode {
    let Some(kind) = platform_from_path(&platform) else {
        return StatusCode::NOT_FOUND;
    };
    let Some(provider_config) = state.providers.get(&kind) else {
        return StatusCode::NOT_FOUND;
    };
    let Some(secret) = &provider_config.webhook_secret else {
        warn!(?kind, "webhook received but no secret configured for this platform, rejecting");
        return StatusCode::UNAUTHORIZED;
    };

    if !verify_webhook(kind, secret, &body, auth_header(kind, &headers)) {
        return StatusCode::UNAUTHORIZED;
    }

    let Ok(json) = serde_json::from_slice::<serde_json::Value>(&body) else {
        return StatusCode::OK;
    };

    let Some(event) = event_type(kind, &headers) else {
        return StatusCode::OK;
    };

    if event.contains("push") {
        if let Some(push) = parse_push(kind, &json) {
            tokio::spawn(handle_push(state, kind, push));
        }
        return StatusCode::OK;
    }

    if event.contains("merge_request") || event.contains("pull_request") || event.contains("pullrequest") {
        if let Some(pr) = parse_pull_request(kind, &json) {
            if pr.is_relevant() {
                tokio::spawn(async move { handle_pull_request(state, kind, pr).await });
            }
        }
        return StatusCode::OK;
    }

    StatusCode::OK
}

fn handle_push(state: Arc<AppState>, kind: vcs_providers::ProviderKind, push: crate::routes::webhook::payload::PushEvent) -> std::pin::Pin<Box<dyn std::future::Future<Output = ()> + Send>> {
    Box::pin(handle_push_impl(state, kind, push))
}

async fn handle_push_impl(state: Arc<AppState>, kind: vcs_providers::ProviderKind, push: crate::routes::webhook::payload::PushEvent) {
    let repo_id = normalize_slug(&push.repository_url);
    let _ = state.store.list_branches().await;
    let _ = kind;
}

async fn handle_pull_request(state: Arc<AppState>, kind: vcs_providers::ProviderKind, pr: crate::routes::webhook::payload::PullRequestEvent) {
    let repo_id = normalize_slug(&pr.repository_url);
    let Some(provider_config) = state.providers.get(&kind) else {
        return;
    };
    let vcs = ProviderClient::new(provider_config);

    let request = ReviewRequest {
        repo_id,
        pr_number: pr.pr_id as i64,
        base_branch: pr.base_branch,
        platform: format!("{kind:?}"),
        dry_run: false,
        incremental_diff: true,
        retrieval: state.review.retrieval,
        precision_threshold: state.review.precision_threshold,
    };

    match state.runner.execute(request, &vcs).await {
        Ok(outcome) => info!(review_id = %outcome.review_id, comments = outcome.comment_count, "webhook-triggered review posted"),
        Err(e) => warn!(error = %e, "webhook-triggered review failed"),
    }
}
