//! `GET /healthz` — liveness for the process plus a best-effort probe of
//! each distinct configured LLM endpoint. A degraded LLM backend does not
//! fail the process's own liveness; the status is reported, not enforced.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use llm_service::HealthStatus;
use serde::Serialize;

use crate::core::app_state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub ok: bool,
    pub llm: Vec<HealthStatus>,
}

pub async fn healthz(State(state): State<Arc<AppState>>) -> Json<HealthReport> {
    let llm = state.llm.health_all().await;
    let ok = llm.iter().all(|s| s.ok);
    Json(HealthReport { ok, llm })
}
