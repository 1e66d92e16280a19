//! `GET /api/feedback?id=&signal=&token=` — the link a reviewer clicks
//! from a posted comment's footer. No session, no cookie: the HMAC token
//! in the URL is the only credential, so any failure to validate it is a
//! flat 400, never a redirect or a partial acceptance.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use store::FeedbackSignal;

use crate::core::app_state::AppState;
use crate::error_handler::AppError;

#[derive(Debug, Deserialize)]
pub struct FeedbackQuery {
    pub id: String,
    pub signal: String,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct FeedbackAck {
    pub recorded: bool,
}

pub async fn record_feedback(State(state): State<Arc<AppState>>, Query(query): Query<FeedbackQuery>) -> Result<Json<FeedbackAck>, AppError> {
    let config = state.feedback_link.as_ref().ok_or_else(|| AppError::BadRequest("feedback links are not configured on this server".into()))?;

    if !review_runner::verify(&config.secret, &query.id, &query.signal, &query.token) {
        return Err(AppError::BadRequest("invalid feedback token".into()));
    }

    let comment_id = query.id.parse().map_err(|_| AppError::BadRequest("id is not a valid comment id".into()))?;
    let signal = match query.signal.as_str() {
        "accepted" => FeedbackSignal::Accepted,
        "rejected" => FeedbackSignal::Rejected,
        other => return Err(AppError::BadRequest(format!("unknown signal: {other}"))),
    };

    state.store.upsert_feedback(comment_id, signal).await?;
    Ok(Json(FeedbackAck { recorded: true }))
}
