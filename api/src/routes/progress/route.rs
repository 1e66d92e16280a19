//! `GET /api/progress?repo=&branch=` — a server-sent-events view onto the
//! Progress Bus. The bus only ever holds the latest event per
//! `(repoId, branch)`, so this stream polls it at a short interval rather
//! than subscribing to a push channel, and closes itself once it observes
//! `step` in `{done, error}`.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Query, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::{self, Stream};
use indexer::IndexStep;
use serde::Deserialize;

use crate::core::app_state::AppState;

const POLL_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Debug, Deserialize)]
pub struct ProgressQuery {
    pub repo: String,
    pub branch: String,
}

pub async fn stream_progress(State(state): State<Arc<AppState>>, Query(query): Query<ProgressQuery>) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = stream::unfold((state, query, false), |(state, query, done)| async move {
        if done {
            return None;
        }

        tokio::time::sleep(POLL_INTERVAL).await;
        let progress = state.progress.get(&query.repo, &query.branch).await;

        let (event, finished) = match &progress {
            Some(p) => {
                let finished = matches!(p.step, IndexStep::Done | IndexStep::Error);
                let event = Event::default().json_data(p).unwrap_or_else(|_| Event::default().data("serialization error"));
                (event, finished)
            }
            None => (Event::default().event("waiting").data("no progress recorded yet"), false),
        };

        Some((Ok(event), (state, query, finished)))
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
