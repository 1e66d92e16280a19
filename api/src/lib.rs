//! HTTP surface: webhook ingestion, the manual review trigger, the
//! feedback callback, indexing progress, and liveness. Everything here is
//! thin — the actual work lives in `review-runner`, `indexer`, and
//! `graph-cache`; this crate's job is wiring and transport.

pub mod config;
pub mod core;
pub mod error_handler;
pub mod middleware_layer;
pub mod routes;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use embedding_adapter::EmbeddingAdapter;
use graph_cache::GraphCache;
use indexer::Indexer;
use llm_service::LlmServiceProfiles;
use parser_registry::ParserRegistry;
use progress_bus::ProgressBus;
use review_runner::ReviewRunner;
use store::{Store, StoreConfig};
use tokio::net::TcpListener;
use tracing::info;

use crate::config::AppConfig;
use crate::core::app_state::{provider_map_from_config, AppState};
use crate::error_handler::AppError;

pub async fn start() -> Result<(), AppError> {
    tracing_subscriber::fmt().with_env_filter(tracing_subscriber::EnvFilter::from_default_env()).init();

    let config = AppConfig::from_env()?;

    let store = Arc::new(Store::connect(&StoreConfig::from_env()).await?);
    store.migrate().await?;

    let parsers = Arc::new(ParserRegistry::with_defaults());

    let llm = Arc::new(LlmServiceProfiles::new(config.llm.fast.clone(), config.llm.slow.clone(), config.llm.embedding.clone()));

    let embeddings = Some(Arc::new(EmbeddingAdapter::new(llm.clone(), store.clone())));

    let indexer = Arc::new(Indexer::new(store.clone(), parsers, embeddings.clone()));

    let graph_cache = Arc::new(GraphCache::new(store.clone(), indexer.clone()));
    let warmed = graph_cache.warmup_all_repos().await;
    info!(warmed, "graph cache warmup complete, accepting traffic");

    let runner = Arc::new(ReviewRunner::new(store.clone(), graph_cache.clone(), llm.clone(), embeddings.clone(), config.feedback_link.clone()));

    let progress = Arc::new(ProgressBus::new());

    let state = Arc::new(AppState {
        store,
        indexer,
        graph_cache,
        progress,
        runner,
        llm,
        embeddings,
        providers: provider_map_from_config(&config),
        review: config.review,
        workdir: config.workdir,
        feedback_link: config.feedback_link,
        trigger_api_key: config.trigger_api_key,
    });

    let app = Router::new()
        .route("/healthz", get(routes::health::healthz))
        .route("/api/review", post(routes::review::trigger_review))
        .route("/api/feedback", get(routes::feedback::record_feedback))
        .route("/api/progress", get(routes::progress::stream_progress))
        .route("/webhook/{platform}", post(routes::webhook::receive_webhook))
        .with_state(state);

    let listener = TcpListener::bind(&config.bind_addr).await.map_err(AppError::Bind)?;
    info!(addr = %config.bind_addr, "listening");
    axum::serve(listener, app).await.map_err(AppError::Server)?;

    Ok(())
}
