use std::collections::HashMap;
use std::sync::Arc;

use embedding_adapter::EmbeddingAdapter;
use graph_cache::GraphCache;
use indexer::Indexer;
use llm_service::LlmServiceProfiles;
use progress_bus::ProgressBus;
use review_runner::ReviewRunner;
use store::Store;
use vcs_providers::{ProviderClient, ProviderConfig, ProviderKind};

use crate::config::{AppConfig, ReviewConfig, WorkdirConfig};

/// Shared state handed to every route handler through axum's `State`
/// extractor.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Store>,
    pub indexer: Arc<Indexer>,
    pub graph_cache: Arc<GraphCache>,
    pub progress: Arc<ProgressBus>,
    pub runner: Arc<ReviewRunner>,
    pub llm: Arc<LlmServiceProfiles>,
    pub embeddings: Option<Arc<EmbeddingAdapter>>,
    pub providers: Arc<HashMap<ProviderKind, ProviderConfig>>,
    pub review: ReviewConfig,
    pub workdir: WorkdirConfig,
    pub feedback_link: Option<review_runner::FeedbackLinkConfig>,
    pub trigger_api_key: String,
}

impl AppState {
    /// Builds a `ProviderClient` for a platform on demand; the clients
    /// themselves are cheap (a pooled `reqwest::Client` plus a base URL
    /// and token), so there is no benefit to caching them in `AppState`.
    pub fn provider_client(&self, kind: ProviderKind) -> Option<ProviderClient> {
        self.providers.get(&kind).map(ProviderClient::new)
    }
}

pub fn provider_map_from_config(config: &AppConfig) -> Arc<HashMap<ProviderKind, ProviderConfig>> {
    Arc::new(config.providers.clone())
}
