//! Typed configuration, read once at startup. Follows the same
//! `from_env`-with-defaults shape as `store::StoreConfig` and
//! `llm_service`'s model configs.

use std::collections::HashMap;
use std::path::PathBuf;

use llm_service::config::default_config;
use llm_service::LlmModelConfig;
use retriever::{RetrievalDepth, RetrieverConfig};
use vcs_providers::{ProviderConfig, ProviderKind};

use crate::error_handler::AppError;

/// The three LLM profiles: `fast` drafts reviews, `slow` (optional) is used
/// when a platform's retrieval depth is `Deep`, `embedding` backs both the
/// vector store and the RAG example lookup.
pub struct LlmConfig {
    pub fast: LlmModelConfig,
    pub slow: Option<LlmModelConfig>,
    pub embedding: LlmModelConfig,
}

impl LlmConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let fast = default_config::config_fast().map_err(|_| AppError::MissingEnv("OPENAI_API_KEY or OLLAMA_* LLM settings"))?;
        let slow = default_config::config_slow().map_err(|_| AppError::MissingEnv("OPENAI_API_KEY or OLLAMA_* LLM settings"))?;
        let embedding = default_config::config_embedding().map_err(|_| AppError::MissingEnv("OPENAI_API_KEY or OLLAMA_* LLM settings"))?;
        Ok(Self { fast, slow, embedding })
    }
}

/// Review-runner tuning knobs, separate from any single platform.
#[derive(Debug, Clone)]
pub struct ReviewConfig {
    pub precision_threshold: f64,
    pub retrieval: RetrieverConfig,
}

impl ReviewConfig {
    pub fn from_env() -> Self {
        let precision_threshold = std::env::var("REVIEW_PRECISION_THRESHOLD").ok().and_then(|v| v.parse().ok()).unwrap_or(review_runner::DEFAULT_THRESHOLD);

        let depth = match std::env::var("REVIEW_RETRIEVAL_DEPTH").unwrap_or_default().to_lowercase().as_str() {
            "fast" => RetrievalDepth::Fast,
            "deep" => RetrievalDepth::Deep,
            _ => RetrievalDepth::Standard,
        };
        let top_k = std::env::var("REVIEW_TOP_K").ok().and_then(|v| v.parse().ok()).unwrap_or(8);

        Self { precision_threshold, retrieval: RetrieverConfig { depth, top_k } }
    }
}

/// Where the indexer materializes a repo's working tree before scanning.
#[derive(Debug, Clone)]
pub struct WorkdirConfig {
    pub root: PathBuf,
}

impl WorkdirConfig {
    pub fn from_env() -> Self {
        Self { root: std::env::var("REPO_WORKDIR").map(PathBuf::from).unwrap_or_else(|_| PathBuf::from("./workdir")) }
    }
}

pub struct AppConfig {
    pub bind_addr: String,
    pub providers: HashMap<ProviderKind, ProviderConfig>,
    pub feedback_link: Option<review_runner::FeedbackLinkConfig>,
    pub review: ReviewConfig,
    pub workdir: WorkdirConfig,
    pub llm: LlmConfig,
    /// Gates the manual `/api/review` trigger, matching the CLI's
    /// `--server --api-key` delegate mode.
    pub trigger_api_key: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".into());

        let mut providers = HashMap::new();
        for kind in [ProviderKind::GitLab, ProviderKind::GitHub, ProviderKind::Bitbucket] {
            match ProviderConfig::from_env(kind) {
                Ok(cfg) => {
                    providers.insert(kind, cfg);
                }
                Err(_) => tracing::debug!(?kind, "no credentials configured for this platform, skipping"),
            }
        }
        if providers.is_empty() {
            return Err(AppError::MissingEnv("at least one of GITLAB_TOKEN, GITHUB_TOKEN, BITBUCKET_TOKEN"));
        }

        let feedback_link = match (std::env::var("FEEDBACK_BASE_URL"), std::env::var("FEEDBACK_SECRET")) {
            (Ok(base_url), Ok(secret)) => Some(review_runner::FeedbackLinkConfig { base_url, secret }),
            _ => None,
        };

        let trigger_api_key = std::env::var("TRIGGER_API_KEY").map_err(|_| AppError::MissingEnv("TRIGGER_API_KEY"))?;

        Ok(Self { bind_addr, providers, feedback_link, review: ReviewConfig::from_env(), workdir: WorkdirConfig::from_env(), llm: LlmConfig::from_env()?, trigger_api_key })
    }
}
