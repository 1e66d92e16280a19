//! Shared LLM service with three active profiles: `fast`, `slow`, and
//! `embedding`. Construct once, wrap in `Arc`, and pass clones to
//! dependents. Caches underlying HTTP clients per config. If `slow` is not
//! provided, it falls back to `fast`.

use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::RwLock;
use tracing::info;

use crate::config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider};
use crate::errors::LlmResult;
use crate::health_service::{HealthService, HealthStatus};
use crate::review::{parse_model_review, ModelReview};
use crate::services::{ollama_service::OllamaService, open_ai_service::OpenAiService};

pub struct LlmServiceProfiles {
    fast: LlmModelConfig,
    slow: LlmModelConfig,
    embedding: LlmModelConfig,

    ollama: RwLock<HashMap<ClientKey, Arc<OllamaService>>>,
    openai: RwLock<HashMap<ClientKey, Arc<OpenAiService>>>,

    health: HealthService,
}

impl LlmServiceProfiles {
    pub fn new(fast: LlmModelConfig, slow_opt: Option<LlmModelConfig>, embedding: LlmModelConfig) -> Self {
        let slow = slow_opt.unwrap_or_else(|| fast.clone());

        info!(
            fast.provider = %fast.provider,
            fast.model = %fast.model,
            slow.provider = %slow.provider,
            slow.model = %slow.model,
            embedding.provider = %embedding.provider,
            embedding.model = %embedding.model,
            "llm service profiles initialized"
        );

        Self {
            fast,
            slow,
            embedding,
            ollama: RwLock::new(HashMap::new()),
            openai: RwLock::new(HashMap::new()),
            health: HealthService::new(),
        }
    }

    pub async fn generate_fast(&self, prompt: &str, system: Option<&str>) -> LlmResult<String> {
        self.generate_with(&self.fast.clone(), prompt, system).await
    }

    pub async fn generate_slow(&self, prompt: &str, system: Option<&str>) -> LlmResult<String> {
        self.generate_with(&self.slow.clone(), prompt, system).await
    }

    /// Calls the slow (quality) profile and parses the response as a
    /// structured review bundle.
    pub async fn generate_review(&self, prompt: &str) -> LlmResult<ModelReview> {
        const SYSTEM: &str = "You are an automated code reviewer. Respond with exactly one JSON object \
            with keys summary (string), comments (array of {path, line, body, severity, confidence?}), \
            and verdict (one of approve, request_changes, comment). No prose outside the JSON.";
        let raw = self.generate_slow(prompt, Some(SYSTEM)).await?;
        parse_model_review(&raw)
    }

    pub async fn embed(&self, input: &str) -> LlmResult<Vec<f32>> {
        let started = Instant::now();
        let out = match self.embedding.provider {
            LlmProvider::Ollama => self.get_or_init_ollama(&self.embedding).await?.embeddings(input).await,
            LlmProvider::OpenAi => self.get_or_init_openai(&self.embedding).await?.embeddings(input).await,
        };
        if out.is_ok() {
            info!(
                provider = %self.embedding.provider,
                model = %self.embedding.model,
                input_len = input.len(),
                latency_ms = started.elapsed().as_millis(),
                "embeddings completed"
            );
        }
        out
    }

    pub async fn health_all(&self) -> Vec<HealthStatus> {
        let mut list = Vec::with_capacity(3);
        list.push(self.fast.clone());
        if self.slow != self.fast {
            list.push(self.slow.clone());
        }
        if self.embedding != self.fast && self.embedding != self.slow {
            list.push(self.embedding.clone());
        }
        self.health.check_many(&list).await
    }

    pub fn embedding_dim_hint(&self) -> &str {
        &self.embedding.model
    }

    async fn generate_with(&self, cfg: &LlmModelConfig, prompt: &str, system: Option<&str>) -> LlmResult<String> {
        let started = Instant::now();
        let res = match cfg.provider {
            LlmProvider::Ollama => self.get_or_init_ollama(cfg).await?.generate(prompt, system).await,
            LlmProvider::OpenAi => self.get_or_init_openai(cfg).await?.generate(prompt, system).await,
        };
        if res.is_ok() {
            info!(
                provider = %cfg.provider,
                model = %cfg.model,
                prompt_len = prompt.len(),
                latency_ms = started.elapsed().as_millis(),
                "generation completed"
            );
        }
        res
    }

    async fn get_or_init_ollama(&self, cfg: &LlmModelConfig) -> LlmResult<Arc<OllamaService>> {
        let key = ClientKey::from(cfg);
        if let Some(cli) = self.ollama.read().await.get(&key).cloned() {
            return Ok(cli);
        }
        let mut w = self.ollama.write().await;
        if let Some(cli) = w.get(&key).cloned() {
            return Ok(cli);
        }
        let cli = Arc::new(OllamaService::new(cfg.clone())?);
        w.insert(key, cli.clone());
        Ok(cli)
    }

    async fn get_or_init_openai(&self, cfg: &LlmModelConfig) -> LlmResult<Arc<OpenAiService>> {
        let key = ClientKey::from(cfg);
        if let Some(cli) = self.openai.read().await.get(&key).cloned() {
            return Ok(cli);
        }
        let mut w = self.openai.write().await;
        if let Some(cli) = w.get(&key).cloned() {
            return Ok(cli);
        }
        let cli = Arc::new(OpenAiService::new(cfg.clone())?);
        w.insert(key, cli.clone());
        Ok(cli)
    }
}

/// Cache key identifying a unique client configuration. `api_key`
/// participates so clients with different credentials never share a pooled
/// connection, but is never itself logged.
#[derive(Clone, Eq, Debug)]
struct ClientKey {
    provider: LlmProvider,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    timeout: Option<u64>,
}

impl From<&LlmModelConfig> for ClientKey {
    fn from(cfg: &LlmModelConfig) -> Self {
        Self {
            provider: cfg.provider,
            endpoint: cfg.endpoint.clone(),
            model: cfg.model.clone(),
            api_key: cfg.api_key.clone(),
            timeout: cfg.timeout_secs,
        }
    }
}

impl PartialEq for ClientKey {
    fn eq(&self, other: &Self) -> bool {
        self.provider == other.provider
            && self.endpoint == other.endpoint
            && self.model == other.model
            && self.api_key == other.api_key
            && self.timeout == other.timeout
    }
}

impl Hash for ClientKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.provider.hash(state);
        self.endpoint.hash(state);
        self.model.hash(state);
        self.api_key.hash(state);
        self.timeout.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_key_ignores_nothing_security_relevant() {
        let a = LlmModelConfig {
            provider: LlmProvider::Ollama,
            model: "m".into(),
            endpoint: "http://localhost:11434".into(),
            api_key: Some("key-a".into()),
            max_tokens: None,
            temperature: None,
            top_p: None,
            timeout_secs: None,
        };
        let mut b = a.clone();
        b.api_key = Some("key-b".into());
        assert_ne!(ClientKey::from(&a), ClientKey::from(&b));
    }
}
