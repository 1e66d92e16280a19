//! Lightweight health checks for supported providers, resilient by design:
//! a failed probe becomes `ok: false`, never a propagated error.

use std::time::Instant;

use serde::Serialize;
use tracing::debug;

use crate::config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider};

#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    pub provider: String,
    pub endpoint: String,
    pub model: String,
    pub ok: bool,
    pub latency_ms: u128,
    pub message: String,
}

pub struct HealthService {
    client: reqwest::Client,
}

impl HealthService {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(5))
                .build()
                .unwrap_or_default(),
        }
    }

    pub async fn check_many(&self, configs: &[LlmModelConfig]) -> Vec<HealthStatus> {
        let mut out = Vec::with_capacity(configs.len());
        for cfg in configs {
            out.push(self.check(cfg).await);
        }
        out
    }

    pub async fn check(&self, cfg: &LlmModelConfig) -> HealthStatus {
        let started = Instant::now();
        let url = match cfg.provider {
            LlmProvider::Ollama => format!("{}/api/tags", cfg.endpoint.trim_end_matches('/')),
            LlmProvider::OpenAi => format!("{}/v1/models", cfg.endpoint.trim_end_matches('/')),
        };

        let mut req = self.client.get(&url);
        if cfg.provider == LlmProvider::OpenAi {
            req = req.bearer_auth(cfg.api_key.as_deref().unwrap_or_default());
        }

        let result = req.send().await;
        let latency_ms = started.elapsed().as_millis();

        match result {
            Ok(resp) if resp.status().is_success() => {
                debug!(provider = %cfg.provider, latency_ms, "health check ok");
                HealthStatus {
                    provider: cfg.provider.to_string(),
                    endpoint: cfg.endpoint.clone(),
                    model: cfg.model.clone(),
                    ok: true,
                    latency_ms,
                    message: "ok".into(),
                }
            }
            Ok(resp) => HealthStatus {
                provider: cfg.provider.to_string(),
                endpoint: cfg.endpoint.clone(),
                model: cfg.model.clone(),
                ok: false,
                latency_ms,
                message: format!("unexpected status {}", resp.status()),
            },
            Err(err) => HealthStatus {
                provider: cfg.provider.to_string(),
                endpoint: cfg.endpoint.clone(),
                model: cfg.model.clone(),
                ok: false,
                latency_ms,
                message: err.to_string(),
            },
        }
    }
}

impl Default for HealthService {
    fn default() -> Self {
        Self::new()
    }
}
