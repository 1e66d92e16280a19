//! Thin client for the local Ollama API:
//! `POST {endpoint}/api/generate` and `POST {endpoint}/api/embeddings`.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider};
use crate::errors::{ConfigError, LlmResult, TransportError};

pub struct OllamaService {
    client: reqwest::Client,
    cfg: LlmModelConfig,
    url_generate: String,
    url_embeddings: String,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

#[derive(Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingsResponse {
    embedding: Vec<f32>,
}

impl OllamaService {
    pub fn new(cfg: LlmModelConfig) -> LlmResult<Self> {
        if cfg.provider != LlmProvider::Ollama {
            return Err(ConfigError::WrongProvider { expected: "ollama" }.into());
        }
        let endpoint = cfg.endpoint.trim();
        if endpoint.is_empty() || !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(ConfigError::InvalidEndpoint(cfg.endpoint.clone()).into());
        }

        let timeout = cfg.timeout_secs.map(Duration::from_secs).unwrap_or(Duration::from_secs(60));
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(TransportError::Http)?;

        let url_generate = format!("{endpoint}/api/generate");
        let url_embeddings = format!("{endpoint}/api/embeddings");

        Ok(Self {
            client,
            cfg,
            url_generate,
            url_embeddings,
        })
    }

    #[instrument(skip(self, prompt), fields(model = %self.cfg.model))]
    pub async fn generate(&self, prompt: &str, system: Option<&str>) -> LlmResult<String> {
        let body = GenerateRequest {
            model: &self.cfg.model,
            prompt,
            stream: false,
            system,
        };

        let resp = self.client.post(&self.url_generate).json(&body).send().await.map_err(TransportError::Http)?;
        let status = resp.status();
        if !status.is_success() {
            let snippet = resp.text().await.unwrap_or_default();
            return Err(TransportError::Status {
                status: status.as_u16(),
                url: self.url_generate.clone(),
                snippet: snippet.chars().take(200).collect(),
            }
            .into());
        }

        let parsed: GenerateResponse = resp.json().await.map_err(|e| TransportError::Decode(e.to_string()))?;
        Ok(parsed.response)
    }

    #[instrument(skip(self, input), fields(model = %self.cfg.model))]
    pub async fn embeddings(&self, input: &str) -> LlmResult<Vec<f32>> {
        let body = EmbeddingsRequest {
            model: &self.cfg.model,
            prompt: input,
        };

        let resp = self.client.post(&self.url_embeddings).json(&body).send().await.map_err(TransportError::Http)?;
        let status = resp.status();
        if !status.is_success() {
            let snippet = resp.text().await.unwrap_or_default();
            return Err(TransportError::Status {
                status: status.as_u16(),
                url: self.url_embeddings.clone(),
                snippet: snippet.chars().take(200).collect(),
            }
            .into());
        }

        let parsed: EmbeddingsResponse = resp.json().await.map_err(|e| TransportError::Decode(e.to_string()))?;
        Ok(parsed.embedding)
    }
}
