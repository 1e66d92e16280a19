//! Thin client for the OpenAI-compatible chat completions and embeddings
//! APIs.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider};
use crate::errors::{ConfigError, LlmResult, TransportError};

pub struct OpenAiService {
    client: reqwest::Client,
    cfg: LlmModelConfig,
    url_chat: String,
    url_embeddings: String,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

#[derive(Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingsDatum>,
}

#[derive(Deserialize)]
struct EmbeddingsDatum {
    embedding: Vec<f32>,
}

impl OpenAiService {
    pub fn new(cfg: LlmModelConfig) -> LlmResult<Self> {
        if cfg.provider != LlmProvider::OpenAi {
            return Err(ConfigError::WrongProvider { expected: "openai" }.into());
        }
        if cfg.api_key.as_deref().unwrap_or_default().is_empty() {
            return Err(ConfigError::MissingVar("OPENAI_API_KEY").into());
        }

        let timeout = cfg.timeout_secs.map(Duration::from_secs).unwrap_or(Duration::from_secs(60));
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(TransportError::Http)?;

        let base = cfg.endpoint.trim_end_matches('/').to_string();
        let url_chat = format!("{base}/v1/chat/completions");
        let url_embeddings = format!("{base}/v1/embeddings");

        Ok(Self {
            client,
            cfg,
            url_chat,
            url_embeddings,
        })
    }

    #[instrument(skip(self, prompt), fields(model = %self.cfg.model))]
    pub async fn generate(&self, prompt: &str, system: Option<&str>) -> LlmResult<String> {
        let mut messages = Vec::new();
        if let Some(system) = system {
            messages.push(ChatMessage { role: "system", content: system });
        }
        messages.push(ChatMessage { role: "user", content: prompt });

        let body = ChatRequest {
            model: &self.cfg.model,
            messages,
            temperature: self.cfg.temperature,
            max_tokens: self.cfg.max_tokens,
        };

        let resp = self
            .client
            .post(&self.url_chat)
            .bearer_auth(self.cfg.api_key.as_deref().unwrap_or_default())
            .json(&body)
            .send()
            .await
            .map_err(TransportError::Http)?;

        let status = resp.status();
        if !status.is_success() {
            let snippet = resp.text().await.unwrap_or_default();
            return Err(TransportError::Status {
                status: status.as_u16(),
                url: self.url_chat.clone(),
                snippet: snippet.chars().take(200).collect(),
            }
            .into());
        }

        let parsed: ChatResponse = resp.json().await.map_err(|e| TransportError::Decode(e.to_string()))?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| TransportError::Decode("empty choices array".into()).into())
    }

    #[instrument(skip(self, input), fields(model = %self.cfg.model))]
    pub async fn embeddings(&self, input: &str) -> LlmResult<Vec<f32>> {
        let body = EmbeddingsRequest {
            model: &self.cfg.model,
            input,
        };

        let resp = self
            .client
            .post(&self.url_embeddings)
            .bearer_auth(self.cfg.api_key.as_deref().unwrap_or_default())
            .json(&body)
            .send()
            .await
            .map_err(TransportError::Http)?;

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
        parsed
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| TransportError::Decode("empty data array".into()).into())
    }
}
