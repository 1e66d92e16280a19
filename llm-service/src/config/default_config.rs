//! Loads the three profile configs strictly from environment variables.
//!
//! - `fast`: quick drafting model, used for `standard`/`fast` retrieval depths.
//! - `slow`: quality model, falls back to `fast` when unset.
//! - `embedding`: embedding model.
//!
//! Environment variables:
//! - `LLM_PROVIDER` = `ollama` | `openai` (default `ollama`)
//! - `OLLAMA_URL` (default `http://localhost:11434`)
//! - `OLLAMA_MODEL_FAST` (default `qwen2.5-coder:7b`)
//! - `OLLAMA_MODEL_SLOW` (optional, falls back to fast)
//! - `EMBEDDING_MODEL` (default `nomic-embed-text`)
//! - `OPENAI_API_KEY`, `OPENAI_BASE_URL` (default `https://api.openai.com`)
//! - `OPENAI_MODEL_FAST`, `OPENAI_MODEL_SLOW`, `OPENAI_EMBEDDING_MODEL`
//! - `LLM_MAX_TOKENS` (optional u32)

use crate::config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider};
use crate::errors::{ConfigError, Error, LlmResult};

fn provider_from_env() -> LlmProvider {
    match std::env::var("LLM_PROVIDER").unwrap_or_default().to_lowercase().as_str() {
        "openai" => LlmProvider::OpenAi,
        _ => LlmProvider::Ollama,
    }
}

fn max_tokens() -> Option<u32> {
    std::env::var("LLM_MAX_TOKENS").ok().and_then(|v| v.parse().ok())
}

pub fn config_fast() -> LlmResult<LlmModelConfig> {
    match provider_from_env() {
        LlmProvider::Ollama => Ok(LlmModelConfig {
            provider: LlmProvider::Ollama,
            model: std::env::var("OLLAMA_MODEL_FAST").unwrap_or_else(|_| "qwen2.5-coder:7b".into()),
            endpoint: std::env::var("OLLAMA_URL").unwrap_or_else(|_| "http://localhost:11434".into()),
            api_key: None,
            max_tokens: max_tokens(),
            temperature: Some(0.4),
            top_p: Some(0.9),
            timeout_secs: Some(120),
        }),
        LlmProvider::OpenAi => Ok(LlmModelConfig {
            provider: LlmProvider::OpenAi,
            model: std::env::var("OPENAI_MODEL_FAST").unwrap_or_else(|_| "gpt-4o-mini".into()),
            endpoint: std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| "https://api.openai.com".into()),
            api_key: Some(must_env("OPENAI_API_KEY")?),
            max_tokens: max_tokens(),
            temperature: Some(0.4),
            top_p: None,
            timeout_secs: Some(120),
        }),
    }
}

pub fn config_slow() -> LlmResult<Option<LlmModelConfig>> {
    match provider_from_env() {
        LlmProvider::Ollama => Ok(std::env::var("OLLAMA_MODEL_SLOW").ok().map(|model| LlmModelConfig {
            provider: LlmProvider::Ollama,
            model,
            endpoint: std::env::var("OLLAMA_URL").unwrap_or_else(|_| "http://localhost:11434".into()),
            api_key: None,
            max_tokens: max_tokens(),
            temperature: Some(0.2),
            top_p: None,
            timeout_secs: Some(600),
        })),
        LlmProvider::OpenAi => Ok(std::env::var("OPENAI_MODEL_SLOW").ok().map(|model| LlmModelConfig {
            provider: LlmProvider::OpenAi,
            model,
            endpoint: std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| "https://api.openai.com".into()),
            api_key: std::env::var("OPENAI_API_KEY").ok(),
            max_tokens: max_tokens(),
            temperature: Some(0.2),
            top_p: None,
            timeout_secs: Some(600),
        })),
    }
}

pub fn config_embedding() -> LlmResult<LlmModelConfig> {
    match provider_from_env() {
        LlmProvider::Ollama => Ok(LlmModelConfig {
            provider: LlmProvider::Ollama,
            model: std::env::var("EMBEDDING_MODEL").unwrap_or_else(|_| "nomic-embed-text".into()),
            endpoint: std::env::var("OLLAMA_URL").unwrap_or_else(|_| "http://localhost:11434".into()),
            api_key: None,
            max_tokens: None,
            temperature: Some(0.0),
            top_p: None,
            timeout_secs: Some(30),
        }),
        LlmProvider::OpenAi => Ok(LlmModelConfig {
            provider: LlmProvider::OpenAi,
            model: std::env::var("OPENAI_EMBEDDING_MODEL").unwrap_or_else(|_| "text-embedding-3-small".into()),
            endpoint: std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| "https://api.openai.com".into()),
            api_key: Some(must_env("OPENAI_API_KEY")?),
            max_tokens: None,
            temperature: None,
            top_p: None,
            timeout_secs: Some(30),
        }),
    }
}

fn must_env(name: &'static str) -> LlmResult<String> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or(Error::Config(ConfigError::MissingVar(name)))
}
