use serde::{Deserialize, Serialize};

/// Emitted during `full_index`/`incremental_update` so a caller can drive a
/// progress bar or publish to the Progress Bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexStep {
    Parsing,
    Embedding,
    Done,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexProgress {
    pub step: IndexStep,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edge_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl IndexProgress {
    pub fn parsing(file: impl Into<String>, progress: usize, total: usize) -> Self {
        Self { step: IndexStep::Parsing, file: Some(file.into()), progress: Some(progress), total: Some(total), symbol_count: None, edge_count: None, duration_ms: None, message: None }
    }

    pub fn embedding(progress: usize, total: usize) -> Self {
        Self { step: IndexStep::Embedding, file: None, progress: Some(progress), total: Some(total), symbol_count: None, edge_count: None, duration_ms: None, message: None }
    }

    pub fn done(symbol_count: usize, edge_count: usize, duration_ms: u64) -> Self {
        Self { step: IndexStep::Done, file: None, progress: None, total: None, symbol_count: Some(symbol_count), edge_count: Some(edge_count), duration_ms: Some(duration_ms), message: None }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { step: IndexStep::Error, file: None, progress: None, total: None, symbol_count: None, edge_count: None, duration_ms: None, message: Some(message.into()) }
    }
}

/// Returned by `full_index`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct IndexStats {
    pub symbol_count: usize,
    pub edge_count: usize,
    pub file_count: usize,
    pub duration_ms: u64,
}
