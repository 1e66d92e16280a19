//! The structured `generateReview` contract the Review Runner (C8) calls
//! against the **slow** profile. The model is instructed to answer with a
//! single JSON object; a fenced ```json block is tolerated and stripped.

use serde::{Deserialize, Serialize};

use crate::errors::{Error, LlmResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelSeverity {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelVerdict {
    Approve,
    RequestChanges,
    Comment,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelComment {
    pub path: String,
    pub line: u64,
    pub body: String,
    pub severity: ModelSeverity,
    #[serde(default)]
    pub confidence: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelReview {
    pub summary: String,
    #[serde(default)]
    pub comments: Vec<ModelComment>,
    pub verdict: ModelVerdict,
}

/// Strips a leading/trailing markdown code fence (` ```json ... ``` ` or
/// plain ` ``` `) if the model wrapped its JSON in one.
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(after_open) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let after_open = after_open.strip_prefix("json").unwrap_or(after_open);
    let after_open = after_open.trim_start_matches('\n');
    after_open.strip_suffix("```").unwrap_or(after_open).trim()
}

pub fn parse_model_review(raw: &str) -> LlmResult<ModelReview> {
    let body = strip_code_fence(raw);
    serde_json::from_str(body).map_err(|e| Error::InvalidReviewOutput(e.to_string()))
}
