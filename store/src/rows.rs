//! Row-shaped types exchanged with callers outside of the symbol/edge model
//! (which already has its own wire type in `symbol_graph`).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "warning" => Severity::Warning,
            "error" => Severity::Error,
            _ => Severity::Info,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Approve,
    RequestChanges,
    Comment,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Approve => "approve",
            Verdict::RequestChanges => "request_changes",
            Verdict::Comment => "comment",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "approve" => Verdict::Approve,
            "request_changes" => Verdict::RequestChanges,
            _ => Verdict::Comment,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewRow {
    pub review_id: Uuid,
    pub repo_id: String,
    pub pr_number: i64,
    pub verdict: Verdict,
    pub comment_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentRow {
    pub id: Uuid,
    pub review_id: Uuid,
    pub repo_id: String,
    pub pr_number: i64,
    pub path: String,
    pub line: i64,
    pub body: String,
    pub severity: Severity,
    pub confidence: Option<f64>,
    pub embedding: Option<Vec<f32>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackSignal {
    Accepted,
    Rejected,
}

impl FeedbackSignal {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedbackSignal::Accepted => "accepted",
            FeedbackSignal::Rejected => "rejected",
        }
    }
}
