//! Ambient LLM transport shared by the Retriever (embeddings) and the
//! Review Runner (fast/slow generation, structured review output).

pub mod config;
mod errors;
mod health_service;
mod review;
mod service_profiles;
mod services;

pub use config::llm_model_config::LlmModelConfig;
pub use config::llm_provider::LlmProvider;
pub use errors::{Error, LlmResult};
pub use health_service::HealthStatus;
pub use review::{ModelComment, ModelReview, ModelSeverity, ModelVerdict};
pub use service_profiles::LlmServiceProfiles;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_fenced_json_review() {
        let raw = "```json\n{\"summary\":\"ok\",\"comments\":[],\"verdict\":\"approve\"}\n```";
        let review = review::parse_model_review(raw).unwrap();
        assert_eq!(review.summary, "ok");
        assert!(matches!(review.verdict, ModelVerdict::Approve));
    }

    #[test]
    fn parses_bare_json_review() {
        let raw = r#"{"summary":"looks good","comments":[{"path":"a.rs","line":3,"body":"nit","severity":"info","confidence":0.9}],"verdict":"comment"}"#;
        let review = review::parse_model_review(raw).unwrap();
        assert_eq!(review.comments.len(), 1);
    }
}
