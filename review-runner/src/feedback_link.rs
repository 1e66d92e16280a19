//! Feedback-link minting (spec step 7): each posted comment gets a fresh
//! id and a markdown footer with two HMAC-signed links so a reader can
//! mark it accepted or rejected without authenticating.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

pub const FOOTER_MARKER: &str = "\n\n---\nWas this helpful?";

#[derive(Debug, Clone)]
pub struct FeedbackLinkConfig {
    pub base_url: String,
    pub secret: String,
}

pub fn sign(secret: &str, comment_id: &str, signal: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts key of any length");
    mac.update(format!("{comment_id}:{signal}").as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Constant-time comparison the feedback callback uses to validate an
/// inbound token before trusting `signal`.
pub fn verify(secret: &str, comment_id: &str, signal: &str, token: &str) -> bool {
    let expected = sign(secret, comment_id, signal);
    constant_time_eq(expected.as_bytes(), token.as_bytes())
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Mints a fresh comment id and appends a signed footer to `body`. Returns
/// `(comment_id, body_with_footer)`.
pub fn mint(config: &FeedbackLinkConfig, body: &str) -> (Uuid, String) {
    let id = Uuid::new_v4();
    let accepted = sign(&config.secret, &id.to_string(), "accepted");
    let rejected = sign(&config.secret, &id.to_string(), "rejected");

    let footer = format!(
        "{FOOTER_MARKER} [👍]({base}/api/feedback?id={id}&signal=accepted&token={accepted}) [👎]({base}/api/feedback?id={id}&signal=rejected&token={rejected})",
        base = config.base_url,
    );

    (id, format!("{body}{footer}"))
}

/// Removes the footer this module appended, leaving the model's original
/// body — used before embedding a comment or surfacing it as a prior
/// example.
pub fn strip_footer(body: &str) -> &str {
    body.split(FOOTER_MARKER).next().unwrap_or(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mint_then_verify_round_trips() {
        let config = FeedbackLinkConfig { base_url: "https://example.test".into(), secret: "s3cr3t".into() };
        let (id, body) = mint(&config, "looks risky");
        assert!(body.starts_with("looks risky"));
        assert!(body.contains("signal=accepted"));

        let token = sign(&config.secret, &id.to_string(), "accepted");
        assert!(verify(&config.secret, &id.to_string(), "accepted", &token));
        assert!(!verify(&config.secret, &id.to_string(), "rejected", &token));
    }

    #[test]
    fn strip_footer_recovers_original_body() {
        let config = FeedbackLinkConfig { base_url: "https://example.test".into(), secret: "s3cr3t".into() };
        let (_, body) = mint(&config, "original text");
        assert_eq!(strip_footer(&body), "original text");
    }

    #[test]
    fn tampered_token_is_rejected() {
        assert!(!verify("secret", "id1", "accepted", "not-a-real-token"));
    }
}
