//! Per-platform webhook authentication. GitHub signs the raw body with
//! HMAC-SHA256 and sends it as `X-Hub-Signature-256: sha256=<hex>`; GitLab
//! and Bitbucket instead compare a shared secret sent verbatim in a header
//! (`X-Gitlab-Token` / `X-Hub-Signature`, folded here to one name so the
//! route handler doesn't need to branch on it twice).

use hmac::{Hmac, Mac};
use sha2::Sha256;
use vcs_providers::ProviderKind;

type HmacSha256 = Hmac<Sha256>;

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

fn verify_hmac_signature(secret: &str, body: &[u8], header_value: &str) -> bool {
    let Some(hex_sig) = header_value.strip_prefix("sha256=") else {
        return false;
    };
    let Ok(expected) = hex::decode(hex_sig) else {
        return false;
    };

    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => return false,
    };
    mac.update(body);
    constant_time_eq(&mac.finalize().into_bytes(), &expected)
}

fn verify_shared_secret(secret: &str, header_value: &str) -> bool {
    constant_time_eq(secret.as_bytes(), header_value.as_bytes())
}

/// `headers` is whatever header the caller found for this platform
/// (`X-Hub-Signature-256` for GitHub, `X-Gitlab-Token`/`X-Hub-Signature`
/// otherwise); `None` means the header was absent.
pub fn verify_webhook(kind: ProviderKind, secret: &str, body: &[u8], header_value: Option<&str>) -> bool {
    let Some(header_value) = header_value else {
        return false;
    };
    match kind {
        ProviderKind::GitHub => verify_hmac_signature(secret, body, header_value),
        ProviderKind::GitLab | ProviderKind::Bitbucket => verify_shared_secret(secret, header_value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn github_requires_a_matching_sha256_prefixed_signature() {
        let secret = "s3cr3t";
        let body = b"{\"action\":\"opened\"}";
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(body);
        let sig = format!("sha256={}", hex::encode(mac.finalize().into_bytes()));

        assert!(verify_webhook(ProviderKind::GitHub, secret, body, Some(&sig)));
        assert!(!verify_webhook(ProviderKind::GitHub, secret, body, Some("sha256=deadbeef")));
        assert!(!verify_webhook(ProviderKind::GitHub, secret, body, None));
    }

    #[test]
    fn gitlab_compares_the_shared_secret_verbatim() {
        assert!(verify_webhook(ProviderKind::GitLab, "topsecret", b"ignored", Some("topsecret")));
        assert!(!verify_webhook(ProviderKind::GitLab, "topsecret", b"ignored", Some("wrong")));
    }
}
