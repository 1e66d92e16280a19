//! Derives a stable `repoId` from a webhook's repository URL or name.
//! Platforms disagree on casing and punctuation for the same repository, so
//! every inbound payload is normalized to one canonical slug before it
//! touches the graph cache, the store, or the per-PR lock.

use std::sync::LazyLock;

use regex::Regex;

static VALID_SLUG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[a-z0-9]+(-[a-z0-9]+)*$").unwrap());

/// Lowercases, trims, and collapses any run of non-alphanumeric characters
/// into a single `-`, dropping leading/trailing separators.
pub fn normalize_slug(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    let mut slug = String::with_capacity(lowered.len());
    let mut prev_dash = true; // swallow a leading separator
    for ch in lowered.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch);
            prev_dash = false;
        } else if !prev_dash {
            slug.push('-');
            prev_dash = true;
        }
    }
    if slug.ends_with('-') {
        slug.pop();
    }
    slug
}

pub fn is_valid_slug(slug: &str) -> bool {
    VALID_SLUG.is_match(slug)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_mixed_case_and_punctuation() {
        assert_eq!(normalize_slug(" Platform NX / Team "), "platform-nx-team");
    }

    #[test]
    fn validates_canonical_slugs_only() {
        assert!(is_valid_slug("platform-nx-team"));
        assert!(is_valid_slug("a1"));
        assert!(!is_valid_slug("platform nx"));
        assert!(!is_valid_slug("Platform-Nx"));
        assert!(!is_valid_slug("platform_nx"));
        assert!(!is_valid_slug("-platform"));
        assert!(!is_valid_slug("platform-"));
    }
}
