use clap::Parser;

/// Trigger a single code review, either in-process or by delegating to a
/// running server.
///
/// Local mode (default) clones/loads the repo, builds the review context
/// and calls the model directly, as if this were a one-off webhook
/// delivery. `--server` mode instead POSTs to a running instance's
/// `/api/review` route and prints whatever it returns.
#[derive(Parser, Debug)]
#[command(name = "review", author, version, about)]
pub struct Cli {
    /// Platform the PR lives on.
    #[arg(long, value_enum, default_value = "gitlab")]
    pub platform: Platform,

    /// PR / MR number.
    #[arg(long)]
    pub pr: u64,

    /// Repository identifier.
    ///
    /// In local mode this is the clone URL; the repo id stored alongside
    /// the graph is derived from it. In `--server` mode this must already
    /// be the server's canonical repo id — use `--repo-id` instead.
    #[arg(long)]
    pub repo: Option<String>,

    #[arg(long = "base-branch")]
    pub base_branch: String,

    /// Run the model and print what would be posted, without writing a
    /// review row or calling the platform API.
    #[arg(long)]
    pub dry_run: bool,

    /// Compare against the PR's last reviewed iteration instead of the
    /// full diff. Ignored on platforms without an iteration concept.
    #[arg(long)]
    pub incremental: bool,

    /// Re-clone and fully reindex the repo before reviewing, instead of
    /// reusing whatever is cached.
    #[arg(long)]
    pub force_full: bool,

    /// Base URL of a running server to delegate to, e.g.
    /// `https://reviews.example.com`. When set, this process does no
    /// indexing or model calls of its own.
    #[arg(long)]
    pub server: Option<String>,

    /// Shared secret matching the server's `TRIGGER_API_KEY`. Required
    /// with `--server`.
    #[arg(long)]
    pub api_key: Option<String>,

    /// Canonical repo id as already known to the server. Required with
    /// `--server`; ignored otherwise.
    #[arg(long = "repo-id")]
    pub repo_id: Option<String>,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
pub enum Platform {
    Gitlab,
    Github,
    Bitbucket,
}

impl Platform {
    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Gitlab => "gitlab",
            Platform::Github => "github",
            Platform::Bitbucket => "bitbucket",
        }
    }

    pub fn to_provider_kind(self) -> vcs_providers::ProviderKind {
        match self {
            Platform::Gitlab => vcs_providers::ProviderKind::GitLab,
            Platform::Github => vcs_providers::ProviderKind::GitHub,
            Platform::Bitbucket => vcs_providers::ProviderKind::Bitbucket,
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn parses_minimal_local_invocation() {
        let cli = Cli::parse_from(["review", "--pr", "7", "--repo", "git@gitlab.com:acme/widgets.git", "--base-branch", "main"]);
        assert_eq!(cli.pr, 7);
        assert!(!cli.dry_run);
        assert!(cli.server.is_none());
        assert!(matches!(cli.platform, Platform::Gitlab));
    }

    #[test]
    fn parses_server_delegate_invocation() {
        let cli = Cli::parse_from([
            "review", "--pr", "7", "--base-branch", "main", "--server", "https://reviews.example.com", "--api-key", "secret", "--repo-id", "acme-widgets", "--platform", "github",
        ]);
        assert_eq!(cli.server.as_deref(), Some("https://reviews.example.com"));
        assert_eq!(cli.repo_id.as_deref(), Some("acme-widgets"));
        assert!(matches!(cli.platform, Platform::Github));
    }
}
