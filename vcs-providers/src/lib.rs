mod client;
mod config;
mod diff;
mod errors;
mod git_cli;
mod providers;
mod types;

pub use client::ProviderClient;
pub use config::ProviderConfig;
pub use diff::{changed_file_paths, parse_diff, parse_unified_diff_advanced};
pub use errors::{ConfigError, Error, ParseError, ProviderError, VcsResult};
pub use git_cli::get_changed_files_from_git;
pub use providers::{bitbucket::BitbucketClient, github::GitHubClient, gitlab::GitLabClient};
pub use types::{Diff, DiffHunk, DiffLine, FileDiff, FileStatus, PostedComment, ProviderKind, PullRequest, ReviewSubmission, Severity, Verdict};
