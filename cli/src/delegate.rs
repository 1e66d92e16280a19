//! `--server` mode: shells out to a running instance's `/api/review`
//! route instead of doing any work locally.

use anyhow::{bail, Context, Result};
use colored::Colorize;
use serde_json::{json, Value};

use crate::args::Cli;

fn trigger_body(cli: &Cli, repo_id: &str) -> Value {
    json!({
        "platform": cli.platform.as_str(),
        "repo": repo_id,
        "pr": cli.pr,
        "base_branch": cli.base_branch,
        "dry_run": cli.dry_run,
        "incremental": cli.incremental,
        "force_full": cli.force_full,
    })
}

fn trigger_url(server: &str) -> String {
    format!("{}/api/review", server.trim_end_matches('/'))
}

pub async fn run(cli: &Cli, server: &str) -> Result<()> {
    let api_key = cli.api_key.as_deref().context("--server requires --api-key")?;
    let repo_id = cli.repo_id.as_deref().context("--server requires --repo-id")?;

    let body = trigger_body(cli, repo_id);
    let url = trigger_url(server);
    let client = reqwest::Client::new();
    let response = client.post(&url).header("X-Api-Key", api_key).json(&body).send().await.with_context(|| format!("request to {url} failed"))?;

    let status = response.status();
    let payload: Value = response.json().await.unwrap_or_else(|_| json!({}));

    if !status.is_success() {
        bail!("server returned {status}: {payload}");
    }

    print_outcome(&payload);
    Ok(())
}

fn print_outcome(payload: &Value) {
    let verdict = payload.get("verdict").and_then(Value::as_str).unwrap_or("unknown");
    let count = payload.get("comment_count").and_then(Value::as_u64).unwrap_or(0);
    let review_id = payload.get("review_id").and_then(Value::as_str).unwrap_or("");

    println!("{} verdict={} comments={} review_id={}", "review complete".green().bold(), verdict.bold(), count, review_id);

    if let Some(comments) = payload.get("comments").and_then(Value::as_array) {
        for comment in comments {
            let path = comment.get("path").and_then(Value::as_str).unwrap_or("?");
            let line = comment.get("line").and_then(Value::as_u64).unwrap_or(0);
            let severity = comment.get("severity").and_then(Value::as_str).unwrap_or("comment");
            let body = comment.get("body").and_then(Value::as_str).unwrap_or("");
            println!("  {}:{} [{}] {}", path.cyan(), line, severity.yellow(), body);
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once(&"review").chain(args).collect::<Vec<_>>())
    }

    #[test]
    fn trigger_url_strips_trailing_slash() {
        assert_eq!(trigger_url("https://reviews.example.com/"), "https://reviews.example.com/api/review");
        assert_eq!(trigger_url("https://reviews.example.com"), "https://reviews.example.com/api/review");
    }

    #[test]
    fn trigger_body_carries_repo_id_not_repo_url() {
        let cli = parse(&["--pr", "42", "--base-branch", "main", "--server", "https://x", "--api-key", "k", "--repo-id", "acme-widgets"]);
        let body = trigger_body(&cli, "acme-widgets");
        assert_eq!(body["repo"], "acme-widgets");
        assert_eq!(body["pr"], 42);
        assert_eq!(body["platform"], "gitlab");
    }
}
