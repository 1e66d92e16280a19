//! Default (non-`--server`) mode: builds the same pieces `api::start`
//! wires up, scoped to a single repo, and runs one review in-process.

use std::sync::Arc;

use anyhow::{Context, Result};
use colored::Colorize;
use embedding_adapter::EmbeddingAdapter;
use graph_cache::GraphCache;
use indexer::Indexer;
use llm_service::config::default_config;
use llm_service::LlmServiceProfiles;
use parser_registry::ParserRegistry;
use review_runner::{FeedbackLinkConfig, ReviewOutcome, ReviewRequest, ReviewRunner};
use store::{Store, StoreConfig};
use vcs_providers::{ProviderClient, ProviderConfig};

use api::config::{ReviewConfig, WorkdirConfig};
use api::core::slug::normalize_slug;

use crate::args::Cli;

fn feedback_link_from_env() -> Option<FeedbackLinkConfig> {
    let base_url = std::env::var("FEEDBACK_BASE_URL").ok()?;
    let secret = std::env::var("FEEDBACK_SECRET").ok()?;
    Some(FeedbackLinkConfig { base_url, secret })
}

pub async fn run(cli: &Cli) -> Result<()> {
    let repo_url = cli.repo.as_deref().context("local mode requires --repo")?;
    let repo_id = normalize_slug(repo_url);

    let provider_config = ProviderConfig::from_env(cli.platform.to_provider_kind()).with_context(|| format!("no credentials configured for {}", cli.platform.as_str()))?;
    let vcs = ProviderClient::new(&provider_config);

    let store = Arc::new(Store::connect(&StoreConfig::from_env()).await.context("connecting to store")?);
    store.migrate().await.context("running store migrations")?;

    let parsers = Arc::new(ParserRegistry::with_defaults());
    let fast = default_config::config_fast().context("resolving fast LLM profile")?;
    let slow = default_config::config_slow().context("resolving slow LLM profile")?;
    let embedding = default_config::config_embedding().context("resolving embedding profile")?;
    let llm = Arc::new(LlmServiceProfiles::new(fast, slow, embedding));

    let embeddings = Some(Arc::new(EmbeddingAdapter::new(llm.clone(), store.clone())));
    let indexer = Arc::new(Indexer::new(store.clone(), parsers, embeddings.clone()));
    let graph_cache = Arc::new(GraphCache::new(store.clone(), indexer.clone()));

    let workdir = WorkdirConfig::from_env();
    let repo_path = workdir.root.join(&repo_id);

    if cli.force_full {
        println!("{}", "reindexing repository before review".dimmed());
        let token = Some(provider_config.token.clone());
        let (url, path, branch) = (repo_url.to_string(), repo_path.clone(), cli.base_branch.clone());
        tokio::task::spawn_blocking(move || indexer::clone_or_fetch(&url, &path, &branch, token)).await.context("clone task panicked")?.context("cloning repository")?;

        indexer.full_index(&repo_path, &repo_id, &cli.base_branch, |_| {}).await.context("full index")?;
        graph_cache.evict_repo(&repo_id, Some(&cli.base_branch)).await;
    }

    let review_config = ReviewConfig::from_env();
    let runner = ReviewRunner::new(store.clone(), graph_cache.clone(), llm.clone(), embeddings.clone(), feedback_link_from_env());

    let request = ReviewRequest {
        repo_id,
        pr_number: cli.pr as i64,
        base_branch: cli.base_branch.clone(),
        platform: format!("{:?}", cli.platform.to_provider_kind()),
        dry_run: cli.dry_run,
        incremental_diff: cli.incremental,
        retrieval: review_config.retrieval,
        precision_threshold: review_config.precision_threshold,
    };

    let outcome = runner.execute(request, &vcs).await.context("running review")?;
    print_outcome(&outcome);
    Ok(())
}

fn print_outcome(outcome: &ReviewOutcome) {
    println!("{} verdict={} comments={} review_id={}", "review complete".green().bold(), outcome.verdict.as_str().bold(), outcome.comment_count, outcome.review_id);

    if let Some(comments) = &outcome.comments {
        for comment in comments {
            println!("  {}:{} [{}] {}", comment.path.cyan(), comment.line, comment.severity.as_str().yellow(), comment.body);
        }
    }
}
