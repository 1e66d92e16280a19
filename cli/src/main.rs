mod args;
mod delegate;
mod local;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;

use args::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt().with_env_filter(tracing_subscriber::EnvFilter::from_default_env()).init();

    let cli = Cli::parse();

    let result = match &cli.server {
        Some(server) => delegate::run(&cli, server).await,
        None => local::run(&cli).await,
    };

    if let Err(err) = &result {
        eprintln!("{} {err:#}", "error:".red().bold());
    }

    result
}
