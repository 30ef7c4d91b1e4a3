//! aetherforge command-line entry point.
//!
//! Answers one prompt and prints the answer followed by numbered sources.
//! Logging goes to stderr so stdout carries only the answer.

use aetherforge_agent::{Agent, OpenAiChatClient, ToolDispatcher};
use aetherforge_client::{FetchOptions, Fetcher};
use aetherforge_core::{AppConfig, CacheDb};
use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Ask a question; the model may search and fetch pages before answering.
#[derive(Parser, Debug)]
#[command(name = "aetherforge")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Delete every cached page and exit
    #[arg(long)]
    clear_cache: bool,

    /// Override the configured tool-call round limit
    #[arg(long)]
    max_rounds: Option<usize>,

    /// The prompt
    prompt: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load().context("loading configuration")?;

    let cache = CacheDb::open(&config.db_path)
        .await
        .with_context(|| format!("opening cache at {}", config.db_path.display()))?;

    if cli.clear_cache {
        let removed = cache.clear().await?;
        tracing::info!(removed, "cache cleared");
        println!("Cleared {removed} cached page(s).");
        return Ok(());
    }

    let prompt = cli.prompt.join(" ");
    if prompt.trim().is_empty() {
        bail!("no prompt given");
    }

    let fetcher = Fetcher::new(cache, &config.user_agent)?;
    let tools = ToolDispatcher::new(fetcher, FetchOptions::from_config(&config)).with_text_limit(config.tool_text_limit);
    let client = OpenAiChatClient::from_config(&config)?;
    let agent = Agent::new(client, &config.model_name, tools).with_temperature(config.temperature);

    tracing::info!(model = %config.model_name, base_url = %config.base_url, "starting conversation");
    let outcome = agent.chat_with_tools(&prompt, cli.max_rounds.unwrap_or(config.max_rounds)).await?;

    println!("{}", outcome.answer);
    if !outcome.sources.is_empty() {
        println!();
        println!("Sources:");
        for (i, url) in outcome.sources.iter().enumerate() {
            println!("[{}] {}", i + 1, url);
        }
    }

    Ok(())
}
