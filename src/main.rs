//! Pantip-Harvest main entry point
//!
//! This is the command-line interface for the Pantip-Harvest fetchers.

use anyhow::Context;
use clap::{Parser, Subcommand};
use pantip_harvest::config::{load_config_with_hash, validate_workers, Config};
use pantip_harvest::progress::{BarProgress, NoProgress, ProgressSink, TracingProgress};
use pantip_harvest::search::result_set;
use pantip_harvest::{
    extract_keyword_ids, CommentFetcher, KeywordCommentMap, ProfileFetcher, SearchFetcher,
    SearchPageResult, UserProfile,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Pantip-Harvest: topic, comment, search and profile retrieval for pantip.com
#[derive(Parser, Debug)]
#[command(name = "pantip-harvest")]
#[command(version)]
#[command(about = "Fetch search results, comments and profiles from pantip.com", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search keywords and write the keyword result set as JSON
    Search {
        #[arg(required = true)]
        keywords: Vec<String>,

        /// Highest page number to request (pages 0..=N)
        #[arg(long)]
        pages: Option<u32>,

        /// Concurrent page requests
        #[arg(long)]
        workers: Option<usize>,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Fetch comments for every topic in a keyword result set file
    Comments {
        /// JSON file produced by `search`
        input: PathBuf,

        /// Concurrent comment batches
        #[arg(long)]
        workers: Option<usize>,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Search keywords, then fetch comments for every topic found
    Harvest {
        #[arg(required = true)]
        keywords: Vec<String>,

        #[arg(long)]
        pages: Option<u32>,

        /// Concurrent requests for both stages
        #[arg(long)]
        workers: Option<usize>,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Fetch user profile pages
    Profile {
        #[arg(required = true)]
        user_ids: Vec<String>,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    // Bar on a terminal, log lines when stderr is piped
    let progress: Arc<dyn ProgressSink> = if cli.quiet {
        Arc::new(NoProgress)
    } else if std::io::stderr().is_terminal() {
        Arc::new(BarProgress::new())
    } else {
        Arc::new(TracingProgress::new())
    };

    let result = match cli.command {
        Command::Search {
            keywords,
            pages,
            workers,
            output,
        } => {
            let config = with_search_overrides(config, pages, workers)?;
            let results = run_searches(&config, &keywords, &progress).await?;
            write_json(&result_set(&results)?, output.as_deref())
        }
        Command::Comments {
            input,
            workers,
            output,
        } => {
            let raw = std::fs::read_to_string(&input)
                .with_context(|| format!("Failed to read {}", input.display()))?;
            let value: serde_json::Value = serde_json::from_str(&raw)
                .with_context(|| format!("Invalid JSON in {}", input.display()))?;
            let workers = worker_override(workers, config.comments.max_workers)?;
            let comments = run_comments(&config, &value, workers, &progress).await?;
            write_json(&comments, output.as_deref())
        }
        Command::Harvest {
            keywords,
            pages,
            workers,
            output,
        } => {
            let config = with_search_overrides(config, pages, workers)?;
            let results = run_searches(&config, &keywords, &progress).await?;
            let set = result_set(&results)?;
            let workers = worker_override(workers, config.comments.max_workers)?;
            let comments = run_comments(&config, &set, workers, &progress).await?;
            write_json(&comments, output.as_deref())
        }
        Command::Profile { user_ids, output } => {
            let profiles = run_profiles(&config, &user_ids).await?;
            write_json(&profiles, output.as_deref())
        }
    };

    if let Err(e) = &result {
        tracing::error!("Run failed: {:#}", e);
    }
    result
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("pantip_harvest=info,warn"),
            1 => EnvFilter::new("pantip_harvest=debug,info"),
            2 => EnvFilter::new("pantip_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

fn with_search_overrides(
    mut config: Config,
    pages: Option<u32>,
    workers: Option<usize>,
) -> anyhow::Result<Config> {
    if let Some(pages) = pages {
        config.search.page_count = pages;
    }
    config.search.max_workers = worker_override(workers, config.search.max_workers)?;
    Ok(config)
}

/// Applies `--workers` over a configured count, with the same bounds as the config file
fn worker_override(workers: Option<usize>, configured: usize) -> anyhow::Result<usize> {
    match workers {
        Some(workers) => {
            validate_workers("--workers", workers)?;
            Ok(workers)
        }
        None => Ok(configured),
    }
}

async fn run_searches(
    config: &Config,
    keywords: &[String],
    progress: &Arc<dyn ProgressSink>,
) -> anyhow::Result<Vec<SearchPageResult>> {
    let mut results = Vec::with_capacity(keywords.len());

    for keyword in keywords {
        let fetcher =
            SearchFetcher::from_config(config, keyword.as_str())?.with_progress(Arc::clone(progress));
        let result = fetcher.fetch_all().await;
        tracing::info!(
            "Search '{}' returned {} pages (total results: {})",
            keyword,
            result.pages.len(),
            result
                .total_results
                .as_ref()
                .map(|t| t.to_string())
                .unwrap_or_else(|| "unknown".to_string())
        );
        results.push(result);
    }

    Ok(results)
}

async fn run_comments(
    config: &Config,
    result_set: &serde_json::Value,
    workers: usize,
    progress: &Arc<dyn ProgressSink>,
) -> anyhow::Result<KeywordCommentMap> {
    let index = extract_keyword_ids(result_set);
    let topic_count: usize = index.values().map(Vec::len).sum();
    tracing::info!(
        "Indexed {} keywords with {} topic ids",
        index.len(),
        topic_count
    );

    let fetcher = CommentFetcher::from_config(config)?.with_progress(Arc::clone(progress));
    let comments = fetcher.fetch_all(&index, workers).await;

    let fetched: usize = comments.values().map(|c| c.len()).sum();
    tracing::info!("Fetched comments for {}/{} topics", fetched, topic_count);
    Ok(comments)
}

async fn run_profiles(
    config: &Config,
    user_ids: &[String],
) -> anyhow::Result<BTreeMap<String, UserProfile>> {
    let fetcher = ProfileFetcher::from_config(config)?;
    let mut profiles = BTreeMap::new();

    for user_id in user_ids {
        match fetcher.fetch(user_id).await {
            Ok(profile) => {
                profiles.insert(user_id.clone(), profile);
            }
            Err(e) => {
                tracing::warn!("Skipping profile {}: {}", user_id, e);
            }
        }
    }

    Ok(profiles)
}

/// Writes pretty-printed JSON to a file, or stdout when no path is given
fn write_json<T: Serialize>(value: &T, output: Option<&Path>) -> anyhow::Result<()> {
    let text = serde_json::to_string_pretty(value)?;

    match output {
        Some(path) => {
            std::fs::write(path, text)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!("Output written to: {}", path.display());
        }
        None => println!("{}", text),
    }

    Ok(())
}
