// ABOUTME: CLI for scraping news articles with the digests-herald scraper.
// ABOUTME: Scrapes one or more URLs and prints JSON (or Markdown) for verification.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use digests_herald::{Article, ArticleCache, Scraper, SelectorTable};
use serde_json::json;
use tracing_subscriber::EnvFilter;

/// Scrape news articles with three extraction strategies and print the best result.
#[derive(Parser, Debug)]
#[command(name = "digests-cli")]
#[command(about = "Scrape news articles with digests-herald and print JSON", long_about = None)]
struct Args {
    /// Article URL(s) to scrape.
    #[arg(required = true)]
    urls: Vec<String>,

    /// Directory holding cached articles.
    #[arg(long, env = "HERALD_CACHE_DIR", default_value = ".herald-cache")]
    cache_dir: PathBuf,

    /// Neither read nor write the cache.
    #[arg(long, default_value_t = false)]
    no_cache: bool,

    /// Maximum number of URLs scraped at once.
    #[arg(long, env = "HERALD_CONCURRENCY", default_value_t = 5)]
    concurrency: usize,

    /// Per-request timeout in seconds.
    #[arg(long, env = "HERALD_TIMEOUT", default_value_t = 10)]
    timeout: u64,

    /// Fetch attempts per URL, including the first.
    #[arg(long, env = "HERALD_RETRIES", default_value_t = 3)]
    retries: u32,

    /// Delay between fetch attempts in milliseconds.
    #[arg(long, env = "HERALD_RETRY_DELAY_MS", default_value_t = 2000)]
    retry_delay_ms: u64,

    /// JSON file replacing the built-in per-domain selector table.
    #[arg(long)]
    selectors: Option<PathBuf>,

    /// Output compact JSON instead of pretty.
    #[arg(long, default_value_t = false)]
    compact: bool,

    /// Render successful articles as Markdown.
    #[arg(long, default_value_t = false)]
    markdown: bool,

    /// Log at debug level.
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();
    init_logging(args.verbose);

    let scraper = build_scraper(&args).await?;
    let articles = if args.urls.len() == 1 {
        vec![scraper.scrape_article(&args.urls[0]).await]
    } else {
        scraper.scrape_multiple(&args.urls).await
    };

    let failed = articles.iter().filter(|a| a.is_failure()).count();
    if args.markdown {
        print_markdown(&articles);
    } else {
        print_json(&articles, args.compact)?;
    }

    Ok(if failed > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn build_scraper(args: &Args) -> Result<Scraper> {
    let mut builder = Scraper::builder()
        .batch_concurrency(args.concurrency)
        .timeout(Duration::from_secs(args.timeout))
        .max_attempts(args.retries)
        .retry_delay(Duration::from_millis(args.retry_delay_ms));

    if let Some(path) = &args.selectors {
        let raw = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("reading selector table {}", path.display()))?;
        let table = SelectorTable::from_json(&raw)
            .with_context(|| format!("parsing selector table {}", path.display()))?;
        builder = builder.selectors(table);
    }

    if !args.no_cache {
        let cache = ArticleCache::open(&args.cache_dir).await?;
        builder = builder.cache(cache);
    }

    Ok(builder.build()?)
}

// Output format:
// - One URL => the article object itself (success or failure shape)
// - Otherwise an envelope with the articles array and counts
fn print_json(articles: &[Article], compact: bool) -> Result<()> {
    let output = match articles {
        [single] => serde_json::to_value(single)?,
        _ => {
            let failed = articles.iter().filter(|a| a.is_failure()).count();
            json!({
                "articles": articles,
                "total": articles.len(),
                "succeeded": articles.len() - failed,
                "failed": failed
            })
        }
    };

    if compact {
        println!("{}", serde_json::to_string(&output)?);
    } else {
        println!("{}", serde_json::to_string_pretty(&output)?);
    }
    Ok(())
}

fn print_markdown(articles: &[Article]) {
    for article in articles {
        match &article.error {
            Some(error) => eprintln!("failed: {}: {}", article.url, error),
            None => println!("{}\n", article.format_markdown()),
        }
    }
}
