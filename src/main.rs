//! Books-Catalog main entry point
//!
//! This is the command-line interface for the bookstore scraper and its
//! read-only query service.

use anyhow::Context as _;
use books_catalog::config::load_config_with_hash;
use books_catalog::output::{print_statistics, CatalogStatistics};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Books-Catalog: scrape a bookstore into a CSV catalog and serve it
///
/// By default a full crawl is run and the catalog file is replaced. Each run
/// is a complete re-crawl; any page fetch failure aborts it without touching
/// the existing catalog.
#[derive(Parser, Debug)]
#[command(name = "books-catalog")]
#[command(version)]
#[command(about = "Bookstore scraper and catalog query service", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without crawling
    #[arg(long, conflicts_with_all = ["stats", "serve"])]
    dry_run: bool,

    /// Show statistics for the existing catalog file and exit
    #[arg(long, conflicts_with_all = ["dry_run", "serve"])]
    stats: bool,

    /// Serve the existing catalog file over HTTP
    #[arg(long, conflicts_with_all = ["dry_run", "stats"])]
    serve: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_logging(cli.verbose, cli.quiet);

    if let Err(err) = try_main(cli).await {
        tracing::error!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

async fn try_main(cli: Cli) -> anyhow::Result<()> {
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config).context("load config")?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.stats {
        handle_stats(Path::new(&config.output.catalog_path)).context("stats")?;
    } else if cli.serve {
        books_catalog::query::serve(&config)
            .await
            .context("serve")?;
    } else {
        handle_crawl(&config).await.context("crawl")?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("books_catalog=info,warn"),
            1 => EnvFilter::new("books_catalog=debug,info"),
            2 => EnvFilter::new("books_catalog=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Handles the --dry-run mode: shows the effective configuration
fn handle_dry_run(config: &books_catalog::Config) {
    println!("=== Books-Catalog Dry Run ===\n");

    println!("Site:");
    println!("  Base URL: {}", config.site.base_url);
    println!("  Image base URL: {}", config.site.image_base_url);
    println!("  Page encoding: {}", config.site.page_encoding);

    println!("\nCrawler:");
    println!("  Request timeout: {}s", config.crawler.request_timeout);
    println!(
        "  Image failure policy: {:?}",
        config.crawler.image_failure_policy
    );
    println!("  Image naming: {:?}", config.crawler.image_naming);

    println!("\nUser Agent:");
    println!("  Name: {}", config.user_agent.crawler_name);
    println!("  Version: {}", config.user_agent.crawler_version);

    println!("\nOutput:");
    println!("  Catalog: {}", config.output.catalog_path);
    println!("  Images: {}", config.output.image_dir);

    println!("\n✓ Configuration is valid");
    println!("✓ Would crawl every category listed at {}", config.site.base_url);
}

/// Handles the --stats mode: reads the catalog file and prints statistics
fn handle_stats(catalog_path: &Path) -> anyhow::Result<()> {
    println!("Catalog: {}\n", catalog_path.display());
    let records = books_catalog::catalog::read_catalog(catalog_path)
        .with_context(|| format!("read catalog {}", catalog_path.display()))?;
    print_statistics(&CatalogStatistics::from_records(&records));
    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: &books_catalog::Config) -> anyhow::Result<()> {
    tracing::info!("Starting full crawl of {}", config.site.base_url);

    let report = books_catalog::crawler::crawl(config).await?;

    if report.images_missing > 0 {
        tracing::warn!("{} cover images could not be downloaded", report.images_missing);
    }

    let stats = CatalogStatistics::from_records(&report.records);
    tracing::info!(
        "Catalog written to {}: {} books in {} categories",
        config.output.catalog_path,
        stats.total_books,
        stats.books_by_category.len()
    );

    Ok(())
}
