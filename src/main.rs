//! Gleaner main entry point
//!
//! This is the command-line interface for the Gleaner crawler.

use anyhow::Context;
use clap::Parser;
use gleaner::config::{self, Config};
use gleaner::crawler::{crawl, CrawlController, CrawlSummary};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Config file consulted when `--config` is not given. Missing is fine,
/// defaults apply.
const DEFAULT_CONFIG_PATH: &str = "gleaner.toml";

/// Gleaner: a polite breadth-first crawler
///
/// Gleaner crawls outward from seed URLs while respecting robots.txt and
/// per-site rate limits, extracts readable article text, and stores it in
/// a full-text-searchable SQLite corpus.
#[derive(Parser, Debug)]
#[command(name = "gleaner")]
#[command(version)]
#[command(about = "A polite crawler feeding a full-text document corpus", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults apply when omitted)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Path to a JSON seed file
    #[arg(
        long,
        value_name = "FILE",
        required_unless_present_any = ["process_pending", "stats"]
    )]
    seeds: Option<PathBuf>,

    /// Resume stored pending, interrupted, and retryable entries instead
    /// of reading seeds
    #[arg(long, conflicts_with = "seeds")]
    process_pending: bool,

    /// Cap on how many stored entries a --process-pending run picks up
    #[arg(long, value_name = "N", requires = "process_pending")]
    pending_limit: Option<u32>,

    /// Override the configured discovery depth
    #[arg(long, value_name = "DEPTH")]
    depth: Option<u32>,

    /// Override the configured page budget
    #[arg(long, value_name = "N")]
    max_pages: Option<u64>,

    /// Follow links onto domains outside the seed set
    #[arg(long)]
    cross_domain: bool,

    /// Show statistics from the database and exit
    #[arg(long, conflicts_with_all = ["dry_run", "process_pending", "seeds"])]
    stats: bool,

    /// Validate config and seeds and show what would be crawled without
    /// fetching anything
    #[arg(long, conflicts_with_all = ["stats", "process_pending"])]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load configuration. An explicitly named file must exist; the default
    // path may be absent.
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            config::load_config(path)
                .with_context(|| format!("failed to load config from {}", path.display()))?
        }
        None => config::load_config_or_default(Path::new(DEFAULT_CONFIG_PATH))
            .context("failed to load default configuration")?,
    };

    apply_overrides(&mut config, &cli);
    config::validate(&config).context("configuration invalid after command-line overrides")?;

    // Handle different modes
    if cli.stats {
        handle_stats(&config)?;
    } else if cli.dry_run {
        let seeds_path = cli.seeds.as_deref().context("a seed file is required")?;
        handle_dry_run(&config, seeds_path)?;
    } else if cli.process_pending {
        handle_process_pending(config, cli.pending_limit).await?;
    } else {
        // clap guarantees seeds is present on this path
        let seeds_path = cli.seeds.clone().context("a seed file is required")?;
        handle_crawl(config, &seeds_path).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("gleaner=info,warn"),
            1 => EnvFilter::new("gleaner=debug,info"),
            2 => EnvFilter::new("gleaner=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Applies command-line overrides onto the loaded configuration
fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(depth) = cli.depth {
        config.crawler.discover_depth = depth;
    }
    if let Some(max_pages) = cli.max_pages {
        config.crawler.max_pages = Some(max_pages);
    }
    if cli.cross_domain {
        config.crawler.allow_cross_domain = true;
    }
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    use gleaner::output::{load_statistics, print_statistics};
    use gleaner::storage::SqliteStorage;

    println!("Database: {}\n", config.output.database_path);

    let storage = SqliteStorage::new(Path::new(&config.output.database_path))?;
    let stats = load_statistics(&storage)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the --dry-run mode: validates config and seeds, opens the store,
/// fetches nothing
fn handle_dry_run(config: &Config, seeds_path: &Path) -> anyhow::Result<()> {
    use gleaner::storage::SqliteStorage;

    println!("=== Gleaner Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Discover depth: {}", config.crawler.discover_depth);
    println!("  Cross-domain: {}", config.crawler.allow_cross_domain);
    match config.crawler.max_pages {
        Some(n) => println!("  Max pages: {}", n),
        None => println!("  Max pages: unlimited"),
    }
    println!("  Workers: {}", config.crawler.max_workers);
    match config.crawler.deadline_secs {
        Some(secs) => println!("  Deadline: {}s", secs),
        None => println!("  Deadline: none"),
    }

    println!("\nPoliteness:");
    println!("  Min interval: {}ms", config.politeness.min_interval_ms);
    println!("  Burst: {}", config.politeness.burst);
    println!(
        "  Max crawl-delay honored: {}s",
        config.politeness.max_crawl_delay_secs
    );

    println!("\nFetcher:");
    println!(
        "  Request timeout: {}s",
        config.fetcher.request_timeout_secs
    );
    println!(
        "  Connect timeout: {}s",
        config.fetcher.connect_timeout_secs
    );
    println!(
        "  Retries: {} (base delay {}ms)",
        config.fetcher.max_retries, config.fetcher.retry_base_delay_ms
    );

    println!("\nExtraction:");
    println!(
        "  Min content length: {}",
        config.extraction.min_content_length
    );

    println!("\nUser Agent:");
    println!("  {}", config.user_agent_string());

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);

    let seeds = config::load_seeds(seeds_path)
        .with_context(|| format!("failed to load seeds from {}", seeds_path.display()))?;
    println!("\nSeeds ({}):", seeds.len());
    for seed in &seeds {
        match seed.max_depth {
            Some(depth) => println!("  - {} (max depth {})", seed.url, depth),
            None => println!("  - {}", seed.url),
        }
    }

    // Opening the store runs migrations, which is the part worth checking
    // before a long crawl.
    let _storage = SqliteStorage::new(Path::new(&config.output.database_path))?;

    println!("\n✓ Configuration is valid");
    println!("✓ Database reachable at: {}", config.output.database_path);
    println!(
        "✓ Would crawl {} seed URLs to depth {}",
        seeds.len(),
        config.crawler.discover_depth
    );

    Ok(())
}

/// Handles the --process-pending mode: resumes stored frontier entries
async fn handle_process_pending(config: Config, limit: Option<u32>) -> anyhow::Result<()> {
    tracing::info!("Resuming stored frontier entries");

    let digest = config::config_digest(&config);
    let controller = CrawlController::new(config, &digest)?;
    let summary = controller.process_pending(limit).await?;

    log_summary(&summary);
    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, seeds_path: &Path) -> anyhow::Result<()> {
    let seeds = config::load_seeds(seeds_path)
        .with_context(|| format!("failed to load seeds from {}", seeds_path.display()))?;
    tracing::info!(
        "Loaded {} seed URLs from {}",
        seeds.len(),
        seeds_path.display()
    );

    let summary = crawl(config, &seeds).await?;

    log_summary(&summary);
    Ok(())
}

/// Logs the outcome of a finished run. Per-URL failures are part of a
/// successful run; only pre-run errors abort.
fn log_summary(summary: &CrawlSummary) {
    tracing::info!(
        run_id = summary.run_id,
        pages_fetched = summary.pages_fetched,
        pages_failed = summary.pages_failed,
        documents_inserted = summary.documents_inserted,
        documents_updated = summary.documents_updated,
        duplicates_skipped = summary.duplicates_skipped,
        links_discovered = summary.links_discovered,
        elapsed_secs = summary.elapsed.as_secs(),
        stop_cause = ?summary.stop_cause,
        "Crawl finished"
    );

    for (reason, count) in &summary.failed_by_reason {
        tracing::warn!("  {} failures: {}", reason, count);
    }
}
