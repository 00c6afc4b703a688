use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use owo_colors::OwoColorize;
use time::{Date, OffsetDateTime};
use tracing::debug;
use tracing_subscriber::EnvFilter;
use ttharvest_core::batch::DEFAULT_API_URL;
use ttharvest_core::{
    Blocklist, CrawlReport, Document, FetchConfig, HarvestConfig, HttpSource, ListingCrawl, PagedCrawl,
    PreprocessConfig, SectionCrawl, crawl_listing, crawl_pages, crawl_section, fetch_file, fetch_stdin, fetch_url,
    harvest_links, submit_batch,
};
use url::Url;

mod echo;

use echo::{format_size, print_banner, print_error, print_info, print_report, print_step, print_success, print_warning};

const VERSION: &str = env!("CARGO_PKG_VERSION");

const CRAWL_TIMEOUT_SECS: u64 = 15;
const SUBMIT_TIMEOUT_SECS: u64 = 600;

/// Output format for harvested links
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LinkFormat {
    Text,
    Json,
}

impl FromStr for LinkFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Invalid format: {}. Valid options: text, json", s)),
        }
    }
}

/// Harvest table-tennis coaching articles into batch files
#[derive(Parser, Debug)]
#[command(name = "ttharvest")]
#[command(author = "ttharvest contributors")]
#[command(version = VERSION)]
#[command(about = "Harvest table-tennis coaching articles", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// HTTP timeout in seconds (default: 15, or 600 for submit)
    #[arg(long, global = true, value_name = "SECS")]
    timeout: Option<u64>,

    /// Custom User-Agent for HTTP requests
    #[arg(long, global = true, value_name = "UA")]
    user_agent: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the links between two section markers of a page
    Links(LinksArgs),
    /// Crawl the TableTennisCoaching.com articles index
    Articles(ArticlesArgs),
    /// Crawl the TableTennisCoaching.com Tip of the Week archive
    Tips(TipsArgs),
    /// Crawl the PingSkills blog
    Pingskills(PingskillsArgs),
    /// Post a batch file to the processing server
    Submit(SubmitArgs),
}

#[derive(Args, Debug)]
struct LinksArgs {
    /// URL to fetch, local HTML file, or "-" for stdin
    #[arg(value_name = "INPUT")]
    input: String,

    /// Section label to start after
    #[arg(long, value_name = "LABEL")]
    start: String,

    /// Section label to stop before (default: end of page)
    #[arg(long, value_name = "LABEL")]
    stop: Option<String>,

    /// Base URL for relative links (default: the input URL)
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Blocked host; repeat to block several (default: social/video sites)
    #[arg(long = "block", value_name = "HOST")]
    blocked: Vec<String>,

    /// Keep at most this many links
    #[arg(long, value_name = "NUM")]
    max_links: Option<usize>,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text", value_name = "FORMAT")]
    format: LinkFormat,
}

#[derive(Args, Debug)]
struct ArticlesArgs {
    /// Batch file to write
    #[arg(short, long, default_value = "ttc_batch_for_gpt.txt", value_name = "FILE")]
    output: PathBuf,

    /// File listing the external links that were not fetched
    #[arg(long, default_value = "ttc_skipped_external_links.txt", value_name = "FILE")]
    skipped: PathBuf,

    /// Keep at most this many links
    #[arg(long, value_name = "NUM")]
    max_links: Option<usize>,

    /// Delay between requests in seconds
    #[arg(long, value_name = "SECS")]
    pause: Option<f64>,

    /// Write the cleaned index page and marker labels to this directory
    #[arg(long, value_name = "DIR")]
    debug: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct TipsArgs {
    /// Batch file to write
    #[arg(short, long, default_value = "ttc_tip_of_the_week_for_gpt.txt", value_name = "FILE")]
    output: PathBuf,

    /// Stop after this many index pages
    #[arg(long, value_name = "NUM")]
    max_pages: Option<usize>,

    /// Delay between requests in seconds
    #[arg(long, value_name = "SECS")]
    pause: Option<f64>,
}

#[derive(Args, Debug)]
struct PingskillsArgs {
    /// Batch file to write
    #[arg(short, long, default_value = "batch_for_gpt.txt", value_name = "FILE")]
    output: PathBuf,

    /// Keep at most this many links
    #[arg(long, value_name = "NUM")]
    max_links: Option<usize>,

    /// Delay between requests in seconds
    #[arg(long, value_name = "SECS")]
    pause: Option<f64>,
}

#[derive(Args, Debug)]
struct SubmitArgs {
    /// Batch file to post
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Processing endpoint
    #[arg(long, default_value = DEFAULT_API_URL, value_name = "URL")]
    api_url: String,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if cli.verbose {
        print_banner();
        print_info("Debug logging enabled");
        eprintln!();
    }

    if let Err(e) = run(cli).await {
        print_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let fetch_config = |default_timeout: u64| {
        let defaults = FetchConfig::default();
        FetchConfig {
            timeout: cli.timeout.unwrap_or(default_timeout),
            user_agent: cli.user_agent.clone().unwrap_or(defaults.user_agent),
        }
    };

    match cli.command {
        Command::Links(ref args) => links(args, &fetch_config(CRAWL_TIMEOUT_SECS), cli.verbose).await,
        Command::Articles(ref args) => articles(args, fetch_config(CRAWL_TIMEOUT_SECS)).await,
        Command::Tips(ref args) => tips(args, fetch_config(CRAWL_TIMEOUT_SECS)).await,
        Command::Pingskills(ref args) => pingskills(args, fetch_config(CRAWL_TIMEOUT_SECS)).await,
        Command::Submit(ref args) => submit(args, fetch_config(SUBMIT_TIMEOUT_SECS)).await,
    }
}

async fn links(args: &LinksArgs, config: &FetchConfig, verbose: bool) -> anyhow::Result<()> {
    let is_url = args.input.starts_with("http://") || args.input.starts_with("https://");

    if verbose {
        print_step(1, 3, "Reading page");
    }
    let html = if args.input == "-" {
        fetch_stdin().context("Failed to read from stdin")?
    } else if is_url {
        fetch_url(&args.input, config).await.context("Failed to fetch URL")?
    } else {
        fetch_file(&args.input).with_context(|| format!("Failed to read file: {}", args.input))?
    };
    debug!(input = %args.input, bytes = html.len(), "read page");
    if verbose {
        eprintln!("  {} {}", "Size:".dimmed(), format_size(html.len()).bright_white());
    }

    let base = match (&args.base_url, is_url) {
        (Some(base), _) => Some(Url::parse(base).with_context(|| format!("Invalid base URL: {base}"))?),
        (None, true) => Some(Url::parse(&args.input).context("Invalid input URL")?),
        (None, false) => None,
    };

    if verbose {
        print_step(2, 3, "Parsing HTML document");
    }
    let doc = Document::parse_with_preprocessing(&html, base, &PreprocessConfig::default())
        .context("Failed to parse HTML")?;
    if verbose && let Some(title) = doc.title() {
        eprintln!("  {} {}", "Title:".dimmed(), title.bright_white());
    }

    let mut builder = HarvestConfig::builder(args.start.clone());
    if let Some(stop) = &args.stop {
        builder = builder.stop_label(stop.clone());
    }
    if !args.blocked.is_empty() {
        builder = builder.blocked_hosts(Blocklist::new(&args.blocked));
    }
    if let Some(max) = args.max_links {
        builder = builder.max_links(max);
    }

    if verbose {
        print_step(3, 3, "Harvesting section links");
    }
    let config = builder.build();
    debug!(start = %config.start_label, stop = ?config.stop_label, "harvesting section");
    let links = harvest_links(&doc, &config).context("Failed to harvest links")?;
    debug!(count = links.len(), "harvested section links");
    if links.is_empty() {
        print_warning("No links found in the section");
    }

    let output = match args.format {
        LinkFormat::Text => links.iter().map(|url| format!("{url}\n")).collect::<String>(),
        LinkFormat::Json => {
            let urls: Vec<&str> = links.iter().map(Url::as_str).collect();
            serde_json::to_string_pretty(&urls).context("Failed to serialize links")? + "\n"
        }
    };
    print!("{output}");

    Ok(())
}

async fn articles(args: &ArticlesArgs, config: FetchConfig) -> anyhow::Result<()> {
    let source = HttpSource::new(config).context("Failed to build HTTP client")?;
    let defaults = SectionCrawl::default();
    let crawl = SectionCrawl {
        max_links: args.max_links,
        pause: pause_or(args.pause, defaults.pause),
        debug_dir: args.debug.clone(),
        ..defaults
    };

    print_step(1, 2, &format!("Crawling {}", crawl.index_url.bright_white().underline()));
    let mut out = create_output(&args.output)?;
    let report = crawl_section(&source, &crawl, today(), &mut out)
        .await
        .context("Articles crawl failed")?;
    out.flush().context("Failed to flush output")?;

    print_step(2, 2, "Recording external links");
    write_skipped(&report, &args.skipped)?;
    print_report(&report, &args.output);

    Ok(())
}

async fn tips(args: &TipsArgs, config: FetchConfig) -> anyhow::Result<()> {
    let source = HttpSource::new(config).context("Failed to build HTTP client")?;
    let defaults = PagedCrawl::default();
    let crawl = PagedCrawl { max_pages: args.max_pages, pause: pause_or(args.pause, defaults.pause), ..defaults };

    print_step(1, 1, &format!("Crawling {}", crawl.page_url(0).bright_white().underline()));
    let mut out = create_output(&args.output)?;
    let report = crawl_pages(&source, &crawl, today(), &mut out)
        .await
        .context("Tip of the Week crawl failed")?;
    out.flush().context("Failed to flush output")?;
    print_report(&report, &args.output);

    Ok(())
}

async fn pingskills(args: &PingskillsArgs, config: FetchConfig) -> anyhow::Result<()> {
    let source = HttpSource::new(config).context("Failed to build HTTP client")?;
    let defaults = ListingCrawl::default();
    let crawl = ListingCrawl { max_links: args.max_links, pause: pause_or(args.pause, defaults.pause), ..defaults };

    print_step(1, 1, &format!("Crawling {}", crawl.index_url.bright_white().underline()));
    let mut out = create_output(&args.output)?;
    let report = crawl_listing(&source, &crawl, today(), &mut out)
        .await
        .context("PingSkills crawl failed")?;
    out.flush().context("Failed to flush output")?;
    print_report(&report, &args.output);

    Ok(())
}

async fn submit(args: &SubmitArgs, config: FetchConfig) -> anyhow::Result<()> {
    let source = HttpSource::new(config).context("Failed to build HTTP client")?;

    print_step(1, 1, &format!("Posting {} to {}", args.input.display(), args.api_url.bright_white()));
    let submissions = submit_batch(source.client(), &args.input, &args.api_url)
        .await
        .with_context(|| format!("Failed to submit {}", args.input.display()))?;

    for submission in &submissions {
        debug!(
            article_id = %submission.article_id,
            http_status = submission.http_status,
            api_status = ?submission.api_status,
            "submission finished"
        );
    }
    let ok = submissions.iter().filter(|s| s.api_status.as_deref() == Some("ok")).count();
    if ok == submissions.len() {
        print_success(&format!("Processed {} articles", ok));
    } else {
        print_warning(&format!("Processed {} of {} articles", ok, submissions.len()));
    }

    Ok(())
}

fn create_output(path: &Path) -> anyhow::Result<BufWriter<File>> {
    let file = File::create(path).with_context(|| format!("Failed to create output file: {}", path.display()))?;
    Ok(BufWriter::new(file))
}

fn write_skipped(report: &CrawlReport, path: &Path) -> anyhow::Result<()> {
    if report.external.is_empty() {
        return Ok(());
    }
    let listing: String = report.external.iter().map(|url| format!("{url}\n")).collect();
    fs::write(path, listing).with_context(|| format!("Failed to write to file: {}", path.display()))?;
    print_info(&format!("Saved {} external links to {}", report.external.len(), path.display()));
    Ok(())
}

fn pause_or(secs: Option<f64>, default: Duration) -> Duration {
    secs.filter(|s| s.is_finite() && *s >= 0.0).map_or(default, Duration::from_secs_f64)
}

fn today() -> Date {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc()).date()
}
