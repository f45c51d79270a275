use anyhow::Result;
use clap::Parser;
use proxy_harvest::{
    config::{seconds, Settings, DEFAULT_OUTPUT_FILE},
    console::Console,
    logging, pipeline,
    proxy::coordinator::DEFAULT_MAX_WORKERS,
    proxy::validator::{ProxyScope, ValidatorConfig, DEFAULT_TEST_URL},
    sources::CrawlerConfig,
};
use std::path::PathBuf;

/// Scrape free proxy lists, check every proxy and keep the working ones
#[derive(Parser)]
#[command(name = "proxy-harvest", version)]
#[command(about = "Scrape free proxy lists, check every proxy and keep the working ones")]
struct Cli {
    /// URL to test proxies against
    #[arg(long, default_value = DEFAULT_TEST_URL)]
    test_url: String,

    /// Per-proxy timeout in seconds
    #[arg(long, default_value_t = 5.0)]
    timeout: f64,

    /// Number of proxies checked concurrently
    #[arg(short = 'n', long, default_value_t = DEFAULT_MAX_WORKERS)]
    workers: usize,

    /// Output file for working proxies (overwritten)
    #[arg(short, long, default_value = DEFAULT_OUTPUT_FILE)]
    output: PathBuf,

    /// Pause between two source fetches in seconds
    #[arg(long, default_value_t = 1.0)]
    source_delay: f64,

    /// Timeout for each source fetch in seconds
    #[arg(long, default_value_t = 10.0)]
    source_timeout: f64,

    /// Target schemes routed through the proxy under test
    #[arg(long, value_enum, default_value_t = ProxyScope::Http)]
    scope: ProxyScope,

    /// Append measured latency (seconds) to each output line
    #[arg(long)]
    with_latency: bool,

    /// Sort working proxies by latency before writing
    #[arg(long)]
    sort: bool,

    /// Leave out a built-in source (repeatable)
    #[arg(long = "skip-source", value_name = "NAME")]
    skip_sources: Vec<String>,

    /// Only print progress and the summary, not a line per proxy
    #[arg(short, long)]
    quiet: bool,

    /// Log filter, e.g. "debug" or "proxy_harvest=trace" (overrides RUST_LOG)
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    fn into_settings(self) -> Result<Settings> {
        let validator = ValidatorConfig::new()
            .with_test_url(self.test_url)
            .with_timeout(seconds("timeout", self.timeout, false)?)
            .with_scope(self.scope);

        let crawler = CrawlerConfig::new()
            .with_timeout(seconds("source timeout", self.source_timeout, false)?)
            .with_delay(seconds("source delay", self.source_delay, true)?);

        let mut settings = Settings::new()
            .with_validator(validator)
            .with_crawler(crawler)
            .with_max_workers(self.workers)
            .with_output(self.output);
        settings.with_latency = self.with_latency;
        settings.sort_by_latency = self.sort;
        settings.skip_sources = self.skip_sources;

        settings.validate()?;
        Ok(settings)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.log_level.as_deref());

    let console = if cli.quiet {
        Console::new().quiet()
    } else {
        Console::new()
    };
    let settings = cli.into_settings()?;

    pipeline::run(&settings, console).await?;

    Ok(())
}
