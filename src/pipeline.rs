//! One full run: crawl, pool, validate, write

use crate::config::Settings;
use crate::console::Console;
use crate::output::save_to_file;
use crate::proxy::coordinator::{Coordinator, RunReport};
use crate::proxy::pool::CandidatePool;
use crate::proxy::validator::ProxyValidator;
use crate::sources::{default_sources, ProxyCrawler, ProxySource};
use crate::Result;
use chrono::{DateTime, Local};
use std::time::{Duration, Instant};
use tracing::info;

/// Everything a run produced
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub started_at: DateTime<Local>,
    pub elapsed: Duration,
    pub sources_total: usize,
    pub sources_ok: usize,
    /// Raw entries returned by all sources together
    pub scraped: usize,
    pub unique: usize,
    pub malformed: usize,
    pub report: RunReport,
}

/// Built-in sources minus the ones the settings skip
pub fn enabled_sources(settings: &Settings) -> Vec<Box<dyn ProxySource>> {
    default_sources()
        .into_iter()
        .filter(|source| !settings.skip_sources.iter().any(|name| name == source.name()))
        .collect()
}

/// Run the whole pipeline over the enabled built-in sources
pub async fn run(settings: &Settings, console: Console) -> Result<RunSummary> {
    run_with_sources(settings, enabled_sources(settings), console).await
}

/// Run the whole pipeline over the given sources
///
/// Source and validation failures only shrink the result; the only error
/// returned is failing to write the output file.
pub async fn run_with_sources(
    settings: &Settings,
    sources: Vec<Box<dyn ProxySource>>,
    console: Console,
) -> Result<RunSummary> {
    let started_at = Local::now();
    let clock = Instant::now();
    console.banner(started_at);

    let crawler = ProxyCrawler::with_config(settings.crawler.clone(), sources)?;
    let sources_total = crawler.source_count();
    let results = crawler
        .crawl_all_with_progress(|result| console.source_result(result))
        .await;
    let sources_ok = results.iter().filter(|r| r.is_success()).count();

    let pool = CandidatePool::from_raw(results.into_iter().map(|r| r.entries));
    info!(
        scraped = pool.scraped(),
        unique = pool.len(),
        malformed = pool.malformed(),
        "candidate pool built"
    );

    let report = if pool.is_empty() {
        console.no_candidates(sources_ok, sources_total);
        RunReport::new()
    } else {
        console.pool_ready(pool.len());

        let validator = ProxyValidator::with_config(settings.validator.clone());
        let coordinator = Coordinator::new(validator, settings.max_workers);
        let total = pool.len();
        let mut checked = 0;

        let mut report = coordinator
            .run_with_progress(pool.candidates(), |candidate, outcome| {
                checked += 1;
                console.outcome(candidate, outcome, checked, total);
            })
            .await;
        if settings.sort_by_latency {
            report.sort_by_latency();
        }
        report
    };

    save_to_file(&report.working, &settings.output, settings.with_latency)?;

    let summary = RunSummary {
        started_at,
        elapsed: clock.elapsed(),
        sources_total,
        sources_ok,
        scraped: pool.scraped(),
        unique: pool.len(),
        malformed: pool.malformed(),
        report,
    };

    if !pool.is_empty() {
        console.summary(&summary, &settings.output);
    }
    info!(
        working = summary.report.working_count(),
        failed = summary.report.failed_count(),
        "run finished"
    );

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enabled_sources_skips_by_name() {
        let mut settings = Settings::new();
        assert_eq!(enabled_sources(&settings).len(), default_sources().len());

        settings.skip_sources = vec!["spys.me".to_string(), "hidemy".to_string()];
        let names: Vec<_> = enabled_sources(&settings)
            .iter()
            .map(|s| s.name().to_string())
            .collect();
        assert_eq!(names.len(), default_sources().len() - 2);
        assert!(!names.contains(&"spys.me".to_string()));
        assert!(!names.contains(&"hidemy".to_string()));
    }
}
