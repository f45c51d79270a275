//! Human readable progress and summary on stdout

use crate::pipeline::RunSummary;
use crate::proxy::models::{Candidate, ValidationOutcome};
use crate::sources::CrawlResult;
use chrono::{DateTime, Local};
use colored::Colorize;
use std::io::{self, Write};
use std::path::Path;

const RULE_WIDTH: usize = 50;

/// Console printer; a silent console swallows everything
#[derive(Debug, Clone, Copy)]
pub struct Console {
    enabled: bool,
    /// Print a line per checked proxy, not just the progress counter
    per_proxy: bool,
}

impl Default for Console {
    fn default() -> Self {
        Self::new()
    }
}

impl Console {
    pub fn new() -> Self {
        Self {
            enabled: true,
            per_proxy: true,
        }
    }

    pub fn silent() -> Self {
        Self {
            enabled: false,
            per_proxy: false,
        }
    }

    /// Keep the progress counter but drop the per-proxy lines
    pub fn quiet(mut self) -> Self {
        self.per_proxy = false;
        self
    }

    pub fn banner(&self, started_at: DateTime<Local>) {
        if !self.enabled {
            return;
        }
        println!("\n{}", " PROXY SCRAPER & CHECKER ".white().on_blue().bold());
        println!("{}", format!("Started {}", started_at.format("%Y-%m-%d %H:%M:%S")).dimmed());
    }

    pub fn source_result(&self, result: &CrawlResult) {
        if !self.enabled {
            return;
        }
        match &result.error {
            None => println!(
                "{} {} {}",
                "🌐".cyan(),
                result.source.cyan(),
                format!("found {} proxies", result.entries.len()).green()
            ),
            Some(error) => println!(
                "{} {}",
                "❌".red(),
                format!("Failed to scrape {}: {}", result.source, truncate(error, 60)).red()
            ),
        }
    }

    pub fn pool_ready(&self, unique: usize) {
        if !self.enabled {
            return;
        }
        println!("\n{}\n", format!("🌟 Total unique proxies found: {}", unique).cyan().bold());
    }

    /// Report an empty pool, telling apart dead sources from empty listings
    pub fn no_candidates(&self, sources_ok: usize, sources_total: usize) {
        if !self.enabled {
            return;
        }
        if sources_ok == 0 {
            println!("\n{}", format!("❌ No proxies found: all {} sources failed.", sources_total).red());
        } else {
            println!(
                "\n{}",
                format!("❌ No proxies found: {} of {} sources responded but listed nothing usable.", sources_ok, sources_total).red()
            );
        }
    }

    pub fn outcome(&self, candidate: &Candidate, outcome: &ValidationOutcome, checked: usize, total: usize) {
        if !self.enabled {
            return;
        }
        if self.per_proxy {
            let address = format!("{:<21}", candidate.to_string());
            match outcome {
                ValidationOutcome::Working { latency } => println!(
                    "✅  {}",
                    format!("{} | Latency: {:.2}s | Valid", address, latency.as_secs_f64()).green()
                ),
                ValidationOutcome::Failed { reason } => println!(
                    "❌  {}",
                    format!("{} | {:<30} | {}", address, truncate(&reason.to_string(), 30), reason.kind()).red()
                ),
            }
        }
        print!("{:>50}\r", format!("⏳ Checked {}/{} proxies...", checked, total));
        let _ = io::stdout().flush();
    }

    pub fn summary(&self, summary: &RunSummary, output: &Path) {
        if !self.enabled {
            return;
        }
        let report = &summary.report;
        let rule = "━".repeat(RULE_WIDTH);

        println!("\n{}", rule);
        println!("{}", "📋 Final Summary:".cyan().bold());
        for line in pool_lines(summary) {
            println!("{}", line);
        }
        println!("{}", format!("   🔴 Invalid proxies:     {}", report.failed_count()).red());
        for (kind, count) in &report.failures {
            println!("{}", format!("      {:<20} {}", kind, count).red());
        }
        println!("{}", format!("   🟢 Valid proxies:       {}", report.working_count()).green());
        println!("{}", format!("   Success rate:          {:.1}%", report.success_rate()).yellow());
        println!("   Finished in:            {:.1}s", summary.elapsed.as_secs_f64());
        println!("{}", rule);
        println!("\n{}", format!("💾 Valid proxies saved to: {}", output.display()).green());
    }
}

/// Source and pool counts of the summary, uncoloured
fn pool_lines(summary: &RunSummary) -> Vec<String> {
    vec![
        format!("   Sources responded:      {}/{}", summary.sources_ok, summary.sources_total),
        format!("   Total scraped proxies:  {}", summary.scraped),
        format!("   Malformed entries:      {}", summary.malformed),
        format!("   Unique proxies:         {}", summary.unique),
    ]
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
