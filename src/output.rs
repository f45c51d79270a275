//! Output file for the result set

use crate::proxy::models::WorkingProxy;
use crate::Result;
use anyhow::Context;
use std::fs;
use std::path::Path;

/// Format one output line: `host:port`, optionally followed by latency in seconds
pub fn format_line(proxy: &WorkingProxy, with_latency: bool) -> String {
    if with_latency {
        format!("{} {:.2}", proxy.candidate, proxy.latency_secs())
    } else {
        proxy.candidate.to_simple_string()
    }
}

/// Overwrite `path` with one working proxy per line
pub fn save_to_file<P: AsRef<Path>>(proxies: &[WorkingProxy], path: P, with_latency: bool) -> Result<()> {
    let path = path.as_ref();
    let mut content: String = proxies
        .iter()
        .map(|p| format_line(p, with_latency))
        .collect::<Vec<_>>()
        .join("\n");
    if !content.is_empty() {
        content.push('\n');
    }

    fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}
