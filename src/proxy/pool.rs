//! Candidate pool: merged, parsed and deduplicated source output

use crate::proxy::models::Candidate;
use crate::proxy::parser::{ParseError, ProxyParser};
use std::collections::HashSet;
use tracing::debug;

/// Ordered set of unique candidates built once per run
#[derive(Debug, Clone, Default)]
pub struct CandidatePool {
    candidates: Vec<Candidate>,
    seen: HashSet<Candidate>,
    /// Raw entries offered to the pool, duplicates and malformed ones included
    scraped: usize,
    /// Raw entries that could not be parsed
    malformed: usize,
}

impl CandidatePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a pool from several batches of raw entries
    pub fn from_raw<I, S>(batches: I) -> Self
    where
        I: IntoIterator<Item = Vec<S>>,
        S: AsRef<str>,
    {
        let mut pool = Self::new();
        for batch in batches {
            pool.extend_raw(&batch);
        }
        pool
    }

    /// Parse and add raw `host:port` entries, keeping first-seen order
    ///
    /// Returns how many new candidates were added.
    pub fn extend_raw<S: AsRef<str>>(&mut self, entries: &[S]) -> usize {
        let mut added = 0;
        for entry in entries {
            self.scraped += 1;
            match ProxyParser::parse_line(entry.as_ref()) {
                Ok(candidate) => {
                    if self.insert(candidate) {
                        added += 1;
                    }
                }
                Err(ParseError::Empty) => {
                    self.malformed += 1;
                }
                Err(e) => {
                    debug!(error = %e, "skipping malformed entry");
                    self.malformed += 1;
                }
            }
        }
        added
    }

    /// Add a parsed candidate; returns false if the pair was already present
    pub fn insert(&mut self, candidate: Candidate) -> bool {
        if self.seen.contains(&candidate) {
            return false;
        }
        self.seen.insert(candidate.clone());
        self.candidates.push(candidate);
        true
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn into_candidates(self) -> Vec<Candidate> {
        self.candidates
    }

    pub fn contains(&self, candidate: &Candidate) -> bool {
        self.seen.contains(candidate)
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn scraped(&self) -> usize {
        self.scraped
    }

    pub fn malformed(&self) -> usize {
        self.malformed
    }
}
