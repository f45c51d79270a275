//! Proxy module for parsing and validating proxies
//!
//! This module provides functionality for:
//! - Parsing raw `host:port` entries into candidates
//! - Deduplicating candidates into a pool
//! - Validating a single candidate through one test request
//! - Validating a whole pool with bounded concurrency

pub mod coordinator;
pub mod models;
pub mod parser;
pub mod pool;
pub mod validator;

pub use coordinator::{Coordinator, RunReport};
pub use models::{Candidate, FailureReason, ValidationOutcome, WorkingProxy};
pub use parser::{ParseError, ProxyParser};
pub use pool::CandidatePool;
pub use validator::{ProxyScope, ProxyValidator, Validate, ValidatorConfig};
