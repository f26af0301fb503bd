//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Emit one metadata-only log event per use-case call.
//!
//! # Invariants
//! - Services never bypass repository validation/persistence contracts.
//! - Log events carry ids and error codes only, never names or labels.

use crate::repo::RepoResult;
use log::{debug, warn};
use std::time::Instant;

pub mod collection_service;
pub mod entity_service;

fn logged<T>(event: &'static str, run: impl FnOnce() -> RepoResult<T>) -> RepoResult<T> {
    let started_at = Instant::now();
    let result = run();
    match &result {
        Ok(_) => debug!(
            "event={event} module=service status=ok duration_ms={}",
            started_at.elapsed().as_millis()
        ),
        Err(err) => warn!(
            "event={event} module=service status=error duration_ms={} error_code={}",
            started_at.elapsed().as_millis(),
            err.code()
        ),
    }
    result
}
