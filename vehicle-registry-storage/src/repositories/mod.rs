//! Repository implementations for the registry entities
//!
//! Every repository method is one class of round trip against the shared
//! pool and carries a bounded wait: short for point lookups and existence
//! checks, longer for multi-row searches and multi-statement transactions.
//! An exceeded bound surfaces as [`Error::Timeout`]; a transaction whose
//! future is cancelled by the deadline is rolled back by the pool, so no
//! partial write becomes visible.

use crate::{Error, Result};
use std::future::Future;
use std::time::Duration;

pub mod login;
pub mod vehicle;

pub use login::LoginRepository;
pub use vehicle::VehicleRepository;

/// Deadline for single-row point lookups and existence checks
pub(crate) const TIMEOUT_SHORT_MS: u64 = 500;

/// Deadline for multi-statement write transactions
pub(crate) const TIMEOUT_WRITE_MS: u64 = 1_000;

/// Deadline for multi-row searches
pub(crate) const TIMEOUT_SEARCH_MS: u64 = 2_000;

pub(crate) async fn with_deadline<T, F>(operation: &'static str, millis: u64, query: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(Duration::from_millis(millis), query).await {
        Ok(result) => result,
        Err(_) => Err(Error::Timeout { operation, millis }),
    }
}
