//! Error types for storage operations
//!
//! Domain-level branches (validation failures, conflicts, stale versions)
//! are outcome enums on the services, never errors. This type only carries
//! infrastructure failures and internal invariant breaches.

use thiserror::Error;

/// Storage layer error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Core domain error: {0}")]
    Core(#[from] vehicle_registry_core::Error),

    #[error("Operation timeout: {operation} exceeded {millis}ms")]
    Timeout {
        operation: &'static str,
        millis: u64,
    },

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Which uniqueness constraint a database error violated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum UniqueTarget {
    Plate,
    Username,
}

impl Error {
    /// Check if this error is a timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Timeout { .. })
    }

    /// Map a unique-constraint violation to the column it guards.
    ///
    /// The uniqueness pre-checks in the write pipeline race against
    /// concurrent writers; the database constraints are authoritative, and
    /// a violation that slips past a pre-check is folded back into the same
    /// domain outcome.
    pub(crate) fn unique_violation_target(&self) -> Option<UniqueTarget> {
        let Error::Database(sqlx::Error::Database(db_err)) = self else {
            return None;
        };
        if !db_err.is_unique_violation() {
            return None;
        }
        let message = db_err.message();
        if message.contains("vehicle.plate") {
            Some(UniqueTarget::Plate)
        } else if message.contains("login.username") {
            Some(UniqueTarget::Username)
        } else {
            None
        }
    }
}

/// Convenience result type for storage operations
pub type Result<T> = std::result::Result<T, Error>;
