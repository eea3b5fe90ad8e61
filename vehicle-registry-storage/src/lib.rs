//! Persistence layer and service pipelines for the vehicle registry
//!
//! This crate provides the SQLite repositories, the query compiler that
//! turns filter criteria into safe predicates, and the read/write service
//! pipelines that enforce validation, uniqueness, and optimistic
//! concurrency across vehicle records.

pub mod error;
pub mod manager;
pub mod migrations;
pub mod notify;
pub mod query;
pub mod repositories;
pub mod services;

pub use error::{Error, Result};
pub use manager::{DatabaseConfig, StorageManager};

/// Re-export core types for convenience
pub use vehicle_registry_core as core;
