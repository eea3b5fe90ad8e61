//! Core domain models for the vehicle registry
//!
//! This crate contains the registry's domain types and the pure decision
//! logic that operates on them: vehicle and credential models, the
//! declarative validation engine, the patch applier, and the concurrency
//! token guard. Nothing in here performs I/O.

pub mod error;
pub mod login;
pub mod patch;
pub mod validation;
pub mod vehicle;
pub mod version;

pub use error::{Error, Result};
