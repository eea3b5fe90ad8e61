//! Business services built on the repositories
//!
//! Services return outcome enums for every domain-level branch; a `Result`
//! error from a service always means infrastructure trouble, never a
//! business decision.

pub mod identity;
pub mod read;
pub mod write;

pub use identity::{CredentialOutcome, IdentityService, RawCredential};
pub use read::{FindOutcome, VehicleReadService, GUEST_USERNAME};
pub use write::{CreateOutcome, UpdateOutcome, VehicleWriteService};
