//! Patch operations for partial vehicle updates
//!
//! A patch payload is an ordered sequence of records such as
//! `{"op": "replace", "path": "/description", "value": "Van"}`. Only
//! `replace` operations on a fixed whitelist of paths have an effect; the
//! patched record is validated afterwards by the pipeline, not here.

use crate::vehicle::Vehicle;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Kind of a patch operation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PatchOp {
    /// Replace a singular value; the only kind the applier honors.
    Replace,
    Add,
    Remove,
}

/// A single patch operation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PatchOperation {
    pub op: PatchOp,
    pub path: String,
    pub value: String,
}

/// What to do with a `replace` that addresses a path outside the whitelist
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnknownPathPolicy {
    /// Skip the operation and keep going.
    #[default]
    Ignore,
    /// Reject the whole patch.
    Reject,
}

/// A `replace` operation addressed a path the applier does not support
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Unsupported patch path: {path}")]
pub struct UnsupportedPath {
    pub path: String,
}

/// Paths a `replace` operation may address
pub const REPLACEABLE_PATHS: &[&str] = &["/description", "/plate"];

/// Apply the `replace` operations of a patch to a vehicle.
///
/// Non-`replace` operations are dropped. A patch without any `replace`
/// operation returns the vehicle unchanged. No field-level validation
/// happens here.
pub fn apply(
    vehicle: &Vehicle,
    operations: &[PatchOperation],
    policy: UnknownPathPolicy,
) -> Result<Vehicle, UnsupportedPath> {
    let mut patched = vehicle.clone();

    for operation in operations.iter().filter(|op| op.op == PatchOp::Replace) {
        match operation.path.as_str() {
            "/description" => patched.description = operation.value.clone(),
            "/plate" => patched.plate = operation.value.clone(),
            other => match policy {
                UnknownPathPolicy::Ignore => {
                    debug!("apply: ignoring unsupported path {}", other);
                }
                UnknownPathPolicy::Reject => {
                    return Err(UnsupportedPath {
                        path: other.to_string(),
                    });
                }
            },
        }
    }

    Ok(patched)
}
