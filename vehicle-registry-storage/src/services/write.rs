//! Write pipeline for vehicle records
//!
//! Create runs validation, the advisory uniqueness checks, and credential
//! conversion before a single transaction persists credential and vehicle
//! together; notification is attempted only after commit and can only
//! downgrade the outcome, never revert it. Update is guarded by the
//! concurrency token and committed as a compare-and-set.

use crate::error::UniqueTarget;
use crate::notify::Notifier;
use crate::repositories::VehicleRepository;
use crate::services::{CredentialOutcome, IdentityService, RawCredential};
use crate::Result;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;
use vehicle_registry_core::validation::{self, Violation};
use vehicle_registry_core::vehicle::Vehicle;
use vehicle_registry_core::version;

/// Outcome of creating a vehicle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    Created(Vehicle),
    /// The vehicle is persisted; only the notification failed.
    CreatedWithoutNotification(Vehicle, String),
    Invalid(Vec<Violation>),
    /// The password does not satisfy the password policy.
    InvalidCredential,
    UsernameTaken(String),
    PlateTaken(String),
}

/// Outcome of updating a vehicle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    Updated(Vehicle),
    Invalid(Vec<Violation>),
    NotFound,
    /// The concurrency token is not a quoted non-negative integer.
    VersionMalformed(String),
    /// The presented version no longer matches the stored one.
    VersionStale(i64),
    PlateTaken(String),
}

/// Service orchestrating vehicle writes
pub struct VehicleWriteService {
    vehicles: Arc<VehicleRepository>,
    identity: Arc<IdentityService>,
    notifier: Arc<dyn Notifier>,
}

impl VehicleWriteService {
    /// Create a new write service
    pub fn new(
        vehicles: Arc<VehicleRepository>,
        identity: Arc<IdentityService>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            vehicles,
            identity,
            notifier,
        }
    }

    /// Register a new vehicle together with its credential.
    pub async fn create(
        &self,
        mut vehicle: Vehicle,
        credential: &RawCredential,
    ) -> Result<CreateOutcome> {
        debug!("create: plate={}", vehicle.plate);

        let violations = validation::validate(&vehicle);
        if !violations.is_empty() {
            debug!("create: {} violations", violations.len());
            return Ok(CreateOutcome::Invalid(violations));
        }

        if self.vehicles.plate_exists(&vehicle.plate).await? {
            return Ok(CreateOutcome::PlateTaken(vehicle.plate));
        }

        let login = match self.identity.convert_credential(credential).await? {
            CredentialOutcome::Converted(login) => login,
            CredentialOutcome::InvalidPassword => return Ok(CreateOutcome::InvalidCredential),
            CredentialOutcome::UsernameTaken(username) => {
                return Ok(CreateOutcome::UsernameTaken(username));
            }
        };

        // The vehicle carries the canonical username from here on.
        vehicle.username = login.username.clone();

        // The pre-checks above race against concurrent writers; a unique
        // violation out of the insert folds back into the same outcomes.
        if let Err(err) = self.vehicles.create(&vehicle, &login).await {
            return match err.unique_violation_target() {
                Some(UniqueTarget::Plate) => Ok(CreateOutcome::PlateTaken(vehicle.plate)),
                Some(UniqueTarget::Username) => Ok(CreateOutcome::UsernameTaken(login.username)),
                None => Err(err),
            };
        }

        let delivery = self.notifier.send(&vehicle).await;
        if let Some(reason) = delivery.reason() {
            warn!("create: vehicle {} persisted, notification failed: {}", vehicle.id, reason);
            return Ok(CreateOutcome::CreatedWithoutNotification(
                vehicle,
                reason.to_string(),
            ));
        }

        info!("create: vehicle {} registered", vehicle.id);
        Ok(CreateOutcome::Created(vehicle))
    }

    /// Update a stored vehicle under the optimistic concurrency guard.
    ///
    /// `raw_token` is the concurrency token as received from the caller,
    /// e.g. `"3"` including the quotes.
    pub async fn update(
        &self,
        id: Uuid,
        incoming: &Vehicle,
        raw_token: &str,
    ) -> Result<UpdateOutcome> {
        debug!("update: id={}, token={}", id, raw_token);

        let violations = validation::validate(incoming);
        if !violations.is_empty() {
            debug!("update: {} violations", violations.len());
            return Ok(UpdateOutcome::Invalid(violations));
        }

        let Some(mut stored) = self.vehicles.find_by_id(id).await? else {
            return Ok(UpdateOutcome::NotFound);
        };

        let expected = match version::parse_token(raw_token) {
            Ok(version) => version,
            Err(malformed) => {
                debug!("update: malformed token {}", malformed.token);
                return Ok(UpdateOutcome::VersionMalformed(malformed.token));
            }
        };
        if expected != stored.version {
            debug!("update: stale version {expected}, stored {}", stored.version);
            return Ok(UpdateOutcome::VersionStale(expected));
        }

        // An unchanged plate never triggers the uniqueness check.
        if incoming.plate != stored.plate && self.vehicles.plate_exists(&incoming.plate).await? {
            return Ok(UpdateOutcome::PlateTaken(incoming.plate.clone()));
        }

        stored.merge_from(incoming);

        match self.vehicles.update(&stored, expected).await {
            Ok(Some(updated)) => {
                info!("update: vehicle {} now at version {}", updated.id, updated.version);
                Ok(UpdateOutcome::Updated(updated))
            }
            // Lost the race after our read: same signal as a stale token.
            Ok(None) => Ok(UpdateOutcome::VersionStale(expected)),
            Err(err) => match err.unique_violation_target() {
                Some(UniqueTarget::Plate) => Ok(UpdateOutcome::PlateTaken(stored.plate)),
                _ => Err(err),
            },
        }
    }

    /// Delete a vehicle; an absent id is a no-op
    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        self.vehicles.delete(id).await
    }
}

#[cfg(test)]
mod tests {
    include!("write_tests.rs");
}
