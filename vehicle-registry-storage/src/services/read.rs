//! Access-aware read paths over the vehicle repository
//!
//! Point lookups go through an access resolution that hides existence from
//! unauthorized callers: an owner or guest sees their record, an
//! administrator can distinguish found from not-found, and anyone else is
//! told only that access is denied.

use crate::query::{self, CompileOutcome, SearchCriteria};
use crate::repositories::VehicleRepository;
use crate::services::IdentityService;
use crate::Result;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;
use vehicle_registry_core::login::role;
use vehicle_registry_core::vehicle::Vehicle;

/// Username under which unauthenticated callers are resolved
pub const GUEST_USERNAME: &str = "guest";

/// Outcome of an access-aware point lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FindOutcome {
    Found(Vehicle),
    /// Only administrators ever see this variant.
    NotFound,
    /// Access denied; carries the caller's resolved roles, empty when the
    /// caller could not be resolved at all.
    Forbidden(Vec<String>),
}

/// Service for vehicle reads and searches
pub struct VehicleReadService {
    vehicles: Arc<VehicleRepository>,
    identity: Arc<IdentityService>,
}

impl VehicleReadService {
    /// Create a new read service
    pub fn new(vehicles: Arc<VehicleRepository>, identity: Arc<IdentityService>) -> Self {
        Self { vehicles, identity }
    }

    /// Access-free point lookup, for collaborators inside the pipeline
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Vehicle>> {
        self.vehicles.find_by_id(id).await
    }

    /// Access-aware point lookup.
    ///
    /// Owners and guests see the record directly. Everyone else goes
    /// through role resolution, and only an administrator learns whether
    /// the record exists at all.
    pub async fn find_visible(&self, id: Uuid, username: &str) -> Result<FindOutcome> {
        debug!("find_visible: id={}, username={}", id, username);

        let vehicle = self.vehicles.find_by_id(id).await?;
        if let Some(vehicle) = &vehicle {
            if vehicle.username == username || username == GUEST_USERNAME {
                return Ok(FindOutcome::Found(vehicle.clone()));
            }
        }

        let Some(roles) = self.identity.resolve_roles(username).await? else {
            debug!("find_visible: {} could not be resolved", username);
            return Ok(FindOutcome::Forbidden(Vec::new()));
        };
        if !roles.iter().any(|r| r == role::ADMIN) {
            debug!("find_visible: {} lacks the admin role", username);
            return Ok(FindOutcome::Forbidden(roles));
        }

        Ok(match vehicle {
            Some(vehicle) => FindOutcome::Found(vehicle),
            None => FindOutcome::NotFound,
        })
    }

    /// Search vehicles by criteria.
    ///
    /// Empty criteria list everything. A single `description` or `plate`
    /// key takes a direct repository query; the matching rules are the same
    /// as under general compilation. An unusable query yields an empty
    /// result, never an error.
    pub async fn find(&self, criteria: &SearchCriteria) -> Result<Vec<Vehicle>> {
        debug!("find: criteria={:?}", criteria);

        if criteria.is_empty() {
            return self.vehicles.find_all().await;
        }

        match criteria.sole_entry() {
            Some((query::KEY_DESCRIPTION, value)) => {
                return self.vehicles.find_by_description_containing(value).await;
            }
            Some((query::KEY_PLATE, value)) => {
                return self.vehicles.find_by_plate_containing(value).await;
            }
            _ => {}
        }

        match query::compile(criteria) {
            CompileOutcome::Usable(plan) => self.vehicles.search(&plan).await,
            CompileOutcome::Unusable => {
                debug!("find: unusable criteria, returning no vehicles");
                Ok(Vec::new())
            }
        }
    }

    /// Distinct descriptions starting with the given prefix
    pub async fn descriptions_by_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        self.vehicles.descriptions_by_prefix(prefix).await
    }
}
