//! Vehicle domain model and related types
//!
//! This module provides the vehicle record model, the registry's aggregate
//! root. A vehicle is owned by exactly one [`VehicleOwner`] whose lifecycle
//! is bound to it, and carries the username of the credential it was
//! registered under.
//!
//! # Examples
//!
//! Creating a new vehicle:
//!
//! ```rust
//! use vehicle_registry_core::vehicle::*;
//!
//! let vehicle = Vehicle::builder()
//!     .description("Delivery van")
//!     .plate("KA X 7")
//!     .mileage(12_000)
//!     .vehicle_type(VehicleType::Commercial)
//!     .owner(VehicleOwner::new("Anna", "Muster"))
//!     .username("anna")
//!     .build()
//!     .unwrap();
//! ```

use crate::{Error, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

/// A vehicle record in the registry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: Uuid,
    /// Optimistic concurrency version, incremented by the persistence layer
    /// on every successful update.
    pub version: i64,
    pub description: String,
    pub plate: String,
    pub mileage: i64,
    pub first_registration: Option<NaiveDate>,
    pub vehicle_type: Option<VehicleType>,
    pub owner: VehicleOwner,
    pub username: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Business identity is the plate, not the generated id.
impl PartialEq for Vehicle {
    fn eq(&self, other: &Self) -> bool {
        self.plate == other.plate
    }
}

impl Eq for Vehicle {}

/// Vehicle category, externally encoded as a single-letter code
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum VehicleType {
    #[serde(rename = "A")]
    Trailer,
    #[serde(rename = "N")]
    Commercial,
    #[serde(rename = "P")]
    Car,
}

impl VehicleType {
    /// The single-letter code used in JSON payloads and database columns
    pub fn code(&self) -> &'static str {
        match self {
            VehicleType::Trailer => "A",
            VehicleType::Commercial => "N",
            VehicleType::Car => "P",
        }
    }

    /// Decode a single-letter code; an unknown code decodes to `None`
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "A" => Some(VehicleType::Trailer),
            "N" => Some(VehicleType::Commercial),
            "P" => Some(VehicleType::Car),
            _ => {
                warn!("Unknown vehicle type code: {}", code);
                None
            }
        }
    }
}

/// The person a vehicle is registered to, lifecycle-bound to its vehicle
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VehicleOwner {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
}

impl VehicleOwner {
    /// Create a new owner with a generated id
    pub fn new<S1: Into<String>, S2: Into<String>>(first_name: S1, last_name: S2) -> Self {
        Self {
            id: Uuid::new_v4(),
            first_name: first_name.into(),
            last_name: last_name.into(),
        }
    }
}

impl Vehicle {
    /// Create a builder for constructing a Vehicle
    pub fn builder() -> VehicleBuilder {
        VehicleBuilder::new()
    }

    /// Overwrite the mutable fields with the values of an incoming record.
    ///
    /// Identity, version, username, timestamps, and the owner row id are
    /// preserved; they belong to the stored entity.
    pub fn merge_from(&mut self, incoming: &Vehicle) {
        self.description = incoming.description.clone();
        self.plate = incoming.plate.clone();
        self.mileage = incoming.mileage;
        self.first_registration = incoming.first_registration;
        self.vehicle_type = incoming.vehicle_type;
        self.owner.first_name = incoming.owner.first_name.clone();
        self.owner.last_name = incoming.owner.last_name.clone();
    }
}

/// Builder for constructing Vehicle instances
///
/// The builder only enforces that required fields are present; field-level
/// rules are the job of the validation engine, which collects all
/// violations instead of failing on the first.
#[derive(Debug, Clone, Default)]
pub struct VehicleBuilder {
    description: Option<String>,
    plate: Option<String>,
    mileage: i64,
    first_registration: Option<NaiveDate>,
    vehicle_type: Option<VehicleType>,
    owner: Option<VehicleOwner>,
    username: Option<String>,
}

impl VehicleBuilder {
    /// Create a new vehicle builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the description
    pub fn description<S: Into<String>>(mut self, description: S) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the plate
    pub fn plate<S: Into<String>>(mut self, plate: S) -> Self {
        self.plate = Some(plate.into());
        self
    }

    /// Set the mileage
    pub fn mileage(mut self, mileage: i64) -> Self {
        self.mileage = mileage;
        self
    }

    /// Set the first registration date
    pub fn first_registration(mut self, date: NaiveDate) -> Self {
        self.first_registration = Some(date);
        self
    }

    /// Set the vehicle type
    pub fn vehicle_type(mut self, vehicle_type: VehicleType) -> Self {
        self.vehicle_type = Some(vehicle_type);
        self
    }

    /// Set the owner
    pub fn owner(mut self, owner: VehicleOwner) -> Self {
        self.owner = Some(owner);
        self
    }

    /// Set the owning username
    pub fn username<S: Into<String>>(mut self, username: S) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Build the Vehicle instance
    pub fn build(self) -> Result<Vehicle> {
        let description = self
            .description
            .ok_or_else(|| Error::validation("Description is required"))?;
        let plate = self.plate.ok_or_else(|| Error::validation("Plate is required"))?;
        let owner = self.owner.ok_or_else(|| Error::validation("Owner is required"))?;
        let username = self
            .username
            .ok_or_else(|| Error::validation("Username is required"))?;

        let now = Utc::now();
        Ok(Vehicle {
            id: Uuid::new_v4(),
            version: 0,
            description,
            plate,
            mileage: self.mileage,
            first_registration: self.first_registration,
            vehicle_type: self.vehicle_type,
            owner,
            username,
            created_at: now,
            updated_at: now,
        })
    }
}
