//! Credential model for registry users
//!
//! A [`Login`] is created once, together with the vehicle it registers, and
//! is never updated by the registry core. Password hashing and verification
//! are delegated to the identity service in the storage layer.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role names granted to credentials
pub mod role {
    /// Administrative role, may read any vehicle record
    pub const ADMIN: &str = "ADMIN";

    /// Default role granted to newly registered users
    pub const VEHICLE: &str = "VEHICLE";
}

/// A stored credential: username, hashed password, and granted roles
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Login {
    pub id: Uuid,
    pub username: String,
    /// Hashed password; never a cleartext value.
    pub password: String,
    pub roles: Vec<String>,
}

impl Login {
    /// Create a new credential with a generated id
    pub fn new<S1: Into<String>, S2: Into<String>>(
        username: S1,
        password: S2,
        roles: Vec<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: username.into(),
            password: password.into(),
            roles,
        }
    }

    /// Check whether this credential carries the given role
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    /// Check whether this credential carries the administrative role
    pub fn is_admin(&self) -> bool {
        self.has_role(role::ADMIN)
    }
}
