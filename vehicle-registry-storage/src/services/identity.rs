//! Credential conversion and role resolution
//!
//! Raw credentials arrive once, at vehicle registration, and leave this
//! service as a stored [`Login`] with a bcrypt hash and the default role.
//! The username is lowercased here; every later lookup sees the canonical
//! form.

use crate::repositories::LoginRepository;
use crate::{Error, Result};
use anyhow::anyhow;
use std::sync::Arc;
use tracing::debug;
use vehicle_registry_core::login::{role, Login};

/// Externally supplied username and cleartext password
#[derive(Debug, Clone)]
pub struct RawCredential {
    pub username: String,
    pub password: String,
}

impl RawCredential {
    /// Create a raw credential
    pub fn new<S1: Into<String>, S2: Into<String>>(username: S1, password: S2) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// Outcome of converting a raw credential into a storable one
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialOutcome {
    Converted(Login),
    /// The password does not satisfy the password policy.
    InvalidPassword,
    /// The (lowercased) username is already taken.
    UsernameTaken(String),
}

/// Service for credential conversion and role resolution
pub struct IdentityService {
    logins: Arc<LoginRepository>,
}

impl IdentityService {
    /// Create a new identity service
    pub fn new(logins: Arc<LoginRepository>) -> Self {
        Self { logins }
    }

    /// Resolve the roles of a username; `None` when no such credential exists
    pub async fn resolve_roles(&self, username: &str) -> Result<Option<Vec<String>>> {
        debug!("Resolving roles for: {}", username);
        Ok(self
            .logins
            .find_by_username(username)
            .await?
            .map(|login| login.roles))
    }

    /// Convert a raw credential into a storable [`Login`].
    ///
    /// The username-taken check here is advisory; the unique constraint on
    /// the username column decides under concurrency.
    pub async fn convert_credential(&self, raw: &RawCredential) -> Result<CredentialOutcome> {
        if !password_acceptable(&raw.password) {
            debug!("Rejected credential for {}: password policy", raw.username);
            return Ok(CredentialOutcome::InvalidPassword);
        }

        let username = raw.username.to_lowercase();
        if self.logins.username_exists(&username).await? {
            debug!("Rejected credential: username {} is taken", username);
            return Ok(CredentialOutcome::UsernameTaken(username));
        }

        let hash = bcrypt::hash(&raw.password, bcrypt::DEFAULT_COST)
            .map_err(|e| Error::Internal(anyhow!("Password hashing failed: {e}")))?;

        Ok(CredentialOutcome::Converted(Login::new(
            username,
            hash,
            vec![role::VEHICLE.to_string()],
        )))
    }

    /// Verify a cleartext password against a stored hash
    pub fn verify_password(&self, password: &str, hash: &str) -> Result<bool> {
        bcrypt::verify(password, hash)
            .map_err(|e| Error::Internal(anyhow!("Password verification failed: {e}")))
    }
}

/// Password policy: at least one uppercase letter, one lowercase letter,
/// and one digit or symbol
fn password_acceptable(password: &str) -> bool {
    let has_upper = password.chars().any(|c| c.is_uppercase());
    let has_lower = password.chars().any(|c| c.is_lowercase());
    let has_digit_or_symbol = password
        .chars()
        .any(|c| c.is_ascii_digit() || (!c.is_alphanumeric() && !c.is_whitespace()));
    has_upper && has_lower && has_digit_or_symbol
}
