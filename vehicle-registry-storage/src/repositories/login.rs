//! Login repository implementation
//!
//! Credentials are written by the vehicle create transaction, never here;
//! this repository only answers lookups for access control and the
//! username uniqueness pre-check.

use crate::repositories::{with_deadline, TIMEOUT_SHORT_MS};
use crate::{Error, Result};
use anyhow::anyhow;
use sqlx::{Pool, Row, Sqlite};
use tracing::debug;
use uuid::Uuid;
use vehicle_registry_core::login::Login;

/// Repository for stored credentials
pub struct LoginRepository {
    pool: Pool<Sqlite>,
}

impl LoginRepository {
    /// Create a new login repository
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Find a credential by exact username, roles included
    pub async fn find_by_username(&self, username: &str) -> Result<Option<Login>> {
        debug!("Finding login by username: {}", username);

        let row = with_deadline("login.find_by_username", TIMEOUT_SHORT_MS, async {
            Ok(
                sqlx::query("SELECT id, username, password FROM login WHERE username = ?1")
                    .bind(username)
                    .fetch_optional(&self.pool)
                    .await?,
            )
        })
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let id: String = row.try_get("id")?;
        let id = Uuid::parse_str(&id)
            .map_err(|e| Error::Internal(anyhow!("Invalid login UUID: {e}")))?;

        let roles = with_deadline("login.roles", TIMEOUT_SHORT_MS, async {
            Ok(
                sqlx::query_scalar("SELECT role FROM login_role WHERE login_id = ?1 ORDER BY role")
                    .bind(id.to_string())
                    .fetch_all(&self.pool)
                    .await?,
            )
        })
        .await?;

        Ok(Some(Login {
            id,
            username: row.try_get("username")?,
            password: row.try_get("password")?,
            roles,
        }))
    }

    /// Check whether a username is already taken.
    ///
    /// Advisory; the unique constraint on the username column decides under
    /// concurrency.
    pub async fn username_exists(&self, username: &str) -> Result<bool> {
        debug!("Checking if username exists: {}", username);

        let count: i64 = with_deadline("login.username_exists", TIMEOUT_SHORT_MS, async {
            Ok(
                sqlx::query_scalar("SELECT COUNT(*) FROM login WHERE username = ?1")
                    .bind(username)
                    .fetch_one(&self.pool)
                    .await?,
            )
        })
        .await?;

        Ok(count > 0)
    }

    /// Count stored credentials
    pub async fn count(&self) -> Result<i64> {
        with_deadline("login.count", TIMEOUT_SHORT_MS, async {
            Ok(sqlx::query_scalar("SELECT COUNT(*) FROM login")
                .fetch_one(&self.pool)
                .await?)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    include!("login_tests.rs");
}
