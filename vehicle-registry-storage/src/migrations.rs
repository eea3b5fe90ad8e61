//! Database schema setup
//!
//! The plate and username uniqueness invariants are enforced here, at the
//! storage level. The write pipeline's existence pre-checks are advisory;
//! two concurrent creates can both pass them, and only these constraints
//! keep the second insert out.

use crate::{Error, Result};
use sqlx::SqlitePool;
use tracing::info;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS vehicle_owner (
    id         TEXT PRIMARY KEY,
    first_name TEXT NOT NULL,
    last_name  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS vehicle (
    id                 TEXT PRIMARY KEY,
    version            INTEGER NOT NULL DEFAULT 0,
    description        TEXT NOT NULL,
    plate              TEXT NOT NULL UNIQUE,
    mileage            INTEGER NOT NULL DEFAULT 0,
    first_registration TEXT,
    vehicle_type       TEXT,
    owner_id           TEXT NOT NULL REFERENCES vehicle_owner (id),
    username           TEXT NOT NULL,
    created_at         TEXT NOT NULL,
    updated_at         TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS login (
    id       TEXT PRIMARY KEY,
    username TEXT NOT NULL UNIQUE,
    password TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS login_role (
    login_id TEXT NOT NULL REFERENCES login (id) ON DELETE CASCADE,
    role     TEXT NOT NULL,
    PRIMARY KEY (login_id, role)
);
"#;

/// Apply the registry schema to the given pool
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    sqlx::raw_sql(SCHEMA)
        .execute(pool)
        .await
        .map_err(|e| Error::Migration(e.to_string()))?;
    info!("Database schema is up to date");
    Ok(())
}
