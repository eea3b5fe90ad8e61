//! Vehicle repository implementation
//!
//! The create path persists the credential and the vehicle (with its owner
//! row) inside one transaction: both land or neither does. Updates are an
//! explicit compare-and-set on the version column; the repository is the
//! only place the version is ever incremented.

use crate::query::{self, QueryPlan};
use crate::repositories::{
    with_deadline, TIMEOUT_SEARCH_MS, TIMEOUT_SHORT_MS, TIMEOUT_WRITE_MS,
};
use crate::{Error, Result};
use anyhow::anyhow;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite};
use tracing::{debug, info};
use uuid::Uuid;
use vehicle_registry_core::login::Login;
use vehicle_registry_core::vehicle::{Vehicle, VehicleOwner, VehicleType};

const SELECT_VEHICLE: &str = r#"
    SELECT v.id, v.version, v.description, v.plate, v.mileage,
           v.first_registration, v.vehicle_type, v.username,
           v.created_at, v.updated_at,
           o.id AS owner_id, o.first_name, o.last_name
    FROM vehicle v
    JOIN vehicle_owner o ON o.id = v.owner_id
"#;

/// Repository for vehicle records
pub struct VehicleRepository {
    pool: Pool<Sqlite>,
}

impl VehicleRepository {
    /// Create a new vehicle repository
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Persist a new vehicle together with its credential.
    ///
    /// Credential, owner, and vehicle are inserted in one transaction; a
    /// violated uniqueness constraint aborts all three inserts.
    pub async fn create(&self, vehicle: &Vehicle, login: &Login) -> Result<()> {
        debug!("Creating vehicle: {} ({})", vehicle.plate, vehicle.id);

        with_deadline("vehicle.create", TIMEOUT_WRITE_MS, async {
            let mut tx = self.pool.begin().await?;

            sqlx::query("INSERT INTO login (id, username, password) VALUES (?1, ?2, ?3)")
                .bind(login.id.to_string())
                .bind(&login.username)
                .bind(&login.password)
                .execute(&mut *tx)
                .await?;

            for role in &login.roles {
                sqlx::query("INSERT INTO login_role (login_id, role) VALUES (?1, ?2)")
                    .bind(login.id.to_string())
                    .bind(role)
                    .execute(&mut *tx)
                    .await?;
            }

            sqlx::query(
                "INSERT INTO vehicle_owner (id, first_name, last_name) VALUES (?1, ?2, ?3)",
            )
            .bind(vehicle.owner.id.to_string())
            .bind(&vehicle.owner.first_name)
            .bind(&vehicle.owner.last_name)
            .execute(&mut *tx)
            .await?;

            sqlx::query(
                r#"
                INSERT INTO vehicle
                    (id, version, description, plate, mileage, first_registration,
                     vehicle_type, owner_id, username, created_at, updated_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
                "#,
            )
            .bind(vehicle.id.to_string())
            .bind(vehicle.version)
            .bind(&vehicle.description)
            .bind(&vehicle.plate)
            .bind(vehicle.mileage)
            .bind(vehicle.first_registration.map(|d| d.to_string()))
            .bind(vehicle.vehicle_type.map(|t| t.code()))
            .bind(vehicle.owner.id.to_string())
            .bind(&vehicle.username)
            .bind(vehicle.created_at.to_rfc3339())
            .bind(vehicle.updated_at.to_rfc3339())
            .execute(&mut *tx)
            .await?;

            tx.commit().await?;
            Ok(())
        })
        .await?;

        info!("Successfully created vehicle: {} ({})", vehicle.plate, vehicle.id);
        Ok(())
    }

    /// Find a vehicle by id
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Vehicle>> {
        debug!("Finding vehicle by id: {}", id);

        let sql = format!("{SELECT_VEHICLE} WHERE v.id = ?1");
        let row = with_deadline("vehicle.find_by_id", TIMEOUT_SHORT_MS, async {
            Ok(sqlx::query(&sql)
                .bind(id.to_string())
                .fetch_optional(&self.pool)
                .await?)
        })
        .await?;

        row.map(|row| vehicle_from_row(&row)).transpose()
    }

    /// List all vehicles
    pub async fn find_all(&self) -> Result<Vec<Vehicle>> {
        debug!("Listing all vehicles");

        let sql = format!("{SELECT_VEHICLE} ORDER BY v.created_at DESC");
        let rows = with_deadline("vehicle.find_all", TIMEOUT_SEARCH_MS, async {
            Ok(sqlx::query(&sql).fetch_all(&self.pool).await?)
        })
        .await?;

        rows.iter().map(vehicle_from_row).collect()
    }

    /// Find vehicles whose description contains the given value,
    /// case-sensitively
    pub async fn find_by_description_containing(&self, value: &str) -> Result<Vec<Vehicle>> {
        debug!("Finding vehicles by description substring: {}", value);

        let sql = format!("{SELECT_VEHICLE} WHERE instr(v.description, ?1) > 0");
        let rows = with_deadline("vehicle.find_by_description", TIMEOUT_SHORT_MS, async {
            Ok(sqlx::query(&sql).bind(value).fetch_all(&self.pool).await?)
        })
        .await?;

        rows.iter().map(vehicle_from_row).collect()
    }

    /// Find vehicles whose plate contains the given value, case-sensitively
    pub async fn find_by_plate_containing(&self, value: &str) -> Result<Vec<Vehicle>> {
        debug!("Finding vehicles by plate substring: {}", value);

        let sql = format!("{SELECT_VEHICLE} WHERE instr(v.plate, ?1) > 0");
        let rows = with_deadline("vehicle.find_by_plate", TIMEOUT_SHORT_MS, async {
            Ok(sqlx::query(&sql).bind(value).fetch_all(&self.pool).await?)
        })
        .await?;

        rows.iter().map(vehicle_from_row).collect()
    }

    /// Check whether a vehicle with exactly this plate exists.
    ///
    /// Advisory only: the check and any subsequent insert are separate
    /// round trips, and the unique constraint on the plate column is what
    /// actually holds under concurrency.
    pub async fn plate_exists(&self, plate: &str) -> Result<bool> {
        debug!("Checking if plate exists: {}", plate);

        let count: i64 = with_deadline("vehicle.plate_exists", TIMEOUT_SHORT_MS, async {
            Ok(
                sqlx::query_scalar("SELECT COUNT(*) FROM vehicle WHERE plate = ?1")
                    .bind(plate)
                    .fetch_one(&self.pool)
                    .await?,
            )
        })
        .await?;

        Ok(count > 0)
    }

    /// Distinct descriptions starting with the given prefix
    pub async fn descriptions_by_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        debug!("Finding descriptions by prefix: {}", prefix);

        with_deadline("vehicle.descriptions_by_prefix", TIMEOUT_SHORT_MS, async {
            Ok(sqlx::query_scalar(
                "SELECT DISTINCT description FROM vehicle WHERE instr(description, ?1) = 1",
            )
            .bind(prefix)
            .fetch_all(&self.pool)
            .await?)
        })
        .await
    }

    /// Run a compiled search plan
    pub async fn search(&self, plan: &QueryPlan) -> Result<Vec<Vehicle>> {
        debug!("Searching vehicles: {:?}", plan);

        let (sql, binds) = match plan {
            QueryPlan::All => (format!("{SELECT_VEHICLE} ORDER BY v.created_at DESC"), Vec::new()),
            QueryPlan::Filtered(predicates) => {
                let (clause, binds) = query::where_clause(predicates);
                (
                    format!("{SELECT_VEHICLE} WHERE {clause} ORDER BY v.created_at DESC"),
                    binds,
                )
            }
        };

        let rows = with_deadline("vehicle.search", TIMEOUT_SEARCH_MS, async {
            let mut statement = sqlx::query(&sql);
            for bind in &binds {
                statement = statement.bind(bind);
            }
            Ok(statement.fetch_all(&self.pool).await?)
        })
        .await?;

        debug!("Search returned {} vehicles", rows.len());
        rows.iter().map(vehicle_from_row).collect()
    }

    /// Compare-and-set update of a vehicle and its owner.
    ///
    /// The row is only written when the stored version still equals
    /// `expected_version`; the write increments the version. `Ok(None)`
    /// is the not-committed case — the caller lost the race.
    pub async fn update(
        &self,
        vehicle: &Vehicle,
        expected_version: i64,
    ) -> Result<Option<Vehicle>> {
        debug!(
            "Updating vehicle: {} ({}), expected version {}",
            vehicle.plate, vehicle.id, expected_version
        );

        let committed = with_deadline("vehicle.update", TIMEOUT_WRITE_MS, async {
            let mut tx = self.pool.begin().await?;

            let result = sqlx::query(
                r#"
                UPDATE vehicle
                SET description = ?1, plate = ?2, mileage = ?3,
                    first_registration = ?4, vehicle_type = ?5,
                    version = version + 1, updated_at = ?6
                WHERE id = ?7 AND version = ?8
                "#,
            )
            .bind(&vehicle.description)
            .bind(&vehicle.plate)
            .bind(vehicle.mileage)
            .bind(vehicle.first_registration.map(|d| d.to_string()))
            .bind(vehicle.vehicle_type.map(|t| t.code()))
            .bind(Utc::now().to_rfc3339())
            .bind(vehicle.id.to_string())
            .bind(expected_version)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                return Ok(false);
            }

            sqlx::query("UPDATE vehicle_owner SET first_name = ?1, last_name = ?2 WHERE id = ?3")
                .bind(&vehicle.owner.first_name)
                .bind(&vehicle.owner.last_name)
                .bind(vehicle.owner.id.to_string())
                .execute(&mut *tx)
                .await?;

            tx.commit().await?;
            Ok(true)
        })
        .await?;

        if !committed {
            debug!("Update not committed: version {} is gone", expected_version);
            return Ok(None);
        }

        let updated = self.find_by_id(vehicle.id).await?.ok_or_else(|| {
            Error::Internal(anyhow!("vehicle {} vanished after update", vehicle.id))
        })?;
        info!(
            "Successfully updated vehicle: {} (version {})",
            updated.id, updated.version
        );
        Ok(Some(updated))
    }

    /// Delete a vehicle and its owner; absent ids are a no-op
    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        debug!("Deleting vehicle: {}", id);

        let deleted = with_deadline("vehicle.delete", TIMEOUT_SHORT_MS, async {
            let mut tx = self.pool.begin().await?;

            let owner_id: Option<String> =
                sqlx::query_scalar("SELECT owner_id FROM vehicle WHERE id = ?1")
                    .bind(id.to_string())
                    .fetch_optional(&mut *tx)
                    .await?;

            let Some(owner_id) = owner_id else {
                debug!("deleteById: no vehicle found");
                return Ok(false);
            };

            sqlx::query("DELETE FROM vehicle WHERE id = ?1")
                .bind(id.to_string())
                .execute(&mut *tx)
                .await?;

            // The owner's lifecycle is bound to its vehicle.
            sqlx::query("DELETE FROM vehicle_owner WHERE id = ?1")
                .bind(owner_id)
                .execute(&mut *tx)
                .await?;

            tx.commit().await?;
            Ok(true)
        })
        .await?;

        if deleted {
            info!("Successfully deleted vehicle: {}", id);
        }
        Ok(deleted)
    }

    /// Count vehicles
    pub async fn count(&self) -> Result<i64> {
        with_deadline("vehicle.count", TIMEOUT_SHORT_MS, async {
            Ok(sqlx::query_scalar("SELECT COUNT(*) FROM vehicle")
                .fetch_one(&self.pool)
                .await?)
        })
        .await
    }
}

fn vehicle_from_row(row: &SqliteRow) -> Result<Vehicle> {
    let id: String = row.try_get("id")?;
    let owner_id: String = row.try_get("owner_id")?;
    let first_registration: Option<String> = row.try_get("first_registration")?;
    let vehicle_type: Option<String> = row.try_get("vehicle_type")?;
    let created_at: String = row.try_get("created_at")?;
    let updated_at: String = row.try_get("updated_at")?;

    Ok(Vehicle {
        id: Uuid::parse_str(&id).map_err(|e| Error::Internal(anyhow!("Invalid vehicle UUID: {e}")))?,
        version: row.try_get("version")?,
        description: row.try_get("description")?,
        plate: row.try_get("plate")?,
        mileage: row.try_get("mileage")?,
        first_registration: first_registration
            .map(|d| {
                d.parse::<NaiveDate>()
                    .map_err(|e| Error::Internal(anyhow!("Invalid registration date: {e}")))
            })
            .transpose()?,
        vehicle_type: vehicle_type.as_deref().and_then(VehicleType::from_code),
        owner: VehicleOwner {
            id: Uuid::parse_str(&owner_id)
                .map_err(|e| Error::Internal(anyhow!("Invalid owner UUID: {e}")))?,
            first_name: row.try_get("first_name")?,
            last_name: row.try_get("last_name")?,
        },
        username: row.try_get("username")?,
        created_at: parse_timestamp(&created_at, "created_at")?,
        updated_at: parse_timestamp(&updated_at, "updated_at")?,
    })
}

fn parse_timestamp(value: &str, column: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(value)
        .map_err(|e| Error::Internal(anyhow!("Failed to parse {column}: {e}")))?
        .with_timezone(&Utc))
}
