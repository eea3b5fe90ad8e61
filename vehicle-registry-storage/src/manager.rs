//! Storage manager wiring the pool, repositories, and services

use crate::notify::{LogNotifier, Notifier};
use crate::repositories::{LoginRepository, VehicleRepository};
use crate::services::{IdentityService, VehicleReadService, VehicleWriteService};
use crate::{migrations, Result};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Sqlite};
use std::sync::Arc;
use tracing::info;

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: Option<u32>,
    pub migrate_on_startup: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite::memory:".to_string(),
            max_connections: Some(5),
            migrate_on_startup: true,
        }
    }
}

/// Main storage manager coordinating repositories and services
pub struct StorageManager {
    pool: Pool<Sqlite>,
    vehicles: Arc<VehicleRepository>,
    logins: Arc<LoginRepository>,
    identity: Arc<IdentityService>,
    reads: Arc<VehicleReadService>,
    writes: Arc<VehicleWriteService>,
}

impl StorageManager {
    /// Create a new storage manager with the default log-only notifier
    pub async fn new(config: &DatabaseConfig) -> Result<Self> {
        Self::with_notifier(config, Arc::new(LogNotifier)).await
    }

    /// Create a new storage manager with a custom notifier
    pub async fn with_notifier(
        config: &DatabaseConfig,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        info!("Connecting to database: {}", config.url);

        let mut options = SqlitePoolOptions::new();
        if let Some(max_connections) = config.max_connections {
            options = options.max_connections(max_connections);
        }
        let pool = options.connect(&config.url).await?;

        info!("Database connection established");

        if config.migrate_on_startup {
            migrations::run_migrations(&pool).await?;
        }

        let vehicles = Arc::new(VehicleRepository::new(pool.clone()));
        let logins = Arc::new(LoginRepository::new(pool.clone()));
        let identity = Arc::new(IdentityService::new(Arc::clone(&logins)));
        let reads = Arc::new(VehicleReadService::new(
            Arc::clone(&vehicles),
            Arc::clone(&identity),
        ));
        let writes = Arc::new(VehicleWriteService::new(
            Arc::clone(&vehicles),
            Arc::clone(&identity),
            notifier,
        ));

        Ok(Self {
            pool,
            vehicles,
            logins,
            identity,
            reads,
            writes,
        })
    }

    /// Get vehicle repository
    pub fn vehicles(&self) -> Arc<VehicleRepository> {
        self.vehicles.clone()
    }

    /// Get login repository
    pub fn logins(&self) -> Arc<LoginRepository> {
        self.logins.clone()
    }

    /// Get identity service
    pub fn identity(&self) -> Arc<IdentityService> {
        self.identity.clone()
    }

    /// Get read service
    pub fn reads(&self) -> Arc<VehicleReadService> {
        self.reads.clone()
    }

    /// Get write service
    pub fn writes(&self) -> Arc<VehicleWriteService> {
        self.writes.clone()
    }

    /// Check database health
    pub async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Get database statistics
    pub async fn stats(&self) -> Result<DatabaseStats> {
        Ok(DatabaseStats {
            vehicles_count: self.vehicles.count().await?,
            logins_count: self.logins.count().await?,
        })
    }
}

/// Database statistics
#[derive(Debug, Clone)]
pub struct DatabaseStats {
    pub vehicles_count: i64,
    pub logins_count: i64,
}
