use std::env;
use std::time::Duration;

use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{self, ConnectionManager, Pool};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use log::{debug, info};

use crate::shared::errors::{AppError, AppResult};

pub type DbPool = Pool<ConnectionManager<PgConnection>>;
pub type DbConnection = r2d2::PooledConnection<ConnectionManager<PgConnection>>;

/// DDL owned by this crate: the `activity` schema and its `job` audit table.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Handle to the shared database.
///
/// Ordinary queries go through the r2d2 pool. Exclusive runs must not: an
/// advisory lock belongs to the session that took it, so a pooled connection
/// handed back and re-borrowed would carry locks between unrelated callers.
/// [`Database::open_isolated_connection`] exists for that path and bypasses
/// the pool entirely.
pub struct Database {
    database_url: String,
    pool: DbPool,
}

impl Database {
    /// Connect using the `DATABASE_URL` environment variable, loading a
    /// `.env` file first when one is present.
    pub fn new() -> AppResult<Self> {
        dotenvy::dotenv().ok();
        let database_url = env::var("DATABASE_URL")?;
        Self::from_url(&database_url)
    }

    pub fn from_url(database_url: &str) -> AppResult<Self> {
        let manager = ConnectionManager::<PgConnection>::new(database_url);

        let pool = r2d2::Pool::builder()
            // Worker processes issue few concurrent queries; keep the pool small
            .max_size(10)
            .min_idle(Some(1))
            .connection_timeout(Duration::from_secs(10))
            .idle_timeout(Some(Duration::from_secs(300)))
            .max_lifetime(Some(Duration::from_secs(1800)))
            .test_on_check_out(true)
            .build(manager)
            .map_err(|e| {
                AppError::ConnectionError(format!("Failed to create connection pool: {}", e))
            })?;

        info!(
            "Database connection pool initialized with max_size: {}",
            pool.max_size()
        );

        Ok(Self {
            database_url: database_url.to_string(),
            pool,
        })
    }

    /// Pooled connection for ordinary queries.
    pub fn get_connection(&self) -> AppResult<DbConnection> {
        Ok(self.pool.get()?)
    }

    /// Dedicated physical connection, never drawn from the pool.
    ///
    /// Every exclusive run rides one of these: the advisory lock it takes is
    /// scoped to this session and dies with it on drop.
    pub fn open_isolated_connection(&self) -> AppResult<PgConnection> {
        debug!("opening isolated connection (pool bypassed)");
        Ok(PgConnection::establish(&self.database_url)?)
    }

    /// Apply this crate's embedded migrations (the `activity.job` table).
    pub fn run_migrations(&self) -> AppResult<()> {
        let mut conn = self.get_connection()?;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| AppError::DatabaseError(format!("Failed to run migrations: {}", e)))?;
        for version in applied {
            info!("Applied migration {}", version);
        }
        Ok(())
    }

    /// Get pool statistics for monitoring
    pub fn pool_status(&self) -> PoolStatus {
        let state = self.pool.state();
        PoolStatus {
            connections: state.connections,
            idle_connections: state.idle_connections,
            max_size: self.pool.max_size(),
        }
    }
}

#[derive(Debug)]
pub struct PoolStatus {
    pub connections: u32,
    pub idle_connections: u32,
    pub max_size: u32,
}
