use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Errors from the persistence layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("duplicate {0}")]
    Duplicate(&'static str),

    #[error("referenced {0} not found")]
    ReferenceNotFound(&'static str),

    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl DatabaseError {
    /// Classify a failed INSERT/UPDATE. Unique violations name the entity
    /// being written, foreign key violations name the referenced entity.
    pub fn from_write(err: sqlx::Error, entity: &'static str, referenced: &'static str) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            match db_err.code().as_deref() {
                Some(UNIQUE_VIOLATION) => return DatabaseError::Duplicate(entity),
                Some(FOREIGN_KEY_VIOLATION) => return DatabaseError::ReferenceNotFound(referenced),
                _ => {}
            }
        }
        DatabaseError::Sqlx(err)
    }
}

/// Pool construction and lifecycle for the relational store
pub struct DatabaseManager;

impl DatabaseManager {
    /// `DATABASE_URL` wins when present; otherwise the discrete settings are used.
    pub fn connect_options(config: &DatabaseConfig) -> Result<PgConnectOptions, DatabaseError> {
        match &config.url {
            Some(url) => Ok(url.parse::<PgConnectOptions>()?),
            None => Ok(PgConnectOptions::new()
                .host(&config.host)
                .port(config.port)
                .database(&config.database)
                .username(&config.user)
                .password(&config.password)),
        }
    }

    fn pool_options(config: &DatabaseConfig) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
    }

    /// Open the pool and verify a connection can be established
    pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
        let options = Self::connect_options(config)?;
        let pool = Self::pool_options(config).connect_with(options).await?;
        info!(
            "Connected to database (max {} connections)",
            config.max_connections
        );
        Ok(pool)
    }

    /// Pool that only connects on first use
    pub fn connect_lazy(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
        let options = Self::connect_options(config)?;
        Ok(Self::pool_options(config).connect_lazy_with(options))
    }

    /// Apply the embedded migrations
    pub async fn migrate(pool: &PgPool) -> Result<(), DatabaseError> {
        sqlx::migrate!("./migrations").run(pool).await?;
        info!("Database migrations applied");
        Ok(())
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check(pool: &PgPool) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(pool).await?;
        Ok(())
    }

    pub async fn close(pool: &PgPool) {
        pool.close().await;
        info!("Closed database pool");
    }
}
