//! # intake-db
//!
//! PostgreSQL database layer for the intake pipeline.
//!
//! This crate provides:
//! - Connection pool management
//! - The staging record repository (idempotent insert, review workflow)
//! - Best-effort source document lookup
//! - Embedded schema migrations
//!
//! ## Example
//!
//! ```rust,ignore
//! use intake_db::Database;
//! use intake_core::StagingRepository;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/intake").await?;
//!     db.run_migrations().await?;
//!
//!     let pending = db.staging.list_pending(50, 0).await?;
//!     println!("{} records awaiting review", pending.len());
//!     Ok(())
//! }
//! ```

pub mod documents;
pub mod pool;
pub mod staging;

// Re-export core types
pub use intake_core::*;

pub use documents::PgDocumentRepository;
pub use pool::{create_pool, create_pool_with_config, log_pool_metrics, PoolConfig};
pub use staging::PgStagingRepository;

/// Embedded migrations, applied with [`Database::run_migrations`].
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!();

/// Combined database context with all repositories.
#[derive(Clone)]
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    /// Staging record repository.
    pub staging: PgStagingRepository,
    /// Source document lookup repository.
    pub documents: PgDocumentRepository,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            staging: PgStagingRepository::new(pool.clone()),
            documents: PgDocumentRepository::new(pool.clone()),
            pool,
        }
    }

    /// Connect with default pool configuration.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = create_pool(database_url).await?;
        Ok(Self::new(pool))
    }

    /// Connect with custom pool configuration.
    pub async fn connect_with_config(database_url: &str, config: PoolConfig) -> Result<Self> {
        let pool = create_pool_with_config(database_url, config).await?;
        Ok(Self::new(pool))
    }

    /// Apply embedded schema migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        MIGRATOR
            .run(&self.pool)
            .await
            .map_err(|e| Error::Database(e.into()))
    }
}
