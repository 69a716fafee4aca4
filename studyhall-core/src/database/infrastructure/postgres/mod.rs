//! PostgreSQL infrastructure adapters implementing the database ports.

pub mod repositories;

use std::{fmt, time::Duration};

use sqlx::{PgPool, postgres::PgPoolOptions};
use tracing::info;

use crate::error::{Result, StoreError};

pub use repositories::comments::PostgresCommentsRepository;
pub use repositories::posts::PostgresPostsRepository;
pub use repositories::saved_posts::PostgresSavedPostsRepository;

/// Statistics about the connection pool
#[derive(Debug, Clone)]
pub struct PoolStats {
    pub size: u32,
    pub idle: u32,
    pub max_size: u32,
}

#[derive(Clone)]
pub struct PostgresDatabase {
    pool: PgPool,
    max_connections: u32,
}

impl fmt::Debug for PostgresDatabase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostgresDatabase")
            .field("pool_size", &self.pool.size())
            .field("idle_connections", &self.pool.num_idle())
            .field("max_connections", &self.max_connections)
            .finish()
    }
}

impl PostgresDatabase {
    pub async fn connect(connection_string: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .connect(connection_string)
            .await
            .map_err(|e| StoreError::Internal(format!("Database connection failed: {e}")))?;

        info!(max_connections, "database pool initialized");

        Ok(Self {
            pool,
            max_connections,
        })
    }

    /// Wrap an existing pool (mainly for testing)
    pub fn from_pool(pool: PgPool) -> Self {
        let max_connections = pool.options().get_max_connections();
        Self {
            pool,
            max_connections,
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            size: self.pool.size(),
            idle: self.pool.num_idle() as u32,
            max_size: self.max_connections,
        }
    }

    /// Apply pending migrations from `studyhall-core/migrations`.
    pub async fn initialize_schema(&self) -> Result<()> {
        crate::MIGRATOR
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::Internal(format!("Migration failed: {e}")))?;
        info!("database schema up to date");
        Ok(())
    }

    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Internal(format!("Database ping failed: {e}")))?;
        Ok(())
    }

    pub fn posts(&self) -> PostgresPostsRepository {
        PostgresPostsRepository::new(self.pool.clone())
    }

    pub fn comments(&self) -> PostgresCommentsRepository {
        PostgresCommentsRepository::new(self.pool.clone())
    }

    pub fn saved_posts(&self) -> PostgresSavedPostsRepository {
        PostgresSavedPostsRepository::new(self.pool.clone())
    }
}
