//! SQLite storage for libris: pool factory, connection handles and migrations.

use std::str::FromStr;
use std::time::Duration;

use sqlx::pool::PoolConnection;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Sqlite;

pub mod error;
pub mod migration;

pub use error::DbError;
pub use migration::Migration;
pub use sqlx;
pub use sqlx::SqliteConnection;

/// Connection parameters for [`Database::connect`].
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

impl DbConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: 5,
            acquire_timeout: Duration::from_secs(5),
        }
    }
}

/// Shared storage handle. Clones share the same pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (creating if missing) the database described by `config`.
    pub async fn connect(config: &DbConfig) -> Result<Self, DbError> {
        if is_in_memory(&config.url) {
            return Self::connect_in_memory().await;
        }

        let connect_err = |source: sqlx::Error| DbError::Connect {
            url: config.url.clone(),
            source,
        };

        let options = SqliteConnectOptions::from_str(&config.url)
            .map_err(connect_err)?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect_with(options)
            .await
            .map_err(connect_err)?;

        tracing::info!(
            target: "libris-db",
            url = %config.url,
            max_connections = config.max_connections,
            "database pool ready"
        );

        Ok(Self { pool })
    }

    /// Private in-memory database.
    ///
    /// The pool holds exactly one connection that is never recycled, since an
    /// in-memory SQLite database lives only as long as its connection.
    pub async fn connect_in_memory() -> Result<Self, DbError> {
        let url = "sqlite::memory:";
        let connect_err = |source: sqlx::Error| DbError::Connect {
            url: url.to_string(),
            source,
        };

        let options = SqliteConnectOptions::from_str(url).map_err(connect_err)?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(connect_err)?;

        Ok(Self { pool })
    }

    /// Check out a connection for the duration of one unit of work.
    ///
    /// The connection goes back to the pool when the guard is dropped.
    pub async fn acquire(&self) -> Result<PoolConnection<Sqlite>, DbError> {
        Ok(self.pool.acquire().await?)
    }

    /// Apply pending migrations, returning how many ran.
    pub async fn migrate(&self, migrations: &[(String, Migration)]) -> Result<usize, DbError> {
        let mut conn = self.acquire().await?;
        migration::apply(&mut *conn, migrations).await
    }

    #[cfg(test)]
    fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn close(&self) {
        self.pool.close().await;
        tracing::info!(target: "libris-db", "database pool closed");
    }
}

/// Every connection to an in-memory URL opens a separate, empty database.
fn is_in_memory(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}
