use thiserror::Error;

/// Errors raised by the storage layer.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("failed to connect to database at {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("migration {module}/{id} failed: {source}")]
    Migration {
        module: String,
        id: &'static str,
        #[source]
        source: sqlx::Error,
    },

    #[error("query failed: {0}")]
    Query(#[from] sqlx::Error),
}
