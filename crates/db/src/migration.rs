//! Migration bookkeeping for module-contributed schema changes.

use sqlx::{Connection, SqliteConnection};

use crate::DbError;

/// Migration definition contributed by a module
#[derive(Debug, Clone)]
pub struct Migration {
    pub id: &'static str,
    pub up: &'static str,
}

const CREATE_LEDGER: &str = r#"
    CREATE TABLE IF NOT EXISTS _migrations (
        module     TEXT NOT NULL,
        id         TEXT NOT NULL,
        applied_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
        PRIMARY KEY (module, id)
    )
"#;

/// Apply every migration not yet recorded in the `_migrations` ledger.
///
/// Each migration runs in its own transaction together with its ledger row,
/// so a failed migration leaves no partial schema behind. Returns the number
/// of migrations applied by this call.
pub async fn apply(
    conn: &mut SqliteConnection,
    migrations: &[(String, Migration)],
) -> Result<usize, DbError> {
    sqlx::query(CREATE_LEDGER).execute(&mut *conn).await?;

    let mut applied = 0;
    for (module, migration) in migrations {
        let already: Option<i64> =
            sqlx::query_scalar("SELECT 1 FROM _migrations WHERE module = ? AND id = ?")
                .bind(module)
                .bind(migration.id)
                .fetch_optional(&mut *conn)
                .await?;

        if already.is_some() {
            tracing::debug!(module = %module, migration = migration.id, "migration already applied");
            continue;
        }

        let wrap = |source: sqlx::Error| DbError::Migration {
            module: module.clone(),
            id: migration.id,
            source,
        };

        let mut tx = conn.begin().await.map_err(wrap)?;
        sqlx::raw_sql(migration.up)
            .execute(&mut *tx)
            .await
            .map_err(wrap)?;
        sqlx::query("INSERT INTO _migrations (module, id) VALUES (?, ?)")
            .bind(module)
            .bind(migration.id)
            .execute(&mut *tx)
            .await
            .map_err(wrap)?;
        tx.commit().await.map_err(wrap)?;

        tracing::info!(module = %module, migration = migration.id, "migration applied");
        applied += 1;
    }

    Ok(applied)
}
