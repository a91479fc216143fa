//! Application lifecycle: connect, migrate, start modules, serve, stop.

use anyhow::Context;
use libris_db::Database;
use libris_kernel::{settings::Settings, InitCtx, ModuleRegistry};

use crate::modules;

/// Registry holding every application module
pub fn registry() -> ModuleRegistry {
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry);
    registry
}

/// A started application: storage is migrated and seeded, modules are running.
pub struct App {
    pub settings: Settings,
    pub db: Database,
    pub registry: ModuleRegistry,
}

impl App {
    fn ctx(&self) -> InitCtx<'_> {
        InitCtx {
            settings: &self.settings,
            db: &self.db,
        }
    }

    /// Stop modules in reverse order and close the pool.
    pub async fn shutdown(self) -> anyhow::Result<()> {
        let stopped = self.registry.stop_modules().await;
        self.db.close().await;
        stopped
    }
}

/// Connect to storage and bring every module up.
pub async fn prepare(settings: Settings) -> anyhow::Result<App> {
    let db = Database::connect(&settings.database.db_config())
        .await
        .context("failed to open database")?;
    prepare_with(settings, db).await
}

/// Same as [`prepare`] on an already opened database.
pub async fn prepare_with(settings: Settings, db: Database) -> anyhow::Result<App> {
    let app = App {
        settings,
        db,
        registry: registry(),
    };
    let ctx = app.ctx();

    app.registry.init_modules(&ctx).await?;

    let migrations = app.registry.collect_migrations();
    let applied = app
        .db
        .migrate(&migrations)
        .await
        .context("failed to run migrations")?;
    tracing::info!(applied, total = migrations.len(), "migrations complete");

    app.registry.start_modules(&ctx).await?;
    Ok(app)
}

/// Run the HTTP server until a shutdown signal arrives.
pub async fn serve(settings: Settings) -> anyhow::Result<()> {
    let app = prepare(settings).await?;

    let served = libris_http::start_server(&app.registry, &app.ctx()).await;
    let stopped = app.shutdown().await;

    served?;
    stopped
}

/// Apply migrations and seed data, then exit.
pub async fn migrate(settings: Settings) -> anyhow::Result<()> {
    let app = prepare(settings).await?;
    tracing::info!(url = %app.settings.database.url, "database is up to date");
    app.shutdown().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::books::repository;

    #[tokio::test]
    async fn prepare_migrates_and_seeds() {
        let db = Database::connect_in_memory().await.unwrap();
        let app = prepare_with(Settings::default(), db.clone()).await.unwrap();

        assert!(app.registry.get_module("livros").is_some());
        let mut conn = db.acquire().await.unwrap();
        assert_eq!(repository::count(&mut conn).await.unwrap(), 2);
        drop(conn);

        app.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn second_prepare_does_not_reseed() {
        let db = Database::connect_in_memory().await.unwrap();
        let first = prepare_with(Settings::default(), db.clone()).await.unwrap();
        drop(first);

        prepare_with(Settings::default(), db.clone()).await.unwrap();

        let mut conn = db.acquire().await.unwrap();
        assert_eq!(repository::count(&mut conn).await.unwrap(), 2);
    }
}
