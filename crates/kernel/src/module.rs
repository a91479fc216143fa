use async_trait::async_trait;
use axum::Router;
use libris_db::{Database, Migration};

/// Context provided to modules during initialization
pub struct InitCtx<'a> {
    pub settings: &'a crate::settings::Settings,
    pub db: &'a Database,
}

/// Core module trait that all libris modules must implement
#[async_trait]
pub trait Module: Sync + Send {
    /// Unique name for this module
    /// Routes are mounted under `/api/{name}`
    fn name(&self) -> &'static str;

    /// Initialize the module with the provided context
    /// Called during application startup before migrations
    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Return the Axum router for this module's routes
    /// Handlers receive the storage handle from `ctx` as router state
    fn routes(&self, _ctx: &InitCtx<'_>) -> Router {
        Router::new()
    }

    /// Return OpenAPI specification fragment for this module as JSON
    /// Will be merged with other modules' specs
    fn openapi(&self) -> Option<serde_json::Value> {
        None
    }

    /// Return migrations contributed by this module
    /// Migrations are executed in the order returned
    fn migrations(&self) -> Vec<Migration> {
        vec![]
    }

    /// Called after migrations are complete
    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Stop the module and clean up resources
    /// Called during application shutdown
    async fn stop(&self) -> anyhow::Result<()> {
        Ok(())
    }
}
