use anyhow::Context;
use std::sync::Arc;

use crate::module::{InitCtx, Module};
use libris_db::Migration;

/// Module registry for managing module lifecycle in registration order
pub struct ModuleRegistry {
    modules: Vec<Arc<dyn Module>>,
}

impl ModuleRegistry {
    /// Create a new module registry
    pub fn new() -> Self {
        Self {
            modules: Vec::new(),
        }
    }

    /// Register a module with the registry
    pub fn register(&mut self, module: Arc<dyn Module>) {
        tracing::debug!(module = module.name(), "module registered");
        self.modules.push(module);
    }

    /// Get all registered modules in registration order
    pub fn modules(&self) -> impl Iterator<Item = &Arc<dyn Module>> {
        self.modules.iter()
    }

    /// Get a module by name
    pub fn get_module(&self, name: &str) -> Option<&Arc<dyn Module>> {
        self.modules.iter().find(|module| module.name() == name)
    }

    /// Initialize modules in registration order
    pub async fn init_modules(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!("initializing {} modules", self.modules.len());

        for module in &self.modules {
            tracing::info!(module = module.name(), "initializing module");

            module
                .init(ctx)
                .await
                .with_context(|| format!("failed to initialize module '{}'", module.name()))?;
        }

        Ok(())
    }

    /// Start modules in registration order
    pub async fn start_modules(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!("starting {} modules", self.modules.len());

        for module in &self.modules {
            tracing::info!(module = module.name(), "starting module");

            module
                .start(ctx)
                .await
                .with_context(|| format!("failed to start module '{}'", module.name()))?;
        }

        Ok(())
    }

    /// Stop modules in reverse registration order
    pub async fn stop_modules(&self) -> anyhow::Result<()> {
        tracing::info!("stopping {} modules", self.modules.len());

        for module in self.modules.iter().rev() {
            tracing::info!(module = module.name(), "stopping module");

            module
                .stop()
                .await
                .with_context(|| format!("failed to stop module '{}'", module.name()))?;
        }

        Ok(())
    }

    /// Collect all migrations from all modules
    pub fn collect_migrations(&self) -> Vec<(String, Migration)> {
        let mut migrations: Vec<(String, Migration)> = self
            .modules
            .iter()
            .flat_map(|module| {
                module
                    .migrations()
                    .into_iter()
                    .map(move |migration| (module.name().to_string(), migration))
            })
            .collect();

        // Sort by module name and migration ID for deterministic ordering
        migrations.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.id.cmp(b.1.id)));

        migrations
    }
}

impl Default for ModuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use libris_db::Database;
    use std::sync::Mutex;

    struct TestModule {
        name: &'static str,
        events: Arc<Mutex<Vec<String>>>,
    }

    impl TestModule {
        fn record(&self, event: &str) {
            self.events
                .lock()
                .unwrap()
                .push(format!("{}:{}", event, self.name));
        }
    }

    #[async_trait::async_trait]
    impl Module for TestModule {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
            self.record("init");
            Ok(())
        }

        fn migrations(&self) -> Vec<Migration> {
            vec![
                Migration {
                    id: "002_index",
                    up: "CREATE INDEX test_idx ON test (id);",
                },
                Migration {
                    id: "001_init",
                    up: "CREATE TABLE test (id INTEGER);",
                },
            ]
        }

        async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
            self.record("start");
            Ok(())
        }

        async fn stop(&self) -> anyhow::Result<()> {
            self.record("stop");
            Ok(())
        }
    }

    struct FailingModule;

    #[async_trait::async_trait]
    impl Module for FailingModule {
        fn name(&self) -> &'static str {
            "broken"
        }

        async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
            anyhow::bail!("boom")
        }
    }

    #[test]
    fn test_module_registry_creation() {
        let registry = ModuleRegistry::new();
        assert!(registry.modules().next().is_none());
        assert!(registry.collect_migrations().is_empty());
    }

    #[test]
    fn test_migrations_are_sorted_per_module() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let mut registry = ModuleRegistry::new();
        registry.register(Arc::new(TestModule {
            name: "zeta",
            events: events.clone(),
        }));
        registry.register(Arc::new(TestModule {
            name: "alpha",
            events,
        }));

        let order: Vec<(String, &str)> = registry
            .collect_migrations()
            .into_iter()
            .map(|(module, migration)| (module, migration.id))
            .collect();

        assert_eq!(
            order,
            vec![
                ("alpha".to_string(), "001_init"),
                ("alpha".to_string(), "002_index"),
                ("zeta".to_string(), "001_init"),
                ("zeta".to_string(), "002_index"),
            ]
        );
    }

    #[tokio::test]
    async fn test_module_lifecycle() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let mut registry = ModuleRegistry::new();
        for name in ["first", "second"] {
            registry.register(Arc::new(TestModule {
                name,
                events: events.clone(),
            }));
        }
        assert!(registry.get_module("second").is_some());
        assert!(registry.get_module("missing").is_none());

        let settings = Settings::default();
        let db = Database::connect_in_memory().await.unwrap();
        let ctx = InitCtx {
            settings: &settings,
            db: &db,
        };

        registry.init_modules(&ctx).await.unwrap();
        registry.start_modules(&ctx).await.unwrap();
        registry.stop_modules().await.unwrap();

        assert_eq!(
            *events.lock().unwrap(),
            vec![
                "init:first",
                "init:second",
                "start:first",
                "start:second",
                "stop:second",
                "stop:first",
            ]
        );
    }

    #[tokio::test]
    async fn test_start_failure_names_module() {
        let mut registry = ModuleRegistry::new();
        registry.register(Arc::new(FailingModule));

        let settings = Settings::default();
        let db = Database::connect_in_memory().await.unwrap();
        let ctx = InitCtx {
            settings: &settings,
            db: &db,
        };

        let err = registry.start_modules(&ctx).await.unwrap_err();
        assert_eq!(err.to_string(), "failed to start module 'broken'");
    }
}
