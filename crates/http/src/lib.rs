//! HTTP server facade for libris with Axum, error handling, and OpenAPI support.

use anyhow::Context;
use axum::{routing::get, Router};

use libris_kernel::{settings::Settings, InitCtx, ModuleRegistry};

pub mod error;
pub mod extract;
pub mod router;

pub use error::AppError;
pub use extract::JsonBody;
use router::RouterBuilder;

/// Start the HTTP server and serve until Ctrl-C or SIGTERM
pub async fn start_server(registry: &ModuleRegistry, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
    let server = &ctx.settings.server;
    let app = build_router(registry, ctx);

    let listener = tokio::net::TcpListener::bind(server.bind_address())
        .await
        .with_context(|| format!("failed to bind to {}", server.bind_address()))?;

    tracing::info!("HTTP server listening on http://{}", server.bind_address());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    tracing::info!("HTTP server stopped");
    Ok(())
}

/// Build the main HTTP router with all module routes mounted
pub fn build_router(registry: &ModuleRegistry, ctx: &InitCtx<'_>) -> Router {
    let settings: &Settings = ctx.settings;
    let mut router_builder = RouterBuilder::new().route("/healthz", get(health_check));

    for module in registry.modules() {
        let module_name = module.name();
        tracing::info!(
            module = module_name,
            "mounting module routes under /api/{}",
            module_name
        );
        router_builder = router_builder.mount_module(module_name, module.routes(ctx));
    }

    router_builder
        .with_openapi(registry)
        .with_tracing()
        .with_cors()
        .with_request_id()
        .with_timeout(settings.server.request_timeout_ms)
        .build()
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "ok"
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
