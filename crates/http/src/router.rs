//! Router builder for the libris HTTP server

use axum::{
    extract::Request,
    http::{HeaderValue, StatusCode},
    routing::get,
    Router,
};
use std::time::Duration;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use uuid::{Timestamp, Uuid};

use libris_kernel::ModuleRegistry;

/// Builder for constructing the main HTTP router
///
/// Layers only wrap routes that were added before them, so register routes
/// and modules first and middleware last.
pub struct RouterBuilder {
    router: Router,
}

impl RouterBuilder {
    /// Create a new router builder
    pub fn new() -> Self {
        Self {
            router: Router::new(),
        }
    }

    /// Add a route to the router
    pub fn route(mut self, path: &str, route: axum::routing::MethodRouter) -> Self {
        self.router = self.router.route(path, route);
        self
    }

    /// Mount a module's router under `/api/{module_name}`
    pub fn mount_module(mut self, module_name: &str, module_router: Router) -> Self {
        let api_path = format!("/api/{}", module_name);
        self.router = self.router.nest(&api_path, module_router);
        self
    }

    /// Add tracing middleware
    pub fn with_tracing(mut self) -> Self {
        self.router = self.router.layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().include_headers(true))
                .on_request(DefaultOnRequest::new().level(tracing::Level::INFO))
                .on_response(DefaultOnResponse::new().level(tracing::Level::INFO)),
        );
        self
    }

    /// Add CORS middleware
    pub fn with_cors(mut self) -> Self {
        self.router = self.router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
        self
    }

    /// Add request ID middleware
    ///
    /// Must be applied after [`Self::with_tracing`] so the id is set before
    /// the trace span is created.
    pub fn with_request_id(mut self) -> Self {
        self.router = self
            .router
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7));
        self
    }

    /// Add timeout middleware; slow requests get `408 Request Timeout`
    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.router = self.router.layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_millis(timeout_ms),
        ));
        self
    }

    /// Add OpenAPI documentation by collecting specs from all modules
    pub fn with_openapi(mut self, registry: &ModuleRegistry) -> Self {
        let openapi_spec = merged_openapi(registry);

        // SwaggerUI needs a typed document; fall back to an empty one if the
        // merged JSON does not deserialize
        let openapi_obj: utoipa::openapi::OpenApi = serde_json::from_value(openapi_spec.clone())
            .unwrap_or_else(|err| {
                tracing::warn!(error = %err, "merged OpenAPI document is invalid");
                utoipa::openapi::OpenApiBuilder::new()
                    .info(
                        utoipa::openapi::InfoBuilder::new()
                            .title("libris API")
                            .version("1.0.0")
                            .build(),
                    )
                    .build()
            });

        self.router = self.router.merge(
            utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
                .url("/api-docs/openapi.json", openapi_obj),
        );

        // Raw JSON for external consumers
        self.router = self.router.route(
            "/docs/openapi.json",
            get(move || async move { axum::Json(openapi_spec.clone()) }),
        );

        self
    }

    /// Build the final router
    pub fn build(self) -> Router {
        self.router
    }
}

impl Default for RouterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Merge every module's OpenAPI fragment into one document, prefixing paths
/// with the module mount point.
pub fn merged_openapi(registry: &ModuleRegistry) -> serde_json::Value {
    let mut openapi_spec = serde_json::json!({
        "openapi": "3.1.0",
        "info": {
            "title": "libris API",
            "version": "1.0.0",
            "description": "Book catalog API"
        },
        "paths": {},
        "components": {
            "schemas": {}
        }
    });

    openapi_spec["components"]["schemas"]["ErrorResponse"] = serde_json::json!({
        "type": "object",
        "properties": {
            "error": {
                "type": "object",
                "properties": {
                    "code": { "type": "string" },
                    "message": { "type": "string" },
                    "details": { "type": "array", "items": {} },
                    "trace_id": { "type": "string" },
                    "timestamp": { "type": "string" }
                },
                "required": ["code", "message", "trace_id", "timestamp"]
            }
        },
        "required": ["error"]
    });

    openapi_spec["paths"]["/healthz"] = serde_json::json!({
        "get": {
            "summary": "Health check",
            "responses": {
                "200": {
                    "description": "OK",
                    "content": { "text/plain": { "schema": { "type": "string" } } }
                }
            }
        }
    });

    for module in registry.modules() {
        let Some(module_spec) = module.openapi() else {
            continue;
        };

        if let Some(paths) = module_spec.get("paths").and_then(|p| p.as_object()) {
            for (path, path_item) in paths {
                // "/" is the module root, mounted without a trailing slash
                let prefixed_path = match path.as_str() {
                    "/" => format!("/api/{}", module.name()),
                    _ => format!("/api/{}{}", module.name(), path),
                };
                openapi_spec["paths"][prefixed_path] = path_item.clone();
            }
        }

        if let Some(schemas) = module_spec
            .get("components")
            .and_then(|c| c.get("schemas"))
            .and_then(|s| s.as_object())
        {
            for (schema_name, schema_def) in schemas {
                openapi_spec["components"]["schemas"][schema_name] = schema_def.clone();
            }
        }
    }

    openapi_spec
}

/// Time-ordered request ids
#[derive(Clone, Copy)]
struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let timestamp = Timestamp::now(uuid::NoContext);
        let request_id = Uuid::new_v7(timestamp)
            .to_string()
            .parse::<HeaderValue>()
            .ok()?;
        Some(RequestId::new(request_id))
    }
}
