pub mod models;
pub mod repository;
pub mod routes;

use anyhow::Context;
use async_trait::async_trait;
use axum::Router;
use libris_kernel::{InitCtx, Migration, Module};
use serde_json::{json, Value};

/// Book catalog served under `/api/livros`
pub struct BooksModule;

impl BooksModule {
    pub const fn new() -> Self {
        Self
    }
}

impl Default for BooksModule {
    fn default() -> Self {
        Self::new()
    }
}

/// Schema for the `books` table.
pub fn migrations() -> Vec<Migration> {
    vec![Migration {
        id: "001_create_books",
        up: r#"
            CREATE TABLE IF NOT EXISTS books (
                id        INTEGER PRIMARY KEY AUTOINCREMENT,
                title     TEXT    NOT NULL CHECK (trim(title) != ''),
                author    TEXT    NOT NULL CHECK (trim(author) != ''),
                year      INTEGER NOT NULL,
                available BOOLEAN NOT NULL DEFAULT 1
            );
            "#,
    }]
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "livros"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self, ctx: &InitCtx<'_>) -> Router {
        routes::router(ctx.db.clone())
    }

    fn openapi(&self) -> Option<Value> {
        Some(openapi())
    }

    fn migrations(&self) -> Vec<Migration> {
        migrations()
    }

    async fn start(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        let mut conn = ctx
            .db
            .acquire()
            .await
            .context("failed to acquire connection for seeding")?;
        let seeded = repository::seed_if_empty(&mut conn)
            .await
            .context("failed to seed books table")?;

        tracing::info!(module = self.name(), seeded, "books module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

fn id_parameter() -> Value {
    json!({
        "name": "id",
        "in": "path",
        "required": true,
        "description": "Book id",
        "schema": { "type": "integer", "format": "int64" }
    })
}

fn json_body(schema: &str) -> Value {
    json!({
        "required": true,
        "content": {
            "application/json": {
                "schema": { "$ref": format!("#/components/schemas/{schema}") }
            }
        }
    })
}

fn json_response(description: &str, schema: Value) -> Value {
    json!({
        "description": description,
        "content": { "application/json": { "schema": schema } }
    })
}

fn schema_ref(schema: &str) -> Value {
    json!({ "$ref": format!("#/components/schemas/{schema}") })
}

fn book_list() -> Value {
    json!({ "type": "array", "items": schema_ref("Book") })
}

fn openapi() -> Value {
    let error = schema_ref("ErrorResponse");
    let bad_request = json_response("Missing or invalid fields", error.clone());
    let confirmation = |description: &str| json_response(description, schema_ref("Confirmation"));

    json!({
        "paths": {
            "/": {
                "get": {
                    "summary": "List all books",
                    "tags": ["Books"],
                    "responses": { "200": json_response("List of books", book_list()) }
                },
                "post": {
                    "summary": "Create a book",
                    "tags": ["Books"],
                    "requestBody": json_body("CreateBook"),
                    "responses": {
                        "201": json_response("Book created", schema_ref("Book")),
                        "400": bad_request.clone()
                    }
                }
            },
            "/disponiveis": {
                "get": {
                    "summary": "List available books",
                    "tags": ["Books"],
                    "responses": { "200": json_response("Available books", book_list()) }
                }
            },
            "/{id}": {
                "get": {
                    "summary": "Get a book by id",
                    "tags": ["Books"],
                    "parameters": [id_parameter()],
                    "responses": {
                        "200": json_response("Book found", schema_ref("Book")),
                        "404": json_response("Book not found", error)
                    }
                },
                "delete": {
                    "summary": "Remove a book",
                    "tags": ["Books"],
                    "parameters": [id_parameter()],
                    "responses": { "200": confirmation("Book removed (no-op if absent)") }
                }
            },
            "/{id}/disponibilidade": {
                "patch": {
                    "summary": "Update book availability",
                    "tags": ["Books"],
                    "parameters": [id_parameter()],
                    "requestBody": json_body("UpdateAvailability"),
                    "responses": {
                        "200": confirmation("Availability updated"),
                        "400": bad_request.clone()
                    }
                }
            },
            "/{id}/editar": {
                "patch": {
                    "summary": "Replace every field of a book",
                    "tags": ["Books"],
                    "parameters": [id_parameter()],
                    "requestBody": json_body("EditBook"),
                    "responses": {
                        "200": confirmation("Book updated"),
                        "400": bad_request
                    }
                }
            }
        },
        "components": {
            "schemas": {
                "Book": {
                    "type": "object",
                    "properties": {
                        "id": { "type": "integer", "format": "int64" },
                        "titulo": { "type": "string" },
                        "autor": { "type": "string" },
                        "ano": { "type": "integer", "format": "int64" },
                        "disponivel": { "type": "boolean" }
                    },
                    "required": ["id", "titulo", "autor", "ano", "disponivel"]
                },
                "CreateBook": {
                    "type": "object",
                    "properties": {
                        "titulo": { "type": "string", "example": "Estruturas de Dados" },
                        "autor": { "type": "string", "example": "N. Wirth" },
                        "ano": { "type": "integer", "example": 1976 },
                        "disponivel": { "type": "boolean", "default": true }
                    },
                    "required": ["titulo", "autor", "ano"]
                },
                "EditBook": {
                    "type": "object",
                    "properties": {
                        "titulo": { "type": "string", "example": "Codigo Limpo" },
                        "autor": { "type": "string", "example": "Robert Martin" },
                        "ano": { "type": "integer", "example": 2008 },
                        "disponivel": { "type": "boolean", "example": true }
                    },
                    "required": ["titulo", "autor", "ano", "disponivel"]
                },
                "UpdateAvailability": {
                    "type": "object",
                    "properties": { "disponivel": { "type": "boolean" } },
                    "required": ["disponivel"]
                },
                "Confirmation": {
                    "type": "object",
                    "properties": { "message": { "type": "string" } },
                    "required": ["message"]
                }
            }
        }
    })
}

/// Create a new instance of the books module
pub fn create_module() -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(BooksModule::new())
}
