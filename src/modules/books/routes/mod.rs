//! HTTP handlers for the book catalog.
//!
//! Each handler checks out one pooled connection, runs one statement, and
//! returns the connection when it goes out of scope.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use libris_db::Database;
use libris_http::{AppError, JsonBody};

use super::models::{Book, Confirmation, CreateBook, EditBook, UpdateAvailability};
use super::repository;

/// Routes relative to the module mount point (`/api/livros`).
pub fn router(db: Database) -> Router {
    Router::new()
        .route("/", get(list_books).post(create_book))
        .route("/disponiveis", get(list_available_books))
        .route("/{id}", get(get_book).delete(delete_book))
        .route("/{id}/disponibilidade", patch(update_availability))
        .route("/{id}/editar", patch(edit_book))
        .with_state(db)
}

async fn list_books(State(db): State<Database>) -> Result<Json<Vec<Book>>, AppError> {
    let mut conn = db.acquire().await?;
    let books = repository::list(&mut conn).await?;
    Ok(Json(books))
}

async fn list_available_books(State(db): State<Database>) -> Result<Json<Vec<Book>>, AppError> {
    let mut conn = db.acquire().await?;
    let books = repository::list_available(&mut conn).await?;
    Ok(Json(books))
}

async fn get_book(
    State(db): State<Database>,
    Path(id): Path<i64>,
) -> Result<Json<Book>, AppError> {
    let mut conn = db.acquire().await?;
    match repository::find(&mut conn, id).await? {
        Some(book) => Ok(Json(book)),
        None => Err(AppError::not_found(format!("book {id} not found"))),
    }
}

async fn create_book(
    State(db): State<Database>,
    JsonBody(payload): JsonBody<CreateBook>,
) -> Result<(StatusCode, Json<Book>), AppError> {
    let fields = payload.validate()?;
    let mut conn = db.acquire().await?;
    let book = repository::insert(&mut conn, &fields).await?;

    tracing::info!(book_id = book.id, title = %book.title, "book created");
    Ok((StatusCode::CREATED, Json(book)))
}

async fn delete_book(
    State(db): State<Database>,
    Path(id): Path<i64>,
) -> Result<Json<Confirmation>, AppError> {
    let mut conn = db.acquire().await?;
    let removed = repository::delete(&mut conn, id).await?;

    tracing::info!(book_id = id, removed, "book delete requested");
    Ok(Json(Confirmation::new("book removed")))
}

async fn update_availability(
    State(db): State<Database>,
    Path(id): Path<i64>,
    JsonBody(payload): JsonBody<UpdateAvailability>,
) -> Result<Json<Confirmation>, AppError> {
    let mut conn = db.acquire().await?;
    let updated = repository::set_availability(&mut conn, id, payload.disponivel).await?;

    tracing::info!(
        book_id = id,
        available = payload.disponivel,
        updated,
        "book availability update requested"
    );
    Ok(Json(Confirmation::new("book availability updated")))
}

async fn edit_book(
    State(db): State<Database>,
    Path(id): Path<i64>,
    JsonBody(payload): JsonBody<EditBook>,
) -> Result<Json<Confirmation>, AppError> {
    let fields = payload.validate()?;
    let mut conn = db.acquire().await?;
    let updated = repository::replace(&mut conn, id, &fields).await?;

    tracing::info!(book_id = id, updated, "book edit requested");
    Ok(Json(Confirmation::new("book updated")))
}

#[cfg(test)]
mod tests {
    use crate::modules::books::BooksModule;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        Router,
    };
    use libris_db::Database;
    use libris_kernel::{settings::Settings, InitCtx, Module};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    /// Seeded catalog on a private in-memory database.
    async fn app() -> Router {
        let settings = Settings::default();
        let db = Database::connect_in_memory().await.unwrap();
        let ctx = InitCtx {
            settings: &settings,
            db: &db,
        };
        let module = BooksModule::new();

        let migrations: Vec<_> = module
            .migrations()
            .into_iter()
            .map(|m| (module.name().to_string(), m))
            .collect();
        db.migrate(&migrations).await.unwrap();
        module.start(&ctx).await.unwrap();

        module.routes(&ctx)
    }

    async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let body = match body {
            Some(value) => Body::from(value.to_string()),
            None => Body::empty(),
        };
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(body)
            .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    fn ids(list: &Value) -> Vec<i64> {
        list.as_array()
            .unwrap()
            .iter()
            .map(|book| book["id"].as_i64().unwrap())
            .collect()
    }

    #[tokio::test]
    async fn catalog_walkthrough() {
        let app = app().await;

        let (status, list) = send(&app, "GET", "/", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(ids(&list), vec![1, 2]);

        let (status, created) = send(
            &app,
            "POST",
            "/",
            Some(json!({"titulo": " X ", "autor": "Y  ", "ano": 2020})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(
            created,
            json!({"id": 3, "titulo": "X", "autor": "Y", "ano": 2020, "disponivel": true})
        );

        let (_, list) = send(&app, "GET", "/", None).await;
        assert_eq!(list.as_array().unwrap().len(), 3);
        assert_eq!(list[2], created);

        let (status, _) = send(
            &app,
            "PATCH",
            "/3/disponibilidade",
            Some(json!({"disponivel": false})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, available) = send(&app, "GET", "/disponiveis", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(ids(&available), vec![1, 2]);

        let (status, _) = send(&app, "DELETE", "/3", None).await;
        assert_eq!(status, StatusCode::OK);

        let (_, list) = send(&app, "GET", "/", None).await;
        assert_eq!(ids(&list), vec![1, 2]);
    }

    #[tokio::test]
    async fn get_returns_full_record() {
        let app = app().await;

        let (status, book) = send(&app, "GET", "/2", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            book,
            json!({"id": 2, "titulo": "Clean Code", "autor": "R. Martin", "ano": 2008, "disponivel": true})
        );
    }

    #[tokio::test]
    async fn get_missing_book_is_not_found() {
        let app = app().await;

        let (status, body) = send(&app, "GET", "/99", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "not_found");
    }

    #[tokio::test]
    async fn non_numeric_id_is_bad_request() {
        let app = app().await;

        let (status, _) = send(&app, "GET", "/abc", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn create_rejects_incomplete_payloads() {
        let app = app().await;

        for payload in [
            json!({"autor": "Y", "ano": 2020}),
            json!({"titulo": "X", "ano": 2020}),
            json!({"titulo": "X", "autor": "Y"}),
            json!({"titulo": "X", "autor": "Y", "ano": "two thousand"}),
            json!({"titulo": "   ", "autor": "Y", "ano": 2020}),
        ] {
            let (status, body) = send(&app, "POST", "/", Some(payload.clone())).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "payload {payload}");
            assert_eq!(body["error"]["code"], "bad_request");
        }

        let (_, list) = send(&app, "GET", "/", None).await;
        assert_eq!(list.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn create_honours_supplied_availability() {
        let app = app().await;

        let (status, created) = send(
            &app,
            "POST",
            "/",
            Some(json!({"titulo": "Lent", "autor": "Z", "ano": 1999, "disponivel": false})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["disponivel"], false);

        let (_, available) = send(&app, "GET", "/disponiveis", None).await;
        assert_eq!(ids(&available), vec![1, 2]);
    }

    #[tokio::test]
    async fn delete_missing_book_is_a_no_op() {
        let app = app().await;

        let (status, body) = send(&app, "DELETE", "/99", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["message"].is_string());

        let (_, list) = send(&app, "GET", "/", None).await;
        assert_eq!(ids(&list), vec![1, 2]);
    }

    #[tokio::test]
    async fn availability_update_changes_only_the_flag() {
        let app = app().await;
        let (_, before) = send(&app, "GET", "/1", None).await;

        let (status, _) = send(
            &app,
            "PATCH",
            "/1/disponibilidade",
            Some(json!({"disponivel": false})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (_, after) = send(&app, "GET", "/1", None).await;
        let mut expected = before.clone();
        expected["disponivel"] = json!(false);
        assert_eq!(after, expected);
    }

    #[tokio::test]
    async fn availability_update_requires_flag() {
        let app = app().await;

        let (status, _) = send(&app, "PATCH", "/1/disponibilidade", Some(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, book) = send(&app, "GET", "/1", None).await;
        assert_eq!(book["disponivel"], true);
    }

    #[tokio::test]
    async fn edit_overwrites_every_field() {
        let app = app().await;
        let edit = json!({"titulo": "Codigo Limpo", "autor": "Robert Martin", "ano": 2009, "disponivel": false});

        let (status, _) = send(&app, "PATCH", "/2/editar", Some(edit)).await;
        assert_eq!(status, StatusCode::OK);

        let (_, book) = send(&app, "GET", "/2", None).await;
        assert_eq!(
            book,
            json!({"id": 2, "titulo": "Codigo Limpo", "autor": "Robert Martin", "ano": 2009, "disponivel": false})
        );
    }

    #[tokio::test]
    async fn edit_requires_every_field() {
        let app = app().await;

        let (status, _) = send(
            &app,
            "PATCH",
            "/2/editar",
            Some(json!({"titulo": "Codigo Limpo", "autor": "Robert Martin", "ano": 2009})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, book) = send(&app, "GET", "/2", None).await;
        assert_eq!(book["titulo"], "Clean Code");
    }

    #[tokio::test]
    async fn writes_to_missing_ids_create_nothing() {
        let app = app().await;

        let (status, _) = send(
            &app,
            "PATCH",
            "/77/editar",
            Some(json!({"titulo": "Ghost", "autor": "Nobody", "ano": 1, "disponivel": true})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(
            &app,
            "PATCH",
            "/77/disponibilidade",
            Some(json!({"disponivel": false})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (_, list) = send(&app, "GET", "/", None).await;
        assert_eq!(ids(&list), vec![1, 2]);
        let (status, _) = send(&app, "GET", "/77", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn available_count_matches_total_minus_unavailable() {
        let app = app().await;

        for (title, available) in [("A", true), ("B", false), ("C", false)] {
            send(
                &app,
                "POST",
                "/",
                Some(json!({"titulo": title, "autor": "Anon", "ano": 2000, "disponivel": available})),
            )
            .await;
        }

        let (_, all) = send(&app, "GET", "/", None).await;
        let (_, available) = send(&app, "GET", "/disponiveis", None).await;
        let all = all.as_array().unwrap();
        assert_eq!(all.len(), 2 + 3);
        let unavailable = all.iter().filter(|b| b["disponivel"] == false).count();

        assert_eq!(available.as_array().unwrap().len(), all.len() - unavailable);
        assert!(available
            .as_array()
            .unwrap()
            .iter()
            .all(|b| b["disponivel"] == true));
    }
}
