use libris_http::AppError;
use serde::{Deserialize, Serialize};

/// A book as stored and as returned by every read endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Book {
    /// Server-assigned identifier
    pub id: i64,
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "autor")]
    pub author: String,
    #[serde(rename = "ano")]
    pub year: i64,
    #[serde(rename = "disponivel")]
    pub available: bool,
}

/// Validated, normalized field set written on create and full edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookFields {
    pub title: String,
    pub author: String,
    pub year: i64,
    pub available: bool,
}

impl BookFields {
    /// Trim `title` and `author`, rejecting values that are blank.
    pub fn new(
        title: &str,
        author: &str,
        year: i64,
        available: bool,
    ) -> Result<Self, AppError> {
        Ok(Self {
            title: non_blank("titulo", title)?,
            author: non_blank("autor", author)?,
            year,
            available,
        })
    }
}

fn non_blank(field: &str, value: &str) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::bad_request(format!("`{field}` must not be blank")));
    }
    Ok(trimmed.to_string())
}

/// Request body for `POST /api/livros`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBook {
    pub titulo: String,
    pub autor: String,
    pub ano: i64,
    #[serde(default = "default_available")]
    pub disponivel: bool,
}

fn default_available() -> bool {
    true
}

impl CreateBook {
    pub fn validate(&self) -> Result<BookFields, AppError> {
        BookFields::new(&self.titulo, &self.autor, self.ano, self.disponivel)
    }
}

/// Request body for `PATCH /api/livros/{id}/editar`; every field is required.
#[derive(Debug, Clone, Deserialize)]
pub struct EditBook {
    pub titulo: String,
    pub autor: String,
    pub ano: i64,
    pub disponivel: bool,
}

impl EditBook {
    pub fn validate(&self) -> Result<BookFields, AppError> {
        BookFields::new(&self.titulo, &self.autor, self.ano, self.disponivel)
    }
}

/// Request body for `PATCH /api/livros/{id}/disponibilidade`.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateAvailability {
    pub disponivel: bool,
}

/// Acknowledgement returned by mutating endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Confirmation {
    pub message: String,
}

impl Confirmation {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn create_defaults_to_available() {
        let payload: CreateBook =
            serde_json::from_str(r#"{"titulo":"X","autor":"Y","ano":2020}"#).unwrap();
        assert!(payload.disponivel);
    }

    #[test]
    fn create_honours_supplied_availability() {
        let payload: CreateBook = serde_json::from_str(
            r#"{"titulo":"X","autor":"Y","ano":2020,"disponivel":false}"#,
        )
        .unwrap();
        assert!(!payload.validate().unwrap().available);
    }

    #[test]
    fn fields_are_trimmed() {
        let fields = BookFields::new("  Dune ", "\tF. Herbert\n", 1965, true).unwrap();
        assert_eq!(fields.title, "Dune");
        assert_eq!(fields.author, "F. Herbert");
    }

    #[test]
    fn blank_author_is_rejected() {
        let err = BookFields::new("Dune", "   ", 1965, true).unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(err.to_string().contains("autor"));
    }

    #[test]
    fn book_serializes_with_wire_names() {
        let book = Book {
            id: 1,
            title: "Clean Code".to_string(),
            author: "R. Martin".to_string(),
            year: 2008,
            available: true,
        };
        assert_eq!(
            serde_json::to_value(&book).unwrap(),
            serde_json::json!({
                "id": 1,
                "titulo": "Clean Code",
                "autor": "R. Martin",
                "ano": 2008,
                "disponivel": true
            })
        );
    }
}
