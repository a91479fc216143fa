//! SQL for the `books` table. Every function runs a single statement on the
//! connection it is given.

use libris_db::{DbError, SqliteConnection};

use super::models::{Book, BookFields};

/// Rows inserted into an empty table on startup.
pub const SEED: [(&str, &str, i64); 2] = [
    ("Estruturas de Dados", "N. Wirth", 1976),
    ("Clean Code", "R. Martin", 2008),
];

pub async fn list(conn: &mut SqliteConnection) -> Result<Vec<Book>, DbError> {
    let books =
        sqlx::query_as::<_, Book>("SELECT id, title, author, year, available FROM books ORDER BY id")
            .fetch_all(conn)
            .await?;
    Ok(books)
}

pub async fn list_available(conn: &mut SqliteConnection) -> Result<Vec<Book>, DbError> {
    let books = sqlx::query_as::<_, Book>(
        "SELECT id, title, author, year, available FROM books WHERE available = 1 ORDER BY id",
    )
    .fetch_all(conn)
    .await?;
    Ok(books)
}

pub async fn find(conn: &mut SqliteConnection, id: i64) -> Result<Option<Book>, DbError> {
    let book = sqlx::query_as::<_, Book>(
        "SELECT id, title, author, year, available FROM books WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(conn)
    .await?;
    Ok(book)
}

pub async fn insert(conn: &mut SqliteConnection, fields: &BookFields) -> Result<Book, DbError> {
    let book = sqlx::query_as::<_, Book>(
        "INSERT INTO books (title, author, year, available) VALUES (?, ?, ?, ?) \
         RETURNING id, title, author, year, available",
    )
    .bind(&fields.title)
    .bind(&fields.author)
    .bind(fields.year)
    .bind(fields.available)
    .fetch_one(conn)
    .await?;
    Ok(book)
}

/// Returns the number of rows removed (0 or 1).
pub async fn delete(conn: &mut SqliteConnection, id: i64) -> Result<u64, DbError> {
    let result = sqlx::query("DELETE FROM books WHERE id = ?")
        .bind(id)
        .execute(conn)
        .await?;
    Ok(result.rows_affected())
}

pub async fn set_availability(
    conn: &mut SqliteConnection,
    id: i64,
    available: bool,
) -> Result<u64, DbError> {
    let result = sqlx::query("UPDATE books SET available = ? WHERE id = ?")
        .bind(available)
        .bind(id)
        .execute(conn)
        .await?;
    Ok(result.rows_affected())
}

/// Overwrite all mutable fields of one book.
pub async fn replace(
    conn: &mut SqliteConnection,
    id: i64,
    fields: &BookFields,
) -> Result<u64, DbError> {
    let result = sqlx::query(
        "UPDATE books SET title = ?, author = ?, year = ?, available = ? WHERE id = ?",
    )
    .bind(&fields.title)
    .bind(&fields.author)
    .bind(fields.year)
    .bind(fields.available)
    .bind(id)
    .execute(conn)
    .await?;
    Ok(result.rows_affected())
}

pub async fn count(conn: &mut SqliteConnection) -> Result<i64, DbError> {
    let total = sqlx::query_scalar("SELECT COUNT(*) FROM books")
        .fetch_one(conn)
        .await?;
    Ok(total)
}

/// Insert [`SEED`] when the table holds no rows. Returns how many rows were added.
pub async fn seed_if_empty(conn: &mut SqliteConnection) -> Result<usize, DbError> {
    if count(&mut *conn).await? > 0 {
        return Ok(0);
    }

    for (title, author, year) in SEED {
        let fields = BookFields {
            title: title.to_string(),
            author: author.to_string(),
            year,
            available: true,
        };
        insert(&mut *conn, &fields).await?;
    }

    Ok(SEED.len())
}
