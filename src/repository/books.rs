//! Books repository for database operations

use sqlx::{Pool, Postgres};

use super::map_unique_violation;
use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookForm},
};

const BOOK_UNIQUES: &[(&str, &str)] = &[("books_isbn_key", "A book with this ISBN already exists.")];

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get book by ID
    pub async fn get_by_id(&self, id: i64) -> AppResult<Book> {
        sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// Get book by ISBN
    pub async fn get_by_isbn(&self, isbn: &str) -> AppResult<Option<Book>> {
        let book = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE isbn = $1")
            .bind(isbn)
            .fetch_optional(&self.pool)
            .await?;

        Ok(book)
    }

    /// Whole catalogue ordered by title
    pub async fn list(&self) -> AppResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>("SELECT * FROM books ORDER BY title, id")
            .fetch_all(&self.pool)
            .await?;

        Ok(books)
    }

    /// Create a new book; every copy starts on the shelf
    pub async fn create(&self, form: &BookForm) -> AppResult<Book> {
        sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (title, author_name, isbn, book_type, quantity, available_copies)
            VALUES ($1, $2, $3, $4, $5, $5)
            RETURNING *
            "#,
        )
        .bind(form.title.trim())
        .bind(form.author_name.trim())
        .bind(form.isbn.trim())
        .bind(form.book_type.trim())
        .bind(form.quantity)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, BOOK_UNIQUES))
    }

    /// Update a book, moving available copies along with the quantity
    pub async fn update(&self, id: i64, form: &BookForm) -> AppResult<Book> {
        let mut tx = self.pool.begin().await?;

        let mut book = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;

        form.apply_to(&mut book)?;

        let book = sqlx::query_as::<_, Book>(
            r#"
            UPDATE books
            SET title = $1, author_name = $2, isbn = $3, book_type = $4,
                quantity = $5, available_copies = $6
            WHERE id = $7
            RETURNING *
            "#,
        )
        .bind(&book.title)
        .bind(&book.author_name)
        .bind(&book.isbn)
        .bind(&book.book_type)
        .bind(book.quantity)
        .bind(book.available_copies)
        .bind(id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_unique_violation(e, BOOK_UNIQUES))?;

        tx.commit().await?;

        Ok(book)
    }

    /// Delete a book with its issue and request history.
    ///
    /// Refused while any copy is out.
    pub async fn delete(&self, id: i64) -> AppResult<Book> {
        let mut tx = self.pool.begin().await?;

        let book = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;

        let has_open_issues: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM issues WHERE book_id = $1 AND NOT is_returned)",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        if has_open_issues {
            return Err(AppError::Conflict(format!(
                "Cannot delete book '{}'. There are still copies issued out.",
                book.title
            )));
        }

        sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(book)
    }

    /// Total copies owned across the catalogue
    pub async fn total_quantity(&self) -> AppResult<i64> {
        let total: i64 = sqlx::query_scalar("SELECT COALESCE(SUM(quantity), 0)::bigint FROM books")
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }
}
