//! Catalogue management service

use std::collections::HashSet;

use validator::Validate;

use crate::{
    error::AppResult,
    models::book::{Book, BookForm},
    repository::Repository,
};

/// Book list plus the books the viewing student already asked for
#[derive(Debug, Clone, Default)]
pub struct BookListing {
    pub books: Vec<Book>,
    pub requested: HashSet<i64>,
}

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// All books by title; `student_id` marks the ones with an open request
    pub async fn list_books(&self, student_id: Option<i64>) -> AppResult<BookListing> {
        let books = self.repository.books.list().await?;

        let requested = match student_id {
            Some(id) => self
                .repository
                .borrow_requests
                .open_book_ids_for_student(id)
                .await?
                .into_iter()
                .collect(),
            None => HashSet::new(),
        };

        Ok(BookListing { books, requested })
    }

    pub async fn get_book(&self, id: i64) -> AppResult<Book> {
        self.repository.books.get_by_id(id).await
    }

    pub async fn add_book(&self, form: &BookForm) -> AppResult<Book> {
        form.validate()?;
        let book = self.repository.books.create(form).await?;
        tracing::info!(book_id = book.id, isbn = %book.isbn, quantity = book.quantity, "Added book");
        Ok(book)
    }

    pub async fn update_book(&self, id: i64, form: &BookForm) -> AppResult<Book> {
        form.validate()?;
        let book = self.repository.books.update(id, form).await?;
        tracing::info!(
            book_id = book.id,
            quantity = book.quantity,
            available_copies = book.available_copies,
            "Updated book"
        );
        Ok(book)
    }

    pub async fn delete_book(&self, id: i64) -> AppResult<Book> {
        let book = self.repository.books.delete(id).await.map_err(|e| {
            tracing::warn!(book_id = id, "Book deletion refused: {}", e);
            e
        })?;
        tracing::info!(book_id = book.id, isbn = %book.isbn, "Deleted book");
        Ok(book)
    }
}
