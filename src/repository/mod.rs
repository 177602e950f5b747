//! Repository layer for database operations
//!
//! Operations that touch more than one row run in a single transaction and
//! lock the book row (`SELECT ... FOR UPDATE`) before changing its stock.

pub mod books;
pub mod borrow_requests;
pub mod issues;
pub mod students;
pub mod users;

use sqlx::{Pool, Postgres};

use crate::error::AppError;

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub users: users::UsersRepository,
    pub students: students::StudentsRepository,
    pub books: books::BooksRepository,
    pub issues: issues::IssuesRepository,
    pub borrow_requests: borrow_requests::BorrowRequestsRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            users: users::UsersRepository::new(pool.clone()),
            students: students::StudentsRepository::new(pool.clone()),
            books: books::BooksRepository::new(pool.clone()),
            issues: issues::IssuesRepository::new(pool.clone()),
            borrow_requests: borrow_requests::BorrowRequestsRepository::new(pool.clone()),
            pool,
        }
    }

    /// Check that the database answers
    pub async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Turn unique-constraint violations into readable conflicts.
///
/// `messages` maps constraint names to the text shown to the user; any other
/// error passes through as a database error.
pub(crate) fn map_unique_violation(err: sqlx::Error, messages: &[(&str, &str)]) -> AppError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.is_unique_violation() {
            let constraint = db_err.constraint().unwrap_or_default();
            let message = messages
                .iter()
                .find(|(name, _)| *name == constraint)
                .map(|(_, message)| message.to_string())
                .unwrap_or_else(|| "A record with the same unique value already exists.".to_string());
            return AppError::Conflict(message);
        }
    }
    AppError::Database(err)
}
