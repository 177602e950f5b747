//! Borrow requests repository for database operations

use chrono::NaiveDate;
use sqlx::{Pool, Postgres};

use super::{issues::lock_book, issues::IssuesRepository, map_unique_violation};
use crate::{
    error::{AppError, AppResult},
    models::{
        book::Book,
        borrow_request::{check_borrow_eligibility, BorrowRequest, BorrowRequestDetails, RequestStatus},
        issue::Issue,
    },
};

const REQUEST_UNIQUES: &[(&str, &str)] = &[(
    "borrow_requests_one_open_per_book",
    "You already have a pending or approved request for this book.",
)];

/// What happened when a librarian approved a request
#[derive(Debug)]
pub enum ApprovalOutcome {
    /// A copy was issued against the request
    Approved {
        request: BorrowRequest,
        issue: Issue,
        book: Book,
        student_name: String,
    },
    /// No copy was left; the request was rejected instead
    OutOfStock { request: BorrowRequest, book: Book },
}

#[derive(Clone)]
pub struct BorrowRequestsRepository {
    pool: Pool<Postgres>,
}

impl BorrowRequestsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get request by ID
    pub async fn get_by_id(&self, id: i64) -> AppResult<BorrowRequest> {
        sqlx::query_as::<_, BorrowRequest>("SELECT * FROM borrow_requests WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Borrow request with id {} not found", id)))
    }

    /// Get request with book and student names
    pub async fn get_details(&self, id: i64) -> AppResult<BorrowRequestDetails> {
        sqlx::query_as::<_, BorrowRequestDetails>(
            r#"
            SELECT r.*, b.title AS book_title, b.available_copies,
                   s.name AS student_name, s.registration_no
            FROM borrow_requests r
            JOIN books b ON b.id = r.book_id
            JOIN students s ON s.id = r.student_id
            WHERE r.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Borrow request with id {} not found", id)))
    }

    /// Pending and approved requests, oldest first
    pub async fn list_open(&self) -> AppResult<Vec<BorrowRequestDetails>> {
        let requests = sqlx::query_as::<_, BorrowRequestDetails>(
            r#"
            SELECT r.*, b.title AS book_title, b.available_copies,
                   s.name AS student_name, s.registration_no
            FROM borrow_requests r
            JOIN books b ON b.id = r.book_id
            JOIN students s ON s.id = r.student_id
            WHERE r.status IN ('pending', 'approved')
            ORDER BY r.request_date, r.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(requests)
    }

    /// Books a student has a pending or approved request for
    pub async fn open_book_ids_for_student(&self, student_id: i64) -> AppResult<Vec<i64>> {
        let ids: Vec<i64> = sqlx::query_scalar(
            "SELECT book_id FROM borrow_requests WHERE student_id = $1 AND status IN ('pending', 'approved')",
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }

    pub async fn count_by_status(&self, status: RequestStatus) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM borrow_requests WHERE status = $1")
            .bind(status)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn count_for_student(&self, student_id: i64, status: RequestStatus) -> AppResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM borrow_requests WHERE student_id = $1 AND status = $2")
                .bind(student_id)
                .bind(status)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    /// File a new pending request for a student
    pub async fn create(&self, student_id: i64, book_id: i64, today: NaiveDate) -> AppResult<(BorrowRequest, Book)> {
        let mut tx = self.pool.begin().await?;

        // Locking the book serialises concurrent requests for it
        let book = lock_book(&mut tx, book_id).await?;

        let has_active_issue: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM issues WHERE student_id = $1 AND book_id = $2 AND NOT is_returned)",
        )
        .bind(student_id)
        .bind(book_id)
        .fetch_one(&mut *tx)
        .await?;

        let has_open_request: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM borrow_requests
                WHERE student_id = $1 AND book_id = $2 AND status IN ('pending', 'approved')
            )
            "#,
        )
        .bind(student_id)
        .bind(book_id)
        .fetch_one(&mut *tx)
        .await?;

        check_borrow_eligibility(&book, has_active_issue, has_open_request)?;

        let request = sqlx::query_as::<_, BorrowRequest>(
            r#"
            INSERT INTO borrow_requests (book_id, student_id, request_date, status)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(book_id)
        .bind(student_id)
        .bind(today)
        .bind(RequestStatus::Pending)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_unique_violation(e, REQUEST_UNIQUES))?;

        tx.commit().await?;

        Ok((request, book))
    }

    /// Approve a pending request by issuing a copy, or reject it when the
    /// shelf is empty.
    pub async fn approve(&self, id: i64, today: NaiveDate, due_date: NaiveDate) -> AppResult<ApprovalOutcome> {
        // Read first to learn the book, then lock book before request, the
        // same order issuing and returning use.
        let unlocked = self.get_by_id(id).await?;

        let mut tx = self.pool.begin().await?;
        let mut book = lock_book(&mut tx, unlocked.book_id).await?;

        let mut request = sqlx::query_as::<_, BorrowRequest>("SELECT * FROM borrow_requests WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Borrow request with id {} not found", id)))?;

        if request.status != RequestStatus::Pending {
            // reuse the state machine's refusal message
            request.clone().approve()?;
        }

        if !book.is_in_stock() {
            request.reject()?;
            sqlx::query("UPDATE borrow_requests SET status = $1 WHERE id = $2")
                .bind(request.status)
                .bind(request.id)
                .execute(&mut *tx)
                .await?;
            tx.commit().await?;

            return Ok(ApprovalOutcome::OutOfStock { request, book });
        }

        let issue = IssuesRepository::create_in_tx(
            &mut tx,
            &mut book,
            request.student_id,
            Some(request.id),
            today,
            due_date,
        )
        .await?;

        request.approve()?;
        sqlx::query("UPDATE borrow_requests SET status = $1 WHERE id = $2")
            .bind(request.status)
            .bind(request.id)
            .execute(&mut *tx)
            .await?;

        let student_name: String = sqlx::query_scalar("SELECT name FROM students WHERE id = $1")
            .bind(request.student_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(ApprovalOutcome::Approved {
            request,
            issue,
            book,
            student_name,
        })
    }

    /// Reject a pending request
    pub async fn reject(&self, id: i64) -> AppResult<BorrowRequestDetails> {
        let mut tx = self.pool.begin().await?;

        let mut request = sqlx::query_as::<_, BorrowRequest>("SELECT * FROM borrow_requests WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Borrow request with id {} not found", id)))?;

        request.reject()?;

        sqlx::query("UPDATE borrow_requests SET status = $1 WHERE id = $2")
            .bind(request.status)
            .bind(request.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        self.get_details(id).await
    }
}
