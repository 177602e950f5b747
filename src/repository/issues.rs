//! Issues repository for database operations

use chrono::NaiveDate;
use sqlx::{Pool, Postgres, Transaction};

use super::map_unique_violation;
use crate::{
    error::{AppError, AppResult},
    models::{
        book::Book,
        borrow_request::{BorrowRequest, RequestStatus},
        issue::{Issue, IssueDetails, IssueReceipt, LoanPolicy},
    },
};

const ISSUE_UNIQUES: &[(&str, &str)] = &[(
    "issues_one_active_per_book",
    "This student already has a copy of this book issued.",
)];

const DETAILS_SELECT: &str = r#"
    SELECT i.*, b.title AS book_title, b.isbn AS book_isbn,
           s.name AS student_name, s.registration_no
    FROM issues i
    JOIN books b ON b.id = i.book_id
    JOIN students s ON s.id = i.student_id
"#;

#[derive(Clone)]
pub struct IssuesRepository {
    pool: Pool<Postgres>,
}

impl IssuesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get issue with book and student names
    pub async fn get_details(&self, id: i64) -> AppResult<IssueDetails> {
        sqlx::query_as::<_, IssueDetails>(&format!("{} WHERE i.id = $1", DETAILS_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Issue record with id {} not found", id)))
    }

    /// Open issues, oldest first
    pub async fn list_open(&self) -> AppResult<Vec<IssueDetails>> {
        self.list_where("WHERE NOT i.is_returned ORDER BY i.issue_date, i.id", None)
            .await
    }

    /// Open issues by due date, soonest first
    pub async fn list_open_by_due_date(&self) -> AppResult<Vec<IssueDetails>> {
        self.list_where("WHERE NOT i.is_returned ORDER BY i.due_date, i.id", None)
            .await
    }

    /// Open issues that are not yet overdue
    pub async fn list_renewable(&self, today: NaiveDate) -> AppResult<Vec<IssueDetails>> {
        self.list_where(
            "WHERE NOT i.is_returned AND i.due_date >= $1 ORDER BY i.due_date, i.id",
            Some(today),
        )
        .await
    }

    /// Returned issues, most recently issued first
    pub async fn list_returned(&self) -> AppResult<Vec<IssueDetails>> {
        self.list_where("WHERE i.is_returned ORDER BY i.issue_date DESC, i.id DESC", None)
            .await
    }

    /// A student's open issues by due date
    pub async fn list_open_for_student(&self, student_id: i64) -> AppResult<Vec<IssueDetails>> {
        let issues = sqlx::query_as::<_, IssueDetails>(&format!(
            "{} WHERE i.student_id = $1 AND NOT i.is_returned ORDER BY i.due_date, i.id",
            DETAILS_SELECT
        ))
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(issues)
    }

    async fn list_where(&self, clause: &str, today: Option<NaiveDate>) -> AppResult<Vec<IssueDetails>> {
        let sql = format!("{} {}", DETAILS_SELECT, clause);
        let mut query = sqlx::query_as::<_, IssueDetails>(&sql);
        if let Some(today) = today {
            query = query.bind(today);
        }

        Ok(query.fetch_all(&self.pool).await?)
    }

    pub async fn count_open(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM issues WHERE NOT is_returned")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn count_overdue(&self, today: NaiveDate) -> AppResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM issues WHERE NOT is_returned AND due_date < $1")
                .bind(today)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    /// Lend one copy of a book to a student.
    ///
    /// Pass `borrow_request` when the issue is granted from a request; the
    /// caller owns the transaction so the request update commits with it.
    pub async fn create_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        book: &mut Book,
        student_id: i64,
        borrow_request_id: Option<i64>,
        issue_date: NaiveDate,
        due_date: NaiveDate,
    ) -> AppResult<Issue> {
        let already_issued: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM issues WHERE student_id = $1 AND book_id = $2 AND NOT is_returned)",
        )
        .bind(student_id)
        .bind(book.id)
        .fetch_one(&mut **tx)
        .await?;

        if already_issued {
            return Err(AppError::Conflict(format!(
                "This student already has '{}' issued.",
                book.title
            )));
        }

        book.checkout()?;

        sqlx::query("UPDATE books SET available_copies = $1 WHERE id = $2")
            .bind(book.available_copies)
            .bind(book.id)
            .execute(&mut **tx)
            .await?;

        let issue = sqlx::query_as::<_, Issue>(
            r#"
            INSERT INTO issues (book_id, student_id, borrow_request_id, issue_date, due_date, is_returned)
            VALUES ($1, $2, $3, $4, $5, FALSE)
            RETURNING *
            "#,
        )
        .bind(book.id)
        .bind(student_id)
        .bind(borrow_request_id)
        .bind(issue_date)
        .bind(due_date)
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| map_unique_violation(e, ISSUE_UNIQUES))?;

        Ok(issue)
    }

    /// Direct issue from the librarian desk
    pub async fn create(
        &self,
        book_id: i64,
        student_id: i64,
        issue_date: NaiveDate,
        due_date: NaiveDate,
    ) -> AppResult<(Issue, Book)> {
        let mut tx = self.pool.begin().await?;

        let mut book = lock_book(&mut tx, book_id).await?;
        let issue = Self::create_in_tx(&mut tx, &mut book, student_id, None, issue_date, due_date).await?;

        tx.commit().await?;

        Ok((issue, book))
    }

    /// Take a copy back, restock the book and close the request it came from.
    pub async fn return_issue(&self, id: i64, today: NaiveDate, policy: &LoanPolicy) -> AppResult<IssueReceipt> {
        let mut tx = self.pool.begin().await?;

        // Book row first, then the issue, like every other stock change
        let book_id: i64 = sqlx::query_scalar("SELECT book_id FROM issues WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Issue record with id {} not found", id)))?;
        let mut book = lock_book(&mut tx, book_id).await?;

        let mut issue = sqlx::query_as::<_, Issue>("SELECT * FROM issues WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        let fine = issue.mark_returned(today, policy)?;
        book.checkin();

        sqlx::query("UPDATE issues SET is_returned = TRUE, return_date = $1 WHERE id = $2")
            .bind(issue.return_date)
            .bind(issue.id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("UPDATE books SET available_copies = $1 WHERE id = $2")
            .bind(book.available_copies)
            .bind(book.id)
            .execute(&mut *tx)
            .await?;

        // Linked request if the issue has one, otherwise the latest open
        // request for the same student and book.
        let request = match issue.borrow_request_id {
            Some(request_id) => {
                sqlx::query_as::<_, BorrowRequest>("SELECT * FROM borrow_requests WHERE id = $1 FOR UPDATE")
                    .bind(request_id)
                    .fetch_optional(&mut *tx)
                    .await?
            }
            None => {
                sqlx::query_as::<_, BorrowRequest>(
                    r#"
                    SELECT * FROM borrow_requests
                    WHERE student_id = $1 AND book_id = $2 AND status IN ('pending', 'approved')
                    ORDER BY request_date DESC, id DESC
                    LIMIT 1
                    FOR UPDATE
                    "#,
                )
                .bind(issue.student_id)
                .bind(issue.book_id)
                .fetch_optional(&mut *tx)
                .await?
            }
        };

        if let Some(mut request) = request {
            if request.complete().is_ok() {
                sqlx::query("UPDATE borrow_requests SET status = $1 WHERE id = $2")
                    .bind(RequestStatus::Completed)
                    .bind(request.id)
                    .execute(&mut *tx)
                    .await?;
            }
        }

        let student_name: String = sqlx::query_scalar("SELECT name FROM students WHERE id = $1")
            .bind(issue.student_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(IssueReceipt {
            issue,
            book_title: book.title,
            student_name,
            fine,
        })
    }

    /// Push the due date of an open issue back by `days`
    pub async fn renew(&self, id: i64, days: i64, today: NaiveDate, policy: &LoanPolicy) -> AppResult<IssueReceipt> {
        let mut tx = self.pool.begin().await?;

        let mut issue = sqlx::query_as::<_, Issue>("SELECT * FROM issues WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Issue record with id {} not found", id)))?;

        let new_due_date = issue.renew(days, today, policy)?;

        sqlx::query("UPDATE issues SET due_date = $1 WHERE id = $2")
            .bind(new_due_date)
            .bind(issue.id)
            .execute(&mut *tx)
            .await?;

        let (book_title, student_name): (String, String) = sqlx::query_as(
            r#"
            SELECT b.title, s.name
            FROM books b, students s
            WHERE b.id = $1 AND s.id = $2
            "#,
        )
        .bind(issue.book_id)
        .bind(issue.student_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(IssueReceipt {
            issue,
            book_title,
            student_name,
            fine: 0,
        })
    }
}

/// Lock a book row for the rest of the transaction
pub(crate) async fn lock_book(tx: &mut Transaction<'_, Postgres>, book_id: i64) -> AppResult<Book> {
    sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1 FOR UPDATE")
        .bind(book_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", book_id)))
}
