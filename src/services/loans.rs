//! Issue, return and renewal service

use validator::Validate;

use crate::{
    config::LibraryConfig,
    error::{AppError, AppResult},
    models::issue::{IssueBookForm, IssueDetails, IssueReceipt, LoanPolicy},
    repository::Repository,
};

#[derive(Clone)]
pub struct LoansService {
    repository: Repository,
    library: LibraryConfig,
    policy: LoanPolicy,
}

impl LoansService {
    pub fn new(repository: Repository, library: LibraryConfig, policy: LoanPolicy) -> Self {
        Self {
            repository,
            library,
            policy,
        }
    }

    pub fn policy(&self) -> &LoanPolicy {
        &self.policy
    }

    /// Issue a book directly by registration number and ISBN
    pub async fn issue_book(&self, form: &IssueBookForm) -> AppResult<IssueReceipt> {
        form.validate()?;
        let today = self.library.today();
        let registration_no = form.registration_no.trim();
        let isbn = form.book_isbn.trim();

        let due_date = form.due_date.unwrap_or_else(|| self.policy.default_due_date(today));
        if due_date < today {
            return Err(AppError::Validation("Due date cannot be in the past.".to_string()));
        }

        let student = self
            .repository
            .students
            .get_by_registration_no(registration_no)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Student with Reg. No. {} not found.", registration_no))
            })?;

        let book = self
            .repository
            .books
            .get_by_isbn(isbn)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with ISBN {} not found.", isbn)))?;

        let (issue, book) = self
            .repository
            .issues
            .create(book.id, student.id, today, due_date)
            .await
            .map_err(|e| {
                tracing::warn!(isbn = %isbn, registration_no = %registration_no, "Issue refused: {}", e);
                e
            })?;

        tracing::info!(
            issue_id = issue.id,
            book_id = book.id,
            student_id = student.id,
            due_date = %issue.due_date,
            available_copies = book.available_copies,
            "Issued book"
        );

        Ok(IssueReceipt {
            issue,
            book_title: book.title,
            student_name: student.name,
            fine: 0,
        })
    }

    /// Check a copy back in; the receipt carries the fine owed
    pub async fn return_book(&self, issue_id: i64) -> AppResult<IssueReceipt> {
        let today = self.library.today();
        let receipt = self
            .repository
            .issues
            .return_issue(issue_id, today, &self.policy)
            .await?;

        tracing::info!(
            issue_id = receipt.issue.id,
            book_id = receipt.issue.book_id,
            fine = receipt.fine,
            "Returned book"
        );

        Ok(receipt)
    }

    /// Extend an open issue by `renewal_days`
    pub async fn renew_book(&self, issue_id: i64, renewal_days: i64) -> AppResult<IssueReceipt> {
        let today = self.library.today();
        let receipt = self
            .repository
            .issues
            .renew(issue_id, renewal_days, today, &self.policy)
            .await
            .map_err(|e| {
                tracing::warn!(issue_id, "Renewal refused: {}", e);
                e
            })?;

        tracing::info!(
            issue_id = receipt.issue.id,
            renewal_days,
            due_date = %receipt.issue.due_date,
            "Renewed issue"
        );

        Ok(receipt)
    }

    /// Open issues for the return form
    pub async fn open_issues(&self) -> AppResult<Vec<IssueDetails>> {
        self.repository.issues.list_open().await
    }

    /// Open, not yet overdue issues for the renew form
    pub async fn renewable_issues(&self) -> AppResult<Vec<IssueDetails>> {
        self.repository.issues.list_renewable(self.library.today()).await
    }

    /// A student says they are bringing a book back.
    ///
    /// Nothing changes until a librarian checks the copy in.
    pub async fn confirm_student_return(&self, student_id: i64, issue_id: i64) -> AppResult<IssueDetails> {
        let details = self.repository.issues.get_details(issue_id).await?;

        if details.issue.student_id != student_id {
            return Err(AppError::Authorization("This is not your issued book.".to_string()));
        }

        if details.issue.is_returned {
            return Err(AppError::Conflict("This book has already been returned.".to_string()));
        }

        tracing::debug!(issue_id, student_id, "Student announced return");
        Ok(details)
    }
}
