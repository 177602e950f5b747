//! Borrow request service

use crate::{
    config::LibraryConfig,
    error::AppResult,
    models::{
        book::Book,
        borrow_request::{BorrowRequest, BorrowRequestDetails},
        issue::LoanPolicy,
    },
    repository::{borrow_requests::ApprovalOutcome, Repository},
};

#[derive(Clone)]
pub struct RequestsService {
    repository: Repository,
    library: LibraryConfig,
    policy: LoanPolicy,
}

impl RequestsService {
    pub fn new(repository: Repository, library: LibraryConfig, policy: LoanPolicy) -> Self {
        Self {
            repository,
            library,
            policy,
        }
    }

    /// Student asks for a book
    pub async fn request_book(&self, student_id: i64, book_id: i64) -> AppResult<(BorrowRequest, Book)> {
        let (request, book) = self
            .repository
            .borrow_requests
            .create(student_id, book_id, self.library.today())
            .await
            .map_err(|e| {
                tracing::info!(student_id, book_id, "Borrow request refused: {}", e);
                e
            })?;

        tracing::info!(request_id = request.id, student_id, book_id, "Borrow request filed");
        Ok((request, book))
    }

    /// Librarian approves; issues a copy due after the standard loan period
    pub async fn approve(&self, request_id: i64) -> AppResult<ApprovalOutcome> {
        let today = self.library.today();
        let due_date = self.policy.default_due_date(today);

        let outcome = self
            .repository
            .borrow_requests
            .approve(request_id, today, due_date)
            .await?;

        match &outcome {
            ApprovalOutcome::Approved { request, issue, .. } => {
                tracing::info!(request_id = request.id, issue_id = issue.id, due_date = %issue.due_date, "Approved borrow request");
            }
            ApprovalOutcome::OutOfStock { request, book } => {
                tracing::warn!(request_id = request.id, book_id = book.id, "Borrow request rejected: out of stock");
            }
        }

        Ok(outcome)
    }

    pub async fn reject(&self, request_id: i64) -> AppResult<BorrowRequestDetails> {
        let details = self.repository.borrow_requests.reject(request_id).await?;
        tracing::info!(request_id, "Rejected borrow request");
        Ok(details)
    }

    /// Pending and approved requests for the librarian's queue
    pub async fn queue(&self) -> AppResult<Vec<BorrowRequestDetails>> {
        self.repository.borrow_requests.list_open().await
    }
}
