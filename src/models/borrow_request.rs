//! Borrow request model and its status transitions

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};

use super::book::Book;
use crate::error::{AppError, AppResult};

/// Lifecycle of a student's request to borrow a book
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
    Completed,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Approved => "approved",
            RequestStatus::Rejected => "rejected",
            RequestStatus::Completed => "completed",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "Pending",
            RequestStatus::Approved => "Approved",
            RequestStatus::Rejected => "Rejected",
            RequestStatus::Completed => "Completed",
        }
    }

    /// Pending and approved requests block a new request for the same book.
    pub fn is_open(&self) -> bool {
        matches!(self, RequestStatus::Pending | RequestStatus::Approved)
    }

    /// Pending -> Approved | Rejected; Pending | Approved -> Completed
    pub fn can_transition_to(&self, next: RequestStatus) -> bool {
        use RequestStatus::*;
        matches!(
            (self, next),
            (Pending, Approved) | (Pending, Rejected) | (Pending, Completed) | (Approved, Completed)
        )
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl std::str::FromStr for RequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(RequestStatus::Pending),
            "approved" => Ok(RequestStatus::Approved),
            "rejected" => Ok(RequestStatus::Rejected),
            "completed" => Ok(RequestStatus::Completed),
            _ => Err(format!("Invalid request status: {}", s)),
        }
    }
}

// Stored as lowercase text
impl sqlx::Type<Postgres> for RequestStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for RequestStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for RequestStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        <&str as Encode<Postgres>>::encode(self.as_str(), buf)
    }
}

/// Borrow request model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, Eq)]
pub struct BorrowRequest {
    pub id: i64,
    pub book_id: i64,
    pub student_id: i64,
    pub request_date: NaiveDate,
    pub status: RequestStatus,
}

impl BorrowRequest {
    fn transition(&mut self, next: RequestStatus, refusal: &str) -> AppResult<()> {
        if !self.status.can_transition_to(next) {
            return Err(AppError::Conflict(refusal.to_string()));
        }
        self.status = next;
        Ok(())
    }

    pub fn approve(&mut self) -> AppResult<()> {
        self.transition(
            RequestStatus::Approved,
            "This request is not pending and cannot be approved.",
        )
    }

    pub fn reject(&mut self) -> AppResult<()> {
        self.transition(RequestStatus::Rejected, "Only pending requests can be rejected.")
    }

    pub fn complete(&mut self) -> AppResult<()> {
        self.transition(RequestStatus::Completed, "Only open requests can be completed.")
    }
}

/// Borrow request joined with book and student names, for the request queue
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct BorrowRequestDetails {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub request: BorrowRequest,
    pub book_title: String,
    pub available_copies: i32,
    pub student_name: String,
    pub registration_no: String,
}

/// Decide whether a student may ask for `book`.
pub fn check_borrow_eligibility(
    book: &Book,
    has_active_issue: bool,
    has_open_request: bool,
) -> AppResult<()> {
    if has_active_issue {
        return Err(AppError::Conflict(format!(
            "You already have '{}' issued to you.",
            book.title
        )));
    }

    if has_open_request {
        return Err(AppError::Conflict(format!(
            "You already have a pending or approved request for '{}'.",
            book.title
        )));
    }

    if !book.is_in_stock() {
        return Err(AppError::BusinessRule(format!(
            "Sorry, '{}' is currently out of stock.",
            book.title
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(status: RequestStatus) -> BorrowRequest {
        BorrowRequest {
            id: 7,
            book_id: 1,
            student_id: 2,
            request_date: NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
            status,
        }
    }

    fn book(available_copies: i32) -> Book {
        Book {
            id: 1,
            title: "Dune".to_string(),
            author_name: "Frank Herbert".to_string(),
            isbn: "9780441013593".to_string(),
            book_type: "Novel".to_string(),
            quantity: 3,
            available_copies,
        }
    }

    #[test]
    fn only_pending_requests_can_be_decided() {
        let mut r = request(RequestStatus::Pending);
        r.approve().unwrap();
        assert_eq!(r.status, RequestStatus::Approved);

        assert!(matches!(r.approve(), Err(AppError::Conflict(_))));
        assert!(matches!(r.reject(), Err(AppError::Conflict(_))));
        assert_eq!(r.status, RequestStatus::Approved);

        let mut r = request(RequestStatus::Pending);
        r.reject().unwrap();
        assert_eq!(r.status, RequestStatus::Rejected);
        assert!(r.approve().is_err());
    }

    #[test]
    fn open_requests_complete_closed_ones_do_not() {
        for status in [RequestStatus::Pending, RequestStatus::Approved] {
            let mut r = request(status);
            r.complete().unwrap();
            assert_eq!(r.status, RequestStatus::Completed);
        }
        for status in [RequestStatus::Rejected, RequestStatus::Completed] {
            assert!(request(status).complete().is_err());
        }
    }

    #[test]
    fn open_statuses() {
        assert!(RequestStatus::Pending.is_open());
        assert!(RequestStatus::Approved.is_open());
        assert!(!RequestStatus::Rejected.is_open());
        assert!(!RequestStatus::Completed.is_open());
    }

    #[test]
    fn status_text_parses_case_insensitively() {
        assert_eq!("Approved".parse::<RequestStatus>(), Ok(RequestStatus::Approved));
        assert_eq!("completed".parse::<RequestStatus>(), Ok(RequestStatus::Completed));
        assert!("lost".parse::<RequestStatus>().is_err());
    }

    #[test]
    fn eligibility_checks_in_order() {
        assert!(check_borrow_eligibility(&book(1), false, false).is_ok());

        let err = check_borrow_eligibility(&book(1), true, true).unwrap_err();
        assert!(err.user_message().contains("already have 'Dune' issued"));

        let err = check_borrow_eligibility(&book(1), false, true).unwrap_err();
        assert!(err.user_message().contains("pending or approved request"));

        let err = check_borrow_eligibility(&book(0), false, false).unwrap_err();
        assert!(matches!(err, AppError::BusinessRule(_)));
    }
}
