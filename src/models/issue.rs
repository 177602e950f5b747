//! Issue (lent copy) model, fines and renewals

use std::ops::RangeInclusive;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, NoneAsEmptyString};
use sqlx::FromRow;
use validator::Validate;

use crate::{
    config::LibraryConfig,
    error::{AppError, AppResult},
};

/// Circulation rules applied to issues
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoanPolicy {
    pub fine_per_day: i64,
    pub default_loan_days: i64,
    pub renewal_days: RangeInclusive<i64>,
    /// Pre-filled on the renew form
    pub default_renewal_days: i64,
    pub currency: String,
}

impl From<&LibraryConfig> for LoanPolicy {
    fn from(config: &LibraryConfig) -> Self {
        Self {
            fine_per_day: config.fine_per_day,
            default_loan_days: config.default_loan_days,
            renewal_days: config.min_renewal_days..=config.max_renewal_days,
            default_renewal_days: config.default_renewal_days,
            currency: config.currency.clone(),
        }
    }
}

impl Default for LoanPolicy {
    fn default() -> Self {
        Self::from(&LibraryConfig::default())
    }
}

impl LoanPolicy {
    /// Due date for a loan starting today
    pub fn default_due_date(&self, today: NaiveDate) -> NaiveDate {
        today + Duration::days(self.default_loan_days)
    }
}

/// Issue model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, Eq)]
pub struct Issue {
    pub id: i64,
    pub book_id: i64,
    pub student_id: i64,
    /// Request this issue was granted from, if any
    pub borrow_request_id: Option<i64>,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub is_returned: bool,
    pub return_date: Option<NaiveDate>,
}

impl Issue {
    /// Whole days past the due date: up to the return date once returned,
    /// up to `today` otherwise. Zero when not late.
    pub fn overdue_days(&self, today: NaiveDate) -> i64 {
        let end = if self.is_returned {
            match self.return_date {
                Some(returned) => returned,
                None => return 0,
            }
        } else {
            today
        };

        (end - self.due_date).num_days().max(0)
    }

    pub fn fine(&self, today: NaiveDate, fine_per_day: i64) -> i64 {
        self.overdue_days(today) * fine_per_day
    }

    /// Days left before the due date; negative when overdue, zero once returned.
    pub fn days_until_due(&self, today: NaiveDate) -> i64 {
        if self.is_returned {
            return 0;
        }
        (self.due_date - today).num_days()
    }

    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.is_returned && self.due_date < today
    }

    /// Close the issue. Returns the fine owed at return time.
    pub fn mark_returned(&mut self, today: NaiveDate, policy: &LoanPolicy) -> AppResult<i64> {
        if self.is_returned {
            return Err(AppError::Conflict("This book has already been returned.".to_string()));
        }

        self.is_returned = true;
        self.return_date = Some(today);
        Ok(self.fine(today, policy.fine_per_day))
    }

    /// Extend the due date by `days` counted from the later of the current due
    /// date and today. Only allowed while nothing is owed.
    pub fn renew(&mut self, days: i64, today: NaiveDate, policy: &LoanPolicy) -> AppResult<NaiveDate> {
        if self.is_returned {
            return Err(AppError::Conflict("This book has already been returned.".to_string()));
        }

        if !policy.renewal_days.contains(&days) {
            return Err(AppError::Validation(format!(
                "Renewal period must be between {} and {} days.",
                policy.renewal_days.start(),
                policy.renewal_days.end()
            )));
        }

        let fine = self.fine(today, policy.fine_per_day);
        if fine != 0 {
            return Err(AppError::BusinessRule(format!(
                "Cannot renew! Book is overdue with a fine of {} {}. Fine must be cleared first.",
                fine, policy.currency
            )));
        }

        let base = self.due_date.max(today);
        self.due_date = base + Duration::days(days);
        Ok(self.due_date)
    }
}

/// Issue joined with the book and student it links, for listings
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct IssueDetails {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub issue: Issue,
    pub book_title: String,
    pub book_isbn: String,
    pub student_name: String,
    pub registration_no: String,
}

/// Result of an issue, return or renewal, with the names needed to report it
#[derive(Debug, Clone, Serialize)]
pub struct IssueReceipt {
    pub issue: Issue,
    pub book_title: String,
    pub student_name: String,
    /// Fine owed at the time of the operation
    pub fine: i64,
}

/// Direct issue form (librarian desk)
#[serde_as]
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct IssueBookForm {
    #[serde(deserialize_with = "crate::models::trimmed")]
    #[validate(
        length(min = 1, max = 30, message = "Registration number must be 1-30 characters"),
        custom(function = "crate::models::not_blank", message = "Registration number must be 1-30 characters")
    )]
    pub registration_no: String,
    #[serde(deserialize_with = "crate::models::trimmed")]
    #[validate(
        length(min = 1, max = 13, message = "ISBN must be 1-13 characters"),
        custom(function = "crate::models::not_blank", message = "ISBN must be 1-13 characters")
    )]
    pub book_isbn: String,
    /// Defaults to the standard loan period when left empty
    #[serde(default)]
    #[serde_as(as = "NoneAsEmptyString")]
    pub due_date: Option<NaiveDate>,
}

/// Return form: pick one of the open issues
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ReturnBookForm {
    #[validate(range(min = 1, message = "Select an issued book to return"))]
    pub issue_id: i64,
}

/// Renew form
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RenewBookForm {
    #[validate(range(min = 1, message = "Select an issued book to renew"))]
    pub issue_id: i64,
    #[validate(range(min = 1, message = "Renewal period must be at least 1 day"))]
    pub renewal_days: i64,
}
