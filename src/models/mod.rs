//! Data models and the circulation rules that act on them

pub mod book;
pub mod borrow_request;
pub mod issue;
pub mod student;
pub mod user;

// Re-export commonly used types
pub use book::Book;
pub use borrow_request::{BorrowRequest, RequestStatus};
pub use issue::{Issue, IssueDetails, LoanPolicy};
pub use student::Student;
pub use user::{Role, User, UserClaims};

use serde::{Deserialize, Deserializer};
use validator::ValidationError;

/// Deserialize a form string with surrounding whitespace removed
pub(crate) fn trimmed<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    Ok(value.trim().to_string())
}

/// Reject values that are empty once whitespace is ignored
pub(crate) fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Field {
        #[serde(deserialize_with = "trimmed")]
        value: String,
    }

    #[test]
    fn trimmed_strips_surrounding_whitespace() {
        let field: Field = serde_json::from_str(r#"{"value": "  Dune \t"}"#).unwrap();
        assert_eq!(field.value, "Dune");
    }

    #[test]
    fn whitespace_only_is_blank() {
        assert!(not_blank("   ").is_err());
        assert!(not_blank("").is_err());
        assert!(not_blank(" x ").is_ok());
    }
}
