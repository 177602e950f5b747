//! Student profile model

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Student profile linked one-to-one with a user account
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, Eq)]
pub struct Student {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub registration_no: String,
    pub roll: String,
    pub department: String,
    pub season: String,
    pub semester: String,
    pub shift: String,
}

/// Roster entry: student with the login it belongs to
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct StudentWithAccount {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub student: Student,
    pub username: String,
    pub email: String,
}

/// Profile part of the registration form
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct StudentProfile {
    #[serde(deserialize_with = "crate::models::trimmed")]
    #[validate(
        length(min = 1, max = 100, message = "Name must be 1-100 characters"),
        custom(function = "crate::models::not_blank", message = "Name must be 1-100 characters")
    )]
    pub name: String,
    #[serde(deserialize_with = "crate::models::trimmed")]
    #[validate(
        length(min = 1, max = 30, message = "Registration number must be 1-30 characters"),
        custom(function = "crate::models::not_blank", message = "Registration number must be 1-30 characters")
    )]
    pub registration_no: String,
    #[serde(deserialize_with = "crate::models::trimmed")]
    #[validate(
        length(min = 1, max = 10, message = "Roll must be 1-10 characters"),
        custom(function = "crate::models::not_blank", message = "Roll must be 1-10 characters")
    )]
    pub roll: String,
    #[serde(deserialize_with = "crate::models::trimmed")]
    #[validate(
        length(min = 1, max = 50, message = "Department must be 1-50 characters"),
        custom(function = "crate::models::not_blank", message = "Department must be 1-50 characters")
    )]
    pub department: String,
    #[serde(deserialize_with = "crate::models::trimmed")]
    #[validate(
        length(min = 1, max = 50, message = "Season must be 1-50 characters"),
        custom(function = "crate::models::not_blank", message = "Season must be 1-50 characters")
    )]
    pub season: String,
    #[serde(deserialize_with = "crate::models::trimmed")]
    #[validate(
        length(min = 1, max = 20, message = "Semester must be 1-20 characters"),
        custom(function = "crate::models::not_blank", message = "Semester must be 1-20 characters")
    )]
    pub semester: String,
    #[serde(deserialize_with = "crate::models::trimmed")]
    #[validate(
        length(min = 1, max = 20, message = "Shift must be 1-20 characters"),
        custom(function = "crate::models::not_blank", message = "Shift must be 1-20 characters")
    )]
    pub shift: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> StudentProfile {
        StudentProfile {
            name: "Nadia Islam".to_string(),
            registration_no: "2022-CSE-031".to_string(),
            roll: "31".to_string(),
            department: "CSE".to_string(),
            season: "2022-23".to_string(),
            semester: "2nd".to_string(),
            shift: "Evening".to_string(),
        }
    }

    #[test]
    fn complete_profile_passes() {
        assert!(profile().validate().is_ok());
    }

    #[test]
    fn whitespace_registration_number_is_rejected() {
        let mut form = profile();
        form.registration_no = "   ".to_string();
        let errors = form.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("registration_no"));
    }
}
