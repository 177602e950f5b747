//! User accounts, roles and session claims

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::student::StudentProfile;
use crate::error::AppError;

/// Login identity
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    /// Hashed password (argon2)
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub created_at: DateTime<Utc>,
}

/// What a signed-in user may do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Librarian: staff and superuser
    Admin,
    /// Non-staff account with a student profile
    Student,
    /// Anything else, e.g. staff without superuser rights
    Unassigned,
}

impl Role {
    /// Classify an account once, at login.
    pub fn classify(user: &User, has_student_profile: bool) -> Self {
        if user.is_staff && user.is_superuser {
            Role::Admin
        } else if has_student_profile && !user.is_staff {
            Role::Student
        } else {
            Role::Unassigned
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Student => "student",
            Role::Unassigned => "unassigned",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// JWT claims carried in the session cookie
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserClaims {
    pub sub: String,
    pub user_id: i64,
    pub role: Role,
    /// Set for student accounts
    pub student_id: Option<i64>,
    pub exp: i64,
    pub iat: i64,
}

impl UserClaims {
    /// Create a new JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse JWT token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn is_student(&self) -> bool {
        self.role == Role::Student && self.student_id.is_some()
    }

    /// Require librarian privileges
    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::Authorization("Librarian privileges required".to_string()))
        }
    }

    /// Student profile id of a student session
    pub fn require_student(&self) -> Result<i64, AppError> {
        match (self.role, self.student_id) {
            (Role::Student, Some(id)) => Ok(id),
            _ => Err(AppError::Authorization("Student account required".to_string())),
        }
    }
}

/// Login form
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginForm {
    #[serde(deserialize_with = "crate::models::trimmed")]
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Student self-registration form: account fields plus profile
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterForm {
    #[serde(deserialize_with = "crate::models::trimmed")]
    #[validate(length(min = 3, max = 150, message = "Username must be 3-150 characters"))]
    pub username: String,
    #[serde(deserialize_with = "crate::models::trimmed")]
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,
    #[validate(length(min = 4, message = "Password must be at least 4 characters"))]
    pub password: String,
    #[validate(must_match(other = "password", message = "Password and Confirm Password do not match."))]
    pub confirm_password: String,
    #[serde(flatten)]
    #[validate(nested)]
    pub profile: StudentProfile,
}
