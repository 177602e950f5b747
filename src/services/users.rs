//! Authentication and account service

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use validator::Validate;

use crate::{
    config::{AdminConfig, AuthConfig},
    error::{AppError, AppResult},
    models::{
        student::StudentWithAccount,
        user::{RegisterForm, Role, User, UserClaims},
    },
    repository::Repository,
};

/// A successful login: session token plus who logged in
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub claims: UserClaims,
}

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
    config: AuthConfig,
}

impl UsersService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Authenticate user by username and password
    pub async fn authenticate(&self, username: &str, password: &str) -> AppResult<Session> {
        let invalid = || AppError::Authentication("Invalid username or password.".to_string());

        let user = self
            .repository
            .users
            .get_by_username(username.trim())
            .await?
            .ok_or_else(invalid)?;

        if !self.verify_password(&user, password)? {
            tracing::info!(username = %user.username, "Rejected login with wrong password");
            return Err(invalid());
        }

        let session = self.open_session(&user).await?;
        tracing::info!(username = %user.username, role = %session.claims.role, "User logged in");
        Ok(session)
    }

    /// Register a student account and log it in
    pub async fn register_student(&self, form: &RegisterForm) -> AppResult<Session> {
        form.validate()?;
        let username = form.username.trim();

        if self.repository.users.username_exists(username).await? {
            return Err(AppError::Conflict("A user with that username already exists.".to_string()));
        }

        if self
            .repository
            .students
            .get_by_registration_no(form.profile.registration_no.trim())
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(
                "A student with this registration number already exists.".to_string(),
            ));
        }

        let password_hash = self.hash_password(&form.password)?;
        let (user, student) = self
            .repository
            .users
            .create_student_account(username, form.email.trim(), &password_hash, &form.profile)
            .await?;

        tracing::info!(
            username = %user.username,
            registration_no = %student.registration_no,
            "Registered student account"
        );

        self.open_session(&user).await
    }

    /// Create the configured librarian account if it does not exist yet
    pub async fn ensure_admin(&self, admin: &AdminConfig) -> AppResult<()> {
        if self.repository.users.username_exists(&admin.username).await? {
            tracing::debug!(username = %admin.username, "Librarian account already present");
            return Ok(());
        }

        let password_hash = self.hash_password(&admin.password)?;
        let user = self
            .repository
            .users
            .create_admin(&admin.username, &admin.email, &password_hash)
            .await?;

        tracing::info!(username = %user.username, "Created librarian account");
        Ok(())
    }

    /// Students with their accounts, for the roster
    pub async fn list_students(&self) -> AppResult<Vec<StudentWithAccount>> {
        self.repository.students.list_with_accounts().await
    }

    /// Classify the user and sign a session token
    async fn open_session(&self, user: &User) -> AppResult<Session> {
        let student = self.repository.users.student_profile(user.id).await?;
        let role = Role::classify(user, student.is_some());

        let now = Utc::now().timestamp();
        let exp = now + (self.config.session_hours as i64 * 3600);

        let claims = UserClaims {
            sub: user.username.clone(),
            user_id: user.id,
            role,
            student_id: match role {
                Role::Student => student.map(|s| s.id),
                _ => None,
            },
            exp,
            iat: now,
        };

        let token = claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))?;

        Ok(Session { token, claims })
    }

    /// Verify user password
    fn verify_password(&self, user: &User, password: &str) -> AppResult<bool> {
        let parsed_hash = PasswordHash::new(&user.password_hash)
            .map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Hash a password using Argon2
    pub fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
        Ok(hash.to_string())
    }
}
