//! Users repository for database operations

use sqlx::{Pool, Postgres};

use super::map_unique_violation;
use crate::{
    error::AppResult,
    models::{
        student::{Student, StudentProfile},
        user::User,
    },
};

const USER_UNIQUES: &[(&str, &str)] = &[
    ("users_username_key", "A user with that username already exists."),
    (
        "students_registration_no_key",
        "A student with this registration number already exists.",
    ),
];

#[derive(Clone)]
pub struct UsersRepository {
    pool: Pool<Postgres>,
}

impl UsersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get user by username (case-insensitive)
    pub async fn get_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE LOWER(username) = LOWER($1)")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Check if username already exists
    pub async fn username_exists(&self, username: &str) -> AppResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(username) = LOWER($1))")
                .bind(username)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    /// Student profile linked to a user, if any
    pub async fn student_profile(&self, user_id: i64) -> AppResult<Option<Student>> {
        let student = sqlx::query_as::<_, Student>("SELECT * FROM students WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(student)
    }

    /// Create a student account: the login and its profile, together
    pub async fn create_student_account(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
        profile: &StudentProfile,
    ) -> AppResult<(User, Student)> {
        let mut tx = self.pool.begin().await?;

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, password_hash, is_staff, is_superuser)
            VALUES ($1, $2, $3, FALSE, FALSE)
            RETURNING *
            "#,
        )
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_unique_violation(e, USER_UNIQUES))?;

        let student = sqlx::query_as::<_, Student>(
            r#"
            INSERT INTO students (user_id, name, registration_no, roll, department, season, semester, shift)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(user.id)
        .bind(profile.name.trim())
        .bind(profile.registration_no.trim())
        .bind(profile.roll.trim())
        .bind(profile.department.trim())
        .bind(profile.season.trim())
        .bind(profile.semester.trim())
        .bind(profile.shift.trim())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_unique_violation(e, USER_UNIQUES))?;

        tx.commit().await?;

        Ok((user, student))
    }

    /// Create a librarian account (staff and superuser)
    pub async fn create_admin(&self, username: &str, email: &str, password_hash: &str) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, password_hash, is_staff, is_superuser)
            VALUES ($1, $2, $3, TRUE, TRUE)
            RETURNING *
            "#,
        )
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, USER_UNIQUES))
    }
}
