//! Students repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::student::{Student, StudentWithAccount},
};

#[derive(Clone)]
pub struct StudentsRepository {
    pool: Pool<Postgres>,
}

impl StudentsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get student by ID
    pub async fn get_by_id(&self, id: i64) -> AppResult<Student> {
        sqlx::query_as::<_, Student>("SELECT * FROM students WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Student with id {} not found", id)))
    }

    /// Get student by registration number
    pub async fn get_by_registration_no(&self, registration_no: &str) -> AppResult<Option<Student>> {
        let student = sqlx::query_as::<_, Student>("SELECT * FROM students WHERE registration_no = $1")
            .bind(registration_no)
            .fetch_optional(&self.pool)
            .await?;

        Ok(student)
    }

    /// All students with their login names, ordered by name
    pub async fn list_with_accounts(&self) -> AppResult<Vec<StudentWithAccount>> {
        let students = sqlx::query_as::<_, StudentWithAccount>(
            r#"
            SELECT s.*, u.username, u.email
            FROM students s
            JOIN users u ON u.id = s.user_id
            ORDER BY s.name, s.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(students)
    }

    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM students")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
