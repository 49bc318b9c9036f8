//! Student repository

use sqlx::PgPool;
use uuid::Uuid;

use crate::{DbError, DbResult, DbStudent};

/// Fields for a new student record
#[derive(Debug, Clone)]
pub struct NewStudent {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub college: Option<String>,
}

pub struct StudentRepo {
    pool: PgPool,
}

impl StudentRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, student: &NewStudent) -> DbResult<DbStudent> {
        let s = sqlx::query_as::<_, DbStudent>(
            r#"
            INSERT INTO students (id, name, email, phone, college)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(student.id)
        .bind(&student.name)
        .bind(&student.email)
        .bind(&student.phone)
        .bind(&student.college)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                DbError::Duplicate(format!("Email already registered: {}", student.email))
            }
            _ => DbError::Query(e),
        })?;
        Ok(s)
    }

    pub async fn find_by_id(&self, id: Uuid) -> DbResult<Option<DbStudent>> {
        let student = sqlx::query_as::<_, DbStudent>("SELECT * FROM students WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(student)
    }

    pub async fn find_by_email(&self, email: &str) -> DbResult<Option<DbStudent>> {
        let student = sqlx::query_as::<_, DbStudent>("SELECT * FROM students WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(student)
    }
}
