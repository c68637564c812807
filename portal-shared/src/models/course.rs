/// Course model (catalog reference data)
///
/// Courses belong to exactly one school (required foreign key). Names need
/// not be globally unique. Created only by admin action, scoped to an
/// existing school: the workflow resolves the school first and refuses to
/// insert a dangling reference.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Course model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Course {
    /// Course ID
    pub id: Uuid,

    /// Course name (non-empty, not necessarily unique)
    pub name: String,

    /// Owning school
    pub school_id: Uuid,

    /// When the course was added
    pub created_at: DateTime<Utc>,
}

impl Course {
    /// Creates a new course under a school
    ///
    /// # Errors
    ///
    /// Returns a foreign key violation if `school_id` does not reference an
    /// existing school; the workflow checks existence first to report
    /// NotFound instead.
    pub async fn create(pool: &PgPool, name: &str, school_id: Uuid) -> Result<Self, sqlx::Error> {
        let course = sqlx::query_as::<_, Course>(
            r#"
            INSERT INTO courses (name, school_id)
            VALUES ($1, $2)
            RETURNING id, name, school_id, created_at
            "#,
        )
        .bind(name)
        .bind(school_id)
        .fetch_one(pool)
        .await?;

        Ok(course)
    }

    /// Finds a course by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let course = sqlx::query_as::<_, Course>(
            r#"
            SELECT id, name, school_id, created_at
            FROM courses
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(course)
    }

    /// Lists all courses in insertion order (no pagination)
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let courses = sqlx::query_as::<_, Course>(
            r#"
            SELECT id, name, school_id, created_at
            FROM courses
            ORDER BY created_at, id
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(courses)
    }
}
