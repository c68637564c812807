/// School model (catalog reference data)
///
/// Schools are created only by admin action and are never updated or deleted
/// in the current scope. The UNIQUE constraint on `name` is enforced at the
/// storage layer; a duplicate insert fails there and must be surfaced, not
/// swallowed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// School model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct School {
    /// School ID
    pub id: Uuid,

    /// School name (unique, non-empty)
    pub name: String,

    /// When the school was added
    pub created_at: DateTime<Utc>,
}

impl School {
    /// Creates a new school
    ///
    /// Inserts unconditionally; a duplicate name fails with a storage-level
    /// unique constraint violation.
    ///
    /// # Errors
    ///
    /// Returns `sqlx::Error::Database` on a duplicate name.
    pub async fn create(pool: &PgPool, name: &str) -> Result<Self, sqlx::Error> {
        let school = sqlx::query_as::<_, School>(
            r#"
            INSERT INTO schools (name)
            VALUES ($1)
            RETURNING id, name, created_at
            "#,
        )
        .bind(name)
        .fetch_one(pool)
        .await?;

        Ok(school)
    }

    /// Finds a school by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let school = sqlx::query_as::<_, School>(
            r#"
            SELECT id, name, created_at
            FROM schools
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(school)
    }

    /// Lists all schools in insertion order (no pagination)
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let schools = sqlx::query_as::<_, School>(
            r#"
            SELECT id, name, created_at
            FROM schools
            ORDER BY created_at, id
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(schools)
    }
}
