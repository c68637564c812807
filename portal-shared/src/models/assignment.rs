/// Assignment model: the single active (school, course) pairing per student
///
/// Invariant: at most one assignment row per account. Reassigning a student
/// updates the existing row in place (same id) instead of inserting a second
/// one. The `UNIQUE(account_id)` constraint backstops the upsert under
/// concurrent writers, and `ON DELETE CASCADE` removes the row with its
/// account.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Assignment model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Assignment {
    /// Assignment ID (stable across reassignments)
    pub id: Uuid,

    /// The student account this assignment belongs to
    pub account_id: Uuid,

    /// Chosen school
    pub school_id: Uuid,

    /// Chosen course
    pub course_id: Uuid,

    /// When the assignment was last written
    pub updated_at: DateTime<Utc>,
}

/// One row of the admin student listing: every student, assigned or not
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct StudentAssignmentRow {
    /// Student account ID
    pub account_id: Uuid,

    /// Student username
    pub username: String,

    /// Assigned school name, if any
    pub school_name: Option<String>,

    /// Assigned course name, if any
    pub course_name: Option<String>,
}

impl Assignment {
    /// Finds the assignment for an account, if one exists
    pub async fn find_by_account(
        pool: &PgPool,
        account_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let assignment = sqlx::query_as::<_, Assignment>(
            r#"
            SELECT id, account_id, school_id, course_id, updated_at
            FROM assignments
            WHERE account_id = $1
            "#,
        )
        .bind(account_id)
        .fetch_optional(pool)
        .await?;

        Ok(assignment)
    }

    /// Upserts the assignment for an account
    ///
    /// Runs in one transaction: look up the existing row by `account_id`;
    /// if found, update its school/course in place (same row id); otherwise
    /// insert a new row. Caller is responsible for validating that the
    /// account, school, and course exist.
    ///
    /// # Errors
    ///
    /// Returns a constraint violation if a referenced id does not exist, or
    /// if a concurrent insert for the same account wins the race (the unique
    /// constraint decides).
    pub async fn upsert(
        pool: &PgPool,
        account_id: Uuid,
        school_id: Uuid,
        course_id: Uuid,
    ) -> Result<Self, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let existing = sqlx::query_as::<_, Assignment>(
            r#"
            SELECT id, account_id, school_id, course_id, updated_at
            FROM assignments
            WHERE account_id = $1
            FOR UPDATE
            "#,
        )
        .bind(account_id)
        .fetch_optional(&mut *tx)
        .await?;

        let assignment = match existing {
            Some(existing) => {
                sqlx::query_as::<_, Assignment>(
                    r#"
                    UPDATE assignments
                    SET school_id = $2, course_id = $3, updated_at = NOW()
                    WHERE id = $1
                    RETURNING id, account_id, school_id, course_id, updated_at
                    "#,
                )
                .bind(existing.id)
                .bind(school_id)
                .bind(course_id)
                .fetch_one(&mut *tx)
                .await?
            }
            None => {
                sqlx::query_as::<_, Assignment>(
                    r#"
                    INSERT INTO assignments (account_id, school_id, course_id)
                    VALUES ($1, $2, $3)
                    RETURNING id, account_id, school_id, course_id, updated_at
                    "#,
                )
                .bind(account_id)
                .bind(school_id)
                .bind(course_id)
                .fetch_one(&mut *tx)
                .await?
            }
        };

        tx.commit().await?;

        tracing::debug!(
            account_id = %account_id,
            assignment_id = %assignment.id,
            "Assignment written"
        );

        Ok(assignment)
    }

    /// Lists every student together with their current (possibly absent)
    /// assignment
    ///
    /// Left-join semantics: students with no assignment still appear, with
    /// empty school/course columns. Ordered by account insertion.
    pub async fn list_students_with_assignments(
        pool: &PgPool,
    ) -> Result<Vec<StudentAssignmentRow>, sqlx::Error> {
        let rows = sqlx::query_as::<_, StudentAssignmentRow>(
            r#"
            SELECT a.id AS account_id,
                   a.username,
                   sch.name AS school_name,
                   crs.name AS course_name
            FROM accounts a
            LEFT JOIN assignments asg ON asg.account_id = a.id
            LEFT JOIN schools sch ON sch.id = asg.school_id
            LEFT JOIN courses crs ON crs.id = asg.course_id
            WHERE a.role = 'student'
            ORDER BY a.created_at, a.id
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(rows)
    }
}
