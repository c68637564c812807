/// Account model and identity store operations
///
/// Accounts carry a username (unique, case-sensitive), an Argon2id credential
/// hash, and an explicit role. The role is a first-class column decided at
/// creation time, and it is what the authorization gate consults, not the
/// username.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE account_role AS ENUM ('student', 'admin');
///
/// CREATE TABLE accounts (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     username TEXT NOT NULL UNIQUE,
///     password_hash TEXT NOT NULL,
///     role account_role NOT NULL DEFAULT 'student',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// The UNIQUE constraint on `username` is the true guarantor of uniqueness;
/// callers may check first for a friendly message, but the constraint decides
/// races.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Role held by an account, decided at creation time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "account_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AccountRole {
    /// Regular student account
    Student,

    /// Administrator: may manage students, catalog, and assignments
    Admin,
}

/// Account model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Account {
    /// Account ID
    pub id: Uuid,

    /// Username (unique, case-sensitive exact match)
    pub username: String,

    /// Argon2id credential hash; never plaintext
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Role consulted by the authorization gate
    pub role: AccountRole,

    /// When the account was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new account
#[derive(Debug, Clone)]
pub struct CreateAccount {
    /// Username (must be non-empty; validated at the boundary)
    pub username: String,

    /// Argon2id credential hash (NOT the plaintext credential)
    pub password_hash: String,

    /// Role for the new account
    pub role: AccountRole,
}

impl Account {
    /// Creates a new account
    ///
    /// # Errors
    ///
    /// A duplicate username surfaces as a `sqlx::Error::Database` unique
    /// constraint violation; the caller converts it to a user-facing
    /// duplicate-username message.
    pub async fn create(pool: &PgPool, data: CreateAccount) -> Result<Self, sqlx::Error> {
        let account = sqlx::query_as::<_, Account>(
            r#"
            INSERT INTO accounts (username, password_hash, role)
            VALUES ($1, $2, $3)
            RETURNING id, username, password_hash, role, created_at
            "#,
        )
        .bind(data.username)
        .bind(data.password_hash)
        .bind(data.role)
        .fetch_one(pool)
        .await?;

        Ok(account)
    }

    /// Finds an account by ID
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails.
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let account = sqlx::query_as::<_, Account>(
            r#"
            SELECT id, username, password_hash, role, created_at
            FROM accounts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(account)
    }

    /// Finds an account by username (exact, case-sensitive match)
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails.
    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let account = sqlx::query_as::<_, Account>(
            r#"
            SELECT id, username, password_hash, role, created_at
            FROM accounts
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(pool)
        .await?;

        Ok(account)
    }

    /// Lists all student accounts in insertion order
    ///
    /// Admin accounts are excluded from administrative listings.
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails.
    pub async fn list_students(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let accounts = sqlx::query_as::<_, Account>(
            r#"
            SELECT id, username, password_hash, role, created_at
            FROM accounts
            WHERE role = 'student'
            ORDER BY created_at, id
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(accounts)
    }

    /// Deletes an account by ID
    ///
    /// Dependent sessions and assignment rows are removed by `ON DELETE
    /// CASCADE`. Returns `false` if the account didn't exist. Role
    /// protection (admins are never deleted) is enforced by the workflow,
    /// not here.
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM accounts WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
