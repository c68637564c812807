/// Contact message model
///
/// Append-only: messages are created by the public contact form and listed
/// by the admin. No updates, no deletes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// A submitted contact request
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ContactMessage {
    /// Message ID
    pub id: Uuid,

    /// Sender email (required)
    pub email: String,

    /// Sender phone (required)
    pub phone: String,

    /// Free-text message body (required)
    pub message: String,

    /// When the message was submitted
    pub created_at: DateTime<Utc>,
}

impl ContactMessage {
    /// Appends a new contact message
    ///
    /// Field presence is validated at the boundary; this insert assumes
    /// non-empty values.
    pub async fn create(
        pool: &PgPool,
        email: &str,
        phone: &str,
        message: &str,
    ) -> Result<Self, sqlx::Error> {
        let contact = sqlx::query_as::<_, ContactMessage>(
            r#"
            INSERT INTO contact_messages (email, phone, message)
            VALUES ($1, $2, $3)
            RETURNING id, email, phone, message, created_at
            "#,
        )
        .bind(email)
        .bind(phone)
        .bind(message)
        .fetch_one(pool)
        .await?;

        Ok(contact)
    }

    /// Lists all contact messages in insertion order
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let messages = sqlx::query_as::<_, ContactMessage>(
            r#"
            SELECT id, email, phone, message, created_at
            FROM contact_messages
            ORDER BY created_at, id
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(messages)
    }
}
