/// Session establishment and resolution
///
/// A successful login issues an opaque session token bound to an account id.
/// Tokens are random base62 strings with a `sess_` prefix; only the SHA-256
/// digest is stored, so a leaked sessions table does not leak usable tokens.
///
/// Resolution is a pure lookup: token digest -> account -> [`Principal`].
/// An unknown or malformed token resolves to `Principal::Anonymous` rather
/// than an error, and revocation is idempotent.
///
/// # Example
///
/// ```no_run
/// use portal_shared::auth::session::Session;
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, account_id: Uuid) -> Result<(), sqlx::Error> {
/// let (token, _session) = Session::issue(&pool, account_id).await?;
/// let principal = Session::resolve(&pool, &token).await?;
/// assert!(principal.is_authenticated());
///
/// Session::revoke(&pool, &token).await?;
/// Session::revoke(&pool, &token).await?; // idempotent
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use uuid::Uuid;

use super::principal::Principal;
use crate::models::account::Account;

/// Length of the random part of a session token (characters)
const TOKEN_RANDOM_LENGTH: usize = 32;

/// Session token prefix
const TOKEN_PREFIX: &str = "sess_";

/// Total length of a session token (prefix + random)
pub const SESSION_TOKEN_LENGTH: usize = TOKEN_PREFIX.len() + TOKEN_RANDOM_LENGTH;

/// A persisted session row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Session {
    /// Session ID
    pub id: Uuid,

    /// SHA-256 hex digest of the token; the token itself is never stored
    pub token_hash: String,

    /// Account this session is bound to
    pub account_id: Uuid,

    /// When the session was established
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// Issues a new session for an account
    ///
    /// Returns the plaintext token (handed to the caller exactly once) and
    /// the stored session row.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails, e.g. the account id does not
    /// exist.
    pub async fn issue(pool: &PgPool, account_id: Uuid) -> Result<(String, Self), sqlx::Error> {
        let token = generate_session_token();
        let token_hash = hash_session_token(&token);

        let session = sqlx::query_as::<_, Session>(
            r#"
            INSERT INTO sessions (token_hash, account_id)
            VALUES ($1, $2)
            RETURNING id, token_hash, account_id, created_at
            "#,
        )
        .bind(&token_hash)
        .bind(account_id)
        .fetch_one(pool)
        .await?;

        tracing::debug!(account_id = %account_id, "Session established");

        Ok((token, session))
    }

    /// Resolves a session token to the current principal
    ///
    /// Unknown, expired-by-revocation, or malformed tokens resolve to
    /// `Principal::Anonymous`. This lookup has no side effects.
    ///
    /// # Errors
    ///
    /// Returns an error only on a store outage.
    pub async fn resolve(pool: &PgPool, token: &str) -> Result<Principal, sqlx::Error> {
        if !validate_token_format(token) {
            return Ok(Principal::Anonymous);
        }

        let token_hash = hash_session_token(token);

        let account = sqlx::query_as::<_, Account>(
            r#"
            SELECT a.id, a.username, a.password_hash, a.role, a.created_at
            FROM sessions s
            JOIN accounts a ON a.id = s.account_id
            WHERE s.token_hash = $1
            "#,
        )
        .bind(&token_hash)
        .fetch_optional(pool)
        .await?;

        Ok(match account {
            Some(account) => Principal::known(account.id, account.username, account.role),
            None => Principal::Anonymous,
        })
    }

    /// Revokes a session by token
    ///
    /// Idempotent: revoking an unknown or already-revoked token is not an
    /// error.
    ///
    /// # Errors
    ///
    /// Returns an error only on a store outage.
    pub async fn revoke(pool: &PgPool, token: &str) -> Result<(), sqlx::Error> {
        if !validate_token_format(token) {
            return Ok(());
        }

        let token_hash = hash_session_token(token);

        sqlx::query("DELETE FROM sessions WHERE token_hash = $1")
            .bind(&token_hash)
            .execute(pool)
            .await?;

        Ok(())
    }
}

/// Generates a new session token: `sess_` plus 32 random base62 characters
pub fn generate_session_token() -> String {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::thread_rng();

    let random_part: String = (0..TOKEN_RANDOM_LENGTH)
        .map(|_| {
            let idx = rng.gen_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect();

    format!("{}{}", TOKEN_PREFIX, random_part)
}

/// Hashes a session token with SHA-256 for storage
pub fn hash_session_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// Checks the `sess_{32 base62 chars}` format without touching the store
pub fn validate_token_format(token: &str) -> bool {
    token.len() == SESSION_TOKEN_LENGTH
        && token.starts_with(TOKEN_PREFIX)
        && token[TOKEN_PREFIX.len()..]
            .chars()
            .all(|c| c.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_session_token_format() {
        let token = generate_session_token();
        assert!(token.starts_with("sess_"));
        assert_eq!(token.len(), SESSION_TOKEN_LENGTH);
        assert!(validate_token_format(&token));
    }

    #[test]
    fn test_tokens_are_unique() {
        let a = generate_session_token();
        let b = generate_session_token();
        assert_ne!(a, b);
    }

    #[test]
    fn test_hash_session_token_deterministic() {
        let hash1 = hash_session_token("sess_abc123");
        let hash2 = hash_session_token("sess_abc123");
        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64); // SHA-256 hex
    }

    #[test]
    fn test_validate_token_format_rejects_garbage() {
        assert!(!validate_token_format(""));
        assert!(!validate_token_format("sess_short"));
        assert!(!validate_token_format("key_aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa"));
        assert!(!validate_token_format(
            "sess_aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa!"
        ));
    }
}
