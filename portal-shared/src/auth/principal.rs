/// Request principal and the authorization gate
///
/// Every boundary operation receives an explicit [`Principal`]: the account
/// bound to the request's session, or [`Principal::Anonymous`] when no valid
/// session exists. Gated operations check it through [`require_authenticated`]
/// and [`require_admin`]; the gate is stateless and consults nothing but the
/// principal itself.
///
/// # Example
///
/// ```
/// use portal_shared::auth::principal::{require_admin, Principal};
/// use portal_shared::models::account::AccountRole;
/// use uuid::Uuid;
///
/// let admin = Principal::known(Uuid::new_v4(), "admin", AccountRole::Admin);
/// assert!(require_admin(&admin).is_ok());
/// assert!(require_admin(&Principal::Anonymous).is_err());
/// ```

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::account::AccountRole;

/// Identity attached to a request
///
/// `Anonymous` when the request carries no session (or an invalid one),
/// `Known` when a session resolved to an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Principal {
    /// No authenticated account
    Anonymous,

    /// Authenticated account
    Known(AccountRef),
}

/// The slice of an account the gate needs: identity and role
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRef {
    /// Account ID
    pub id: Uuid,

    /// Username, for listings and log lines
    pub username: String,

    /// Role decided at account creation
    pub role: AccountRole,
}

impl Principal {
    /// Builds a known principal from account fields
    pub fn known(id: Uuid, username: impl Into<String>, role: AccountRole) -> Self {
        Principal::Known(AccountRef {
            id,
            username: username.into(),
            role,
        })
    }

    /// True if this principal is an authenticated account
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Principal::Known(_))
    }
}

/// Error type for authorization gate denials
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum GateError {
    /// Operation requires an authenticated principal
    #[error("Authentication required")]
    Unauthenticated,

    /// Operation requires the admin role
    #[error("You do not have permission to access the admin panel")]
    Forbidden,
}

/// Requires a non-anonymous principal
///
/// # Errors
///
/// Returns `GateError::Unauthenticated` for anonymous access; the boundary
/// layer turns this into a login redirect.
pub fn require_authenticated(principal: &Principal) -> Result<&AccountRef, GateError> {
    match principal {
        Principal::Known(account) => Ok(account),
        Principal::Anonymous => Err(GateError::Unauthenticated),
    }
}

/// Requires an authenticated principal with the admin role
///
/// Checked in order: authenticated first, then role. A logged-in student gets
/// `Forbidden`, an anonymous caller gets `Unauthenticated`.
///
/// # Errors
///
/// Returns `GateError::Unauthenticated` or `GateError::Forbidden`.
pub fn require_admin(principal: &Principal) -> Result<&AccountRef, GateError> {
    let account = require_authenticated(principal)?;

    if account.role != AccountRole::Admin {
        return Err(GateError::Forbidden);
    }

    Ok(account)
}
