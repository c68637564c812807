/// Error handling for the portal server
///
/// A unified error type that maps every handled failure to the boundary
/// behavior the portal guarantees:
///
/// - recoverable errors (validation, duplicates, not-found) become a JSON
///   body with a short human-readable message and a form-friendly status,
///   so the caller can re-render the same page with the message;
/// - authorization denials become redirects (to the login page when the
///   caller is anonymous, to the home page with a denial message when the
///   caller lacks the admin role) and never render protected content;
/// - internal errors are logged and returned opaque; no stack traces leak.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use portal_shared::auth::{password::PasswordError, principal::GateError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Portal result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// The one failure message shown for any bad login, regardless of whether
/// the username was unknown, the credential mismatched, or a field was
/// empty. Keeping it uniform prevents username enumeration.
pub const GENERIC_AUTH_FAILURE: &str = "Invalid username or password. Please try again.";

/// Unified portal error type
#[derive(Debug)]
pub enum ApiError {
    /// Required field missing or empty (400)
    Validation(Vec<ValidationErrorDetail>),

    /// Uniqueness violation converted to a user-facing message (409)
    Duplicate(String),

    /// Referenced account/school/course does not exist (404)
    NotFound(String),

    /// Credential verification failed; always the generic message (401)
    InvalidCredentials,

    /// Gated operation reached by an anonymous principal (redirect to login)
    Unauthenticated,

    /// Gated operation reached by a non-admin principal (redirect home)
    Forbidden(String),

    /// Internal server error (500, opaque to clients)
    Internal(String),
}

/// Validation error detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    /// Field that failed validation
    pub field: String,

    /// Error message
    pub message: String,
}

/// Error response body for recoverable errors
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code (e.g., "duplicate_username", "not_found")
    pub error: String,

    /// Human-readable message, suitable for re-rendering the form
    pub message: String,

    /// Optional per-field validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationErrorDetail>>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Validation(errors) => {
                write!(f, "Validation failed: {} errors", errors.len())
            }
            ApiError::Duplicate(msg) => write!(f, "Duplicate: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::InvalidCredentials => write!(f, "{}", GENERIC_AUTH_FAILURE),
            ApiError::Unauthenticated => write!(f, "Authentication required"),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            // Authorization denials redirect instead of rendering anything
            ApiError::Unauthenticated => Redirect::to("/login").into_response(),
            ApiError::Forbidden(msg) => {
                let location = format!("/?error={}", percent_encode(&msg));
                Redirect::to(&location).into_response()
            }

            ApiError::Validation(errors) => {
                let body = Json(ErrorResponse {
                    error: "validation_error".to_string(),
                    message: "Please fill in all required fields.".to_string(),
                    details: Some(errors),
                });
                (StatusCode::BAD_REQUEST, body).into_response()
            }
            ApiError::Duplicate(msg) => {
                let body = Json(ErrorResponse {
                    error: "duplicate".to_string(),
                    message: msg,
                    details: None,
                });
                (StatusCode::CONFLICT, body).into_response()
            }
            ApiError::NotFound(msg) => {
                let body = Json(ErrorResponse {
                    error: "not_found".to_string(),
                    message: msg,
                    details: None,
                });
                (StatusCode::NOT_FOUND, body).into_response()
            }
            ApiError::InvalidCredentials => {
                let body = Json(ErrorResponse {
                    error: "invalid_credentials".to_string(),
                    message: GENERIC_AUTH_FAILURE.to_string(),
                    details: None,
                });
                (StatusCode::UNAUTHORIZED, body).into_response()
            }
            ApiError::Internal(msg) => {
                // Log internal errors but don't expose details to clients
                tracing::error!("Internal error: {}", msg);
                let body = Json(ErrorResponse {
                    error: "internal_error".to_string(),
                    message: "An internal error occurred".to_string(),
                    details: None,
                });
                (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
            }
        }
    }
}

/// Convert sqlx errors to portal errors
///
/// Unique constraint violations carry the constraint name, which tells us
/// which user-facing duplicate message applies. The constraint is the true
/// uniqueness guarantor; the handlers' existence checks only make the common
/// case friendlier.
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".to_string()),
            sqlx::Error::Database(db_err) => {
                if let Some(constraint) = db_err.constraint() {
                    if constraint.contains("username") {
                        return ApiError::Duplicate(
                            "Username already exists. Please choose a different username."
                                .to_string(),
                        );
                    }
                    if constraint.contains("schools") {
                        return ApiError::Duplicate(
                            "A school with that name already exists.".to_string(),
                        );
                    }
                    return ApiError::Duplicate(format!("Constraint violation: {}", constraint));
                }

                ApiError::Internal(format!("Database error: {}", db_err))
            }
            _ => ApiError::Internal(format!("Database error: {}", err)),
        }
    }
}

/// Convert gate denials to portal errors
impl From<GateError> for ApiError {
    fn from(err: GateError) -> Self {
        match err {
            GateError::Unauthenticated => ApiError::Unauthenticated,
            GateError::Forbidden => ApiError::Forbidden(GateError::Forbidden.to_string()),
        }
    }
}

/// Convert password hashing errors to portal errors
impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        ApiError::Internal(format!("Password operation failed: {}", err))
    }
}

/// Minimal percent-encoding for redirect query values
fn percent_encode(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            b' ' => out.push_str("%20"),
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ApiError::Duplicate("Username already exists".to_string());
        assert_eq!(err.to_string(), "Duplicate: Username already exists");

        let err = ApiError::NotFound("Student not found".to_string());
        assert_eq!(err.to_string(), "Not found: Student not found");
    }

    #[test]
    fn test_invalid_credentials_message_is_generic() {
        // Unknown user and wrong password must produce identical output
        assert_eq!(ApiError::InvalidCredentials.to_string(), GENERIC_AUTH_FAILURE);
    }

    #[test]
    fn test_unauthenticated_redirects_to_login() {
        let response = ApiError::Unauthenticated.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get("location").unwrap(), "/login");
    }

    #[test]
    fn test_forbidden_redirects_home_with_message() {
        let response = ApiError::Forbidden("no permission".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let location = response.headers().get("location").unwrap().to_str().unwrap();
        assert!(location.starts_with("/?error="));
        assert!(location.contains("no%20permission"));
    }

    #[test]
    fn test_gate_error_conversion() {
        let err: ApiError = GateError::Unauthenticated.into();
        assert!(matches!(err, ApiError::Unauthenticated));

        let err: ApiError = GateError::Forbidden.into();
        assert!(matches!(err, ApiError::Forbidden(_)));
    }

    #[test]
    fn test_percent_encode() {
        assert_eq!(percent_encode("plain"), "plain");
        assert_eq!(percent_encode("a b"), "a%20b");
        assert_eq!(percent_encode("a&b"), "a%26b");
    }
}
