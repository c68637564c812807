/// Identity and session endpoints
///
/// - `POST /register`: self-registration
/// - `POST /login`: credential verification and session establishment
/// - `GET|POST /logout`: session teardown (idempotent)
/// - `GET /account`: the authenticated landing page
///
/// Login failures are deliberately uniform: unknown username, wrong
/// credential, and empty fields all produce the same generic message so the
/// endpoint cannot be used to enumerate usernames.

use crate::{
    app::{extract_session_token, AppState, SESSION_COOKIE},
    error::{ApiError, ApiResult, ValidationErrorDetail},
};
use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
    Extension, Json,
};
use portal_shared::{
    auth::{
        password,
        principal::{require_authenticated, Principal},
        session::Session,
    },
    models::account::{Account, AccountRole, CreateAccount},
};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Username (non-empty)
    #[validate(length(min = 1, message = "Username must not be empty"))]
    pub username: String,

    /// Credential (non-empty)
    #[validate(length(min = 1, message = "Password must not be empty"))]
    pub password: String,
}

/// Login request
///
/// No field-level validation messages here: empty fields fail with the same
/// generic message as bad credentials.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Username
    pub username: String,

    /// Credential
    pub password: String,
}

/// Account landing page payload
#[derive(Debug, Serialize)]
pub struct AccountResponse {
    /// Account ID
    pub id: String,

    /// Username
    pub username: String,

    /// Role
    pub role: AccountRole,
}

/// Collects validator errors into the portal's detail format
pub(crate) fn collect_validation_errors(e: validator::ValidationErrors) -> ApiError {
    let errors: Vec<ValidationErrorDetail> = e
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| ValidationErrorDetail {
                field: field.to_string(),
                message: error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "Validation failed".to_string()),
            })
        })
        .collect();
    ApiError::Validation(errors)
}

/// Creates an account with the given role
///
/// Shared by self-registration and admin provisioning. The existence check
/// produces the friendly duplicate message in the common case; the unique
/// constraint on `username` decides races, and a constraint violation maps
/// to the same duplicate error.
pub(crate) async fn create_account(
    state: &AppState,
    username: &str,
    credential: &str,
    role: AccountRole,
) -> ApiResult<Account> {
    if let Some(_existing) = Account::find_by_username(&state.db, username).await? {
        return Err(ApiError::Duplicate(
            "Username already exists. Please choose a different username.".to_string(),
        ));
    }

    let password_hash = password::hash_password(credential)?;

    let account = Account::create(
        &state.db,
        CreateAccount {
            username: username.to_string(),
            password_hash,
            role,
        },
    )
    .await?;

    tracing::info!(username = %account.username, role = ?account.role, "Account created");

    Ok(account)
}

/// Self-registration endpoint
///
/// Creates a student account and redirects to the login page.
///
/// # Errors
///
/// - validation failure when either field is empty
/// - duplicate error when the username is taken
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<Redirect> {
    req.validate().map_err(collect_validation_errors)?;

    create_account(&state, &req.username, &req.password, AccountRole::Student).await?;

    Ok(Redirect::to("/login"))
}

/// Login endpoint
///
/// Verifies the credential and establishes a session. The session token is
/// handed back as an HttpOnly cookie and the caller is redirected to their
/// landing page (`/admin` for administrators, `/account` otherwise).
///
/// # Errors
///
/// Any failure (unknown username, wrong credential, empty fields) returns
/// the one generic auth failure.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Response> {
    if req.username.is_empty() || req.password.is_empty() {
        return Err(ApiError::InvalidCredentials);
    }

    let account = Account::find_by_username(&state.db, &req.username)
        .await?
        .ok_or(ApiError::InvalidCredentials)?;

    let valid = password::verify_password(&req.password, &account.password_hash)?;
    if !valid {
        return Err(ApiError::InvalidCredentials);
    }

    let (token, _session) = Session::issue(&state.db, account.id).await?;

    tracing::info!(username = %account.username, "Login succeeded");

    let landing = match account.role {
        AccountRole::Admin => "/admin",
        AccountRole::Student => "/account",
    };

    let mut response = Redirect::to(landing).into_response();
    response.headers_mut().insert(
        header::SET_COOKIE,
        format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax",
            SESSION_COOKIE, token
        )
        .parse()
        .map_err(|e| ApiError::Internal(format!("Cookie header: {}", e)))?,
    );

    Ok(response)
}

/// Logout endpoint
///
/// Tears down the session unconditionally and redirects home. Idempotent:
/// logging out without a session, or twice, behaves identically.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<Response> {
    if let Some(token) = extract_session_token(&headers) {
        Session::revoke(&state.db, &token).await?;
    }

    let mut response = Redirect::to("/").into_response();
    response.headers_mut().insert(
        header::SET_COOKIE,
        format!("{}=; Path=/; HttpOnly; Max-Age=0", SESSION_COOKIE)
            .parse()
            .map_err(|e| ApiError::Internal(format!("Cookie header: {}", e)))?,
    );

    Ok(response)
}

/// Authenticated landing page
///
/// Requires a non-anonymous principal; anonymous callers are redirected to
/// the login page by the error mapping.
pub async fn account(
    Extension(principal): Extension<Principal>,
) -> ApiResult<(StatusCode, Json<AccountResponse>)> {
    let account = require_authenticated(&principal)?;

    Ok((
        StatusCode::OK,
        Json(AccountResponse {
            id: account.id.to_string(),
            username: account.username.clone(),
            role: account.role,
        }),
    ))
}
