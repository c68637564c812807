/// Application state and router builder
///
/// Defines the shared application state and builds the Axum router with all
/// routes and middleware. A single principal-resolution layer runs on every
/// request: it resolves the session token (Bearer header or `portal_session`
/// cookie) to a [`Principal`] and inserts it into request extensions, falling
/// back to `Principal::Anonymous`. Handlers then pass that explicit principal
/// through the authorization gate; there is no ambient session state anywhere.
///
/// # Route Map
///
/// ```text
/// /
/// ├── GET  /                         # Home page (public)
/// ├── GET  /about, /apply, ...       # Static pages (public)
/// ├── POST /register                 # Self-registration
/// ├── GET/POST /login, /logout       # Session establishment/teardown
/// ├── GET  /account                  # Landing page (authenticated)
/// ├── POST /contact                  # Contact form (public)
/// ├── POST /get_response             # Chat collaborator (public)
/// └── /admin                         # Admin-only workflow
///     ├── GET  /students             # Left-join listing
///     ├── POST /students             # Provision a student account
///     ├── POST /students/:id/delete  # Delete (no-op for admins/absent)
///     ├── POST /assign/:id           # Upsert assignment
///     ├── POST /modify_assignment/:id # Same upsert, second entry route
///     ├── GET/POST /schools          # Catalog
///     ├── POST /schools/:id/courses  # Catalog (scoped to a school)
///     ├── GET  /courses
///     └── GET  /messages             # Contact inbox
/// ```

use crate::{config::Config, responder::Responder, routes};
use axum::{
    extract::Request,
    http::header,
    middleware::Next,
    response::Response,
    routing::{get, post},
    Router,
};
use portal_shared::auth::{principal::Principal, session::Session};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Cookie carrying the session token
pub const SESSION_COOKIE: &str = "portal_session";

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// Text-response collaborator
    pub responder: Arc<dyn Responder>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config, responder: Arc<dyn Responder>) -> Self {
        Self {
            db,
            config: Arc::new(config),
            responder,
        }
    }
}

/// Builds the complete Axum router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    // Public pages and the contact/chat endpoints
    let public_routes = Router::new()
        .route("/", get(routes::pages::home))
        .route("/about", get(routes::pages::about))
        .route("/apply", get(routes::pages::apply))
        .route("/programmes", get(routes::pages::programmes))
        .route("/contact", get(routes::pages::contact).post(routes::contact::submit_contact))
        .route("/get_response", post(routes::chat::chat_query))
        .route("/health", get(routes::pages::health_check));

    // Identity and session endpoints
    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", get(routes::pages::login).post(routes::auth::login))
        .route("/logout", get(routes::auth::logout).post(routes::auth::logout))
        .route("/account", get(routes::auth::account));

    // Admin workflow; every handler passes the principal through the gate
    let admin_routes = Router::new()
        .route("/", get(routes::admin::admin_home))
        .route(
            "/students",
            get(routes::admin::list_students).post(routes::admin::add_student),
        )
        .route("/students/:id/delete", post(routes::admin::delete_student))
        .route("/assign/:id", post(routes::admin::assign))
        .route("/modify_assignment/:id", post(routes::admin::assign))
        .route(
            "/schools",
            get(routes::admin::list_schools).post(routes::admin::add_school),
        )
        .route("/schools/:id/courses", post(routes::admin::add_course))
        .route("/courses", get(routes::admin::list_courses))
        .route("/messages", get(routes::admin::list_contact_messages));

    Router::new()
        .merge(public_routes)
        .merge(auth_routes)
        .nest("/admin", admin_routes)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            principal_layer,
        ))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Principal resolution middleware
///
/// Resolves the request's session token to a `Principal` and inserts it into
/// request extensions. Missing, malformed, or revoked tokens resolve to
/// `Principal::Anonymous`; the gate decides later whether that is allowed
/// for the requested operation.
async fn principal_layer(
    state: axum::extract::State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, crate::error::ApiError> {
    let principal = match extract_session_token(req.headers()) {
        Some(token) => Session::resolve(&state.db, &token).await?,
        None => Principal::Anonymous,
    };

    req.extensions_mut().insert(principal);

    Ok(next.run(req).await)
}

/// Pulls the session token from the Authorization header or session cookie
pub fn extract_session_token(headers: &axum::http::HeaderMap) -> Option<String> {
    if let Some(auth_header) = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
    {
        if let Some(token) = auth_header.strip_prefix("Bearer ") {
            return Some(token.to_string());
        }
    }

    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == SESSION_COOKIE).then(|| value.to_string())
    })
}
