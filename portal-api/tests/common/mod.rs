/// Shared test harness for the API integration tests
///
/// Builds the real router over a real database. Tests are skipped when
/// `TEST_DATABASE_URL` is not set; everything else is exercised end to end
/// through `tower::ServiceExt::oneshot`.

use axum::{
    body::Body,
    http::{header, Request},
    Router,
};
use portal_api::{
    app::{build_router, AppState},
    config::{Config, DatabaseConfig, ServerConfig},
    responder::{Responder, ResponderError},
};
use portal_shared::{
    auth::{password, session::Session},
    models::account::{Account, AccountRole, CreateAccount},
};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

/// Canned responder so chat tests need no external service
pub struct EchoResponder;

#[async_trait::async_trait]
impl Responder for EchoResponder {
    async fn get_response(&self, text: &str) -> Result<String, ResponderError> {
        Ok(format!("echo: {}", text))
    }
}

/// A router plus the accounts and tokens the tests drive it with
pub struct TestContext {
    pub db: PgPool,
    pub app: Router,
    pub admin: Account,
    pub admin_token: String,
}

impl TestContext {
    /// Connects, migrates, provisions an admin account, and builds the app.
    ///
    /// Returns `None` (so the caller can skip) when `TEST_DATABASE_URL` is
    /// not set.
    pub async fn try_new() -> Option<Self> {
        let url = match std::env::var("TEST_DATABASE_URL") {
            Ok(url) => url,
            Err(_) => {
                eprintln!("TEST_DATABASE_URL not set; skipping API test");
                return None;
            }
        };

        let db = PgPool::connect(&url).await.expect("connect to test database");
        portal_shared::db::migrations::run_migrations(&db)
            .await
            .expect("run migrations");

        let config = Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
            },
            database: DatabaseConfig {
                url,
                max_connections: 5,
            },
            responder_url: None,
        };

        let state = AppState::new(db.clone(), config, Arc::new(EchoResponder));
        let app = build_router(state);

        let (admin, admin_token) =
            create_account_with_session(&db, &unique("admin"), "admin-pass", AccountRole::Admin)
                .await;

        Some(Self {
            db,
            app,
            admin,
            admin_token,
        })
    }

    /// Provisions a student directly in the store and opens a session
    pub async fn create_student(&self, username: &str, credential: &str) -> (Account, String) {
        create_account_with_session(&self.db, username, credential, AccountRole::Student).await
    }
}

/// Unique per-run name so tests don't collide with earlier data
pub fn unique(prefix: &str) -> String {
    format!("{}-{}", prefix, Uuid::new_v4())
}

async fn create_account_with_session(
    db: &PgPool,
    username: &str,
    credential: &str,
    role: AccountRole,
) -> (Account, String) {
    let account = Account::create(
        db,
        CreateAccount {
            username: username.to_string(),
            password_hash: password::hash_password(credential).expect("hash credential"),
            role,
        },
    )
    .await
    .expect("create account");

    let (token, _session) = Session::issue(db, account.id).await.expect("issue session");

    (account, token)
}

/// Builds a GET request, optionally authenticated with a bearer token
pub fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

/// Builds a JSON POST request, optionally authenticated with a bearer token
pub fn post_json(uri: &str, token: Option<&str>, body: serde_json::Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// Reads a response body as JSON
pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("parse body as JSON")
}

/// Returns the Location header of a redirect response
pub fn location(response: &axum::response::Response) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .expect("redirect carries a Location header")
        .to_str()
        .unwrap()
        .to_string()
}
