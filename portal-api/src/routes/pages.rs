/// Static program pages and the health check
///
/// The page handlers are pure template lookups with no state; they exist so
/// the portal serves its public shell from one binary. The health check
/// verifies database connectivity the same way the rest of the portal
/// reaches it.

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, response::Html, Json};
use serde::{Deserialize, Serialize};

pub async fn home() -> Html<&'static str> {
    Html(include_str!("../../pages/home.html"))
}

pub async fn about() -> Html<&'static str> {
    Html(include_str!("../../pages/about.html"))
}

pub async fn apply() -> Html<&'static str> {
    Html(include_str!("../../pages/apply.html"))
}

pub async fn programmes() -> Html<&'static str> {
    Html(include_str!("../../pages/programmes.html"))
}

pub async fn contact() -> Html<&'static str> {
    Html(include_str!("../../pages/contact.html"))
}

pub async fn login() -> Html<&'static str> {
    Html(include_str!("../../pages/login.html"))
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Application version
    pub version: String,

    /// Database status
    pub database: String,
}

/// Health check handler
///
/// Returns service health status including database connectivity.
pub async fn health_check(State(state): State<AppState>) -> ApiResult<Json<HealthResponse>> {
    let database_status = match sqlx::query("SELECT 1").fetch_one(&state.db).await {
        Ok(_) => "connected",
        Err(_) => "disconnected",
    };

    Ok(Json(HealthResponse {
        status: if database_status == "connected" {
            "healthy".to_string()
        } else {
            "degraded".to_string()
        },
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: database_status.to_string(),
    }))
}
