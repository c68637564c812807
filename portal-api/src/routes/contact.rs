/// Public contact form endpoint
///
/// Appends a contact message and redirects home. All three fields are
/// required; an empty field re-renders the form with a message instead of
/// touching the store.

use crate::{app::AppState, error::ApiResult, routes::auth::collect_validation_errors};
use axum::{extract::State, response::Redirect, Json};
use portal_shared::models::contact_message::ContactMessage;
use serde::Deserialize;
use validator::Validate;

/// Contact form payload
#[derive(Debug, Deserialize, Validate)]
pub struct ContactRequest {
    /// Sender email
    #[validate(length(min = 1, message = "Please fill in all contact details."))]
    pub email: String,

    /// Sender phone
    #[validate(length(min = 1, message = "Please fill in all contact details."))]
    pub phone: String,

    /// Message body
    #[validate(length(min = 1, message = "Please fill in all contact details."))]
    pub message: String,
}

/// Submits a contact request
pub async fn submit_contact(
    State(state): State<AppState>,
    Json(req): Json<ContactRequest>,
) -> ApiResult<Redirect> {
    req.validate().map_err(collect_validation_errors)?;

    ContactMessage::create(&state.db, &req.email, &req.phone, &req.message).await?;

    tracing::debug!("Contact message received");

    Ok(Redirect::to("/"))
}
