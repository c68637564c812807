/// Client for the conversational text-response collaborator
///
/// The portal treats the responder as an opaque black box: text in, text
/// out. One endpoint (`POST /get_response`) delegates to it. The trait seam
/// exists so tests can swap in a canned responder without a network.

use async_trait::async_trait;

/// Error type for responder calls
#[derive(Debug, thiserror::Error)]
pub enum ResponderError {
    /// The collaborator is not configured
    #[error("Responder service is not configured")]
    NotConfigured,

    /// The collaborator call failed
    #[error("Responder request failed: {0}")]
    Request(String),
}

/// Opaque text-response collaborator: `get_response(text) -> string`
#[async_trait]
pub trait Responder: Send + Sync {
    /// Produces a response for the given text
    async fn get_response(&self, text: &str) -> Result<String, ResponderError>;
}

/// HTTP-backed responder
///
/// Posts `{"message": text}` to `{base_url}/get_response` and expects
/// `{"answer": string}` back.
pub struct HttpResponder {
    client: reqwest::Client,
    base_url: String,
}

impl HttpResponder {
    /// Creates a responder client against a base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[derive(serde::Serialize)]
struct ResponderRequest<'a> {
    message: &'a str,
}

#[derive(serde::Deserialize)]
struct ResponderResponse {
    answer: String,
}

#[async_trait]
impl Responder for HttpResponder {
    async fn get_response(&self, text: &str) -> Result<String, ResponderError> {
        let url = format!("{}/get_response", self.base_url.trim_end_matches('/'));

        let response = self
            .client
            .post(&url)
            .json(&ResponderRequest { message: text })
            .send()
            .await
            .map_err(|e| ResponderError::Request(e.to_string()))?
            .error_for_status()
            .map_err(|e| ResponderError::Request(e.to_string()))?;

        let body: ResponderResponse = response
            .json()
            .await
            .map_err(|e| ResponderError::Request(e.to_string()))?;

        Ok(body.answer)
    }
}

/// Placeholder used when `RESPONDER_URL` is unset
pub struct UnconfiguredResponder;

#[async_trait]
impl Responder for UnconfiguredResponder {
    async fn get_response(&self, _text: &str) -> Result<String, ResponderError> {
        Err(ResponderError::NotConfigured)
    }
}
