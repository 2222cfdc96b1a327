use thiserror::Error;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("rate limited after retries")]
    RateLimited,

    #[error("api error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("missing api key: set GOOGLE_API_KEY")]
    MissingApiKey,
}
