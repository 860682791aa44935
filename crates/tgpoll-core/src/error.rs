use serde_json::Value;
use thiserror::Error;

/// Top-level error type for tgpoll.
#[derive(Debug, Error)]
pub enum TgPollError {
    /// `start()` was called while a polling session is running.
    #[error("already started")]
    AlreadyStarted,

    /// `stop()` was called with no polling session running.
    #[error("not started")]
    NotStarted,

    /// A `getUpdates` response did not carry `ok: true`.
    #[error("can't make request to telegram api{}{}",
        .error_code.map(|c| format!(" ({c})")).unwrap_or_default(),
        .description.as_deref().map(|d| format!(": {d}")).unwrap_or_default())]
    InvalidEnvelope {
        error_code: Option<i64>,
        description: Option<String>,
    },

    /// Transport failure talking to the Bot API.
    #[error("http error: {0}")]
    Http(String),

    /// Response body could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// The update handler failed.
    #[error("handler error: {0}")]
    Handler(String),

    /// A command response did not carry `ok: true`. Holds the decoded body.
    #[error("api error: {}", describe_api_body(.body))]
    Api { body: Value },

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

fn describe_api_body(body: &Value) -> String {
    match body.get("description").and_then(Value::as_str) {
        Some(description) => description.to_string(),
        None => body.to_string(),
    }
}
