//! Errors raised by the agent crate.

use std::sync::Arc;

/// Failures talking to the model endpoint.
///
/// These are the only errors that escape the conversation loop; tool
/// failures are turned into tool output instead.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// Request timeout.
    #[error("model request timeout")]
    Timeout,

    /// Network error.
    #[error("model network error: {0}")]
    Network(Arc<reqwest::Error>),

    /// Non-success HTTP response.
    #[error("model HTTP error {status}: {body}")]
    Http { status: u16, body: String },

    /// Response body was not a chat completion.
    #[error("model response parse error: {0}")]
    Parse(String),

    /// Chat completion carried no choices.
    #[error("model returned no choices")]
    EmptyResponse,
}

impl From<reqwest::Error> for ModelError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() { ModelError::Timeout } else { ModelError::Network(Arc::new(err)) }
    }
}

/// Reasons a tool call could not be decoded.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("unknown tool {0}")]
    UnknownTool(String),

    #[error("invalid arguments for {tool}: {reason}")]
    InvalidArguments { tool: &'static str, reason: String },
}
