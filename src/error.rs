use thiserror::Error;

/// Errors raised by the Mealie client, the AI extraction path and configuration loading.
///
/// The import orchestrator never lets these escape; it folds them into
/// [`ImportOutcome::Failure`](crate::model::ImportOutcome).
#[derive(Error, Debug)]
pub enum ImportError {
    /// Network failure or timeout while talking to a remote service
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Remote service rejected the request or answered with something unusable
    #[error("API error (status {status}): {body}")]
    Api { status: u16, body: String },

    /// The language-model provider failed (auth, quota, network, empty reply)
    #[error("AI provider error: {0}")]
    AiProvider(String),

    /// The language-model reply could not be turned into a recipe
    #[error("AI response could not be parsed: {0}")]
    AiParse(String),

    /// The given URL is not an absolute http(s) URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Error building HTTP headers (usually a malformed token)
    #[error("Header parse error: {0}")]
    Header(#[from] reqwest::header::InvalidHeaderValue),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl ImportError {
    /// Build an [`ImportError::Api`] keeping at most `MAX_BODY` characters of the body.
    pub fn api(status: u16, body: impl AsRef<str>) -> Self {
        const MAX_BODY: usize = 300;
        let body = body.as_ref().trim();
        let body = match body.char_indices().nth(MAX_BODY) {
            Some((idx, _)) => format!("{}...", &body[..idx]),
            None => body.to_string(),
        };
        ImportError::Api { status, body }
    }
}
