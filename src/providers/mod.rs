mod anthropic;
mod factory;
mod open_ai;
mod prompt;

pub use anthropic::AnthropicProvider;
pub use factory::ProviderFactory;
pub use open_ai::OpenAIProvider;
pub use prompt::{build_user_message, RECIPE_EXTRACTION_PROMPT};

use async_trait::async_trait;

use crate::error::ImportError;

/// Unified trait for all LLM providers
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Get the provider name (e.g., "openai", "anthropic")
    fn provider_name(&self) -> &str;

    /// Send one system prompt and one user message, returning the model's text reply.
    ///
    /// Every failure is reported as [`ImportError::AiProvider`].
    async fn complete(&self, system: &str, content: &str) -> Result<String, ImportError>;
}

/// Read the body of a provider response, mapping HTTP failures to provider errors
async fn read_json(
    provider: &str,
    response: Result<reqwest::Response, reqwest::Error>,
) -> Result<serde_json::Value, ImportError> {
    let response = response
        .map_err(|e| ImportError::AiProvider(format!("{provider} request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let body: String = body.chars().take(300).collect();
        return Err(ImportError::AiProvider(format!(
            "{provider} returned {status}: {body}"
        )));
    }

    response
        .json()
        .await
        .map_err(|e| ImportError::AiProvider(format!("{provider} sent an unreadable response: {e}")))
}
