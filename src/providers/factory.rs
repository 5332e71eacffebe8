use std::time::Duration;

use crate::config::AiConfig;
use crate::error::ImportError;
use crate::providers::{AnthropicProvider, LlmProvider, OpenAIProvider};

pub struct ProviderFactory;

impl ProviderFactory {
    /// Create the provider named in `config.provider`
    pub fn create(config: &AiConfig, timeout: Duration) -> Result<Box<dyn LlmProvider>, ImportError> {
        match config.provider.as_str() {
            "openai" => Ok(Box::new(OpenAIProvider::new(config, timeout)?)),
            "anthropic" => Ok(Box::new(AnthropicProvider::new(config, timeout)?)),
            other => Err(ImportError::AiProvider(format!(
                "Unknown provider: {other} (expected one of: {})",
                Self::available_providers().join(", ")
            ))),
        }
    }

    /// List all available provider names
    pub fn available_providers() -> Vec<&'static str> {
        vec!["openai", "anthropic"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_config(provider: &str) -> AiConfig {
        AiConfig {
            enabled: true,
            provider: provider.to_string(),
            model: Some("test-model".to_string()),
            api_key: Some("test-key".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_create_openai_provider() {
        let provider =
            ProviderFactory::create(&create_test_config("openai"), Duration::from_secs(5)).unwrap();
        assert_eq!(provider.provider_name(), "openai");
    }

    #[test]
    fn test_create_anthropic_provider() {
        let provider =
            ProviderFactory::create(&create_test_config("anthropic"), Duration::from_secs(5))
                .unwrap();
        assert_eq!(provider.provider_name(), "anthropic");
    }

    #[test]
    fn test_create_unknown_provider() {
        let result = ProviderFactory::create(&create_test_config("unknown"), Duration::from_secs(5));
        match result {
            Err(e) => {
                let message = e.to_string();
                assert!(message.contains("Unknown provider: unknown"));
                assert!(message.contains("openai, anthropic"));
            }
            Ok(_) => panic!("unknown provider should not be created"),
        }
    }

    #[test]
    fn test_available_providers() {
        let providers = ProviderFactory::available_providers();
        assert_eq!(providers, vec!["openai", "anthropic"]);
    }
}
