use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Deserializer};

/// Bot settings, loaded once at startup and passed around explicitly
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub discord: DiscordConfig,
    pub mealie: MealieConfig,
    #[serde(default)]
    pub ai: AiConfig,
    #[serde(default)]
    pub recipe: RecipeConfig,
    /// Request timeout in seconds, applied to every outgoing HTTP call
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    /// Default log filter, overridden by `RUST_LOG`
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DiscordConfig {
    pub token: String,
    /// Register commands on this guild only (instant update, handy in development)
    pub guild_id: Option<u64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MealieConfig {
    /// Base URL of the Mealie instance, e.g. `https://mealie.example.com`
    pub base_url: String,
    /// Long-lived API token created in the Mealie user profile
    pub api_token: String,
    /// Household slug used when building public recipe links
    #[serde(default = "default_household")]
    pub household: String,
}

/// Configuration of the AI fallback
#[derive(Debug, Deserialize, Clone)]
pub struct AiConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Provider name, see [`ProviderFactory`](crate::providers::ProviderFactory)
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Model name; each provider falls back to its own default when unset
    pub model: Option<String>,
    /// API key (can also be set via the provider's environment variable)
    pub api_key: Option<String>,
    /// Base URL for API endpoint (for custom or proxy endpoints)
    pub base_url: Option<String>,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Page text sent to the model is cut at this many characters
    #[serde(default = "default_max_page_chars")]
    pub max_page_chars: usize,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            provider: default_provider(),
            model: None,
            api_key: None,
            base_url: None,
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            max_page_chars: default_max_page_chars(),
        }
    }
}

/// Completeness rules and tagging
#[derive(Debug, Deserialize, Clone)]
pub struct RecipeConfig {
    /// Tags added to every imported recipe. Accepts a list or a comma-separated string.
    #[serde(default = "default_tags", deserialize_with = "string_or_list")]
    pub default_tags: Vec<String>,
    #[serde(default = "default_true")]
    pub require_ingredients: bool,
    #[serde(default = "default_true")]
    pub require_instructions: bool,
}

impl Default for RecipeConfig {
    fn default() -> Self {
        Self {
            default_tags: default_tags(),
            require_ingredients: true,
            require_instructions: true,
        }
    }
}

// Default value functions
fn default_timeout() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_household() -> String {
    "home".to_string()
}

fn default_provider() -> String {
    "openai".to_string()
}

fn default_temperature() -> f32 {
    0.1
}

fn default_max_tokens() -> u32 {
    2000
}

fn default_max_page_chars() -> usize {
    8000
}

fn default_tags() -> Vec<String> {
    vec!["Discord Import".to_string(), "Verify".to_string()]
}

fn default_true() -> bool {
    true
}

fn string_or_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Tags {
        Joined(String),
        List(Vec<String>),
    }

    let tags = match Tags::deserialize(deserializer)? {
        Tags::Joined(joined) => split_tags(&joined),
        Tags::List(list) => list
            .into_iter()
            .map(|tag| tag.trim().to_string())
            .filter(|tag| !tag.is_empty())
            .collect(),
    };
    Ok(tags)
}

fn split_tags(joined: &str) -> Vec<String> {
    joined
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(String::from)
        .collect()
}

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables with MEALIE_BOT__ prefix
    /// 2. config.toml file in current directory
    /// 3. Default values
    ///
    /// Environment variable format: MEALIE_BOT__MEALIE__API_TOKEN
    pub fn load() -> Result<Self, ConfigError> {
        load_settings()
    }

    /// Normalise and sanity-check loaded values
    pub fn validate(mut self) -> Result<Self, ConfigError> {
        let base_url = self.mealie.base_url.trim().trim_end_matches('/').to_string();
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ConfigError::Message(
                "mealie.base_url must start with http:// or https://".to_string(),
            ));
        }
        self.mealie.base_url = base_url;

        if self.timeout == 0 {
            return Err(ConfigError::Message(
                "timeout must be at least one second".to_string(),
            ));
        }

        Ok(self)
    }
}

/// Load settings from `config.toml` (optional) and `MEALIE_BOT__*` environment variables
pub fn load_settings() -> Result<Settings, ConfigError> {
    let settings = Config::builder()
        // Optional config file (can be missing)
        .add_source(File::with_name("config").required(false))
        // Use double underscore for nested: MEALIE_BOT__DISCORD__TOKEN
        .add_source(
            Environment::with_prefix("MEALIE_BOT")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let settings: Settings = settings.try_deserialize()?;
    settings.validate()
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    fn parse(toml: &str) -> Result<Settings, ConfigError> {
        Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?
            .try_deserialize::<Settings>()?
            .validate()
    }

    const MINIMAL: &str = r#"
        [discord]
        token = "discord-token"

        [mealie]
        base_url = "https://mealie.example.com/"
        api_token = "mealie-token"
    "#;

    #[test]
    fn test_defaults() {
        let settings = parse(MINIMAL).unwrap();
        assert_eq!(settings.timeout, 30);
        assert_eq!(settings.log_level, "info");
        assert_eq!(settings.mealie.household, "home");
        assert!(!settings.ai.enabled);
        assert_eq!(settings.ai.provider, "openai");
        assert_eq!(settings.ai.max_page_chars, 8000);
        assert_eq!(settings.recipe.default_tags, vec!["Discord Import", "Verify"]);
        assert!(settings.recipe.require_ingredients);
        assert!(settings.recipe.require_instructions);
        assert!(settings.discord.guild_id.is_none());
    }

    #[test]
    fn test_trailing_slash_is_stripped() {
        let settings = parse(MINIMAL).unwrap();
        assert_eq!(settings.mealie.base_url, "https://mealie.example.com");
    }

    #[test]
    fn test_base_url_requires_http_scheme() {
        let toml = MINIMAL.replace("https://mealie.example.com/", "mealie.example.com");
        let err = parse(&toml).unwrap_err();
        assert!(err.to_string().contains("http://"));
    }

    #[test]
    fn test_tags_accept_comma_separated_string() {
        let toml = format!(
            "{MINIMAL}\n[recipe]\ndefault_tags = \" Discord Import, Verify ,, Dinner\"\n"
        );
        let settings = parse(&toml).unwrap();
        assert_eq!(
            settings.recipe.default_tags,
            vec!["Discord Import", "Verify", "Dinner"]
        );
    }

    #[test]
    fn test_tags_accept_list() {
        let toml = format!(
            "{MINIMAL}\n[recipe]\ndefault_tags = [\"Imported\", \" \"]\nrequire_instructions = false\n"
        );
        let settings = parse(&toml).unwrap();
        assert_eq!(settings.recipe.default_tags, vec!["Imported"]);
        assert!(!settings.recipe.require_instructions);
        assert!(settings.recipe.require_ingredients);
    }

    #[test]
    fn test_ai_section() {
        let toml = format!(
            "{MINIMAL}\n[ai]\nenabled = true\nprovider = \"anthropic\"\nmodel = \"claude-sonnet-4-5\"\napi_key = \"k\"\n"
        );
        let settings = parse(&toml).unwrap();
        assert!(settings.ai.enabled);
        assert_eq!(settings.ai.provider, "anthropic");
        assert_eq!(settings.ai.api_key.as_deref(), Some("k"));
        assert_eq!(settings.ai.max_tokens, 2000);
    }

    #[test]
    fn test_model_is_left_to_the_provider() {
        let toml = format!("{MINIMAL}\n[ai]\nenabled = true\nprovider = \"anthropic\"\n");
        let settings = parse(&toml).unwrap();
        assert_eq!(settings.ai.provider, "anthropic");
        assert!(settings.ai.model.is_none());
    }

    #[test]
    fn test_missing_mealie_section_fails() {
        let result = parse("[discord]\ntoken = \"t\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let toml = format!("timeout = 0\n{MINIMAL}");
        assert!(parse(&toml).is_err());
    }
}
