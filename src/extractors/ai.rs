use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info};
use serde::Deserialize;
use serde_json::Value;
use url::Url;

use super::RecipeExtractor;
use crate::config::AiConfig;
use crate::error::ImportError;
use crate::model::{nutrition_from_json, scalar_text, RecipeCandidate};
use crate::providers::{build_user_message, LlmProvider, ProviderFactory, RECIPE_EXTRACTION_PROMPT};
use crate::url_to_text::{PageText, RequestFetcher};

const UNTITLED: &str = "Untitled Recipe";

/// Reads the page itself and asks a language model for the recipe
pub struct AiRecipeExtractor {
    fetcher: RequestFetcher,
    provider: Box<dyn LlmProvider>,
    max_page_chars: usize,
}

impl AiRecipeExtractor {
    pub fn new(fetcher: RequestFetcher, provider: Box<dyn LlmProvider>, max_page_chars: usize) -> Self {
        Self {
            fetcher,
            provider,
            max_page_chars,
        }
    }

    /// Build the extractor with the provider selected in configuration
    pub fn from_config(config: &AiConfig, timeout: Duration) -> Result<Self, ImportError> {
        let provider = ProviderFactory::create(config, timeout)?;
        let fetcher = RequestFetcher::new(timeout)?;
        Ok(Self::new(fetcher, provider, config.max_page_chars))
    }
}

#[async_trait]
impl RecipeExtractor for AiRecipeExtractor {
    async fn extract_recipe(&self, url: &Url) -> Result<RecipeCandidate, ImportError> {
        info!(
            "Extracting recipe from {} with {}",
            url,
            self.provider.provider_name()
        );

        let html = self.fetcher.fetch(url).await?;
        let page = PageText::from_html(&html);
        if page.text.trim().is_empty() {
            return Err(ImportError::AiParse(format!("{url} has no readable text")));
        }

        let message = build_user_message(
            url.as_str(),
            page.title.as_deref(),
            page.truncated(self.max_page_chars),
        );
        let reply = self
            .provider
            .complete(RECIPE_EXTRACTION_PROMPT, &message)
            .await?;
        debug!("Model reply: {}", reply);

        let mut candidate = parse_model_reply(&reply, url)?;
        if candidate.title.is_empty() {
            candidate.title = page
                .title
                .as_deref()
                .map(clean_recipe_title)
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| UNTITLED.to_string());
        }

        info!(
            "AI extracted '{}' with {} ingredients and {} steps",
            candidate.title,
            candidate.ingredients.len(),
            candidate.instructions.len()
        );
        Ok(candidate)
    }
}

#[derive(Debug, Deserialize)]
struct ExtractedRecipe {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default, alias = "recipeIngredient")]
    ingredients: Vec<Line>,
    #[serde(default, alias = "recipeInstructions")]
    instructions: Vec<Line>,
    #[serde(default, rename = "totalTime", alias = "total_time")]
    total_time: Option<Value>,
    #[serde(default, rename = "recipeYield", alias = "recipe_yield")]
    recipe_yield: Option<Value>,
    #[serde(default)]
    nutrition: Option<BTreeMap<String, Value>>,
    #[serde(default)]
    error: Option<String>,
}

/// Models do not always return plain strings in the lists
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Line {
    Text(String),
    Entry(LineEntry),
}

#[derive(Debug, Deserialize)]
struct LineEntry {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    note: Option<String>,
    #[serde(default)]
    display: Option<String>,
}

impl Line {
    fn into_text(self) -> Option<String> {
        let text = match self {
            Line::Text(text) => text,
            Line::Entry(entry) => [entry.text, entry.display, entry.note]
                .into_iter()
                .flatten()
                .find(|s| !s.trim().is_empty())?,
        };
        let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
        (!text.is_empty()).then_some(text)
    }
}

/// Turn the model's reply into a candidate for `url`.
///
/// The reply may be wrapped in a markdown code fence. The title is left empty when the
/// model did not provide one.
pub fn parse_model_reply(reply: &str, url: &Url) -> Result<RecipeCandidate, ImportError> {
    let json = strip_code_fence(reply);
    let extracted: ExtractedRecipe = serde_json::from_str(json)
        .map_err(|e| ImportError::AiParse(format!("model reply is not the expected JSON: {e}")))?;

    if let Some(error) = extracted.error.as_deref().map(str::trim) {
        if !error.is_empty() {
            return Err(ImportError::AiParse(format!("model found no recipe: {error}")));
        }
    }

    let lines = |lines: Vec<Line>| lines.into_iter().filter_map(Line::into_text).collect();

    Ok(RecipeCandidate {
        title: extracted
            .name
            .as_deref()
            .map(clean_recipe_title)
            .unwrap_or_default(),
        description: extracted
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty()),
        ingredients: lines(extracted.ingredients),
        instructions: lines(extracted.instructions),
        total_time: extracted.total_time.as_ref().and_then(scalar_text),
        recipe_yield: extracted.recipe_yield.as_ref().and_then(scalar_text),
        nutrition: extracted
            .nutrition
            .as_ref()
            .map(nutrition_from_json)
            .unwrap_or_default(),
        ..RecipeCandidate::new(url)
    })
}

fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") on the opening fence line
    let rest = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

/// Normalise a recipe title: decode HTML entities, collapse whitespace and drop
/// "Recipe:"-style prefixes.
pub fn clean_recipe_title(title: &str) -> String {
    const PREFIXES: &[&str] = &["Recipe:", "RECIPE:", "Przepis:", "PRZEPIS:"];

    let decoded = html_escape::decode_html_entities(title);
    let mut title = decoded.split_whitespace().collect::<Vec<_>>().join(" ");
    for prefix in PREFIXES {
        if let Some(rest) = title.strip_prefix(prefix) {
            title = rest.trim().to_string();
        }
    }
    title
}
