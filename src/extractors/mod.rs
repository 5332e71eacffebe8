mod ai;

pub use ai::{clean_recipe_title, parse_model_reply, AiRecipeExtractor};

use async_trait::async_trait;
use url::Url;

use crate::error::ImportError;
use crate::model::RecipeCandidate;

/// Extracts recipe content from a page without going through Mealie
#[async_trait]
pub trait RecipeExtractor: Send + Sync {
    /// Makes exactly one attempt; callers decide whether to try again
    async fn extract_recipe(&self, url: &Url) -> Result<RecipeCandidate, ImportError>;
}
