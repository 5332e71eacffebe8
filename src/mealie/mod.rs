mod client;
mod tags;
mod types;

pub use client::MealieClient;
pub use tags::generate_slug;

use std::collections::BTreeSet;

use async_trait::async_trait;
use url::Url;

use crate::error::ImportError;
use crate::model::{RecipeCandidate, RecipeUpdate};

/// Operations the importer needs from the recipe manager
#[async_trait]
pub trait RecipeManager: Send + Sync {
    /// Let the manager scrape `url` and create a recipe from it.
    /// The returned candidate always carries the new slug.
    async fn create_from_url(&self, url: &Url) -> Result<RecipeCandidate, ImportError>;

    async fn get_by_slug(&self, slug: &str) -> Result<RecipeCandidate, ImportError>;

    /// Create a recipe from already extracted content, returning its slug
    async fn create_recipe(&self, candidate: &RecipeCandidate) -> Result<String, ImportError>;

    async fn update_recipe(&self, slug: &str, update: &RecipeUpdate) -> Result<(), ImportError>;

    async fn add_tags(&self, slug: &str, tags: &BTreeSet<String>) -> Result<(), ImportError>;

    /// Public link to a stored recipe
    fn recipe_url(&self, slug: &str) -> String;
}
