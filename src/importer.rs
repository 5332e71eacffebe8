use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::{error, info, warn};
use url::Url;

use crate::config::Settings;
use crate::error::ImportError;
use crate::extractors::{AiRecipeExtractor, RecipeExtractor};
use crate::mealie::{MealieClient, RecipeManager};
use crate::model::{FailureReason, ImportOutcome, RecipeUpdate, ValidationResult};
use crate::validator::validate;

/// Completeness rules and fallback switches for one importer
#[derive(Debug, Clone)]
pub struct ImportPolicy {
    pub require_ingredients: bool,
    pub require_instructions: bool,
    pub ai_fallback: bool,
    pub default_tags: BTreeSet<String>,
}

impl ImportPolicy {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            require_ingredients: settings.recipe.require_ingredients,
            require_instructions: settings.recipe.require_instructions,
            ai_fallback: settings.ai.enabled,
            default_tags: settings.recipe.default_tags.iter().cloned().collect(),
        }
    }
}

/// Why the AI fallback was started
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackCause {
    /// Mealie could not create a recipe at all
    PrimaryFailed(String),
    /// Mealie created a recipe that misses required fields
    Incomplete(ValidationResult),
}

/// Checkpoints reported while an import runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportStage {
    PrimaryParse,
    AiFallback(FallbackCause),
}

/// Receives progress while an import runs
#[async_trait]
pub trait ImportProgress: Send + Sync {
    async fn report(&self, stage: ImportStage);
}

/// Progress sink that drops everything
pub struct NoProgress;

#[async_trait]
impl ImportProgress for NoProgress {
    async fn report(&self, _stage: ImportStage) {}
}

/// Runs the import flow: Mealie's own parser first, the AI extractor when that is not enough
pub struct Importer {
    manager: Arc<dyn RecipeManager>,
    extractor: Option<Arc<dyn RecipeExtractor>>,
    policy: ImportPolicy,
}

impl Importer {
    pub fn new(
        manager: Arc<dyn RecipeManager>,
        extractor: Option<Arc<dyn RecipeExtractor>>,
        policy: ImportPolicy,
    ) -> Self {
        Self {
            manager,
            extractor,
            policy,
        }
    }

    /// Build the importer against the real Mealie and AI services.
    ///
    /// An AI extractor that cannot be built (missing key, unknown provider) disables
    /// the fallback instead of failing startup.
    pub fn from_settings(settings: &Settings) -> Result<Self, ImportError> {
        let timeout = Duration::from_secs(settings.timeout);
        let manager = Arc::new(MealieClient::new(&settings.mealie, timeout)?);
        let mut policy = ImportPolicy::from_settings(settings);

        let extractor: Option<Arc<dyn RecipeExtractor>> = if policy.ai_fallback {
            match AiRecipeExtractor::from_config(&settings.ai, timeout) {
                Ok(extractor) => Some(Arc::new(extractor)),
                Err(e) => {
                    warn!("AI fallback disabled: {}", e);
                    policy.ai_fallback = false;
                    None
                }
            }
        } else {
            None
        };

        Ok(Self::new(manager, extractor, policy))
    }

    pub fn policy(&self) -> &ImportPolicy {
        &self.policy
    }

    pub async fn import_recipe(&self, url: &str) -> ImportOutcome {
        self.import_recipe_with_progress(url, &NoProgress).await
    }

    pub async fn import_recipe_with_progress(
        &self,
        url: &str,
        progress: &dyn ImportProgress,
    ) -> ImportOutcome {
        let url = match parse_recipe_url(url) {
            Ok(url) => url,
            Err(e) => return ImportOutcome::failure(FailureReason::InvalidUrl, e.to_string()),
        };

        info!("Importing recipe from {}", url);
        progress.report(ImportStage::PrimaryParse).await;

        let (existing, cause) = match self.manager.create_from_url(&url).await {
            Ok(candidate) => {
                let Some(slug) = candidate.slug.clone() else {
                    error!("Mealie returned a recipe without a slug for {}", url);
                    return ImportOutcome::failure(
                        FailureReason::PrimaryParseFailed,
                        "Mealie did not return a recipe identifier",
                    );
                };

                let validation = validate(
                    &candidate,
                    self.policy.require_ingredients,
                    self.policy.require_instructions,
                );
                if validation.is_complete {
                    info!("Mealie parsed {} completely as '{}'", url, slug);
                    self.apply_default_tags(&slug).await;
                    return ImportOutcome::Success {
                        url: self.manager.recipe_url(&slug),
                        slug,
                        used_fallback: false,
                    };
                }

                warn!(
                    "Recipe '{}' is missing {}",
                    slug,
                    validation.describe_missing()
                );
                (Some(candidate), FallbackCause::Incomplete(validation))
            }
            Err(e) => {
                warn!("Mealie failed to parse {}: {}", url, e);
                (None, FallbackCause::PrimaryFailed(e.to_string()))
            }
        };

        let extractor = match (&self.extractor, self.policy.ai_fallback) {
            (Some(extractor), true) => extractor,
            _ => {
                return match cause {
                    FallbackCause::Incomplete(validation) => ImportOutcome::failure(
                        FailureReason::IncompleteRecipe,
                        format!(
                            "missing {}, AI fallback disabled",
                            validation.describe_missing()
                        ),
                    ),
                    FallbackCause::PrimaryFailed(detail) => {
                        ImportOutcome::failure(FailureReason::PrimaryParseFailed, detail)
                    }
                };
            }
        };

        progress.report(ImportStage::AiFallback(cause)).await;

        let extracted = match extractor.extract_recipe(&url).await {
            Ok(candidate) => candidate,
            Err(e) => {
                error!("AI extraction failed for {}: {}", url, e);
                return ImportOutcome::failure(FailureReason::AiExtractionFailed, e.to_string());
            }
        };

        let validation = validate(
            &extracted,
            self.policy.require_ingredients,
            self.policy.require_instructions,
        );
        if !validation.is_complete {
            warn!(
                "AI result for {} is missing {}",
                url,
                validation.describe_missing()
            );
            return ImportOutcome::failure(
                FailureReason::IncompleteRecipe,
                format!("missing {}", validation.describe_missing()),
            );
        }

        // Fill in the record Mealie already created instead of adding a second one
        let saved = match existing {
            Some(primary) => {
                let slug = primary.slug.clone().unwrap_or_default();
                let update = RecipeUpdate {
                    name: Some(extracted.title.clone())
                        .filter(|_| primary.title.trim().is_empty()),
                    description: extracted
                        .description
                        .clone()
                        .filter(|_| primary.description.is_none()),
                    total_time: extracted
                        .total_time
                        .clone()
                        .filter(|_| primary.total_time.is_none()),
                    recipe_yield: extracted
                        .recipe_yield
                        .clone()
                        .filter(|_| primary.recipe_yield.is_none()),
                    nutrition: Some(extracted.nutrition.clone())
                        .filter(|n| !n.is_empty() && primary.nutrition.is_empty()),
                    ..RecipeUpdate::content_of(&extracted)
                };
                self.manager
                    .update_recipe(&slug, &update)
                    .await
                    .map(|()| slug)
            }
            None => self.manager.create_recipe(&extracted).await,
        };

        let slug = match saved {
            Ok(slug) => slug,
            Err(e) => {
                error!("Could not save AI-extracted recipe for {}: {}", url, e);
                return ImportOutcome::failure(FailureReason::RecipeSaveFailed, e.to_string());
            }
        };

        self.apply_default_tags(&slug).await;
        info!("Imported {} as '{}' with the AI fallback", url, slug);

        ImportOutcome::Success {
            url: self.manager.recipe_url(&slug),
            slug,
            used_fallback: true,
        }
    }

    /// Tagging is best effort: the recipe exists either way
    async fn apply_default_tags(&self, slug: &str) {
        if self.policy.default_tags.is_empty() {
            return;
        }
        if let Err(e) = self.manager.add_tags(slug, &self.policy.default_tags).await {
            warn!("Failed to add tags to recipe {}: {}", slug, e);
        }
    }
}

/// Accept only absolute http(s) URLs with a host
pub fn parse_recipe_url(input: &str) -> Result<Url, ImportError> {
    let input = input.trim();
    let url = Url::parse(input).map_err(|e| ImportError::InvalidUrl(format!("{input}: {e}")))?;

    match url.scheme() {
        "http" | "https" if url.host_str().is_some_and(|h| !h.is_empty()) => Ok(url),
        _ => Err(ImportError::InvalidUrl(format!(
            "{input}: only http(s) links are supported"
        ))),
    }
}
