use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde_json::Value;
use url::Url;

/// In-flight representation of a recipe, before or after it exists in Mealie
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeCandidate {
    pub source_url: String,
    pub title: String,
    pub description: Option<String>,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    /// ISO 8601 duration, e.g. `PT45M`
    pub total_time: Option<String>,
    /// Servings as written on the page, e.g. `4` or `6 slices`
    pub recipe_yield: Option<String>,
    /// Mealie nutrition keys (`calories`, `proteinContent`, ...) to their values
    pub nutrition: BTreeMap<String, String>,
    pub tags: BTreeSet<String>,
    /// Assigned by Mealie when the recipe is created
    pub slug: Option<String>,
}

impl RecipeCandidate {
    pub fn new(source_url: &Url) -> Self {
        Self {
            source_url: source_url.to_string(),
            ..Default::default()
        }
    }

    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }
}

/// Fields written onto an existing recipe when the AI fills in what Mealie missed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    pub total_time: Option<String>,
    pub recipe_yield: Option<String>,
    pub nutrition: Option<BTreeMap<String, String>>,
    pub org_url: Option<String>,
}

impl RecipeUpdate {
    /// Every field of `candidate`, for a record that has nothing worth keeping
    pub fn full(candidate: &RecipeCandidate) -> Self {
        Self {
            name: Some(candidate.title.clone()).filter(|name| !name.trim().is_empty()),
            description: candidate.description.clone(),
            total_time: candidate.total_time.clone(),
            recipe_yield: candidate.recipe_yield.clone(),
            nutrition: Some(candidate.nutrition.clone()).filter(|n| !n.is_empty()),
            ..Self::content_of(candidate)
        }
    }

    /// Content of `candidate`, without touching the name, description or details
    pub fn content_of(candidate: &RecipeCandidate) -> Self {
        Self {
            ingredients: candidate.ingredients.clone(),
            instructions: candidate.instructions.clone(),
            org_url: Some(candidate.source_url.clone()).filter(|url| !url.is_empty()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MissingField {
    Ingredients,
    Instructions,
}

impl MissingField {
    pub fn as_str(&self) -> &'static str {
        match self {
            MissingField::Ingredients => "ingredients",
            MissingField::Instructions => "instructions",
        }
    }
}

impl fmt::Display for MissingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    pub is_complete: bool,
    pub missing: BTreeSet<MissingField>,
}

impl ValidationResult {
    /// Missing fields joined for humans, e.g. `ingredients and instructions`
    pub fn describe_missing(&self) -> String {
        self.missing
            .iter()
            .map(MissingField::as_str)
            .collect::<Vec<_>>()
            .join(" and ")
    }
}

/// Why an import did not produce a recipe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    InvalidUrl,
    PrimaryParseFailed,
    IncompleteRecipe,
    AiExtractionFailed,
    RecipeSaveFailed,
}

impl FailureReason {
    /// Plain-language explanation shown to users
    pub fn describe(&self) -> &'static str {
        match self {
            FailureReason::InvalidUrl => "That does not look like a valid recipe link.",
            FailureReason::PrimaryParseFailed => "Mealie could not import a recipe from this page.",
            FailureReason::IncompleteRecipe => {
                "Could not parse ingredients/instructions from this page."
            }
            FailureReason::AiExtractionFailed => "The AI could not extract a recipe from this page.",
            FailureReason::RecipeSaveFailed => {
                "The recipe was extracted but could not be saved to Mealie."
            }
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureReason::InvalidUrl => "InvalidUrl",
            FailureReason::PrimaryParseFailed => "PrimaryParseFailed",
            FailureReason::IncompleteRecipe => "IncompleteRecipe",
            FailureReason::AiExtractionFailed => "AiExtractionFailed",
            FailureReason::RecipeSaveFailed => "RecipeSaveFailed",
        };
        f.write_str(name)
    }
}

/// Result of one import attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportOutcome {
    Success {
        slug: String,
        /// Public link to the recipe in Mealie
        url: String,
        used_fallback: bool,
    },
    Failure {
        reason: FailureReason,
        detail: String,
    },
}

impl ImportOutcome {
    pub fn failure(reason: FailureReason, detail: impl Into<String>) -> Self {
        ImportOutcome::Failure {
            reason,
            detail: detail.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ImportOutcome::Success { .. })
    }

    pub fn failure_reason(&self) -> Option<FailureReason> {
        match self {
            ImportOutcome::Success { .. } => None,
            ImportOutcome::Failure { reason, .. } => Some(*reason),
        }
    }
}

/// Text of a JSON scalar; models and Mealie send counts both as strings and as numbers
pub(crate) fn scalar_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(text) => text.trim().to_string(),
        Value::Number(number) => number.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

/// Nutrition object with every non-empty scalar value kept as text
pub(crate) fn nutrition_from_json<'a>(
    entries: impl IntoIterator<Item = (&'a String, &'a Value)>,
) -> BTreeMap<String, String> {
    entries
        .into_iter()
        .filter_map(|(key, value)| scalar_text(value).map(|text| (key.clone(), text)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_missing_orders_fields() {
        let result = ValidationResult {
            is_complete: false,
            missing: [MissingField::Instructions, MissingField::Ingredients]
                .into_iter()
                .collect(),
        };
        assert_eq!(result.describe_missing(), "ingredients and instructions");
    }

    #[test]
    fn test_scalar_text() {
        assert_eq!(scalar_text(&Value::from(" 4 ")), Some("4".to_string()));
        assert_eq!(scalar_text(&Value::from(6)), Some("6".to_string()));
        assert_eq!(scalar_text(&Value::from("")), None);
        assert_eq!(scalar_text(&Value::Null), None);
    }

    #[test]
    fn test_full_update_carries_details() {
        let url = Url::parse("https://example.com/recipe/1").unwrap();
        let mut candidate = RecipeCandidate::new(&url);
        candidate.title = "Soup".to_string();
        candidate.total_time = Some("PT30M".to_string());
        candidate.nutrition.insert("calories".to_string(), "300".to_string());

        let update = RecipeUpdate::full(&candidate);
        assert_eq!(update.name.as_deref(), Some("Soup"));
        assert_eq!(update.total_time.as_deref(), Some("PT30M"));
        assert!(update.recipe_yield.is_none());
        assert_eq!(update.nutrition.unwrap()["calories"], "300");
        assert!(RecipeUpdate::content_of(&candidate).nutrition.is_none());
    }

    #[test]
    fn test_update_content_keeps_name_untouched() {
        let url = Url::parse("https://example.com/recipe/1").unwrap();
        let mut candidate = RecipeCandidate::new(&url);
        candidate.title = "Soup".to_string();
        candidate.ingredients = vec!["water".to_string()];

        let update = RecipeUpdate::content_of(&candidate);
        assert!(update.name.is_none());
        assert_eq!(update.ingredients, vec!["water"]);
        assert_eq!(update.org_url.as_deref(), Some("https://example.com/recipe/1"));
    }
}
