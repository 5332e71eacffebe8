use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::model::{nutrition_from_json, scalar_text, RecipeCandidate, RecipeUpdate};

/// Recipe as returned by `GET /api/recipes/{slug}`; only the fields we read
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MealieRecipe {
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, rename = "orgURL")]
    pub org_url: Option<String>,
    #[serde(default)]
    pub recipe_ingredient: Option<Vec<IngredientEntry>>,
    #[serde(default)]
    pub recipe_instructions: Option<Vec<InstructionEntry>>,
    #[serde(default)]
    pub total_time: Option<Value>,
    #[serde(default)]
    pub recipe_yield: Option<Value>,
    #[serde(default)]
    pub nutrition: Option<BTreeMap<String, Value>>,
    #[serde(default)]
    pub tags: Option<Vec<Tag>>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum IngredientEntry {
    Text(String),
    Parsed {
        #[serde(default)]
        display: Option<String>,
        #[serde(default)]
        note: Option<String>,
        #[serde(default, rename = "originalText")]
        original_text: Option<String>,
    },
}

impl IngredientEntry {
    fn into_line(self) -> String {
        match self {
            IngredientEntry::Text(text) => text,
            IngredientEntry::Parsed {
                display,
                note,
                original_text,
            } => [display, note, original_text]
                .into_iter()
                .flatten()
                .find(|s| !s.trim().is_empty())
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum InstructionEntry {
    Text(String),
    Step {
        #[serde(default)]
        text: Option<String>,
    },
}

impl InstructionEntry {
    fn into_line(self) -> String {
        match self {
            InstructionEntry::Text(text) => text,
            InstructionEntry::Step { text } => text.unwrap_or_default(),
        }
    }
}

/// Tag organizer object, `GET/POST /api/organizers/tags`
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub(crate) struct Tag {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub slug: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TagPage {
    #[serde(default)]
    pub items: Vec<Tag>,
}

impl MealieRecipe {
    pub fn into_candidate(self) -> RecipeCandidate {
        let lines = |entries: Vec<String>| -> Vec<String> {
            entries
                .into_iter()
                .map(|line| line.trim().to_string())
                .filter(|line| !line.is_empty())
                .collect()
        };

        RecipeCandidate {
            source_url: self.org_url.unwrap_or_default(),
            title: self.name.unwrap_or_default(),
            description: self.description.filter(|d| !d.trim().is_empty()),
            ingredients: lines(
                self.recipe_ingredient
                    .unwrap_or_default()
                    .into_iter()
                    .map(IngredientEntry::into_line)
                    .collect(),
            ),
            instructions: lines(
                self.recipe_instructions
                    .unwrap_or_default()
                    .into_iter()
                    .map(InstructionEntry::into_line)
                    .collect(),
            ),
            total_time: self.total_time.as_ref().and_then(scalar_text),
            recipe_yield: self.recipe_yield.as_ref().and_then(scalar_text),
            nutrition: self
                .nutrition
                .as_ref()
                .map(nutrition_from_json)
                .unwrap_or_default(),
            tags: self
                .tags
                .unwrap_or_default()
                .into_iter()
                .map(|tag| tag.name)
                .collect(),
            slug: Some(self.slug).filter(|slug| !slug.is_empty()),
        }
    }
}

/// Body for `PATCH /api/recipes/{slug}`
pub(crate) fn update_payload(update: &RecipeUpdate) -> Value {
    let mut payload = json!({
        "recipeIngredient": update
            .ingredients
            .iter()
            .map(|line| json!({ "note": line, "display": line, "originalText": line }))
            .collect::<Vec<_>>(),
        "recipeInstructions": update
            .instructions
            .iter()
            .map(|text| json!({ "title": "", "text": text, "ingredientReferences": [] }))
            .collect::<Vec<_>>(),
    });

    if let Some(name) = &update.name {
        payload["name"] = json!(name);
    }
    if let Some(description) = &update.description {
        payload["description"] = json!(description);
    }
    if let Some(total_time) = &update.total_time {
        payload["totalTime"] = json!(total_time);
    }
    if let Some(recipe_yield) = &update.recipe_yield {
        payload["recipeYield"] = json!(recipe_yield);
    }
    if let Some(nutrition) = &update.nutrition {
        payload["nutrition"] = json!(nutrition);
    }
    if let Some(org_url) = &update.org_url {
        payload["orgURL"] = json!(org_url);
    }

    payload
}

/// Mealie answers a create call with the slug as a JSON string; some versions wrap it in an object
pub(crate) fn slug_from_body(body: &str) -> Option<String> {
    let slug = match serde_json::from_str::<Value>(body.trim()) {
        Ok(Value::String(slug)) => slug,
        Ok(Value::Object(map)) => map
            .get("slug")
            .or_else(|| map.get("id"))
            .and_then(Value::as_str)?
            .to_string(),
        _ => return None,
    };

    if slug.is_empty() || slug.starts_with("no-recipe") {
        None
    } else {
        Some(slug)
    }
}
