use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, error, info, warn};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Client, Response};
use serde_json::json;
use url::Url;

use super::tags::generate_slug;
use super::types::{slug_from_body, update_payload, MealieRecipe, Tag, TagPage};
use super::RecipeManager;
use crate::config::MealieConfig;
use crate::error::ImportError;
use crate::model::{RecipeCandidate, RecipeUpdate};

/// HTTP client for the Mealie REST API
pub struct MealieClient {
    client: Client,
    base_url: String,
    household: String,
}

impl MealieClient {
    /// Create a new client from configuration
    pub fn new(config: &MealieConfig, timeout: Duration) -> Result<Self, ImportError> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.api_token))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        Ok(MealieClient {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            household: config.household.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn fetch_recipe(&self, slug: &str) -> Result<MealieRecipe, ImportError> {
        let response = self
            .client
            .get(self.endpoint(&format!("/api/recipes/{slug}")))
            .send()
            .await?;
        let recipe = ensure_success(response).await?.json::<MealieRecipe>().await?;
        Ok(recipe)
    }

    async fn delete_recipe(&self, slug: &str) -> Result<(), ImportError> {
        warn!("Removing recipe '{}' after a failed save", slug);
        let response = self
            .client
            .delete(self.endpoint(&format!("/api/recipes/{slug}")))
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }

    async fn list_tags(&self) -> Result<Vec<Tag>, ImportError> {
        let response = self
            .client
            .get(self.endpoint("/api/organizers/tags"))
            .query(&[("perPage", "-1")])
            .send()
            .await?;
        let page = ensure_success(response).await?.json::<TagPage>().await?;
        Ok(page.items)
    }

    async fn create_tag(&self, name: &str) -> Result<Tag, ImportError> {
        info!("Creating new tag: {}", name);
        let response = self
            .client
            .post(self.endpoint("/api/organizers/tags"))
            .json(&json!({ "name": name, "slug": generate_slug(name) }))
            .send()
            .await?;
        let tag = ensure_success(response).await?.json::<Tag>().await?;
        Ok(tag)
    }

    /// Find each tag by name (case-insensitive), creating the ones Mealie does not know yet
    async fn ensure_tags(&self, names: &BTreeSet<String>) -> Result<Vec<Tag>, ImportError> {
        let existing = match self.list_tags().await {
            Ok(tags) => tags,
            Err(e) => {
                warn!("Could not list existing tags, will try to create them: {}", e);
                Vec::new()
            }
        };

        let mut resolved = Vec::with_capacity(names.len());
        for name in names {
            let wanted = name.to_lowercase();
            let found = existing
                .iter()
                .find(|tag| tag.name.to_lowercase() == wanted);
            match found {
                Some(tag) => {
                    debug!("Tag '{}' already exists", name);
                    resolved.push(tag.clone());
                }
                None => match self.create_tag(name).await {
                    Ok(tag) => resolved.push(tag),
                    Err(e) => warn!("Could not create tag '{}': {}", name, e),
                },
            }
        }

        Ok(resolved)
    }
}

#[async_trait]
impl RecipeManager for MealieClient {
    async fn create_from_url(&self, url: &Url) -> Result<RecipeCandidate, ImportError> {
        let response = self
            .client
            .post(self.endpoint("/api/recipes/create/url"))
            .json(&json!({ "url": url.as_str(), "includeTags": false }))
            .send()
            .await?;

        let status = response.status();
        let body = ensure_success(response).await?.text().await?;
        let slug = slug_from_body(&body).ok_or_else(|| ImportError::api(status.as_u16(), &body))?;
        info!("Mealie created recipe '{}' from {}", slug, url);

        match self.get_by_slug(&slug).await {
            Ok(mut candidate) => {
                if candidate.source_url.is_empty() {
                    candidate.source_url = url.to_string();
                }
                candidate.slug = Some(slug);
                Ok(candidate)
            }
            Err(e) => {
                // The record exists; hand back the slug so it gets filled in rather than duplicated.
                warn!("Recipe '{}' was created but could not be read back: {}", slug, e);
                Ok(RecipeCandidate::new(url).with_slug(slug))
            }
        }
    }

    async fn get_by_slug(&self, slug: &str) -> Result<RecipeCandidate, ImportError> {
        let recipe = self.fetch_recipe(slug).await?;
        Ok(recipe.into_candidate())
    }

    async fn create_recipe(&self, candidate: &RecipeCandidate) -> Result<String, ImportError> {
        let name = if candidate.title.trim().is_empty() {
            "Untitled Recipe"
        } else {
            candidate.title.trim()
        };

        let response = self
            .client
            .post(self.endpoint("/api/recipes"))
            .json(&json!({ "name": name }))
            .send()
            .await?;
        let status = response.status();
        let body = ensure_success(response).await?.text().await?;
        let slug = slug_from_body(&body).ok_or_else(|| ImportError::api(status.as_u16(), &body))?;
        info!("Created recipe '{}' from extracted content", slug);

        // The name was set by the create call
        let update = RecipeUpdate {
            name: None,
            ..RecipeUpdate::full(candidate)
        };
        if let Err(e) = self.update_recipe(&slug, &update).await {
            // An empty record would block the next attempt under the same slug
            if let Err(delete_error) = self.delete_recipe(&slug).await {
                error!("Could not remove empty recipe '{}': {}", slug, delete_error);
            }
            return Err(e);
        }

        Ok(slug)
    }

    async fn update_recipe(&self, slug: &str, update: &RecipeUpdate) -> Result<(), ImportError> {
        let payload = update_payload(update);
        debug!("Updating recipe {}: {}", slug, payload);

        let response = self
            .client
            .patch(self.endpoint(&format!("/api/recipes/{slug}")))
            .json(&payload)
            .send()
            .await?;
        ensure_success(response).await?;

        info!("Successfully updated recipe: {}", slug);
        Ok(())
    }

    async fn add_tags(&self, slug: &str, tags: &BTreeSet<String>) -> Result<(), ImportError> {
        if tags.is_empty() {
            return Ok(());
        }

        let recipe = self.fetch_recipe(slug).await?;
        let new_tags = self.ensure_tags(tags).await?;
        if new_tags.is_empty() {
            warn!("No tags could be created or found for recipe {}", slug);
            return Ok(());
        }

        // Deduplicate by id; tags without an id are keyed by slug
        let mut merged: BTreeMap<String, Tag> = BTreeMap::new();
        for tag in recipe.tags.unwrap_or_default().into_iter().chain(new_tags) {
            let key = tag.id.clone().unwrap_or_else(|| generate_slug(&tag.name));
            merged.insert(key, tag);
        }
        let merged: Vec<Tag> = merged.into_values().collect();

        info!(
            "Assigning tags {:?} to recipe {}",
            merged.iter().map(|t| t.name.as_str()).collect::<Vec<_>>(),
            slug
        );
        let response = self
            .client
            .patch(self.endpoint(&format!("/api/recipes/{slug}")))
            .json(&json!({ "tags": merged }))
            .send()
            .await?;
        ensure_success(response).await?;

        Ok(())
    }

    fn recipe_url(&self, slug: &str) -> String {
        format!("{}/g/{}/r/{}", self.base_url, self.household, slug)
    }
}

/// Turn a non-2xx response into [`ImportError::Api`]
async fn ensure_success(response: Response) -> Result<Response, ImportError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(ImportError::api(status.as_u16(), body))
}
