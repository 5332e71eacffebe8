pub mod commands;
pub mod config;
pub mod discord;
pub mod error;
pub mod extractors;
pub mod importer;
pub mod mealie;
pub mod model;
pub mod providers;
pub mod url_to_text;
pub mod validator;

pub use config::Settings;
pub use error::ImportError;
pub use importer::{ImportPolicy, Importer};
pub use model::{FailureReason, ImportOutcome, RecipeCandidate};

/// Import a single recipe link with the given settings.
///
/// Builds a fresh [`Importer`]; long-running callers should build one and reuse it.
pub async fn import_recipe(settings: &Settings, url: &str) -> Result<ImportOutcome, ImportError> {
    let importer = Importer::from_settings(settings)?;
    Ok(importer.import_recipe(url).await)
}
