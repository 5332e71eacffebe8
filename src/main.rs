use std::sync::Arc;

use log::{info, warn};
use mealie_import::commands::CommandHandler;
use mealie_import::{discord, Importer, Settings};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env file is fine, the environment may already be set
    let dotenv = dotenvy::dotenv();

    let settings = Settings::load()?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&settings.log_level))
        .init();

    if let Err(e) = dotenv {
        warn!("No .env file loaded: {}", e);
    }

    let importer = Importer::from_settings(&settings)?;
    let policy = importer.policy();
    info!(
        "Mealie at {}, AI fallback {}",
        settings.mealie.base_url,
        if policy.ai_fallback { "enabled" } else { "disabled" }
    );

    let commands = Arc::new(CommandHandler::new(Arc::new(importer)));
    discord::run(&settings.discord, commands).await?;

    Ok(())
}
