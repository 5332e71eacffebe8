mod reply;

pub use reply::{truncate_text, Reply, ReplyField, Tone};

use std::sync::Arc;

use log::info;
use thiserror::Error;

use crate::importer::{ImportProgress, Importer};

pub const SAVE_RECIPE: &str = "save_recipe";
pub const INFO: &str = "info";
pub const URL_OPTION: &str = "url";

/// Commands the bot understands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    SaveRecipe { url: String },
    Info,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unknown command: {0}")]
    Unknown(String),
    #[error("Missing required option: {0}")]
    MissingOption(&'static str),
}

impl Command {
    pub fn parse(name: &str, url: Option<&str>) -> Result<Self, CommandError> {
        match name {
            SAVE_RECIPE => {
                let url = url
                    .map(str::trim)
                    .filter(|url| !url.is_empty())
                    .ok_or(CommandError::MissingOption(URL_OPTION))?;
                Ok(Command::SaveRecipe {
                    url: url.to_string(),
                })
            }
            INFO => Ok(Command::Info),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

/// First phase of handling a command, sent before the platform's response deadline
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Acknowledgement {
    /// Show a "thinking" state; the result follows from [`CommandHandler::complete`]
    Defer,
    /// The command is answered right away and needs no second phase
    Immediate(Reply),
}

/// Maps commands onto the importer and formats what comes back
pub struct CommandHandler {
    importer: Arc<Importer>,
    tags: Vec<String>,
}

impl CommandHandler {
    pub fn new(importer: Arc<Importer>) -> Self {
        let tags = importer.policy().default_tags.iter().cloned().collect();
        Self { importer, tags }
    }

    pub fn acknowledge(&self, command: &Command) -> Acknowledgement {
        match command {
            Command::SaveRecipe { .. } => Acknowledgement::Defer,
            Command::Info => Acknowledgement::Immediate(Reply::info(&self.tags)),
        }
    }

    /// Second phase: run the command to completion and produce the final reply
    pub async fn complete(&self, command: Command, progress: &dyn ImportProgress) -> Reply {
        match command {
            Command::SaveRecipe { url } => {
                let outcome = self.importer.import_recipe_with_progress(&url, progress).await;
                info!("Import of {} finished: {:?}", url, outcome);
                Reply::from_outcome(&outcome, &self.tags)
            }
            Command::Info => Reply::info(&self.tags),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_save_recipe() {
        assert_eq!(
            Command::parse("save_recipe", Some(" https://example.com/r ")),
            Ok(Command::SaveRecipe {
                url: "https://example.com/r".to_string()
            })
        );
    }

    #[test]
    fn test_parse_requires_url() {
        assert_eq!(
            Command::parse("save_recipe", None),
            Err(CommandError::MissingOption("url"))
        );
        assert_eq!(
            Command::parse("save_recipe", Some("  ")),
            Err(CommandError::MissingOption("url"))
        );
    }

    #[test]
    fn test_parse_info_and_unknown() {
        assert_eq!(Command::parse("info", None), Ok(Command::Info));
        assert_eq!(
            Command::parse("ping", None),
            Err(CommandError::Unknown("ping".to_string()))
        );
    }
}
