use crate::importer::{FallbackCause, ImportStage};
use crate::model::ImportOutcome;

/// Maximum length Discord accepts for an embed field value
const MAX_FIELD: usize = 1024;

/// Colour family of a reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Info,
    Progress,
    Success,
    Warning,
    Error,
}

impl Tone {
    /// RGB value used for the embed stripe
    pub fn rgb(&self) -> u32 {
        match self {
            Tone::Info => 0x3498db,
            Tone::Progress => 0x3498db,
            Tone::Success => 0x2ecc71,
            Tone::Warning => 0xe67e22,
            Tone::Error => 0xe74c3c,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

/// Platform-neutral chat message, rendered as an embed by the Discord adapter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub title: String,
    pub description: String,
    pub tone: Tone,
    pub fields: Vec<ReplyField>,
    pub footer: Option<String>,
}

impl Reply {
    pub fn new(tone: Tone, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            tone,
            fields: Vec::new(),
            footer: None,
        }
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>, inline: bool) -> Self {
        self.fields.push(ReplyField {
            name: name.into(),
            value: truncate_text(&value.into(), MAX_FIELD),
            inline,
        });
        self
    }

    pub fn footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = Some(footer.into());
        self
    }

    /// Final message for an import
    pub fn from_outcome(outcome: &ImportOutcome, tags: &[String]) -> Self {
        match outcome {
            ImportOutcome::Success {
                slug,
                url,
                used_fallback,
            } => {
                let (title, description, method) = if *used_fallback {
                    (
                        "Recipe parsed by AI!",
                        "Mealie could not read the whole recipe, so it was extracted with AI and saved to Mealie.",
                        "AI fallback",
                    )
                } else {
                    (
                        "Recipe saved!",
                        "Mealie parsed the recipe and it has everything required.",
                        "Mealie parser",
                    )
                };

                let mut reply = Reply::new(Tone::Success, title, description)
                    .field("Recipe link", format!("[Open recipe]({url})"), false)
                    .field("Slug", format!("`{slug}`"), true)
                    .field("Method", method, true);
                if !tags.is_empty() {
                    reply = reply
                        .field("Tags", tags.join(", "), true)
                        .footer("Imported recipes are tagged for manual verification");
                }
                reply
            }
            ImportOutcome::Failure { reason, detail } => {
                let mut reply = Reply::new(Tone::Error, "Could not save the recipe", reason.describe())
                    .footer("Try another link or add the recipe manually");
                if !detail.trim().is_empty() {
                    reply = reply.field("Details", detail.trim(), false);
                }
                reply
            }
        }
    }

    /// Intermediate message while an import runs
    pub fn from_stage(stage: &ImportStage) -> Self {
        match stage {
            ImportStage::PrimaryParse => Reply::new(
                Tone::Progress,
                "Processing recipe...",
                "Asking Mealie to parse the recipe...",
            ),
            ImportStage::AiFallback(FallbackCause::PrimaryFailed(_)) => Reply::new(
                Tone::Warning,
                "Mealie could not parse the recipe",
                "Trying to extract it with AI...",
            ),
            ImportStage::AiFallback(FallbackCause::Incomplete(validation)) => Reply::new(
                Tone::Warning,
                "Recipe parsed partially",
                format!(
                    "Mealie parsed the recipe, but it is missing {}.\n\nTrying to extract it with AI...",
                    validation.describe_missing()
                ),
            ),
        }
    }

    /// Static bot information
    pub fn info(tags: &[String]) -> Self {
        let tagging = if tags.is_empty() {
            "Imported recipes are not tagged.".to_string()
        } else {
            format!(
                "Every imported recipe is tagged:\n{}",
                tags.iter()
                    .map(|tag| format!("• **{tag}**"))
                    .collect::<Vec<_>>()
                    .join("\n")
            )
        };

        Reply::new(
            Tone::Info,
            "Mealie Bot",
            "Imports recipes from links into Mealie.",
        )
        .field(
            "Commands",
            "/save_recipe [url] - save the recipe from a link\n/info - show this message",
            false,
        )
        .field(
            "How to use",
            "1. Run `/save_recipe` with the recipe link\n2. The bot imports it into Mealie and replies with a link",
            false,
        )
        .field("Tagging", tagging, false)
        .footer("The bot only reacts to slash commands")
    }
}

/// Cut `text` to at most `max_len` characters, ending with "..." when shortened
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        return text.to_string();
    }
    let keep = max_len.saturating_sub(3);
    let mut truncated: String = text.chars().take(keep).collect();
    truncated.push_str("...");
    truncated
}
