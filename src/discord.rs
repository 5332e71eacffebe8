use std::sync::Arc;

use async_trait::async_trait;
use log::{error, info, warn};
use serenity::all::{
    Client, Colour, Command as SlashCommand, CommandInteraction, CommandOptionType, Context,
    CreateCommand, CreateCommandOption, CreateEmbed, CreateEmbedFooter,
    CreateInteractionResponse, CreateInteractionResponseFollowup,
    CreateInteractionResponseMessage, EventHandler, GatewayIntents, GuildId, Interaction, Ready,
};
use serenity::http::Http;

use crate::commands::{
    Acknowledgement, Command, CommandHandler, Reply, Tone, INFO, SAVE_RECIPE, URL_OPTION,
};
use crate::config::DiscordConfig;
use crate::importer::{ImportProgress, ImportStage};

/// serenity event handler wiring slash commands to the [`CommandHandler`]
pub struct Handler {
    commands: Arc<CommandHandler>,
    guild_id: Option<u64>,
}

impl Handler {
    pub fn new(commands: Arc<CommandHandler>, guild_id: Option<u64>) -> Self {
        Self { commands, guild_id }
    }

    async fn handle_command(&self, ctx: Context, interaction: CommandInteraction) {
        let url = interaction
            .data
            .options
            .iter()
            .find(|option| option.name == URL_OPTION)
            .and_then(|option| option.value.as_str());

        let command = match Command::parse(&interaction.data.name, url) {
            Ok(command) => command,
            Err(e) => {
                warn!("[{}] {}", interaction.id, e);
                let reply = Reply::new(Tone::Error, "Error", e.to_string());
                respond(&ctx.http, &interaction, reply).await;
                return;
            }
        };

        info!(
            "[{}] Received {:?} from {}",
            interaction.id, command, interaction.user.name
        );

        match self.commands.acknowledge(&command) {
            Acknowledgement::Immediate(reply) => respond(&ctx.http, &interaction, reply).await,
            Acknowledgement::Defer => {
                // Discord allows three seconds for the first response
                if let Err(e) = interaction.defer(&ctx.http).await {
                    error!(
                        "[{}] Failed to defer, interaction probably expired: {}",
                        interaction.id, e
                    );
                    return;
                }

                let commands = Arc::clone(&self.commands);
                let http = Arc::clone(&ctx.http);
                tokio::spawn(async move {
                    let progress = FollowupProgress {
                        http: Arc::clone(&http),
                        interaction: interaction.clone(),
                    };
                    let reply = commands.complete(command, &progress).await;
                    followup(&http, &interaction, reply).await;
                });
            }
        }
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("{} is connected", ready.user.name);

        let definitions = command_definitions();
        let registered = match self.guild_id {
            Some(guild_id) => GuildId::new(guild_id)
                .set_commands(&ctx.http, definitions)
                .await,
            None => SlashCommand::set_global_commands(&ctx.http, definitions).await,
        };

        match registered {
            Ok(commands) => info!("Successfully synced {} slash commands", commands.len()),
            Err(e) => error!("Failed to sync slash commands: {}", e),
        }
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        if let Interaction::Command(command) = interaction {
            self.handle_command(ctx, command).await;
        }
    }
}

/// Posts each import stage as a follow-up message
struct FollowupProgress {
    http: Arc<Http>,
    interaction: CommandInteraction,
}

#[async_trait]
impl ImportProgress for FollowupProgress {
    async fn report(&self, stage: ImportStage) {
        followup(&self.http, &self.interaction, Reply::from_stage(&stage)).await;
    }
}

fn command_definitions() -> Vec<CreateCommand> {
    vec![
        CreateCommand::new(SAVE_RECIPE)
            .description("Save a recipe from a link to Mealie")
            .add_option(
                CreateCommandOption::new(CommandOptionType::String, URL_OPTION, "Recipe link")
                    .required(true),
            ),
        CreateCommand::new(INFO).description("Show information about the Mealie bot"),
    ]
}

fn embed(reply: Reply) -> CreateEmbed {
    let mut embed = CreateEmbed::new()
        .title(reply.title)
        .description(reply.description)
        .colour(Colour::new(reply.tone.rgb()));
    for field in reply.fields {
        embed = embed.field(field.name, field.value, field.inline);
    }
    if let Some(footer) = reply.footer {
        embed = embed.footer(CreateEmbedFooter::new(footer));
    }
    embed
}

async fn respond(http: &Arc<Http>, interaction: &CommandInteraction, reply: Reply) {
    let message = CreateInteractionResponseMessage::new().embed(embed(reply));
    if let Err(e) = interaction
        .create_response(http, CreateInteractionResponse::Message(message))
        .await
    {
        error!("[{}] Failed to respond: {}", interaction.id, e);
    }
}

async fn followup(http: &Arc<Http>, interaction: &CommandInteraction, reply: Reply) {
    let message = CreateInteractionResponseFollowup::new().embed(embed(reply));
    if let Err(e) = interaction.create_followup(http, message).await {
        error!("[{}] Failed to send follow-up: {}", interaction.id, e);
    }
}

/// Connect to the gateway and serve commands until the connection ends
pub async fn run(config: &DiscordConfig, commands: Arc<CommandHandler>) -> Result<(), serenity::Error> {
    let handler = Handler::new(commands, config.guild_id);
    let mut client = Client::builder(&config.token, GatewayIntents::non_privileged())
        .event_handler(handler)
        .await?;

    client.start().await
}
