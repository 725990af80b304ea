use anyhow::Result;
use dotenvy::dotenv;
use log::{error, info};
use serenity::async_trait;
use serenity::http::Http;
use serenity::model::channel::{Message, Reaction};
use serenity::model::gateway::{Activity, Ready};
use serenity::prelude::*;
use std::sync::Arc;

use bepis::core::Config;
use bepis::features::{
    BooruHandler, ChatbotHandler, ChooseHandler, LinuxHandler, RandomReactions, ReminderService,
    ReminderStore, ResponseConfig, WaifuHandler,
};
use bepis::triggers::{Dispatcher, TriggerHandler, TriggerKind, TriggerRegistry};

struct Handler {
    dispatcher: Dispatcher,
    random_reactions: Option<RandomReactions>,
}

#[async_trait]
impl EventHandler for Handler {
    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot {
            return;
        }

        if let Some(reactions) = &self.random_reactions {
            reactions.maybe_react(&ctx, &msg).await;
        }

        self.dispatcher.handle_message(&ctx, &msg).await;
    }

    async fn reaction_add(&self, _ctx: Context, _reaction: Reaction) {
        // Reaction events are received but nothing dispatches on them yet
    }

    async fn ready(&self, ctx: Context, ready: Ready) {
        ctx.set_activity(Activity::playing("Bepis")).await;

        info!("🎉 {} is connected and ready!", ready.user.name);
        info!("📡 Connected to {} guilds", ready.guilds.len());
        info!(
            "🔗 Invite link: https://discordapp.com/oauth2/authorize?client_id={}&scope=bot&permissions=2048",
            ready.user.id
        );
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    let config = Config::from_env()?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    info!("Starting Bepis Discord Bot...");

    // A standalone HTTP client: used up front to learn the bot's own id
    // (the chatbot relay registers under the mention tokens) and later by
    // the reminder delivery task.
    let http = Arc::new(Http::new(&config.discord_token));
    let bot_user = http.get_current_user().await.map_err(|e| {
        error!("Failed to fetch bot identity: {e}");
        error!("This could indicate:");
        error!("  - Invalid bot token format");
        error!("  - Network issues reaching Discord API");
        anyhow::anyhow!("Identity lookup failed: {}", e)
    })?;
    info!("Authenticated as {} ({})", bot_user.name, bot_user.id);

    let mut registry = TriggerRegistry::new();

    // Canned responses from the YAML trigger table
    match ResponseConfig::load(&config.triggers_config_path) {
        Ok(table) => {
            info!(
                "📄 Loaded {} canned response(s) from {}",
                table.responses.len(),
                config.triggers_config_path
            );
            table.register_into(&mut registry);
        }
        Err(e) => {
            if std::path::Path::new(&config.triggers_config_path).exists() {
                error!(
                    "❌ Failed to load trigger table from {}: {e}",
                    config.triggers_config_path
                );
            } else {
                info!(
                    "📄 No trigger table at {} - canned responses disabled",
                    config.triggers_config_path
                );
            }
        }
    }

    // Built-in handlers
    registry.register(TriggerKind::FirstWord, "choose", Arc::new(ChooseHandler));
    registry.register(TriggerKind::Contains, "linux", Arc::new(LinuxHandler));
    registry.register(TriggerKind::FirstWord, "waifu", Arc::new(WaifuHandler::new()?));

    let booru_credentials = config
        .danbooru_username
        .clone()
        .zip(config.danbooru_api_key.clone());
    if booru_credentials.is_some() {
        info!("🔑 Danbooru account configured, multi-tag search enabled");
    }
    let booru: Arc<dyn TriggerHandler> = Arc::new(BooruHandler::new(booru_credentials)?);
    registry.register(TriggerKind::FirstWord, "danr", Arc::clone(&booru));
    registry.register(TriggerKind::FirstWord, "spam", booru);

    // Chatbot relay answers to the bot's own mention
    if let Some(api_key) = config.cleverbot_api_key.clone() {
        let chatbot: Arc<dyn TriggerHandler> = Arc::new(ChatbotHandler::new(api_key)?);
        registry.register(
            TriggerKind::FirstWord,
            format!("<@{}>", bot_user.id.0),
            Arc::clone(&chatbot),
        );
        registry.register(
            TriggerKind::FirstWord,
            format!("<@!{}>", bot_user.id.0),
            chatbot,
        );
        info!("🤖 Chatbot relay enabled");
    } else {
        info!("🤖 No chatbot API key - relay disabled");
    }

    // Reminder subsystem: load the snapshot (corruption is fatal here,
    // silently dropping scheduled reminders is worse than not starting),
    // then run the engine thread and delivery task.
    if config.remind_enabled {
        let store = ReminderStore::at_default_path()?;
        let service = ReminderService::start(store, Arc::clone(&http), config.remind_save_ticks)?;
        info!(
            "⏰ Reminder engine started with {} pending reminder(s)",
            service.pending()
        );
        registry.register(TriggerKind::FirstWord, "remind", service.handler());
    } else {
        info!("⏰ Reminder subsystem disabled by configuration");
    }

    let dispatcher = Dispatcher::new(registry);
    info!("{} trigger word(s) registered", dispatcher.trigger_count());

    let random_reactions = if config.random_reactions {
        info!(
            "🎲 Random reactions enabled at frequency {}",
            config.reaction_frequency
        );
        Some(RandomReactions::new(
            config.reaction_frequency,
            config.random_reaction_values.clone(),
        ))
    } else {
        None
    };

    let handler = Handler {
        dispatcher,
        random_reactions,
    };

    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::GUILD_MESSAGE_REACTIONS
        | GatewayIntents::MESSAGE_CONTENT;

    // Build the Discord client with proper gateway configuration
    let mut client = Client::builder(&config.discord_token, intents)
        .event_handler(handler)
        .await
        .map_err(|e| {
            error!("Failed to create Discord client: {e}");
            error!("This could indicate:");
            error!("  - Invalid bot token format");
            error!("  - Network issues reaching Discord API");
            error!("  - Insufficient permissions");
            anyhow::anyhow!("Client creation failed: {}", e)
        })?;

    info!("Bot configured successfully. Connecting to Discord gateway...");
    info!("Gateway intents: {intents:?}");

    if let Err(why) = client.start().await {
        error!("Gateway connection failed: {why:?}");
        error!("This could be due to:");
        error!("  - Invalid bot token");
        error!("  - Network connectivity issues");
        error!("  - Discord API outage");
        error!("  - Missing required permissions");
        return Err(anyhow::anyhow!(
            "Failed to establish gateway connection: {}",
            why
        ));
    }

    Ok(())
}
