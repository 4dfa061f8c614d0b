//! Bot layer - Discord-specific interface and command handlers
//!
//! This module wires the core economy into poise: shared state, slash commands,
//! the message handler that settles tolls, and framework-level error reporting.

/// Discord command implementations (owner, word, market, general, admin)
pub mod commands;
/// Discord event and interaction handlers (messages, autocomplete, notices)
pub mod handlers;

use crate::{
    config::game::GameConfig,
    core::{locks::OwnerLocks, registry::Registry},
    errors::{Error, Result},
};
use poise::serenity_prelude as serenity;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info, instrument, warn};

/// Shared data available to all bot commands and event handlers.
pub struct BotData {
    /// Database connection for all database operations
    pub database: DatabaseConnection,
    /// Per-owner locks serializing balance checks and debits
    pub locks: OwnerLocks,
    /// Game settings from config.toml
    pub config: Arc<GameConfig>,
    registry: RwLock<Arc<Registry>>,
}

impl BotData {
    /// Creates the shared state with an initial registry snapshot.
    #[must_use]
    pub fn new(database: DatabaseConnection, config: GameConfig, registry: Registry) -> Self {
        Self {
            database,
            locks: OwnerLocks::new(),
            config: Arc::new(config),
            registry: RwLock::new(Arc::new(registry)),
        }
    }

    /// The current registry snapshot.
    ///
    /// The snapshot is immutable; holders keep scanning the old one while a refresh
    /// swaps in a new one.
    pub async fn registry(&self) -> Arc<Registry> {
        Arc::clone(&*self.registry.read().await)
    }

    /// Reloads the registry from the database and swaps it in.
    pub async fn refresh_registry(&self) -> Result<()> {
        let fresh = Registry::load(&self.database).await?;
        *self.registry.write().await = Arc::new(fresh);
        Ok(())
    }
}

async fn on_error(error: poise::FrameworkError<'_, BotData, Error>) {
    match error {
        poise::FrameworkError::Setup { error, .. } => {
            error!("Failed to start bot: {:?}", error);
        }
        poise::FrameworkError::Command { error, ctx, .. } if error.is_rejection() => {
            if let Err(e) = handlers::notice::say_temporary(ctx, format!("⚠️ {error}")).await {
                error!("Failed to send rejection message: {}", e);
            }
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            error!("Error in command `{}`: {:?}", ctx.command().name, error);
            if let Err(e) = ctx.say("⚠️ 요청을 처리하는 중 오류가 발생했습니다.").await {
                error!("Failed to send error message: {}", e);
            }
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                error!("Error while handling error: {}", e);
            }
        }
    }
}

async fn event_handler(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, BotData, Error>,
    data: &BotData,
) -> Result<()> {
    if let serenity::FullEvent::Message { new_message } = event {
        handlers::message::on_message(ctx, new_message, data).await;
    }
    Ok(())
}

/// Builds the poise framework and runs the client until it stops.
#[instrument(skip(token, data))]
pub async fn run_bot(token: String, data: BotData) -> Result<()> {
    let guild_ids = data.config.guild_ids.clone();

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: commands::all(),
            on_error: |error| Box::pin(on_error(error)),
            event_handler: |ctx, event, framework, data| {
                Box::pin(event_handler(ctx, event, framework, data))
            },
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                info!("Logged in as {}", ready.user.name);
                if guild_ids.is_empty() {
                    info!("Registering commands globally...");
                    poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                } else {
                    for guild_id in guild_ids {
                        let guild_id = serenity::GuildId::new(guild_id);
                        poise::builtins::register_in_guild(
                            ctx,
                            &framework.options().commands,
                            guild_id,
                        )
                        .await?;
                        info!("Registered commands in guild {}", guild_id);
                    }
                }
                Ok(data)
            })
        })
        .build();

    let intents = serenity::GatewayIntents::GUILDS
        | serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::MESSAGE_CONTENT;

    info!("Setting up Serenity client for Poise framework...");
    let mut client = serenity::Client::builder(&token, intents)
        .framework(framework)
        .await
        .inspect_err(|e| error!("Error creating client: {:?}", e))?;

    info!("Starting bot client...");
    client
        .start()
        .await
        .inspect_err(|e| warn!("Client stopped with error: {:?}", e))?;
    Ok(())
}

pub use commands::*;
pub use handlers::*;
