use dotenvy::dotenv;
use std::env;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use word_toll::{
    bot::{self, BotData},
    config::{database, game},
    core::registry::Registry,
    errors::{Error, Result},
};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Environment variables may also be set externally
    dotenv().ok();

    let config = game::load_default_config().unwrap_or_else(|e| {
        warn!("{}; using default game settings", e);
        game::GameConfig::default()
    });

    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|_| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to initialize database: {}", e))?;

    let registry = Registry::load(&db).await?;
    info!("Loaded {} registered words", registry.len());

    let token = env::var("DISCORD_BOT_TOKEN")
        .inspect_err(|e| error!("DISCORD_BOT_TOKEN not found: {}", e))
        .map_err(Error::EnvVar)?;

    bot::run_bot(token, BotData::new(db, config, registry)).await
}
