/// Database configuration and connection management
pub mod database;

/// Game settings loaded from config.toml
pub mod game;
