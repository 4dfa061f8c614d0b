//! Discord command implementations organized by category.

#![allow(clippy::too_long_first_doc_paragraph)]

/// Developer-only maintenance commands
pub mod admin;

/// General utility commands
pub mod general;

/// Market commands
pub mod market;

/// Account, remittance, log, and ranking commands
pub mod owner;

/// Word registration and management commands
pub mod word;

use crate::{bot::BotData, errors::Error};
use poise::serenity_prelude as serenity;

/// Embed colour for informational views.
pub const YELLOW: u32 = 0x00F1_C40F;
/// Embed colour for market views.
pub const AQUA: u32 = 0x001A_BC9C;

/// Every command the bot registers.
#[must_use]
pub fn all() -> Vec<poise::Command<BotData, Error>> {
    vec![
        general::ping(),
        general::help(),
        general::prices(),
        owner::money(),
        owner::newcomer(),
        owner::user(),
        owner::remit(),
        owner::log(),
        owner::rank(),
        word::register(),
        word::cancel(),
        word::word(),
        word::discount(),
        market::exhibit(),
        market::withhold(),
        market::market(),
        market::buy(),
        admin::debug_remove(),
        admin::debug_set_money(),
    ]
}

/// Best display name for a stored user id: guild nickname, then global name.
pub async fn display_name(ctx: poise::Context<'_, BotData, Error>, user_id: &str) -> String {
    let Ok(raw) = user_id.parse::<u64>() else {
        return format!("User {user_id}");
    };
    let user_id = serenity::UserId::new(raw);

    if let Some(guild_id) = ctx.guild_id() {
        if let Ok(member) = guild_id.member(ctx, user_id).await {
            return member.display_name().to_string();
        }
    }
    match user_id.to_user(ctx).await {
        Ok(user) => user.display_name().to_string(),
        Err(_) => format!("User {user_id}"),
    }
}
