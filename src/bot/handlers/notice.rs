//! Replies that clean themselves up after `notice_ttl_secs`.

use crate::{
    bot::BotData,
    errors::{Error, Result},
};
use poise::serenity_prelude as serenity;
use std::{sync::Arc, time::Duration};
use tracing::debug;

/// Sends `reply` and schedules its deletion.
pub async fn send_temporary(
    ctx: poise::Context<'_, BotData, Error>,
    reply: poise::CreateReply,
) -> Result<()> {
    let handle = ctx.send(reply).await?;
    let message = handle.into_message().await?;
    schedule_delete(
        Arc::clone(&ctx.serenity_context().http),
        message.channel_id,
        message.id,
        Duration::from_secs(ctx.data().config.notice_ttl_secs),
    );
    Ok(())
}

/// Sends a plain text reply and schedules its deletion.
pub async fn say_temporary(
    ctx: poise::Context<'_, BotData, Error>,
    content: impl Into<String>,
) -> Result<()> {
    send_temporary(ctx, poise::CreateReply::default().content(content)).await
}

/// Deletes a message after `ttl` on a background task.
///
/// Failures are only logged; the message may already be gone.
pub fn schedule_delete(
    http: Arc<serenity::Http>,
    channel_id: serenity::ChannelId,
    message_id: serenity::MessageId,
    ttl: Duration,
) {
    tokio::spawn(async move {
        tokio::time::sleep(ttl).await;
        if let Err(e) = channel_id.delete_message(&http, message_id).await {
            debug!("Could not delete message {}: {}", message_id, e);
        }
    });
}
