//! Inbound message handler - settles tolls and replaces blocked messages.

use crate::{
    bot::BotData,
    core::settlement::{self, SettlementOutcome},
    errors::Error,
};
use poise::serenity_prelude as serenity;
use tracing::{error, warn};

/// Settles one guild message.
///
/// Bots are ignored. When the author runs out of money the original message is
/// deleted and a notice with the redacted text is posted in its place; the two
/// requests run concurrently and a failure of one does not undo the other.
pub async fn on_message(ctx: &serenity::Context, message: &serenity::Message, data: &BotData) {
    if message.author.bot || message.content.is_empty() {
        return;
    }

    let author_id = message.author.id.to_string();
    let registry = data.registry().await;

    let outcome = match settlement::handle_message(
        &data.database,
        &registry,
        &data.locks,
        Some(&author_id),
        &message.content,
    )
    .await
    {
        Ok(outcome) => outcome,
        Err(e @ Error::InvariantViolation { .. }) => {
            error!("Settlement of message {} stopped: {}", message.id, e);
            return;
        }
        Err(e) => {
            error!("Failed to settle message {}: {}", message.id, e);
            return;
        }
    };

    if let SettlementOutcome {
        blocked: true,
        redacted_text: Some(redacted),
        ..
    } = outcome
    {
        replace_blocked(ctx, message, &redacted).await;
    }
}

/// Longest message Discord accepts, in characters
const MESSAGE_LIMIT: usize = 2000;

/// Builds the notice posted in place of a blocked message, cut to fit one message.
fn blocked_notice(name: &str, redacted: &str) -> String {
    let mut notice = format!("⚠️ __{name}__님의 소지금이 부족하여 메시지의 일부가 수정되었습니다.");
    for line in redacted.lines() {
        notice.push_str("\n> ");
        notice.push_str(line);
    }

    if notice.chars().count() <= MESSAGE_LIMIT {
        return notice;
    }
    let mut cut: String = notice.chars().take(MESSAGE_LIMIT - 1).collect();
    cut.push('…');
    cut
}

async fn replace_blocked(ctx: &serenity::Context, message: &serenity::Message, redacted: &str) {
    let name = message
        .author_nick(ctx)
        .await
        .unwrap_or_else(|| message.author.display_name().to_string());
    let notice = blocked_notice(&name, redacted);

    let (sent, deleted) = tokio::join!(
        message.channel_id.say(&ctx.http, notice),
        message.delete(ctx),
    );
    if let Err(e) = sent {
        warn!("Failed to post redacted copy of {}: {}", message.id, e);
    }
    if let Err(e) = deleted {
        warn!("Failed to delete blocked message {}: {}", message.id, e);
    }
}
