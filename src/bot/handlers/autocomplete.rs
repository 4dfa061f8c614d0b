//! Autocomplete handlers for Discord slash command parameters.

use crate::{bot::BotData, errors::Error};

/// Discord's cap on autocomplete suggestions.
const MAX_SUGGESTIONS: usize = 25;

/// Suggests registered words containing the partial input.
///
/// Reads the in-memory registry snapshot, so it never touches the database.
pub async fn autocomplete_word(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let registry = ctx.data().registry().await;
    word_suggestions(registry.words().iter().map(|w| w.text.as_str()), partial)
}

/// Suggests words the caller owns that contain the partial input.
pub async fn autocomplete_owned_word(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let registry = ctx.data().registry().await;
    let author_id = ctx.author().id.to_string();
    word_suggestions(
        registry
            .words()
            .iter()
            .filter(|w| w.owner_id == author_id)
            .map(|w| w.text.as_str()),
        partial,
    )
}

fn word_suggestions<'a>(words: impl Iterator<Item = &'a str>, partial: &str) -> Vec<String> {
    let mut matching: Vec<String> = words
        .filter(|w| w.contains(partial))
        .map(str::to_string)
        .collect();
    matching.sort();
    matching.truncate(MAX_SUGGESTIONS);
    matching
}
