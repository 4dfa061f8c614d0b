//! Word Discord commands - register, cancel, inspect, and discount words.
//!
//! Every command that changes a word refreshes the registry snapshot before
//! replying, so the next message is scanned against the new state.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{
            BotData,
            commands::{YELLOW, display_name},
            handlers::{autocomplete, notice},
        },
        config::game::GameConfig,
        core::{market, word as word_ops},
        entities::word as word_entity,
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;

    /// Registers a new word at the given price. The price cannot be changed later.
    #[poise::command(slash_command)]
    pub async fn register(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "등록 가격 (나중에 변경할 수 없음)"] price: f64,
        #[description = "등록할 단어"] word: String,
    ) -> Result<()> {
        let data = ctx.data();
        let author_id = ctx.author().id.to_string();

        let registered = {
            let _guard = data.locks.lock(&author_id).await;
            word_ops::register_word(&data.database, &author_id, &word, price).await?
        };
        data.refresh_registry().await?;

        let embed = word_embed(ctx, &data.config, &registered).await?;
        notice::send_temporary(
            ctx,
            poise::CreateReply::default()
                .content(format!("✅ __{}__ 단어를 등록했습니다.", registered.text))
                .embed(embed),
        )
        .await
    }

    /// Cancels a registered word. 10% of the price is kept as a fee.
    #[poise::command(slash_command)]
    pub async fn cancel(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "취소할 단어"]
        #[autocomplete = "autocomplete::autocomplete_owned_word"]
        word: String,
    ) -> Result<()> {
        let data = ctx.data();
        let author_id = ctx.author().id.to_string();

        let refund = {
            let _guard = data.locks.lock(&author_id).await;
            word_ops::cancel_word(&data.database, &author_id, &word).await?
        };
        data.refresh_registry().await?;

        notice::say_temporary(
            ctx,
            format!(
                "✅ __{word}__ 단어를 삭제하고 __{}__을(를) 돌려받았습니다.",
                data.config.format_money(refund)
            ),
        )
        .await
    }

    /// Shows a word's fee, price, owner, discounts, and market status.
    #[poise::command(slash_command)]
    pub async fn word(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "정보를 확인할 단어"]
        #[autocomplete = "autocomplete::autocomplete_word"]
        word: String,
    ) -> Result<()> {
        let data = ctx.data();
        let found = word_ops::require_word(&data.database, &word).await?;
        let on_sale = market::listing_by_word(&data.database, found.id)
            .await?
            .is_some();

        let embed = word_embed(ctx, &data.config, &found).await?.field(
            "판매중",
            if on_sale { "⭕ 구매 가능" } else { "❌ 구매 불가능" },
            true,
        );
        notice::send_temporary(
            ctx,
            poise::CreateReply::default()
                .content(format!("✅ __{}__ 단어 정보를 불러왔습니다!", found.text))
                .embed(embed),
        )
        .await
    }

    /// Gives a user a discount on one of your words. 0 cancels the discount.
    #[poise::command(slash_command)]
    pub async fn discount(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "할인을 적용할 사용자"] user: serenity::User,
        #[description = "할인을 적용할 단어"]
        #[autocomplete = "autocomplete::autocomplete_owned_word"]
        word: String,
        #[description = "할인율 (0 ~ 100, 100이면 전액 할인, 0이면 할인 취소)"] percent: f64,
    ) -> Result<()> {
        let data = ctx.data();
        let author_id = ctx.author().id.to_string();

        let rate = word_ops::set_discount(
            &data.database,
            &author_id,
            &word,
            &user.id.to_string(),
            percent,
        )
        .await?;
        data.refresh_registry().await?;

        let content = if rate < 1.0 {
            format!(
                "✅ __{}__님에게 __{word}__ 단어를 __{percent}%__ 할인으로 적용했습니다.",
                user.display_name()
            )
        } else {
            format!(
                "✅ __{}__님에게 __{word}__ 단어의 할인을 취소했습니다.",
                user.display_name()
            )
        };
        notice::say_temporary(ctx, content).await
    }

    async fn word_embed(
        ctx: poise::Context<'_, BotData, Error>,
        config: &GameConfig,
        word: &word_entity::Model,
    ) -> Result<serenity::CreateEmbed> {
        let owner_name = display_name(ctx, &word.owner_id).await;
        let mut embed = serenity::CreateEmbed::default()
            .title(format!("__{}__ 단어 정보", word.text))
            .color(YELLOW)
            .field(
                "사용료",
                format!(
                    "__**{}**__",
                    config.format_money(word_ops::fee(&word.text, word.price))
                ),
                false,
            )
            .field("가격", config.format_money(word.price), true)
            .field("소유자", owner_name, true);

        let preferences = word_ops::preferences_for_word(&ctx.data().database, word.id).await?;
        if !preferences.is_empty() {
            let mut lines = Vec::with_capacity(preferences.len());
            for pref in &preferences {
                let name = display_name(ctx, &pref.owner_id).await;
                lines.push(format!("- {name}: {:.2}%", (1.0 - pref.rate) * 100.0));
            }
            embed = embed.field("할인", lines.join("\n"), false);
        }
        Ok(embed)
    }
}

// Re-export all commands
pub use inner::*;
