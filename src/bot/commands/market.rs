//! Market Discord commands - exhibit, withhold, browse, and buy words.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{
            BotData,
            commands::{AQUA, display_name},
            handlers::{autocomplete, notice},
        },
        core::{
            market::{self, MarketSort},
            word as word_ops,
        },
        errors::{Error, Result},
    };
    use poise::{ChoiceParameter, serenity_prelude as serenity};

    /// Times `/buy` re-reads the seller after the word changed hands mid-purchase
    const PURCHASE_RETRIES: u32 = 2;

    #[derive(Debug, Clone, Copy, poise::ChoiceParameter)]
    pub enum SortChoice {
        #[name = "recent"]
        Recent,
        #[name = "price"]
        Price,
    }

    /// Puts one of your words on the market.
    #[poise::command(slash_command)]
    pub async fn exhibit(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "내놓을 단어"]
        #[autocomplete = "autocomplete::autocomplete_owned_word"]
        word: String,
        #[description = "판매 가격"] price: f64,
    ) -> Result<()> {
        let data = ctx.data();
        let author_id = ctx.author().id.to_string();
        market::exhibit_owned(&data.database, &author_id, &word, price).await?;

        notice::say_temporary(
            ctx,
            format!(
                "✅ __{word}__ 단어를 __{}__에 시장에 내놓았습니다.",
                data.config.format_money(price)
            ),
        )
        .await
    }

    /// Takes one of your words off the market.
    #[poise::command(slash_command)]
    pub async fn withhold(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "출품을 취소할 단어"]
        #[autocomplete = "autocomplete::autocomplete_owned_word"]
        word: String,
    ) -> Result<()> {
        let author_id = ctx.author().id.to_string();
        market::withhold_owned(&ctx.data().database, &author_id, &word).await?;

        notice::say_temporary(ctx, format!("✅ __{word}__ 단어 출품을 취소했습니다.")).await
    }

    /// Shows words on the market.
    #[poise::command(slash_command)]
    pub async fn market(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "정렬 방식 (기본: recent)"] sort: Option<SortChoice>,
    ) -> Result<()> {
        let sort = sort.unwrap_or(SortChoice::Recent);
        let order = match sort {
            SortChoice::Recent => MarketSort::Recent,
            SortChoice::Price => MarketSort::Price,
        };
        let data = ctx.data();
        let listed = market::browse(&data.database, order).await?;

        if listed.is_empty() {
            return notice::say_temporary(ctx, "⚠️ 시장에 내놓은 단어가 없습니다.").await;
        }

        let mut embed = serenity::CreateEmbed::default()
            .title("시장")
            .description(format!("정렬: {}", sort.name()))
            .color(AQUA);
        for entry in &listed {
            let owner_name = display_name(ctx, &entry.word.owner_id).await;
            embed = embed.field(
                format!(
                    "{} ({})",
                    entry.word.text,
                    data.config.format_money(entry.asking_price)
                ),
                format!(
                    "**판매가** {}\n**원가** {}\n**사용료** {}\n**현 소유자** {owner_name}",
                    data.config.format_money(entry.asking_price),
                    data.config.format_money(entry.word.price),
                    data.config
                        .format_money(word_ops::fee(&entry.word.text, entry.word.price)),
                ),
                true,
            );
        }

        notice::send_temporary(ctx, poise::CreateReply::default().embed(embed)).await
    }

    /// Buys a word from the market.
    #[poise::command(slash_command)]
    pub async fn buy(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "구매할 단어"]
        #[autocomplete = "autocomplete::autocomplete_word"]
        word: String,
    ) -> Result<()> {
        let data = ctx.data();
        let buyer_id = ctx.author().id.to_string();
        let mut retries = 0;
        let (bought, price) = loop {
            let seller_id = word_ops::require_word(&data.database, &word).await?.owner_id;
            let attempt = {
                let _guard = data.locks.lock_pair(&buyer_id, &seller_id).await;
                market::purchase(&data.database, &buyer_id, &seller_id, &word).await
            };
            match attempt {
                Err(Error::OwnerChanged { .. }) if retries < PURCHASE_RETRIES => retries += 1,
                other => break other?,
            }
        };
        data.refresh_registry().await?;

        notice::say_temporary(
            ctx,
            format!(
                "✅ __{}__ 단어를 __{}__에 구매했습니다.",
                bought.text,
                data.config.format_money(price)
            ),
        )
        .await
    }
}

// Re-export all commands
pub use inner::*;
