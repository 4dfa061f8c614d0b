//! Owner Discord commands - accounts, remittance, the usage log, and rankings.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{
            BotData,
            commands::{YELLOW, display_name},
            handlers::notice,
        },
        core::{
            market, owner,
            ranking::{self, RANKING_LIMIT, RankingKind},
            usage_log::{self, LogFilter},
            word,
        },
        errors::{Error, Result},
    };
    use poise::{ChoiceParameter, serenity_prelude as serenity};
    use std::fmt::Write;

    /// Discord's limit for one embed field value.
    const FIELD_LIMIT: usize = 1024;
    /// Upper bound on `/log` entries so the embed stays within limits.
    const MAX_LOG_COUNT: u64 = 50;

    #[derive(Debug, Clone, Copy, poise::ChoiceParameter)]
    pub enum LogKind {
        #[name = "i_paid"]
        Paid,
        #[name = "i_got"]
        Received,
        #[name = "all"]
        All,
    }

    #[derive(Debug, Clone, Copy, poise::ChoiceParameter)]
    pub enum RankChoice {
        #[name = "money"]
        Money,
        #[name = "word"]
        Word,
        #[name = "property"]
        Property,
    }

    impl From<RankChoice> for RankingKind {
        fn from(choice: RankChoice) -> Self {
            match choice {
                RankChoice::Money => Self::Money,
                RankChoice::Word => Self::Word,
                RankChoice::Property => Self::Property,
            }
        }
    }

    /// Shows a user's balance and total property.
    #[poise::command(slash_command)]
    pub async fn money(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "소지금을 확인할 사용자"] user: Option<serenity::User>,
    ) -> Result<()> {
        let user = user.as_ref().unwrap_or_else(|| ctx.author());
        let user_id = user.id.to_string();
        let db = &ctx.data().database;
        let config = &ctx.data().config;

        let owner = owner::require_owner(db, &user_id).await?;
        let property = owner::owner_property(db, &user_id).await?;

        notice::say_temporary(
            ctx,
            format!(
                "✅ __{}__님의 소지금: __{}__, 총 자본: __{}__",
                user.display_name(),
                config.format_money(owner.balance),
                config.format_money(property)
            ),
        )
        .await
    }

    /// Registers the caller as a new user.
    #[poise::command(slash_command)]
    pub async fn newcomer(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let author = ctx.author();
        owner::create_owner(&ctx.data().database, &author.id.to_string()).await?;

        notice::say_temporary(
            ctx,
            format!("✅ 새로운 사용자 __{}__님을 추가했습니다.", author.display_name()),
        )
        .await
    }

    /// Shows a user's balance, property, and registered words.
    ///
    /// Words currently on the market are underlined.
    #[poise::command(slash_command)]
    pub async fn user(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "정보를 확인할 사용자"] user: Option<serenity::User>,
    ) -> Result<()> {
        let user = user.as_ref().unwrap_or_else(|| ctx.author());
        let user_id = user.id.to_string();
        let db = &ctx.data().database;
        let config = &ctx.data().config;

        let owner = owner::require_owner(db, &user_id).await?;
        let property = owner::owner_property(db, &user_id).await?;
        let words = word::words_by_owner(db, &user_id).await?;

        let mut entries = Vec::with_capacity(words.len());
        for w in &words {
            let entry = format!("{}({:.0})", w.text, w.price);
            if market::listing_by_word(db, w.id).await?.is_some() {
                entries.push(format!("__{entry}__"));
            } else {
                entries.push(entry);
            }
        }

        let mut embed = serenity::CreateEmbed::default()
            .title(format!("{}님의 정보", user.display_name()))
            .color(YELLOW)
            .field("소지금", config.format_money(owner.balance), true)
            .field("등록한 단어 수", format!("{}개", words.len()), true)
            .field("총자본", config.format_money(property), true);
        for (i, chunk) in chunk_list(&entries, FIELD_LIMIT).into_iter().enumerate() {
            embed = embed.field(format!("등록된 단어 목록 {}", i + 1), chunk, false);
        }

        notice::send_temporary(
            ctx,
            poise::CreateReply::default()
                .content(format!("✅ __{}__님의 정보", user.display_name()))
                .embed(embed),
        )
        .await
    }

    /// Sends money to another user.
    #[poise::command(slash_command)]
    pub async fn remit(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "송금할 사람"] to: serenity::User,
        #[description = "송금할 금액"] amount: f64,
    ) -> Result<()> {
        let data = ctx.data();
        let from_id = ctx.author().id.to_string();
        let to_id = to.id.to_string();

        let _guard = data.locks.lock_pair(&from_id, &to_id).await;
        owner::remit(&data.database, &from_id, &to_id, amount).await?;

        notice::say_temporary(
            ctx,
            format!(
                "✅ __{}__님에게 __{}__을(를) 송금했습니다.",
                to.display_name(),
                data.config.format_money(amount)
            ),
        )
        .await
    }

    /// Shows recent word uses.
    #[poise::command(slash_command)]
    pub async fn log(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "기록의 종류 (기본: all)"] kind: Option<LogKind>,
        #[description = "기록의 개수 (기본: 10)"] count: Option<u64>,
    ) -> Result<()> {
        let count = count.unwrap_or(10);
        if count == 0 || count > MAX_LOG_COUNT {
            #[allow(clippy::cast_precision_loss)]
            return Err(Error::InvalidAmount {
                amount: count as f64,
            });
        }

        let kind = kind.unwrap_or(LogKind::All);
        let author_id = ctx.author().id.to_string();
        let filter = match kind {
            LogKind::Paid => LogFilter::Paid(author_id),
            LogKind::Received => LogFilter::Received(author_id),
            LogKind::All => LogFilter::All,
        };

        let db = &ctx.data().database;
        let config = &ctx.data().config;
        let entries = usage_log::query_usage_log(db, &filter, count).await?;

        let mut lines = String::new();
        for (i, entry) in entries.iter().enumerate() {
            let text = word::word_by_id(db, entry.word_id)
                .await?
                .map_or_else(|| "(삭제된 단어)".to_string(), |w| w.text);
            let name = display_name(ctx, &entry.user_id).await;
            writeln!(
                &mut lines,
                "{}. {}, {}: {} ({})",
                i + 1,
                entry.used_at.format("%Y-%m-%d %H:%M:%S"),
                name,
                text,
                config.format_money(entry.amount)
            )?;
        }
        if lines.is_empty() {
            lines.push_str("기록이 없습니다.");
        }

        let embed = serenity::CreateEmbed::default()
            .title("기록")
            .description(lines)
            .color(YELLOW);
        notice::send_temporary(
            ctx,
            poise::CreateReply::default()
                .content(format!("✅ `{}` 기록을 가져왔습니다.", kind.name()))
                .embed(embed),
        )
        .await
    }

    /// Shows the top users or words.
    #[poise::command(slash_command)]
    pub async fn rank(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "랭킹을 확인할 종류"] kind: RankChoice,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let config = &ctx.data().config;

        let mut lines = Vec::new();
        match RankingKind::from(kind) {
            RankingKind::Money => {
                for (i, owner) in ranking::by_money(db, RANKING_LIMIT).await?.iter().enumerate() {
                    let name = display_name(ctx, &owner.id).await;
                    lines.push(format!(
                        "{}. {} ({})",
                        i + 1,
                        name,
                        config.format_money(owner.balance)
                    ));
                }
            }
            RankingKind::Word => {
                for (i, entry) in ranking::by_word(db, RANKING_LIMIT).await?.iter().enumerate() {
                    let name = display_name(ctx, &entry.word.owner_id).await;
                    lines.push(format!(
                        "{}. {} ({}, {} / {})",
                        i + 1,
                        entry.word.text,
                        name,
                        config.format_money(entry.proceeds),
                        config.format_money(entry.fee)
                    ));
                }
            }
            RankingKind::Property => {
                for (i, entry) in ranking::by_property(db, RANKING_LIMIT).await?.iter().enumerate()
                {
                    let name = display_name(ctx, &entry.owner.id).await;
                    lines.push(format!(
                        "{}. {} ({})",
                        i + 1,
                        name,
                        config.format_money(entry.property)
                    ));
                }
            }
        }

        if lines.is_empty() {
            return notice::say_temporary(
                ctx,
                format!("⚠️ __{}__ 랭킹을 확인할 수 없습니다. 아직 사용자 또는 단어가 없습니다.", kind.name()),
            )
            .await;
        }

        let embed = serenity::CreateEmbed::default()
            .title(format!("__{}__ 랭킹", kind.name()))
            .color(YELLOW)
            .field("순위", lines.join("\n"), false);
        notice::send_temporary(
            ctx,
            poise::CreateReply::default()
                .content(format!("✅ __{}__ 랭킹을 불러왔습니다!", kind.name()))
                .embed(embed),
        )
        .await
    }

    /// Joins `items` with ", " into chunks no longer than `limit` characters.
    pub(crate) fn chunk_list(items: &[String], limit: usize) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut current = String::new();
        for item in items {
            let needed = if current.is_empty() { 0 } else { 2 } + item.chars().count();
            if !current.is_empty() && current.chars().count() + needed > limit {
                chunks.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push_str(", ");
            }
            current.push_str(item);
        }
        if !current.is_empty() {
            chunks.push(current);
        }
        chunks
    }
}

// Re-export all commands
pub use inner::*;

#[cfg(test)]
mod tests {
    use super::inner::chunk_list;

    #[test]
    fn test_chunk_list_respects_limit() {
        let items: Vec<String> = ["가나", "다라", "마바"].iter().map(ToString::to_string).collect();

        assert_eq!(chunk_list(&items, 100), vec!["가나, 다라, 마바".to_string()]);
        assert_eq!(
            chunk_list(&items, 6),
            vec!["가나, 다라".to_string(), "마바".to_string()]
        );
        assert!(chunk_list(&[], 10).is_empty());
    }
}
