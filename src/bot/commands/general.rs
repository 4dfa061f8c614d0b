//! General Discord commands - ping, help, and the price table.
//! These commands don't touch the database.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, handlers::notice},
        core::word::{break_even_uses, price_rate},
        errors::{Error, Result},
    };
    use std::fmt::Write;

    /// Responds with "Pong!" to test bot connectivity.
    #[poise::command(slash_command, prefix_command)]
    pub async fn ping(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.say("Pong!").await?;
        Ok(())
    }

    /// Displays help information about available commands.
    #[poise::command(slash_command, prefix_command)]
    pub async fn help(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let currency = &ctx.data().config.currency_name;
        let help_text = format!(
            "**단어 통행료 도움말**\n\
            등록된 단어를 메시지에 쓰면 단어 주인에게 사용료를 냅니다. \
            낸 금액의 110%가 주인에게 들어가고, 한글을 입력하면 타수만큼 {currency}을(를) 받습니다.\n\n\
            **사용자**\n\
            • `/newcomer` - 사용자로 등록합니다.\n\
            • `/money [user]` - 소지금과 총자본을 확인합니다.\n\
            • `/user [user]` - 사용자 정보를 확인합니다.\n\
            • `/remit <to> <amount>` - 송금합니다.\n\
            • `/log [kind] [count]` - 단어 사용 기록을 확인합니다.\n\
            • `/rank <kind>` - 랭킹을 확인합니다.\n\n\
            **단어**\n\
            • `/register <price> <word>` - 단어를 등록합니다.\n\
            • `/cancel <word>` - 등록을 취소하고 90%를 돌려받습니다.\n\
            • `/word <word>` - 단어 정보를 확인합니다.\n\
            • `/discount <user> <word> <percent>` - 할인을 적용합니다.\n\
            • `/prices` - 길이별 사용료 비율을 확인합니다.\n\n\
            **시장**\n\
            • `/exhibit <word> <price>` - 단어를 시장에 내놓습니다.\n\
            • `/withhold <word>` - 출품을 취소합니다.\n\
            • `/market [sort]` - 시장을 확인합니다.\n\
            • `/buy <word>` - 단어를 구매합니다."
        );

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Shows the fee rate and break-even use count for each word length.
    #[poise::command(slash_command)]
    pub async fn prices(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let mut content = String::from(
            "✅ 단어의 사용료는 길이에 따라 다르며, 길이가 짧은 단어는 사용료가 낮아집니다.\n",
        );
        for length in 1..=10 {
            writeln!(
                &mut content,
                "> 길이가 {length}글자인 단어는 등록 가격의 {:.2}%로, 약 {}회 사용할 때 본전을 찾을 수 있습니다.",
                price_rate(length) * 100.0,
                break_even_uses(length)
            )?;
        }

        notice::say_temporary(ctx, content).await
    }
}

// Re-export all commands
pub use inner::*;
