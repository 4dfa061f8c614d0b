//! Developer-only commands. Callers must be listed in `developers` in config.toml.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, handlers::notice},
        core::owner,
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;
    use tracing::warn;

    fn require_developer(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let author_id = ctx.author().id.to_string();
        if ctx.data().config.is_developer(&author_id) {
            Ok(())
        } else {
            warn!("{} tried to run /{} without permission", author_id, ctx.command().name);
            Err(Error::Unauthorized)
        }
    }

    /// Deletes the caller's account, words, listings, and discounts.
    #[poise::command(slash_command)]
    pub async fn debug_remove(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        require_developer(ctx)?;
        let data = ctx.data();
        let author_id = ctx.author().id.to_string();

        owner::require_owner(&data.database, &author_id).await?;
        {
            let _guard = data.locks.lock(&author_id).await;
            owner::delete_owner_cascade(&data.database, &author_id).await?;
        }
        data.refresh_registry().await?;

        notice::say_temporary(
            ctx,
            format!("✅ __{}__ 사용자를 삭제했습니다.", ctx.author().display_name()),
        )
        .await
    }

    /// Overwrites a user's balance.
    #[poise::command(slash_command)]
    pub async fn debug_set_money(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "설정할 소지금"] money: f64,
        #[description = "소지금을 설정할 사용자"] user: Option<serenity::User>,
    ) -> Result<()> {
        require_developer(ctx)?;
        let data = ctx.data();
        let user = user.as_ref().unwrap_or_else(|| ctx.author());
        let user_id = user.id.to_string();

        {
            let _guard = data.locks.lock(&user_id).await;
            owner::set_owner_balance(&data.database, &user_id, money).await?;
        }

        notice::say_temporary(
            ctx,
            format!(
                "✅ __{}__님의 소지금을 __{}__로 설정했습니다.",
                user.display_name(),
                data.config.format_money(money)
            ),
        )
        .await
    }
}

// Re-export all commands
pub use inner::*;
