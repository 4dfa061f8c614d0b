//! Usage log - append-only record of every charged or exempted word use.

use crate::{
    entities::{Word, WordUse, word, word_use},
    errors::Result,
};
use sea_orm::{QueryOrder, QuerySelect, Set, prelude::*};

/// Which part of the log to read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogFilter {
    /// Uses where this user was the speaker
    Paid(String),
    /// Uses of words currently owned by this user
    Received(String),
    /// Every use
    All,
}

/// Appends one entry for `user_id` using `word_id`.
pub async fn append_usage_log<C>(
    db: &C,
    user_id: &str,
    word_id: i64,
    amount: f64,
) -> Result<word_use::Model>
where
    C: ConnectionTrait,
{
    let entry = word_use::ActiveModel {
        used_at: Set(chrono::Utc::now()),
        user_id: Set(user_id.to_string()),
        word_id: Set(word_id),
        amount: Set(amount),
        ..Default::default()
    };
    entry.insert(db).await.map_err(Into::into)
}

/// The newest `limit` entries matching `filter`.
pub async fn query_usage_log<C>(
    db: &C,
    filter: &LogFilter,
    limit: u64,
) -> Result<Vec<word_use::Model>>
where
    C: ConnectionTrait,
{
    let query = WordUse::find()
        .order_by_desc(word_use::Column::UsedAt)
        .order_by_desc(word_use::Column::Id)
        .limit(limit);

    let query = match filter {
        LogFilter::Paid(user_id) => query.filter(word_use::Column::UserId.eq(user_id.as_str())),
        LogFilter::Received(owner_id) => {
            let owned: Vec<i64> = Word::find()
                .filter(word::Column::OwnerId.eq(owner_id.as_str()))
                .all(db)
                .await?
                .into_iter()
                .map(|w| w.id)
                .collect();
            query.filter(word_use::Column::WordId.is_in(owned))
        }
        LogFilter::All => query,
    };

    query.all(db).await.map_err(Into::into)
}

/// Every entry for the given words, oldest first.
pub async fn uses_of_words<C>(db: &C, word_ids: Vec<i64>) -> Result<Vec<word_use::Model>>
where
    C: ConnectionTrait,
{
    WordUse::find()
        .filter(word_use::Column::WordId.is_in(word_ids))
        .order_by_asc(word_use::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}
