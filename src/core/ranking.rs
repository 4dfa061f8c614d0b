//! Leaderboards by balance, by property, and by word earnings.
//!
//! Aggregation happens in Rust over full table reads; the tables are small and
//! this keeps the queries portable.

use crate::{
    core::{settlement::TOLL_PREMIUM, usage_log, word as word_ops},
    entities::{Owner, owner, word},
    errors::Result,
};
use sea_orm::{QueryOrder, QuerySelect, prelude::*};
use std::collections::HashMap;

/// Default leaderboard length.
pub const RANKING_LIMIT: u64 = 10;

/// Which leaderboard to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankingKind {
    /// Richest by balance
    Money,
    /// Highest-earning words
    Word,
    /// Richest by balance plus word holdings
    Property,
}

/// An owner and their total property.
#[derive(Debug, Clone)]
pub struct PropertyRanking {
    /// The owner
    pub owner: owner::Model,
    /// Balance plus registration prices of owned words
    pub property: f64,
}

/// A word and what it has earned.
#[derive(Debug, Clone)]
pub struct WordRanking {
    /// The word
    pub word: word::Model,
    /// Current base fee per use
    pub fee: f64,
    /// Total credited to owners from logged uses
    pub proceeds: f64,
}

/// Owners ordered by balance, richest first.
pub async fn by_money<C>(db: &C, limit: u64) -> Result<Vec<owner::Model>>
where
    C: ConnectionTrait,
{
    Owner::find()
        .order_by_desc(owner::Column::Balance)
        .limit(limit)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Owners ordered by property, richest first.
pub async fn by_property<C>(db: &C, limit: u64) -> Result<Vec<PropertyRanking>>
where
    C: ConnectionTrait,
{
    let mut holdings: HashMap<String, f64> = HashMap::new();
    for word in word_ops::all_words(db).await? {
        *holdings.entry(word.owner_id).or_default() += word.price;
    }

    let mut ranking: Vec<PropertyRanking> = Owner::find()
        .all(db)
        .await?
        .into_iter()
        .map(|owner| {
            let property = owner.balance + holdings.get(&owner.id).copied().unwrap_or(0.0);
            PropertyRanking { owner, property }
        })
        .collect();

    ranking.sort_by(|a, b| b.property.total_cmp(&a.property));
    ranking.truncate(usize::try_from(limit)?);
    Ok(ranking)
}

/// Live words ordered by total proceeds, highest first.
pub async fn by_word<C>(db: &C, limit: u64) -> Result<Vec<WordRanking>>
where
    C: ConnectionTrait,
{
    let words = word_ops::all_words(db).await?;
    let ids: Vec<i64> = words.iter().map(|w| w.id).collect();

    let mut proceeds: HashMap<i64, f64> = HashMap::new();
    for entry in usage_log::uses_of_words(db, ids).await? {
        *proceeds.entry(entry.word_id).or_default() += entry.amount * TOLL_PREMIUM;
    }

    let mut ranking: Vec<WordRanking> = words
        .into_iter()
        .map(|word| {
            let earned = proceeds.get(&word.id).copied().unwrap_or(0.0);
            WordRanking {
                fee: word_ops::fee(&word.text, word.price),
                proceeds: earned,
                word,
            }
        })
        .collect();

    ranking.sort_by(|a, b| b.proceeds.total_cmp(&a.proceeds));
    ranking.truncate(usize::try_from(limit)?);
    Ok(ranking)
}
