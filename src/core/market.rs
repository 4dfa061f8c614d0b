//! Market business logic - listing, withholding, and buying words.
//!
//! [`exhibit`], [`withhold`], and [`buy`] never move money. Purchases that
//! settle balances go through [`purchase`], which wraps [`buy`] together with the
//! buyer/seller transfer in one database transaction.

use crate::{
    core::{owner, word as word_ops},
    entities::{Listing, Word, listing, word},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, QuerySelect, Set, TransactionTrait, prelude::*};
use tracing::info;

/// Number of listings shown when browsing the market.
pub const BROWSE_LIMIT: u64 = 10;

/// A listing joined with the word it sells.
#[derive(Debug, Clone)]
pub struct ListedWord {
    /// The word on sale
    pub word: word::Model,
    /// Asking price
    pub asking_price: f64,
}

/// Sort order for [`browse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarketSort {
    /// Most recently listed first
    Recent,
    /// Most expensive first
    Price,
}

/// Finds the listing for a word, if it is on sale.
pub async fn listing_by_word<C>(db: &C, word_id: i64) -> Result<Option<listing::Model>>
where
    C: ConnectionTrait,
{
    Listing::find_by_id(word_id).one(db).await.map_err(Into::into)
}

/// Inserts a listing row.
pub async fn create_listing<C>(db: &C, word_id: i64, price: f64) -> Result<listing::Model>
where
    C: ConnectionTrait,
{
    let model = listing::ActiveModel {
        word_id: Set(word_id),
        price: Set(price),
        listed_at: Set(chrono::Utc::now()),
    };
    model.insert(db).await.map_err(Into::into)
}

/// Deletes the listing for a word. Deleting a missing listing is not an error.
pub async fn delete_listing<C>(db: &C, word_id: i64) -> Result<()>
where
    C: ConnectionTrait,
{
    Listing::delete_by_id(word_id).exec(db).await?;
    Ok(())
}

/// Puts a word on the market at `price`.
pub async fn exhibit<C>(db: &C, word: &word::Model, price: f64) -> Result<listing::Model>
where
    C: ConnectionTrait,
{
    if !price.is_finite() || price <= 0.0 {
        return Err(Error::InvalidAmount { amount: price });
    }
    if listing_by_word(db, word.id).await?.is_some() {
        return Err(Error::AlreadyListed {
            text: word.text.clone(),
        });
    }
    create_listing(db, word.id, price).await
}

/// Takes a word off the market.
pub async fn withhold<C>(db: &C, word_id: i64) -> Result<()>
where
    C: ConnectionTrait,
{
    delete_listing(db, word_id).await
}

/// Removes the listing and hands the word to `buyer_id`. Balances are untouched.
pub async fn buy<C>(db: &C, word: &word::Model, buyer_id: &str) -> Result<word::Model>
where
    C: ConnectionTrait,
{
    withhold(db, word.id).await?;
    word_ops::update_word_owner(db, word.id, buyer_id).await
}

/// Lists a word owned by `owner_id`.
pub async fn exhibit_owned<C>(db: &C, owner_id: &str, text: &str, price: f64) -> Result<listing::Model>
where
    C: ConnectionTrait,
{
    let word = word_ops::require_word(db, text).await?;
    if word.owner_id != owner_id {
        return Err(Error::NotWordOwner {
            text: text.to_string(),
        });
    }
    exhibit(db, &word, price).await
}

/// Withdraws a listing of a word owned by `owner_id`.
pub async fn withhold_owned<C>(db: &C, owner_id: &str, text: &str) -> Result<()>
where
    C: ConnectionTrait,
{
    let word = word_ops::require_word(db, text).await?;
    if word.owner_id != owner_id {
        return Err(Error::NotWordOwner {
            text: text.to_string(),
        });
    }
    if listing_by_word(db, word.id).await?.is_none() {
        return Err(Error::NotListed {
            text: text.to_string(),
        });
    }
    withhold(db, word.id).await
}

/// Buys a listed word: debits the buyer, credits the seller, transfers ownership.
///
/// Callers are expected to hold the locks of the buyer and `seller_id`. If the word
/// no longer belongs to `seller_id` nothing changes and [`Error::OwnerChanged`] is
/// returned, so the caller can lock the new owner and retry.
///
/// # Returns
/// The word after the transfer and the price paid
pub async fn purchase(
    db: &DatabaseConnection,
    buyer_id: &str,
    seller_id: &str,
    text: &str,
) -> Result<(word::Model, f64)> {
    let txn = db.begin().await?;

    let word = word_ops::require_word(&txn, text).await?;
    let listing = listing_by_word(&txn, word.id)
        .await?
        .ok_or_else(|| Error::NotListed {
            text: text.to_string(),
        })?;
    if word.owner_id == buyer_id {
        return Err(Error::SelfTransfer);
    }
    if word.owner_id != seller_id {
        return Err(Error::OwnerChanged {
            text: text.to_string(),
        });
    }

    let buyer = owner::require_owner(&txn, buyer_id).await?;
    if buyer.balance < listing.price {
        return Err(Error::InsufficientFunds {
            current: buyer.balance,
            required: listing.price,
        });
    }

    owner::update_owner_balance(&txn, buyer_id, -listing.price).await?;
    owner::update_owner_balance(&txn, seller_id, listing.price).await?;
    let word = buy(&txn, &word, buyer_id).await?;

    txn.commit().await?;
    info!(
        "{} bought {} from {} for {:.2}",
        buyer_id, word.text, seller_id, listing.price
    );
    Ok((word, listing.price))
}

/// The first [`BROWSE_LIMIT`] listings in the requested order.
pub async fn browse<C>(db: &C, sort: MarketSort) -> Result<Vec<ListedWord>>
where
    C: ConnectionTrait,
{
    let query = Listing::find().find_also_related(Word);
    let query = match sort {
        MarketSort::Recent => query
            .order_by_desc(listing::Column::ListedAt)
            .order_by_desc(listing::Column::WordId),
        MarketSort::Price => query.order_by_desc(listing::Column::Price),
    };

    let rows = query.limit(BROWSE_LIMIT).all(db).await?;
    Ok(rows
        .into_iter()
        .filter_map(|(listing, word)| {
            word.map(|word| ListedWord {
                word,
                asking_price: listing.price,
            })
        })
        .collect())
}
