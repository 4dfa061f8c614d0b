//! Word business logic - validation, pricing, registration, and discounts.
//!
//! Words are priced once at registration. Every detected use costs
//! `price * price_rate(length)`, where the length is counted in syllables.

use crate::{
    core::owner,
    entities::{Listing, Preference, Word, preference, word},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::info;

/// Share of the registration price returned when a word is cancelled.
pub const CANCEL_REFUND_RATE: f64 = 0.9;

/// Minimum word length in syllables.
pub const MIN_WORD_LENGTH: usize = 2;

/// Whether `ch` is a precomposed Hangul syllable (U+AC00 `가` through U+D7A3 `힣`).
#[must_use]
pub const fn is_hangul_syllable(ch: char) -> bool {
    matches!(ch, '가'..='힣')
}

/// Whether `text` can be registered: at least two syllables, all precomposed Hangul.
#[must_use]
pub fn is_valid_word(text: &str) -> bool {
    text.chars().count() >= MIN_WORD_LENGTH && text.chars().all(is_hangul_syllable)
}

/// Fraction of the registration price charged per use of a word of `length` syllables.
///
/// `price_rate(n) = n² / 100`, so a ten-syllable word costs its full price per use.
#[must_use]
#[allow(clippy::cast_precision_loss)] // word lengths are tiny
pub fn price_rate(length: usize) -> f64 {
    let n = length as f64;
    n * n / 100.0
}

/// Number of uses after which a word of `length` syllables has paid for itself.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn break_even_uses(length: usize) -> u64 {
    (1.0 / price_rate(length)).round() as u64
}

/// Base toll for one use of `text` registered at `price`, before any discount.
#[must_use]
pub fn fee(text: &str, price: f64) -> f64 {
    price * price_rate(text.chars().count())
}

/// Finds a word by id.
pub async fn word_by_id<C>(db: &C, id: i64) -> Result<Option<word::Model>>
where
    C: ConnectionTrait,
{
    Word::find_by_id(id).one(db).await.map_err(Into::into)
}

/// Finds a word by its exact text.
pub async fn word_by_text<C>(db: &C, text: &str) -> Result<Option<word::Model>>
where
    C: ConnectionTrait,
{
    Word::find()
        .filter(word::Column::Text.eq(text))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Like [`word_by_text`], but a missing word is an [`Error::WordNotFound`].
pub async fn require_word<C>(db: &C, text: &str) -> Result<word::Model>
where
    C: ConnectionTrait,
{
    word_by_text(db, text)
        .await?
        .ok_or_else(|| Error::WordNotFound {
            text: text.to_string(),
        })
}

/// All words owned by `owner_id`, in registration order.
pub async fn words_by_owner<C>(db: &C, owner_id: &str) -> Result<Vec<word::Model>>
where
    C: ConnectionTrait,
{
    Word::find()
        .filter(word::Column::OwnerId.eq(owner_id))
        .order_by_asc(word::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Every live word, in registration order.
pub async fn all_words<C>(db: &C) -> Result<Vec<word::Model>>
where
    C: ConnectionTrait,
{
    Word::find()
        .order_by_asc(word::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Inserts a word row. Validation and payment are the caller's job; see [`register_word`].
pub async fn create_word<C>(db: &C, owner_id: &str, text: &str, price: f64) -> Result<word::Model>
where
    C: ConnectionTrait,
{
    let model = word::ActiveModel {
        text: Set(text.to_string()),
        owner_id: Set(owner_id.to_string()),
        price: Set(price),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    model.insert(db).await.map_err(Into::into)
}

/// Deletes a word row by id.
pub async fn delete_word<C>(db: &C, word_id: i64) -> Result<()>
where
    C: ConnectionTrait,
{
    Word::delete_by_id(word_id).exec(db).await?;
    Ok(())
}

/// Reassigns a word to a new owner.
pub async fn update_word_owner<C>(db: &C, word_id: i64, new_owner_id: &str) -> Result<word::Model>
where
    C: ConnectionTrait,
{
    let word = word_by_id(db, word_id)
        .await?
        .ok_or_else(|| Error::WordNotFound {
            text: word_id.to_string(),
        })?;
    let mut active: word::ActiveModel = word.into();
    active.owner_id = Set(new_owner_id.to_string());
    active.update(db).await.map_err(Into::into)
}

/// All preference rates set on a word.
pub async fn preferences_for_word<C>(db: &C, word_id: i64) -> Result<Vec<preference::Model>>
where
    C: ConnectionTrait,
{
    Preference::find()
        .filter(preference::Column::WordId.eq(word_id))
        .all(db)
        .await
        .map_err(Into::into)
}

/// Sets the rate `beneficiary` pays for `word_id`. A rate of 1 removes the entry.
pub async fn upsert_preference<C>(db: &C, word_id: i64, beneficiary: &str, rate: f64) -> Result<()>
where
    C: ConnectionTrait,
{
    if !(0.0..=1.0).contains(&rate) {
        return Err(Error::InvalidAmount { amount: rate });
    }
    if rate >= 1.0 {
        return delete_preference(db, word_id, beneficiary).await;
    }

    let existing = Preference::find_by_id((word_id, beneficiary.to_string()))
        .one(db)
        .await?;

    if let Some(pref) = existing {
        let mut active: preference::ActiveModel = pref.into();
        active.rate = Set(rate);
        active.update(db).await?;
    } else {
        let active = preference::ActiveModel {
            word_id: Set(word_id),
            owner_id: Set(beneficiary.to_string()),
            rate: Set(rate),
        };
        active.insert(db).await?;
    }
    Ok(())
}

/// Removes the preference entry for `(word_id, beneficiary)` if there is one.
pub async fn delete_preference<C>(db: &C, word_id: i64, beneficiary: &str) -> Result<()>
where
    C: ConnectionTrait,
{
    Preference::delete_by_id((word_id, beneficiary.to_string()))
        .exec(db)
        .await?;
    Ok(())
}

/// Registers `text` for `owner_id` at `price`, debiting the owner.
///
/// Fails without touching any state if the word is taken or invalid, the price
/// is not positive, the owner is unknown, or the owner cannot afford it.
pub async fn register_word(
    db: &DatabaseConnection,
    owner_id: &str,
    text: &str,
    price: f64,
) -> Result<word::Model> {
    if !price.is_finite() || price <= 0.0 {
        return Err(Error::InvalidAmount { amount: price });
    }
    if !is_valid_word(text) {
        return Err(Error::InvalidWord {
            text: text.to_string(),
        });
    }

    let txn = db.begin().await?;

    if word_by_text(&txn, text).await?.is_some() {
        return Err(Error::DuplicateWord {
            text: text.to_string(),
        });
    }

    let owner = owner::require_owner(&txn, owner_id).await?;
    if owner.balance < price {
        return Err(Error::InsufficientFunds {
            current: owner.balance,
            required: price,
        });
    }

    owner::update_owner_balance(&txn, owner_id, -price).await?;
    let word = create_word(&txn, owner_id, text, price).await?;

    txn.commit().await?;
    info!("{} registered word {} for {:.2}", owner_id, word.text, price);
    Ok(word)
}

/// Cancels a word owned by `owner_id`, refunding [`CANCEL_REFUND_RATE`] of its price.
///
/// Any listing and preferences on the word are removed with it.
///
/// # Returns
/// The refunded amount
pub async fn cancel_word(db: &DatabaseConnection, owner_id: &str, text: &str) -> Result<f64> {
    let txn = db.begin().await?;

    let word = require_word(&txn, text).await?;
    if word.owner_id != owner_id {
        return Err(Error::NotWordOwner {
            text: text.to_string(),
        });
    }

    Listing::delete_by_id(word.id).exec(&txn).await?;
    Preference::delete_many()
        .filter(preference::Column::WordId.eq(word.id))
        .exec(&txn)
        .await?;
    delete_word(&txn, word.id).await?;

    let refund = word.price * CANCEL_REFUND_RATE;
    owner::update_owner_balance(&txn, owner_id, refund).await?;

    txn.commit().await?;
    info!("{} cancelled word {}, refunded {:.2}", owner_id, text, refund);
    Ok(refund)
}

/// Grants `beneficiary` a discount of `percent` (0-100) on a word owned by `owner_id`.
///
/// # Returns
/// The resulting preference rate (`1 - percent / 100`)
pub async fn set_discount<C>(
    db: &C,
    owner_id: &str,
    text: &str,
    beneficiary: &str,
    percent: f64,
) -> Result<f64>
where
    C: ConnectionTrait,
{
    if !(0.0..=100.0).contains(&percent) {
        return Err(Error::InvalidAmount { amount: percent });
    }

    let word = require_word(db, text).await?;
    if word.owner_id != owner_id {
        return Err(Error::NotWordOwner {
            text: text.to_string(),
        });
    }

    let rate = 1.0 - percent / 100.0;
    upsert_preference(db, word.id, beneficiary, rate).await?;
    Ok(rate)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::market;
    use crate::test_utils::*;

    #[test]
    fn test_word_validity() {
        assert!(!is_valid_word("a"));
        assert!(!is_valid_word("ab"));
        assert!(!is_valid_word("가"));
        assert!(!is_valid_word("가a"));
        assert!(!is_valid_word("ㄱㄴ"));
        assert!(!is_valid_word("가 나"));
        assert!(is_valid_word("가나"));
        assert!(is_valid_word("힣힣힣"));
    }

    #[test]
    fn test_price_rate_values() {
        assert!((price_rate(1) - 0.01).abs() < 1e-12);
        assert!((price_rate(10) - 1.0).abs() < 1e-12);
        for n in 1..30 {
            assert!(price_rate(n + 1) > price_rate(n));
        }
    }

    #[test]
    fn test_break_even_uses() {
        assert_eq!(break_even_uses(1), 100);
        assert_eq!(break_even_uses(2), 25);
        assert_eq!(break_even_uses(10), 1);
    }

    #[test]
    fn test_fee_counts_syllables_not_bytes() {
        // "가나" is 6 bytes but 2 syllables
        assert!((fee("가나", 100.0) - 4.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_register_word_debits_owner() -> Result<()> {
        let db = setup_test_db().await?;
        create_funded_owner(&db, "alice", 100.0).await?;

        let word = register_word(&db, "alice", "가나", 50.0).await?;
        assert_eq!(word.text, "가나");
        assert_eq!(word.owner_id, "alice");
        assert_eq!(word.price, 50.0);
        assert_eq!(owner::require_owner(&db, "alice").await?.balance, 50.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_register_word_rejections() -> Result<()> {
        let db = setup_test_db().await?;
        create_funded_owner(&db, "alice", 100.0).await?;
        register_word(&db, "alice", "가나", 10.0).await?;

        assert!(matches!(
            register_word(&db, "alice", "가나", 10.0).await,
            Err(Error::DuplicateWord { .. })
        ));
        assert!(matches!(
            register_word(&db, "alice", "ab", 10.0).await,
            Err(Error::InvalidWord { .. })
        ));
        assert!(matches!(
            register_word(&db, "alice", "다라", -1.0).await,
            Err(Error::InvalidAmount { .. })
        ));
        assert!(matches!(
            register_word(&db, "alice", "다라", 1000.0).await,
            Err(Error::InsufficientFunds { .. })
        ));
        assert!(matches!(
            register_word(&db, "nobody", "다라", 1.0).await,
            Err(Error::OwnerNotFound { .. })
        ));

        // Only the first registration moved money
        assert_eq!(owner::require_owner(&db, "alice").await?.balance, 90.0);
        assert!(word_by_text(&db, "다라").await?.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn test_register_then_cancel_refunds_ninety_percent() -> Result<()> {
        let db = setup_test_db().await?;
        create_funded_owner(&db, "alice", 200.0).await?;

        register_word(&db, "alice", "가나", 50.0).await?;
        let refund = cancel_word(&db, "alice", "가나").await?;

        assert_eq!(refund, 45.0);
        assert_eq!(owner::require_owner(&db, "alice").await?.balance, 195.0);
        assert!(word_by_text(&db, "가나").await?.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn test_cancel_requires_ownership() -> Result<()> {
        let db = setup_test_db().await?;
        create_funded_owner(&db, "alice", 100.0).await?;
        create_funded_owner(&db, "bob", 100.0).await?;
        register_word(&db, "alice", "가나", 50.0).await?;

        assert!(matches!(
            cancel_word(&db, "bob", "가나").await,
            Err(Error::NotWordOwner { .. })
        ));
        assert!(matches!(
            cancel_word(&db, "bob", "없음").await,
            Err(Error::WordNotFound { .. })
        ));
        assert!(word_by_text(&db, "가나").await?.is_some());

        Ok(())
    }

    #[tokio::test]
    async fn test_cancel_removes_listing_and_preferences() -> Result<()> {
        let db = setup_test_db().await?;
        create_funded_owner(&db, "alice", 100.0).await?;
        let word = register_word(&db, "alice", "가나", 50.0).await?;
        market::exhibit(&db, &word, 70.0).await?;
        set_discount(&db, "alice", "가나", "bob", 50.0).await?;

        cancel_word(&db, "alice", "가나").await?;

        assert!(market::listing_by_word(&db, word.id).await?.is_none());
        assert!(preferences_for_word(&db, word.id).await?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_discount_stores_rate_and_removes_at_zero_percent() -> Result<()> {
        let db = setup_test_db().await?;
        create_funded_owner(&db, "alice", 100.0).await?;
        let word = register_word(&db, "alice", "가나", 50.0).await?;

        let rate = set_discount(&db, "alice", "가나", "bob", 25.0).await?;
        assert_eq!(rate, 0.75);
        let prefs = preferences_for_word(&db, word.id).await?;
        assert_eq!(prefs.len(), 1);
        assert_eq!(prefs[0].owner_id, "bob");
        assert_eq!(prefs[0].rate, 0.75);

        // Updating replaces rather than duplicates
        set_discount(&db, "alice", "가나", "bob", 100.0).await?;
        let prefs = preferences_for_word(&db, word.id).await?;
        assert_eq!(prefs.len(), 1);
        assert_eq!(prefs[0].rate, 0.0);

        // 0% discount means rate 1, which is stored as absence
        set_discount(&db, "alice", "가나", "bob", 0.0).await?;
        assert!(preferences_for_word(&db, word.id).await?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_discount_rejections() -> Result<()> {
        let db = setup_test_db().await?;
        create_funded_owner(&db, "alice", 100.0).await?;
        register_word(&db, "alice", "가나", 50.0).await?;

        assert!(matches!(
            set_discount(&db, "alice", "가나", "bob", 150.0).await,
            Err(Error::InvalidAmount { .. })
        ));
        assert!(matches!(
            set_discount(&db, "bob", "가나", "bob", 50.0).await,
            Err(Error::NotWordOwner { .. })
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_update_word_owner() -> Result<()> {
        let db = setup_test_db().await?;
        create_funded_owner(&db, "alice", 100.0).await?;
        create_funded_owner(&db, "bob", 0.0).await?;
        let word = register_word(&db, "alice", "가나", 50.0).await?;

        let moved = update_word_owner(&db, word.id, "bob").await?;
        assert_eq!(moved.owner_id, "bob");
        assert!(words_by_owner(&db, "alice").await?.is_empty());
        assert_eq!(words_by_owner(&db, "bob").await?.len(), 1);

        Ok(())
    }
}
