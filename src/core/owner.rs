//! Owner business logic - registration, balances, remittance, and admin removal.
//!
//! Balance changes go through [`update_owner_balance`], which applies a delta in a
//! single SQL statement so concurrent credits to the same owner cannot lose updates.

use crate::{
    entities::{Listing, Owner, Preference, Word, listing, owner, preference, word},
    errors::{Error, Result},
};
use sea_orm::{Set, TransactionTrait, prelude::*, sea_query::Expr};
use tracing::info;

/// Finds an owner by Discord user id.
pub async fn owner_by_id<C>(db: &C, id: &str) -> Result<Option<owner::Model>>
where
    C: ConnectionTrait,
{
    Owner::find_by_id(id.to_string())
        .one(db)
        .await
        .map_err(Into::into)
}

/// Like [`owner_by_id`], but a missing owner is an [`Error::OwnerNotFound`].
pub async fn require_owner<C>(db: &C, id: &str) -> Result<owner::Model>
where
    C: ConnectionTrait,
{
    owner_by_id(db, id)
        .await?
        .ok_or_else(|| Error::OwnerNotFound { id: id.to_string() })
}

/// Whether the user is registered in the economy.
pub async fn owner_exists<C>(db: &C, id: &str) -> Result<bool>
where
    C: ConnectionTrait,
{
    Ok(owner_by_id(db, id).await?.is_some())
}

/// Registers a new owner with a zero balance.
pub async fn create_owner<C>(db: &C, id: &str) -> Result<owner::Model>
where
    C: ConnectionTrait,
{
    if owner_exists(db, id).await? {
        return Err(Error::OwnerExists { id: id.to_string() });
    }

    let model = owner::ActiveModel {
        id: Set(id.to_string()),
        balance: Set(0.0),
        created_at: Set(chrono::Utc::now()),
    };
    let owner = model.insert(db).await?;
    info!("Registered owner {}", owner.id);
    Ok(owner)
}

/// Adds `delta` to an owner's balance atomically (`balance = balance + delta`).
///
/// # Arguments
/// * `db` - Database connection or transaction
/// * `id` - Owner to update
/// * `delta` - Amount to add (negative to debit)
///
/// # Returns
/// The updated owner model
pub async fn update_owner_balance<C>(db: &C, id: &str, delta: f64) -> Result<owner::Model>
where
    C: ConnectionTrait,
{
    if !delta.is_finite() {
        return Err(Error::InvalidAmount { amount: delta });
    }

    let result = Owner::update_many()
        .col_expr(
            owner::Column::Balance,
            Expr::col(owner::Column::Balance).add(delta),
        )
        .filter(owner::Column::Id.eq(id))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(Error::OwnerNotFound { id: id.to_string() });
    }

    require_owner(db, id).await
}

/// Overwrites an owner's balance. Admin only.
pub async fn set_owner_balance<C>(db: &C, id: &str, balance: f64) -> Result<owner::Model>
where
    C: ConnectionTrait,
{
    if !balance.is_finite() {
        return Err(Error::InvalidAmount { amount: balance });
    }

    let owner = require_owner(db, id).await?;
    let mut active: owner::ActiveModel = owner.into();
    active.balance = Set(balance);
    active.update(db).await.map_err(Into::into)
}

/// Deletes an owner together with their words, those words' listings and
/// preferences, and any discounts granted to the owner on other words.
///
/// Usage log entries are kept.
pub async fn delete_owner_cascade(db: &DatabaseConnection, id: &str) -> Result<()> {
    let txn = db.begin().await?;

    require_owner(&txn, id).await?;

    let word_ids: Vec<i64> = Word::find()
        .filter(word::Column::OwnerId.eq(id))
        .all(&txn)
        .await?
        .into_iter()
        .map(|w| w.id)
        .collect();

    Listing::delete_many()
        .filter(listing::Column::WordId.is_in(word_ids.clone()))
        .exec(&txn)
        .await?;
    Preference::delete_many()
        .filter(preference::Column::WordId.is_in(word_ids))
        .exec(&txn)
        .await?;
    Preference::delete_many()
        .filter(preference::Column::OwnerId.eq(id))
        .exec(&txn)
        .await?;
    Word::delete_many()
        .filter(word::Column::OwnerId.eq(id))
        .exec(&txn)
        .await?;
    Owner::delete_by_id(id.to_string()).exec(&txn).await?;

    txn.commit().await?;
    info!("Removed owner {} and their words", id);
    Ok(())
}

/// Total property of an owner: balance plus the registration prices of owned words.
pub async fn owner_property<C>(db: &C, id: &str) -> Result<f64>
where
    C: ConnectionTrait,
{
    let owner = require_owner(db, id).await?;
    let words = crate::core::word::words_by_owner(db, id).await?;
    Ok(owner.balance + words.iter().map(|w| w.price).sum::<f64>())
}

/// Moves `amount` from one owner to another.
///
/// Callers are expected to hold both owners' settlement locks.
pub async fn remit(db: &DatabaseConnection, from: &str, to: &str, amount: f64) -> Result<()> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(Error::InvalidAmount { amount });
    }
    if from == to {
        return Err(Error::SelfTransfer);
    }

    let txn = db.begin().await?;

    let sender = require_owner(&txn, from).await?;
    require_owner(&txn, to).await?;

    if sender.balance < amount {
        return Err(Error::InsufficientFunds {
            current: sender.balance,
            required: amount,
        });
    }

    update_owner_balance(&txn, from, -amount).await?;
    update_owner_balance(&txn, to, amount).await?;

    txn.commit().await?;
    info!("Remitted {:.2} from {} to {}", amount, from, to);
    Ok(())
}
