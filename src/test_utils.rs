//! Shared test utilities.
//!
//! This module provides common helper functions for setting up test databases
//! and creating owners and words with sensible defaults.

use crate::{
    core::{owner, registry::Registry, word},
    entities,
    errors::Result,
};
use sea_orm::DatabaseConnection;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Registers an owner and sets their balance.
pub async fn create_funded_owner(
    db: &DatabaseConnection,
    id: &str,
    balance: f64,
) -> Result<entities::owner::Model> {
    owner::create_owner(db, id).await?;
    owner::set_owner_balance(db, id, balance).await
}

/// Registers `text` for `owner_id`, creating the owner with a balance of 100
/// first if needed. The registration price is debited as usual.
pub async fn setup_with_word(
    db: &DatabaseConnection,
    owner_id: &str,
    text: &str,
    price: f64,
) -> Result<(entities::owner::Model, entities::word::Model)> {
    if !owner::owner_exists(db, owner_id).await? {
        create_funded_owner(db, owner_id, 100.0).await?;
    }
    let word = word::register_word(db, owner_id, text, price).await?;
    let owner = owner::require_owner(db, owner_id).await?;
    Ok((owner, word))
}

/// Inserts a word directly, bypassing validation and payment.
///
/// Useful for pinning an exact per-use fee in settlement tests.
pub async fn insert_raw_word(
    db: &DatabaseConnection,
    owner_id: &str,
    text: &str,
    price: f64,
) -> Result<entities::word::Model> {
    word::create_word(db, owner_id, text, price).await
}

/// Loads a fresh registry snapshot.
pub async fn load_registry(db: &DatabaseConnection) -> Result<Registry> {
    Registry::load(db).await
}

/// Asserts two amounts are equal up to floating-point noise.
pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}
