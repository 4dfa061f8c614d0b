//! Word use entity - Append-only log of detected word uses.
//!
//! Rows are never updated or deleted, and survive deletion of the word they refer to,
//! so there is deliberately no foreign key on `word_id`.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Usage log database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "word_uses")]
pub struct Model {
    /// Unique identifier for the log entry
    #[sea_orm(primary_key)]
    pub id: i64,
    /// When the word was used
    pub used_at: DateTimeUtc,
    /// Discord user id of the speaker
    pub user_id: String,
    /// Word that was detected
    pub word_id: i64,
    /// Toll the speaker paid (0 for exempted uses)
    pub amount: f64,
}

/// `WordUse` has no enforced relationships
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
