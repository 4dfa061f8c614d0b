//! Market listing entity - A word offered for sale.
//!
//! The word id is the primary key, so a word can be listed at most once.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Market listing database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "market")]
pub struct Model {
    /// Listed word
    #[sea_orm(primary_key, auto_increment = false)]
    pub word_id: i64,
    /// Asking price
    pub price: f64,
    /// When the word was put on the market
    pub listed_at: DateTimeUtc,
}

/// Defines relationships between Listing and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each listing refers to one word
    #[sea_orm(
        belongs_to = "super::word::Entity",
        from = "Column::WordId",
        to = "super::word::Column::Id"
    )]
    Word,
}

impl Related<super::word::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Word.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
