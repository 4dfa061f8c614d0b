//! Preference entity - Per-(word, beneficiary) toll multiplier.
//!
//! A missing row means the full price (rate 1). Rows with rate 1 are deleted
//! rather than stored.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Preference rate database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "preferences")]
pub struct Model {
    /// Word the discount applies to
    #[sea_orm(primary_key, auto_increment = false)]
    pub word_id: i64,
    /// Discord user id of the beneficiary
    #[sea_orm(primary_key, auto_increment = false)]
    pub owner_id: String,
    /// Multiplier in [0, 1); 0 means free
    pub rate: f64,
}

/// Defines relationships between Preference and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each preference belongs to one word
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
