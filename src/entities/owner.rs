//! Owner entity - A registered participant in the word economy.
//!
//! The primary key is the Discord user id. Owned words are not stored here;
//! they are derived by querying `words` by `owner_id`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Owner database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "owners")]
pub struct Model {
    /// Discord user id
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Current balance; may be fractional
    pub balance: f64,
    /// When the owner registered
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Owner and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One owner has many words
    #[sea_orm(has_many = "super::word::Entity")]
    Words,
}

impl Related<super::word::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Words.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
