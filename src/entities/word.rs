//! Word entity - A registered, taxable text.
//!
//! `text` is unique among live words. `price` is the registration price and never
//! changes after insertion; the per-use fee is derived from it.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Word database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "words")]
pub struct Model {
    /// Unique identifier for the word
    #[sea_orm(primary_key)]
    pub id: i64,
    /// The registered text
    #[sea_orm(unique)]
    pub text: String,
    /// Discord user id of the current owner
    pub owner_id: String,
    /// Registration price
    pub price: f64,
    /// When the word was registered
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Word and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each word belongs to one owner
    #[sea_orm(
        belongs_to = "super::owner::Entity",
        from = "Column::OwnerId",
        to = "super::owner::Column::Id"
    )]
    Owner,
    /// A word has at most one market listing
    #[sea_orm(has_one = "super::listing::Entity")]
    Listing,
    /// One word has many preference rates
    #[sea_orm(has_many = "super::preference::Entity")]
    Preferences,
}

impl Related<super::owner::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl Related<super::listing::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Listing.def()
    }
}

impl Related<super::preference::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Preferences.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
