//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod listing;
pub mod owner;
pub mod preference;
pub mod word;
pub mod word_use;

// Re-export specific types to avoid conflicts
pub use listing::{Column as ListingColumn, Entity as Listing, Model as ListingModel};
pub use owner::{Column as OwnerColumn, Entity as Owner, Model as OwnerModel};
pub use preference::{Column as PreferenceColumn, Entity as Preference, Model as PreferenceModel};
pub use word::{Column as WordColumn, Entity as Word, Model as WordModel};
pub use word_use::{Column as WordUseColumn, Entity as WordUse, Model as WordUseModel};
