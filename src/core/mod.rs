//! Core business logic - framework-agnostic economy operations.
//!
//! Nothing in here knows about Discord. Every operation takes a database handle
//! (a connection or an open transaction) and plain ids, and returns domain errors
//! from [`crate::errors`].

/// Keystroke counting and the typing reward
pub mod keystroke;
/// Per-owner async locks serializing balance checks and debits
pub mod locks;
/// Market listings and purchases
pub mod market;
/// Owner accounts, balances, and remittance
pub mod owner;
/// Leaderboards
pub mod ranking;
/// Immutable word snapshot and message scanning
pub mod registry;
/// Per-message toll settlement
pub mod settlement;
/// Append-only record of word uses
pub mod usage_log;
/// Word registration, cancellation, pricing, and discounts
pub mod word;
