//! Discord event and interaction handlers
//!
//! This module provides handlers for non-command traffic: inbound messages that
//! go through toll settlement, autocomplete, and self-deleting replies.

/// Autocomplete handlers for word names
pub mod autocomplete;
/// Inbound message settlement
pub mod message;
/// Self-deleting replies
pub mod notice;
