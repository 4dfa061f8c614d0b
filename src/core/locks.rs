//! Per-owner settlement locks.
//!
//! Balance reads followed by debits must not interleave for the same owner, or two
//! messages from one user could both pass the affordability check. Every code path
//! that debits an owner holds that owner's guard for the duration.

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Lazily created async mutex per owner id.
#[derive(Debug, Default)]
pub struct OwnerLocks {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

/// Guards held for a two-party operation. Dropping releases both.
#[derive(Debug)]
pub struct PairGuard {
    _first: OwnedMutexGuard<()>,
    _second: Option<OwnedMutexGuard<()>>,
}

impl OwnerLocks {
    /// Creates an empty lock table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn handle(&self, owner_id: &str) -> Arc<Mutex<()>> {
        // Clone out of the shard so the DashMap guard is released before awaiting
        Arc::clone(
            self.locks
                .entry(owner_id.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .value(),
        )
    }

    /// Waits for exclusive access to `owner_id`.
    pub async fn lock(&self, owner_id: &str) -> OwnedMutexGuard<()> {
        self.handle(owner_id).lock_owned().await
    }

    /// Locks two owners in a fixed order so opposite transfers cannot deadlock.
    pub async fn lock_pair(&self, a: &str, b: &str) -> PairGuard {
        if a == b {
            return PairGuard {
                _first: self.lock(a).await,
                _second: None,
            };
        }
        let (first, second) = if a < b { (a, b) } else { (b, a) };
        let first = self.lock(first).await;
        let second = self.lock(second).await;
        PairGuard {
            _first: first,
            _second: Some(second),
        }
    }

    /// Number of owners that have been locked at least once.
    #[must_use]
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    /// Whether no owner has been locked yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_owner_is_exclusive() {
        let locks = OwnerLocks::new();
        let guard = locks.lock("alice").await;

        let blocked = tokio::time::timeout(Duration::from_millis(50), locks.lock("alice")).await;
        assert!(blocked.is_err());

        drop(guard);
        let reacquired = tokio::time::timeout(Duration::from_millis(50), locks.lock("alice")).await;
        assert!(reacquired.is_ok());
    }

    #[tokio::test]
    async fn test_different_owners_do_not_block() {
        let locks = OwnerLocks::new();
        let _alice = locks.lock("alice").await;

        let bob = tokio::time::timeout(Duration::from_millis(50), locks.lock("bob")).await;
        assert!(bob.is_ok());
        assert_eq!(locks.len(), 2);
    }

    #[tokio::test]
    async fn test_pair_lock_holds_both_and_tolerates_same_id() {
        let locks = OwnerLocks::new();
        let pair = locks.lock_pair("bob", "alice").await;

        let blocked = tokio::time::timeout(Duration::from_millis(50), locks.lock("alice")).await;
        assert!(blocked.is_err());
        drop(pair);

        let _same = locks.lock_pair("carol", "carol").await;
    }
}
