//! Fee settlement - charges a message's author for every registered word they used.
//!
//! For each match coming out of the registry scan, in discovery order:
//! - words the author owns are free and leave no trace;
//! - a preference rate of zero logs the use without moving money;
//! - otherwise the author pays `fee * rate` and the owner receives that times
//!   [`TOLL_PREMIUM`], and the use is logged.
//!
//! When the author cannot afford a toll the message is blocked: scanning stops,
//! tolls already paid stay paid, and a redacted copy of the message is produced with
//! every used word (including the unaffordable one) replaced by [`REDACTION_MARKER`].
//!
//! Each toll is applied in its own database transaction. A failure on a later toll
//! does not roll back earlier ones.

use crate::{
    core::{
        keystroke::keystroke_reward,
        locks::OwnerLocks,
        owner,
        registry::{Registry, SpanTracker, find_free},
        usage_log,
    },
    errors::{Error, Result},
};
use sea_orm::{DatabaseConnection, TransactionTrait};
use tracing::{debug, error, info, instrument};

/// Multiplier applied to a toll when crediting the word's owner.
///
/// The owner receives more than the speaker pays; each paid use mints money.
pub const TOLL_PREMIUM: f64 = 1.1;

/// Replacement text for used words in a blocked message.
pub const REDACTION_MARKER: &str = "**[수정됨]**";

/// One logged use and what the author paid for it.
#[derive(Debug, Clone, PartialEq)]
pub struct Charge {
    /// Word that was used
    pub word_id: i64,
    /// Amount debited from the author (zero for exempted uses)
    pub amount: f64,
}

/// Result of settling one message.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettlementOutcome {
    /// Whether the author ran out of money partway through
    pub blocked: bool,
    /// Redacted message text, present only when blocked
    pub redacted_text: Option<String>,
    /// Logged uses in the order they were settled
    pub matches_charged: Vec<Charge>,
    /// Keystroke reward credited after settlement
    pub keystroke_reward: f64,
}

impl SettlementOutcome {
    /// Total debited from the author by tolls.
    #[must_use]
    pub fn total_charged(&self) -> f64 {
        self.matches_charged.iter().map(|c| c.amount).sum()
    }
}

/// Settles one inbound message.
///
/// Unregistered authors (`None`, or an id with no owner record) are never charged.
/// The author's lock is held for the whole message, keystroke reward included.
///
/// # Errors
/// [`Error::InvariantViolation`] if a matched word's owner no longer exists; tolls
/// settled before that point are kept. Database errors are propagated as-is.
#[instrument(skip(db, registry, locks, text))]
pub async fn handle_message(
    db: &DatabaseConnection,
    registry: &Registry,
    locks: &OwnerLocks,
    author_id: Option<&str>,
    text: &str,
) -> Result<SettlementOutcome> {
    let Some(author_id) = author_id else {
        return Ok(SettlementOutcome::default());
    };

    let _guard = locks.lock(author_id).await;

    if owner::owner_by_id(db, author_id).await?.is_none() {
        return Ok(SettlementOutcome::default());
    }

    let mut outcome = SettlementOutcome::default();
    let mut used: Vec<&str> = Vec::new();

    for found in registry.scan_matches(text) {
        let word = found.word;
        if word.owner_id == author_id {
            continue;
        }

        let Some(word_owner) = owner::owner_by_id(db, &word.owner_id).await? else {
            error!(
                "Word {} ({}) points at missing owner {}",
                word.id, word.text, word.owner_id
            );
            return Err(Error::InvariantViolation {
                message: format!("owner {} of word {} is missing", word.owner_id, word.text),
            });
        };

        used.push(&word.text);
        let rate = word.rate_for(author_id);
        let toll = word.fee() * rate;

        let amount = if rate <= 0.0 {
            usage_log::append_usage_log(db, author_id, word.id, 0.0).await?;
            debug!("{} used {} for free", author_id, word.text);
            0.0
        } else {
            let balance = spendable_balance(db, author_id).await?;
            if balance < toll {
                outcome.blocked = true;
                info!(
                    "Blocked message from {}: {} costs {:.2}, balance {:.2}",
                    author_id, word.text, toll, balance
                );
                break;
            }
            pay_toll(db, author_id, &word_owner.id, word.id, toll).await?;
            debug!(
                "{} paid {:.2} to {} for {}",
                author_id, toll, word_owner.id, word.text
            );
            toll
        };

        outcome.matches_charged.push(Charge {
            word_id: word.id,
            amount,
        });
    }

    if outcome.blocked {
        outcome.redacted_text = Some(redact(text, &used, REDACTION_MARKER));
    }

    let reward = keystroke_reward(text);
    if reward > 0.0 {
        owner::update_owner_balance(db, author_id, reward).await?;
    }
    outcome.keystroke_reward = reward;

    Ok(outcome)
}

/// Current stored balance of the author.
///
/// Tolls paid by other speakers credit the author without taking the author's
/// lock, so the stored row is the only reliable figure.
async fn spendable_balance(db: &DatabaseConnection, author_id: &str) -> Result<f64> {
    Ok(owner::require_owner(db, author_id).await?.balance)
}

/// Debits the speaker, credits the owner with the premium, and logs the use.
async fn pay_toll(
    db: &DatabaseConnection,
    payer_id: &str,
    owner_id: &str,
    word_id: i64,
    toll: f64,
) -> Result<()> {
    let txn = db.begin().await?;
    owner::update_owner_balance(&txn, payer_id, -toll).await?;
    owner::update_owner_balance(&txn, owner_id, toll * TOLL_PREMIUM).await?;
    usage_log::append_usage_log(&txn, payer_id, word_id, toll).await?;
    txn.commit().await?;
    Ok(())
}

/// Replaces every occurrence of each of `words` in `text` with `marker`.
///
/// Longer words are replaced first and occurrences never overlap, so a short word
/// cannot eat into a longer one or into an inserted marker.
#[must_use]
pub fn redact(text: &str, words: &[&str], marker: &str) -> String {
    let mut ordered: Vec<&str> = words.to_vec();
    ordered.sort_by(|a, b| {
        b.chars()
            .count()
            .cmp(&a.chars().count())
            .then_with(|| a.cmp(b))
    });
    ordered.dedup();

    let mut occupied = SpanTracker::default();
    for word in ordered {
        let mut from = 0;
        while let Some(start) = find_free(text, word, from, &occupied) {
            occupied.occupy(start..start + word.len());
            from = start + word.len();
        }
    }

    let mut spans = occupied.into_spans();
    spans.sort_by_key(|s| s.start);

    let mut redacted = String::with_capacity(text.len());
    let mut last = 0;
    for span in spans {
        redacted.push_str(&text[last..span.start]);
        redacted.push_str(marker);
        last = span.end;
    }
    redacted.push_str(&text[last..]);
    redacted
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;
    use crate::core::{
        registry::RegisteredWord,
        usage_log::{LogFilter, query_usage_log},
        word,
    };
    use crate::test_utils::*;
    use std::{collections::HashMap, sync::Arc};

    // Ten syllables, so the per-use fee equals the registration price
    const TEN: &str = "가나다라마바사아자차";

    async fn balance(db: &DatabaseConnection, id: &str) -> f64 {
        owner::require_owner(db, id).await.unwrap().balance
    }

    async fn log_len(db: &DatabaseConnection) -> usize {
        query_usage_log(db, &LogFilter::All, 100).await.unwrap().len()
    }

    #[test]
    fn test_redact_replaces_every_occurrence() {
        let redacted = redact("사과 좋아 사과!", &["사과"], "[X]");
        assert_eq!(redacted, "[X] 좋아 [X]!");
    }

    #[test]
    fn test_redact_prefers_longer_words_and_spares_marker() {
        let redacted = redact("가나다 가나", &["가나", "가나다"], "<정>");
        assert_eq!(redacted, "<정> <정>");

        // A used word that also appears inside the marker is not replaced there
        let redacted = redact("수정 하세요", &["수정"], REDACTION_MARKER);
        assert_eq!(redacted, format!("{REDACTION_MARKER} 하세요"));
    }

    #[test]
    fn test_redact_without_words_is_identity() {
        assert_eq!(redact("그대로", &[], "[X]"), "그대로");
    }

    #[tokio::test]
    async fn test_unregistered_author_changes_nothing() -> Result<()> {
        let db = setup_test_db().await?;
        create_funded_owner(&db, "alice", 100.0).await?;
        insert_raw_word(&db, "alice", TEN, 10.0).await?;
        let registry = load_registry(&db).await?;
        let locks = OwnerLocks::new();

        let outcome = handle_message(&db, &registry, &locks, None, TEN).await?;
        assert_eq!(outcome, SettlementOutcome::default());

        let outcome = handle_message(&db, &registry, &locks, Some("stranger"), TEN).await?;
        assert_eq!(outcome, SettlementOutcome::default());

        assert_close(balance(&db, "alice").await, 100.0);
        assert_eq!(log_len(&db).await, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_own_words_are_free_and_unlogged() -> Result<()> {
        let db = setup_test_db().await?;
        create_funded_owner(&db, "alice", 100.0).await?;
        insert_raw_word(&db, "alice", TEN, 10.0).await?;
        let registry = load_registry(&db).await?;

        let outcome = handle_message(&db, &registry, &OwnerLocks::new(), Some("alice"), TEN).await?;

        assert!(!outcome.blocked);
        assert!(outcome.matches_charged.is_empty());
        assert_close(balance(&db, "alice").await, 100.0 + keystroke_reward(TEN));
        assert_eq!(log_len(&db).await, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_payment_debits_author_and_credits_owner_with_premium() -> Result<()> {
        let db = setup_test_db().await?;
        create_funded_owner(&db, "alice", 0.0).await?;
        create_funded_owner(&db, "bob", 100.0).await?;
        let word = insert_raw_word(&db, "alice", TEN, 10.0).await?;
        let registry = load_registry(&db).await?;

        let outcome = handle_message(&db, &registry, &OwnerLocks::new(), Some("bob"), TEN).await?;

        assert!(!outcome.blocked);
        assert!(outcome.redacted_text.is_none());
        assert_eq!(outcome.matches_charged.len(), 1);
        assert_eq!(outcome.matches_charged[0].word_id, word.id);
        assert_close(outcome.matches_charged[0].amount, 10.0);
        assert_close(balance(&db, "bob").await, 90.0 + keystroke_reward(TEN));
        assert_close(balance(&db, "alice").await, 11.0);

        let log = query_usage_log(&db, &LogFilter::Paid("bob".to_string()), 10).await?;
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].word_id, word.id);
        assert_close(log[0].amount, 10.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_greedy_longest_match_charges_only_longer_word() -> Result<()> {
        let db = setup_test_db().await?;
        create_funded_owner(&db, "alice", 0.0).await?;
        create_funded_owner(&db, "bob", 100.0).await?;
        let long = insert_raw_word(&db, "alice", "가나다", 10.0).await?;
        insert_raw_word(&db, "alice", "가나", 10.0).await?;
        let registry = load_registry(&db).await?;

        let outcome =
            handle_message(&db, &registry, &OwnerLocks::new(), Some("bob"), "가나다").await?;

        assert_eq!(outcome.matches_charged.len(), 1);
        assert_eq!(outcome.matches_charged[0].word_id, long.id);
        assert_close(outcome.total_charged(), word::fee("가나다", 10.0));
        Ok(())
    }

    #[tokio::test]
    async fn test_unaffordable_toll_blocks_and_redacts() -> Result<()> {
        let db = setup_test_db().await?;
        create_funded_owner(&db, "alice", 0.0).await?;
        create_funded_owner(&db, "bob", 5.0).await?;
        insert_raw_word(&db, "alice", TEN, 10.0).await?;
        let registry = load_registry(&db).await?;

        let text = format!("안녕 {TEN}!");
        let outcome = handle_message(&db, &registry, &OwnerLocks::new(), Some("bob"), &text).await?;

        assert!(outcome.blocked);
        assert_eq!(
            outcome.redacted_text.as_deref(),
            Some(format!("안녕 {REDACTION_MARKER}!").as_str())
        );
        assert!(outcome.matches_charged.is_empty());
        // Only the keystroke reward reaches bob; alice gets nothing
        assert_close(balance(&db, "bob").await, 5.0 + keystroke_reward(&text));
        assert_close(balance(&db, "alice").await, 0.0);
        assert_eq!(log_len(&db).await, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_block_keeps_earlier_tolls_and_stops_scanning() -> Result<()> {
        let db = setup_test_db().await?;
        create_funded_owner(&db, "alice", 0.0).await?;
        create_funded_owner(&db, "bob", 12.0).await?;
        // Fees: 10 for the ten-syllable word, then 4 twice for "사과" (price 100, rate 0.04)
        let ten = insert_raw_word(&db, "alice", TEN, 10.0).await?;
        insert_raw_word(&db, "alice", "사과", 100.0).await?;
        // Cheap enough to pay, but never reached once the message is blocked
        insert_raw_word(&db, "alice", "포", 1.0).await?;
        let registry = load_registry(&db).await?;

        let text = format!("{TEN} 사과 포도");
        let outcome = handle_message(&db, &registry, &OwnerLocks::new(), Some("bob"), &text).await?;

        assert!(outcome.blocked);
        assert_eq!(outcome.matches_charged.len(), 1);
        assert_eq!(outcome.matches_charged[0].word_id, ten.id);
        assert_eq!(
            outcome.redacted_text.as_deref(),
            Some(format!("{REDACTION_MARKER} {REDACTION_MARKER} 포도").as_str())
        );
        assert_close(balance(&db, "bob").await, 2.0 + keystroke_reward(&text));
        assert_close(balance(&db, "alice").await, 11.0);
        assert_eq!(log_len(&db).await, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_full_exemption_logs_without_moving_money() -> Result<()> {
        let db = setup_test_db().await?;
        create_funded_owner(&db, "alice", 0.0).await?;
        create_funded_owner(&db, "bob", 0.0).await?;
        let word = insert_raw_word(&db, "alice", TEN, 10.0).await?;
        word::upsert_preference(&db, word.id, "bob", 0.0).await?;
        let registry = load_registry(&db).await?;

        let outcome = handle_message(&db, &registry, &OwnerLocks::new(), Some("bob"), TEN).await?;

        assert!(!outcome.blocked);
        assert_eq!(
            outcome.matches_charged,
            vec![Charge {
                word_id: word.id,
                amount: 0.0
            }]
        );
        assert_close(balance(&db, "bob").await, keystroke_reward(TEN));
        assert_close(balance(&db, "alice").await, 0.0);
        assert_eq!(log_len(&db).await, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_partial_discount_scales_toll() -> Result<()> {
        let db = setup_test_db().await?;
        create_funded_owner(&db, "alice", 0.0).await?;
        create_funded_owner(&db, "bob", 100.0).await?;
        let word = insert_raw_word(&db, "alice", TEN, 10.0).await?;
        word::upsert_preference(&db, word.id, "bob", 0.25).await?;
        let registry = load_registry(&db).await?;

        let outcome = handle_message(&db, &registry, &OwnerLocks::new(), Some("bob"), TEN).await?;

        assert_close(outcome.total_charged(), 2.5);
        assert_close(balance(&db, "bob").await, 97.5 + keystroke_reward(TEN));
        assert_close(balance(&db, "alice").await, 2.75);
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_messages_pay_at_most_once() -> Result<()> {
        let db = setup_test_db().await?;
        create_funded_owner(&db, "alice", 0.0).await?;
        create_funded_owner(&db, "bob", 10.0).await?;
        insert_raw_word(&db, "alice", TEN, 10.0).await?;
        let registry = Arc::new(load_registry(&db).await?);
        let locks = Arc::new(OwnerLocks::new());

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let db = db.clone();
                let registry = Arc::clone(&registry);
                let locks = Arc::clone(&locks);
                tokio::spawn(async move {
                    handle_message(&db, &registry, &locks, Some("bob"), TEN).await
                })
            })
            .collect();

        let mut outcomes = Vec::new();
        for task in tasks {
            outcomes.push(task.await.expect("settlement task panicked")?);
        }

        assert_eq!(outcomes.iter().filter(|o| !o.blocked).count(), 1);
        assert_eq!(outcomes.iter().filter(|o| o.blocked).count(), 7);
        assert_eq!(log_len(&db).await, 1);
        assert_close(balance(&db, "alice").await, 11.0);
        assert_close(balance(&db, "bob").await, 8.0 * keystroke_reward(TEN));
        Ok(())
    }

    #[tokio::test]
    async fn test_credit_during_held_lock_is_spendable() -> Result<()> {
        let db = setup_test_db().await?;
        create_funded_owner(&db, "alice", 0.0).await?;
        create_funded_owner(&db, "bob", 0.0).await?;
        create_funded_owner(&db, "carol", 100.0).await?;
        insert_raw_word(&db, "bob", TEN, 10.0).await?;
        let registry = load_registry(&db).await?;
        let locks = OwnerLocks::new();

        // carol pays bob's toll while bob's own message holds his lock
        let _bob_guard = locks.lock("bob").await;
        let outcome = handle_message(&db, &registry, &locks, Some("carol"), TEN).await?;
        assert!(!outcome.blocked);

        assert_close(spendable_balance(&db, "bob").await?, 11.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_credit_between_messages_unblocks_author() -> Result<()> {
        let db = setup_test_db().await?;
        create_funded_owner(&db, "alice", 0.0).await?;
        create_funded_owner(&db, "bob", 0.0).await?;
        insert_raw_word(&db, "alice", TEN, 10.0).await?;
        let registry = load_registry(&db).await?;
        let locks = OwnerLocks::new();

        let first = handle_message(&db, &registry, &locks, Some("bob"), TEN).await?;
        assert!(first.blocked);

        owner::update_owner_balance(&db, "bob", 10.0).await?;
        let second = handle_message(&db, &registry, &locks, Some("bob"), TEN).await?;
        assert!(!second.blocked);
        assert_eq!(log_len(&db).await, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_word_owner_is_invariant_violation() -> Result<()> {
        let db = setup_test_db().await?;
        create_funded_owner(&db, "bob", 100.0).await?;
        let stale = RegisteredWord {
            id: 42,
            text: TEN.to_string(),
            owner_id: "ghost".to_string(),
            price: 10.0,
            length: 10,
            preferences: HashMap::new(),
        };
        let registry = Registry::new(vec![stale]);

        let result = handle_message(&db, &registry, &OwnerLocks::new(), Some("bob"), TEN).await;

        assert!(matches!(result, Err(Error::InvariantViolation { .. })));
        assert_close(balance(&db, "bob").await, 100.0);
        Ok(())
    }
}
