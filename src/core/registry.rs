//! Word registry - an immutable snapshot of every live word, used to scan messages.
//!
//! A snapshot is loaded with [`Registry::load`] and never changes afterwards; after
//! any mutation (register, cancel, buy, discount) the caller loads a new one and
//! swaps it in.
//!
//! Scanning is greedy by length: longer words are searched first and every match
//! claims its byte span, so a shorter word can never match inside or across text
//! already claimed by a longer one. [`Registry::scan_matches`] is lazy, which lets
//! settlement stop discovering words the moment a message is blocked.

use crate::{
    core::word::fee,
    entities::{Preference, word},
    errors::Result,
};
use sea_orm::{ConnectionTrait, EntityTrait};
use std::{collections::HashMap, ops::Range};

/// A live word together with everything settlement needs to charge for it.
#[derive(Debug, Clone, PartialEq)]
pub struct RegisteredWord {
    /// Word id
    pub id: i64,
    /// Registered text
    pub text: String,
    /// Owner at snapshot time
    pub owner_id: String,
    /// Registration price
    pub price: f64,
    /// Length in syllables
    pub length: usize,
    /// Beneficiary id to rate multiplier; absent means 1
    pub preferences: HashMap<String, f64>,
}

impl RegisteredWord {
    /// Builds a snapshot entry from a stored word and its preference rates.
    #[must_use]
    pub fn new(word: word::Model, preferences: HashMap<String, f64>) -> Self {
        let length = word.text.chars().count();
        Self {
            id: word.id,
            text: word.text,
            owner_id: word.owner_id,
            price: word.price,
            length,
            preferences,
        }
    }

    /// Base toll per use, before discounts.
    #[must_use]
    pub fn fee(&self) -> f64 {
        fee(&self.text, self.price)
    }

    /// Multiplier `user_id` pays on this word.
    #[must_use]
    pub fn rate_for(&self, user_id: &str) -> f64 {
        self.preferences.get(user_id).copied().unwrap_or(1.0)
    }
}

/// Point-in-time set of live words, ordered for scanning.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    // Longest first; equal lengths by ascending id so scans are reproducible
    words: Vec<RegisteredWord>,
}

impl Registry {
    /// Builds a registry from arbitrary entries. Empty texts are dropped.
    #[must_use]
    pub fn new(mut words: Vec<RegisteredWord>) -> Self {
        words.retain(|w| !w.text.is_empty());
        words.sort_by(|a, b| b.length.cmp(&a.length).then(a.id.cmp(&b.id)));
        Self { words }
    }

    /// Loads a fresh snapshot of every live word and its preference rates.
    pub async fn load<C>(db: &C) -> Result<Self>
    where
        C: ConnectionTrait,
    {
        let words = crate::core::word::all_words(db).await?;

        let mut preferences: HashMap<i64, HashMap<String, f64>> = HashMap::new();
        for pref in Preference::find().all(db).await? {
            preferences
                .entry(pref.word_id)
                .or_default()
                .insert(pref.owner_id, pref.rate);
        }

        let entries = words
            .into_iter()
            .map(|w| {
                let prefs = preferences.remove(&w.id).unwrap_or_default();
                RegisteredWord::new(w, prefs)
            })
            .collect();

        let registry = Self::new(entries);
        tracing::debug!("Loaded registry snapshot with {} words", registry.len());
        Ok(registry)
    }

    /// Words in scan order.
    #[must_use]
    pub fn words(&self) -> &[RegisteredWord] {
        &self.words
    }

    /// Looks a word up by its exact text.
    #[must_use]
    pub fn get(&self, text: &str) -> Option<&RegisteredWord> {
        self.words.iter().find(|w| w.text == text)
    }

    /// Number of words in the snapshot.
    #[must_use]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Whether the snapshot is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Lazily finds registered words in `text`, longest first, without overlap.
    #[must_use]
    pub fn scan_matches<'r, 't>(&'r self, text: &'t str) -> Matches<'r, 't> {
        Matches {
            words: &self.words,
            text,
            index: 0,
            cursor: 0,
            occupied: SpanTracker::default(),
        }
    }
}

/// One occurrence of a registered word.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Match<'r> {
    /// The word that matched
    pub word: &'r RegisteredWord,
    /// Byte offset of the occurrence in the scanned text
    pub start: usize,
}

impl Match<'_> {
    /// Byte range covered by the occurrence.
    #[must_use]
    pub fn span(&self) -> Range<usize> {
        self.start..self.start + self.word.text.len()
    }
}

/// Byte ranges already claimed by earlier matches.
#[derive(Debug, Default, Clone)]
pub(crate) struct SpanTracker {
    spans: Vec<Range<usize>>,
}

impl SpanTracker {
    pub(crate) fn overlaps(&self, range: &Range<usize>) -> bool {
        self.spans
            .iter()
            .any(|s| s.start < range.end && range.start < s.end)
    }

    pub(crate) fn occupy(&mut self, range: Range<usize>) {
        self.spans.push(range);
    }

    pub(crate) fn into_spans(self) -> Vec<Range<usize>> {
        self.spans
    }
}

/// Leftmost occurrence of `needle` at or after `from` that touches no claimed span.
pub(crate) fn find_free(
    text: &str,
    needle: &str,
    mut from: usize,
    occupied: &SpanTracker,
) -> Option<usize> {
    if needle.is_empty() {
        return None;
    }
    while let Some(offset) = text.get(from..)?.find(needle) {
        let start = from + offset;
        if !occupied.overlaps(&(start..start + needle.len())) {
            return Some(start);
        }
        // Step one character past the rejected start and keep looking
        from = start + text[start..].chars().next().map_or(1, char::len_utf8);
    }
    None
}

/// Iterator returned by [`Registry::scan_matches`].
///
/// Matches come out in discovery order: all occurrences of the longest word left
/// to right, then the next word, and so on.
#[derive(Debug)]
pub struct Matches<'r, 't> {
    words: &'r [RegisteredWord],
    text: &'t str,
    index: usize,
    cursor: usize,
    occupied: SpanTracker,
}

impl<'r> Iterator for Matches<'r, '_> {
    type Item = Match<'r>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(word) = self.words.get(self.index) {
            if let Some(start) = find_free(self.text, &word.text, self.cursor, &self.occupied) {
                let end = start + word.text.len();
                self.occupied.occupy(start..end);
                self.cursor = end;
                return Some(Match { word, start });
            }
            self.index += 1;
            self.cursor = 0;
        }
        None
    }
}
