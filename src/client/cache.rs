//! # Local Feed Cache
//!
//! The viewer's ordered copy of the feed. Entries are kept in feed order
//! (`createdAt` descending, then id ascending) and are unique by id. Each entry
//! carries a `provisional` flag that is never sent over the wire: `true` for a
//! message this viewer submitted and the server has not confirmed yet.
//!
//! The cache itself has no locking; `ClientSyncEngine` owns it behind its
//! mutex and records every change as a [`CacheMutation`].

use crate::shared::{feed_order, Message};
use std::cmp::Ordering;
use std::collections::HashSet;

/// One cached message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedMessage {
    pub message: Message,
    pub provisional: bool,
}

/// Observable change applied to a cache
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheMutation {
    /// Replaced wholesale by an initial snapshot
    Seeded { count: usize },
    /// A message was merged in at its ordered position
    Inserted { id: String, provisional: bool },
    /// A provisional entry was replaced by the confirmed message
    Confirmed { id: String, moved: bool },
    /// A provisional entry was removed after a failed submission
    RolledBack { id: String },
    /// A delivered message was already present
    IgnoredDuplicate { id: String },
    /// Replaced by a fresh snapshot, keeping unconfirmed local entries
    Resynced { count: usize, kept_provisional: usize },
}

/// Ordered, id-unique message list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedCache {
    entries: Vec<CachedMessage>,
}

impl FeedCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache holding `messages` as confirmed entries
    ///
    /// Duplicate ids keep their first occurrence.
    pub fn seeded(messages: Vec<Message>) -> Self {
        let mut cache = Self::new();
        for message in messages {
            cache.insert(message, false);
        }
        cache
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    pub fn get(&self, id: &str) -> Option<&CachedMessage> {
        self.position(id).map(|index| &self.entries[index])
    }

    pub fn entries(&self) -> &[CachedMessage] {
        &self.entries
    }

    /// Plain messages in feed order
    pub fn messages(&self) -> Vec<Message> {
        self.entries.iter().map(|entry| entry.message.clone()).collect()
    }

    /// Entries still waiting for confirmation
    pub fn provisional(&self) -> impl Iterator<Item = &CachedMessage> {
        self.entries.iter().filter(|entry| entry.provisional)
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.entries.iter().position(|entry| entry.message.id == id)
    }

    fn ordered_slot(&self, message: &Message) -> usize {
        self.entries
            .partition_point(|entry| feed_order(&entry.message, message) == Ordering::Less)
    }

    /// Merge `message` at its ordered position
    ///
    /// Returns `false` and leaves the cache untouched if the id is present.
    pub fn insert(&mut self, message: Message, provisional: bool) -> bool {
        if self.contains(&message.id) {
            return false;
        }
        let slot = self.ordered_slot(&message);
        self.entries.insert(slot, CachedMessage { message, provisional });
        true
    }

    /// Replace the entry for `id` with the confirmed message
    ///
    /// Returns whether the entry changed position. When `id` is no longer
    /// cached the confirmed message is simply merged in.
    pub fn confirm(&mut self, id: &str, confirmed: Message) -> bool {
        let old_index = self.position(id);
        if let Some(index) = old_index {
            self.entries.remove(index);
        }
        if let Some(index) = self.position(&confirmed.id) {
            self.entries.remove(index);
        }

        let slot = self.ordered_slot(&confirmed);
        self.entries.insert(
            slot,
            CachedMessage {
                message: confirmed,
                provisional: false,
            },
        );
        old_index != Some(slot)
    }

    /// Remove the entry for `id`
    pub fn remove(&mut self, id: &str) -> Option<CachedMessage> {
        self.position(id).map(|index| self.entries.remove(index))
    }

    /// Replace contents with `snapshot`, keeping provisional entries it lacks
    ///
    /// Returns how many provisional entries were kept.
    pub fn resync(&mut self, snapshot: Vec<Message>) -> usize {
        let pending: Vec<Message> = self
            .provisional()
            .map(|entry| entry.message.clone())
            .collect();

        *self = Self::seeded(snapshot);

        let confirmed_ids: HashSet<String> =
            self.entries.iter().map(|entry| entry.message.id.clone()).collect();
        pending
            .into_iter()
            .filter(|message| !confirmed_ids.contains(&message.id))
            .map(|message| self.insert(message, true))
            .filter(|inserted| *inserted)
            .count()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
