//! This module provides an in-memory cache of events, keyed by identity
//!
//! The cache is what makes repeated and paginated fetches cheap to reconcile: batches
//! are folded in by id, so fetching the same records twice can never produce
//! duplicate entries.

use std::collections::HashMap;
use std::collections::HashSet;

use crate::event::{Event, EventId};
use crate::utils::keys_are_the_same;

/// How a batch of fetched events is folded into the cache
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MergeMode {
    /// Insert or overwrite the events of the batch, and keep every cached entry the
    /// batch does not mention. This is the only mode that makes sense for paginated
    /// fetches, where a batch is one page of many
    Merge,
    /// The batch is a complete snapshot of the collection: cached entries absent
    /// from it are dropped
    Replace,
}

/// A tally of what a merge did
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MergeOutcome {
    pub added: usize,
    pub updated: usize,
}

/// The set of currently known events, deduplicated by id.
///
/// Iteration order is unspecified. Display ordering is established downstream, by
/// [`grouping`](crate::grouping), never by iterating this cache.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EventCache {
    events: HashMap<EventId, Event>,
}

impl EventCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn get(&self, id: &EventId) -> Option<&Event> {
        self.events.get(id)
    }

    pub fn events(&self) -> impl Iterator<Item = &Event> {
        self.events.values()
    }

    /// Clone the current contents into a vector.
    ///
    /// Derivations (filter, group, flatten) work on one such snapshot so they never
    /// observe a cache mid-merge.
    pub fn snapshot(&self) -> Vec<Event> {
        self.events.values().cloned().collect()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Fold a batch of events into the cache.
    ///
    /// An already-known id is overwritten wholesale by the batch's version (last write
    /// wins, in batch order). Merging the same batch twice leaves the cache exactly as
    /// if it had been merged once.
    pub fn merge(&mut self, batch: Vec<Event>, mode: MergeMode) -> MergeOutcome {
        if mode == MergeMode::Replace {
            let incoming: HashSet<EventId> = batch.iter().map(|event| event.id().clone()).collect();
            self.events.retain(|id, _| incoming.contains(id));
        }

        let mut outcome = MergeOutcome::default();
        for event in batch {
            match self.events.insert(event.id().clone(), event) {
                None => outcome.added += 1,
                Some(_) => outcome.updated += 1,
            }
        }
        outcome
    }

    /// Compares two caches to check they hold the same current content
    pub fn has_same_events_as(&self, other: &Self) -> bool {
        if keys_are_the_same(&self.events, &other.events) == false {
            return false;
        }

        for (id, event) in &self.events {
            match other.events.get(id) {
                Some(other_event) => {
                    if event != other_event {
                        return false;
                    }
                },
                None => return false,
            }
        }
        true
    }
}
