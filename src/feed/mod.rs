//! This module ties the cache, the filters and the fetch seam together into one
//! pipeline instance
//!
//! An [`EventFeed`] is created per consuming view. It owns the cache and the state
//! machine that serializes fetches, and it derives the grouped and flattened
//! structures the presentation layer renders.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{FixedOffset, Local, NaiveDate, Utc};

pub mod status;
use status::{FeedStatus, StatusReceiver, StatusSender};

use crate::cache::{EventCache, MergeMode, MergeOutcome};
use crate::event::Event;
use crate::filters::{is_upcoming, CategorySelection};
use crate::grouping::{self, DayGroup};
use crate::record;
use crate::traits::{EventSource, FetchRequest};

/// How long a fetch may take before it is treated as failed
#[cfg(not(test))]
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);
/// How long a fetch may take before it is treated as failed
#[cfg(test)]
const FETCH_TIMEOUT: Duration = Duration::from_millis(50);


/// What made the pipeline fetch
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Trigger {
    /// The fixed-interval timer: re-fetch the whole collection
    Refresh,
    /// The consumer is close to the end of the rendered list: fetch the next page
    NextPage,
}

/// Where the fetch state machine currently stands
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SyncState {
    Idle,
    Fetching,
    /// The last fetch failed; the next trigger will retry it
    FetchFailed,
}

/// What a call to [`EventFeed::trigger`] did
#[derive(Clone, Debug, PartialEq)]
pub enum TriggerOutcome {
    /// A batch was fetched and folded into the cache
    Merged { outcome: MergeOutcome, rejected: usize },
    /// Another fetch was already in flight, so this trigger was dropped.
    /// The next regular trigger will naturally re-fetch
    Coalesced,
    /// A next page was asked for, but the source already told us there are no more
    UpToDate,
    /// The fetch failed or timed out. Cached events are untouched
    Failed,
    /// The feed was reset while this fetch was in flight; its result was discarded
    Discarded,
}

/// Tunables of one pipeline instance
#[derive(Clone, Copy, Debug)]
pub struct FeedConfig {
    /// How many records a paginated fetch asks for
    pub page_size: usize,
    /// How a full refresh is folded into the cache. `Merge` (the default) keeps
    /// events that dropped out of the response; `Replace` treats every refresh as a
    /// complete snapshot of the collection
    pub refresh_merge: MergeMode,
    /// The viewer's time zone, used to cut days
    pub timezone: FixedOffset,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            page_size: 25,
            refresh_merge: MergeMode::Merge,
            timezone: *Local::now().offset(),
        }
    }
}


/// The bookkeeping guarded by the feed's lock
#[derive(Debug)]
struct FeedState {
    cache: EventCache,
    sync: SyncState,
    /// Whether a paginated source may still hold records we have not seen
    has_more: bool,
    /// Id of the last record of the last fetched page
    cursor: Option<String>,
    /// Bumped by [`EventFeed::reset`]. A fetch completion carrying a stale
    /// generation is discarded instead of resurrecting torn-down state
    generation: u64,
}

impl FeedState {
    fn new() -> Self {
        Self {
            cache: EventCache::new(),
            sync: SyncState::Idle,
            has_more: true,
            cursor: None,
            generation: 0,
        }
    }
}


/// A self-contained sync pipeline for one consuming view.
///
/// Handles are cheap to clone and all point at the same cache and state, which is how
/// the trigger driver, the presentation layer and the teardown path share one feed.
pub struct EventFeed<S> {
    source: Arc<S>,
    state: Arc<Mutex<FeedState>>,
    status: Arc<StatusSender>,
    config: FeedConfig,
}

impl<S> Clone for EventFeed<S> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            state: Arc::clone(&self.state),
            status: Arc::clone(&self.status),
            config: self.config,
        }
    }
}

impl<S: EventSource> EventFeed<S> {
    /// Create a feed with the default configuration
    pub fn new(source: S) -> Self {
        Self::with_config(source, FeedConfig::default())
    }

    pub fn with_config(source: S, config: FeedConfig) -> Self {
        let (status, _) = status::status_channel();
        Self {
            source: Arc::new(source),
            state: Arc::new(Mutex::new(FeedState::new())),
            status: Arc::new(status),
            config,
        }
    }

    /// Subscribe to status updates, for non-blocking UI feedback
    pub fn subscribe(&self) -> StatusReceiver {
        self.status.subscribe()
    }

    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    pub fn sync_state(&self) -> SyncState {
        self.state.lock().unwrap().sync
    }

    pub fn event_count(&self) -> usize {
        self.state.lock().unwrap().cache.len()
    }

    pub fn has_more_pages(&self) -> bool {
        self.state.lock().unwrap().has_more
    }

    /// Run one fetch cycle for the given trigger.
    ///
    /// At most one fetch is ever in flight: a trigger arriving while another fetch is
    /// pending is dropped, not queued ([`TriggerOutcome::Coalesced`]). This is the
    /// sole guard against interleaved, conflicting merges, so the state is checked
    /// and flipped before the first suspension point.
    pub async fn trigger(&self, trigger: Trigger) -> TriggerOutcome {
        let (request, generation) = {
            let mut state = self.state.lock().unwrap();
            if state.sync == SyncState::Fetching {
                log::debug!("A fetch is already in flight, dropping this {:?} trigger", trigger);
                return TriggerOutcome::Coalesced;
            }
            let request = match trigger {
                Trigger::Refresh => FetchRequest::Everything,
                Trigger::NextPage => {
                    if state.has_more == false {
                        return TriggerOutcome::UpToDate;
                    }
                    FetchRequest::Page { limit: self.config.page_size, cursor: state.cursor.clone() }
                },
            };
            state.sync = SyncState::Fetching;
            (request, state.generation)
        };

        let _ = self.status.send(FeedStatus::Loading);
        let result = tokio::time::timeout(FETCH_TIMEOUT, self.source.fetch(&request)).await;

        let mut state = self.state.lock().unwrap();
        if state.generation != generation {
            // The view this fetch was started for has been torn down in the meantime
            log::debug!("Discarding a fetch that resolved after its feed was reset");
            return TriggerOutcome::Discarded;
        }

        let batch = match result {
            Err(_elapsed) => {
                return Self::fail(&mut state, &self.status, format!("fetch timed out after {:?}", FETCH_TIMEOUT));
            },
            Ok(Err(err)) => {
                return Self::fail(&mut state, &self.status, err.to_string());
            },
            Ok(Ok(batch)) => batch,
        };

        let fetched = batch.len();
        let mut events = Vec::with_capacity(fetched);
        let mut rejected = 0;
        for raw in &batch {
            match record::normalize(raw) {
                Ok(event) => events.push(event),
                Err(reason) => {
                    log::warn!("Skipping one record of the batch: {}", reason);
                    rejected += 1;
                },
            }
        }

        if let FetchRequest::Page { limit, .. } = &request {
            state.has_more = fetched >= *limit;
            // The cursor advances on the raw batch, so that a page full of rejects
            // cannot make the next fetch re-serve the same page forever
            if let Some(last_id) = batch.last().and_then(|raw| raw.get("id")).and_then(|id| id.as_str()) {
                state.cursor = Some(last_id.to_string());
            }
        }

        let mode = match trigger {
            Trigger::Refresh => self.config.refresh_merge,
            Trigger::NextPage => MergeMode::Merge,
        };
        let outcome = state.cache.merge(events, mode);
        state.sync = SyncState::Idle;
        log::info!("Merged a batch of {}: {} added, {} updated, {} rejected",
            fetched, outcome.added, outcome.updated, rejected);

        let _ = self.status.send(FeedStatus::Idle);
        TriggerOutcome::Merged { outcome, rejected }
    }

    fn fail(state: &mut FeedState, status: &StatusSender, message: String) -> TriggerOutcome {
        log::warn!("Fetch failed: {}. Keeping {} cached events on display", message, state.cache.len());
        state.sync = SyncState::FetchFailed;
        let _ = status.send(FeedStatus::Error(message));
        TriggerOutcome::Failed
    }

    /// Drop every cached event and forget the pagination position.
    ///
    /// This is the teardown path (view unmount, sign-out). A fetch still in flight
    /// when this is called will have its eventual result discarded instead of
    /// repopulating the state.
    pub fn reset(&self) {
        let mut state = self.state.lock().unwrap();
        state.cache.clear();
        state.cursor = None;
        state.has_more = true;
        state.sync = SyncState::Idle;
        state.generation += 1;
        let _ = self.status.send(FeedStatus::Idle);
    }

    /// The grouped-by-day structure to render: upcoming events matching `selection`,
    /// cut into ascending day buckets.
    ///
    /// `as_of` is "today" in the viewer's time zone, snapshotted once by the caller so
    /// the whole derivation agrees on it.
    pub fn grouped_as_of(&self, selection: CategorySelection, as_of: NaiveDate) -> Vec<DayGroup> {
        let snapshot = { self.state.lock().unwrap().cache.snapshot() };
        let timezone = self.config.timezone;

        let visible = snapshot.into_iter()
            .filter(|event| is_upcoming(event, as_of, timezone))
            .filter(|event| selection.matches(event))
            .collect();
        grouping::group_by_day(visible, timezone)
    }

    /// See [`Self::grouped_as_of`]; this snapshots "today" for you
    pub fn grouped(&self, selection: CategorySelection) -> Vec<DayGroup> {
        self.grouped_as_of(selection, self.today())
    }

    /// The flat, chronologically sorted sequence that drives next/previous navigation
    /// in a detail view
    pub fn flattened_as_of(&self, selection: CategorySelection, as_of: NaiveDate) -> Vec<Event> {
        grouping::flatten(&self.grouped_as_of(selection, as_of))
    }

    /// See [`Self::flattened_as_of`]; this snapshots "today" for you
    pub fn flattened(&self, selection: CategorySelection) -> Vec<Event> {
        self.flattened_as_of(selection, self.today())
    }

    /// Today's date in the viewer's time zone
    fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.config.timezone).date_naive()
    }
}
