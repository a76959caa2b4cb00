//! This module drives a feed from its two trigger sources
//!
//! Real consumers have two reasons to fetch: a fixed-interval timer that keeps the
//! cache fresh, and a signal that the rendered list is getting close to its end.
//! Both are multiplexed into [`EventFeed::trigger`] here, on one task; the feed's
//! single in-flight slot is what keeps them from ever overlapping.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::feed::{EventFeed, Trigger};
use crate::traits::EventSource;

/// How often the timer re-fetches the whole collection
pub const DEFAULT_REFRESH_PERIOD: Duration = Duration::from_secs(30);

/// A handle on the background task that feeds triggers into an [`EventFeed`]
pub struct SyncScheduler {
    driver: JoinHandle<()>,
    near_end: mpsc::Sender<()>,
}

impl SyncScheduler {
    /// Spawn the driving task.
    ///
    /// The first refresh happens immediately, the next ones every `period`
    /// (a failed fetch is simply retried at the next tick, there is no backoff).
    pub fn spawn<S>(feed: EventFeed<S>, period: Duration) -> Self
    where
        S: EventSource + Send + Sync + 'static,
    {
        // Capacity 1 on purpose: a "near the end" signal arriving while one is
        // already waiting carries no extra information
        let (near_end_tx, mut near_end_rx) = mpsc::channel(1);

        let driver = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        feed.trigger(Trigger::Refresh).await;
                    },
                    received = near_end_rx.recv() => match received {
                        Some(()) => {
                            feed.trigger(Trigger::NextPage).await;
                        },
                        None => break,
                    },
                }
            }
        });

        Self { driver, near_end: near_end_tx }
    }

    /// Signal that the consumer is close to the end of the rendered list.
    ///
    /// Never blocks. If the driver is still busy with a previous signal this one is
    /// dropped, which is fine: the pipeline would coalesce it anyway.
    pub fn near_end(&self) {
        let _ = self.near_end.try_send(());
    }

    /// Tear the driver down, cancelling any fetch still in flight
    pub fn shutdown(&self) {
        self.driver.abort();
    }
}

impl Drop for SyncScheduler {
    fn drop(&mut self) {
        self.driver.abort();
    }
}
