//! Utilities to surface the state of the pipeline to its consumer

use std::fmt::{Display, Error, Formatter};

/// What the pipeline is currently doing, for non-blocking UI feedback
#[derive(Clone, Debug, PartialEq)]
pub enum FeedStatus {
    /// No fetch is running; the cached events are the freshest we have
    Idle,
    /// A fetch is in flight
    Loading,
    /// The last fetch failed. Previously cached events keep being served
    Error(String),
}

impl Display for FeedStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        match self {
            FeedStatus::Idle => write!(f, "Idle"),
            FeedStatus::Loading => write!(f, "Loading..."),
            FeedStatus::Error(message) => write!(f, "Fetch failed: {}", message),
        }
    }
}

impl Default for FeedStatus {
    fn default() -> Self {
        Self::Idle
    }
}



/// See [`status_channel`]
pub type StatusSender = tokio::sync::watch::Sender<FeedStatus>;
/// See [`status_channel`]
pub type StatusReceiver = tokio::sync::watch::Receiver<FeedStatus>;

/// Create a status channel, that can be used to watch what the pipeline is doing
pub fn status_channel() -> (StatusSender, StatusReceiver) {
    tokio::sync::watch::channel(FeedStatus::default())
}
