//! This crate keeps a local, renderable copy of a remote campus event feed.
//!
//! It provides an HTTP client for the feed's events endpoint in the [`client`] module, that can be used as a stand-alone source.
//!
//! Because the collection lives behind a slow network and the consumer re-renders often, every fetched event is kept in an identity-keyed [`EventCache`](cache::EventCache): re-fetching and paginating can only ever update entries, never duplicate them. \
//! The cache, the upcoming/category [`filters`], the per-day [`grouping`] and the fetch seam ([`traits::EventSource`]) are tied together by an [`EventFeed`](feed::EventFeed), which also serializes every fetch through a single in-flight slot. \
//! A [`SyncScheduler`](scheduler::SyncScheduler) drives that feed from a fixed-interval timer and from the consumer's "near the end of the list" signals.

pub mod traits;

mod event;
pub use event::Category;
pub use event::Event;
pub use event::EventId;
pub use event::Perks;
pub mod record;
pub use record::RejectReason;
pub mod cache;
pub use cache::EventCache;
pub use cache::MergeMode;
pub mod filters;
pub use filters::CategorySelection;
pub mod grouping;
pub use grouping::DayGroup;
pub mod feed;
pub use feed::EventFeed;
pub use feed::FeedConfig;
pub use feed::Trigger;
pub use feed::TriggerOutcome;
pub use feed::status::FeedStatus;
pub mod scheduler;
pub use scheduler::SyncScheduler;

pub mod client;
pub use client::RemoteFeed;

pub mod settings;
pub mod utils;
