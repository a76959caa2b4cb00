use std::error::Error;

use async_trait::async_trait;
use serde_json::Value;

/// What a single fetch should retrieve
#[derive(Clone, Debug, PartialEq)]
pub enum FetchRequest {
    /// The whole collection in one response
    Everything,
    /// One page of at most `limit` records, starting after `cursor`.
    /// `cursor` is the id of the last record of the previous page; `None` asks for
    /// the first page.
    Page { limit: usize, cursor: Option<String> },
}

/// A source of raw event records.
///
/// Implementations return raw, unvalidated records: normalization happens inside the
/// pipeline, so that one bad record cannot poison a whole response.
///
/// Answering a [`FetchRequest::Page`] with fewer records than requested means there
/// are no more pages.
#[async_trait]
pub trait EventSource {
    async fn fetch(&self, request: &FetchRequest) -> Result<Vec<Value>, Box<dyn Error + Send + Sync>>;
}

/// Sources are commonly shared between a feed and the test or UI code driving it
#[async_trait]
impl<S: EventSource + Send + Sync> EventSource for std::sync::Arc<S> {
    async fn fetch(&self, request: &FetchRequest) -> Result<Vec<Value>, Box<dyn Error + Send + Sync>> {
        self.as_ref().fetch(request).await
    }
}
