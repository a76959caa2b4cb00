//! This module provides a client that fetches event records over HTTP
//!
//! This is the only part of the crate that talks to the network. It is deliberately
//! thin: records come back raw and are validated by the pipeline, not here.

use std::error::Error;

use async_trait::async_trait;
use serde_json::Value;
use url::Url;

use crate::settings;
use crate::traits::{EventSource, FetchRequest};

/// An [`EventSource`] backed by the events endpoint of a remote server
#[derive(Clone, Debug)]
pub struct RemoteFeed {
    endpoint: Url,
    http: reqwest::Client,
}

impl RemoteFeed {
    /// Create a client. This does not issue any request yet
    pub fn new<S: AsRef<str>>(base_url: S) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let endpoint = Url::parse(base_url.as_ref())?.join("events")?;
        let user_agent = settings::USER_AGENT.lock().unwrap().clone();
        let http = reqwest::Client::builder()
            .user_agent(user_agent)
            .build()?;

        Ok(Self { endpoint, http })
    }

    fn request_url(&self, request: &FetchRequest) -> Url {
        let mut url = self.endpoint.clone();
        if let FetchRequest::Page { limit, cursor } = request {
            url.query_pairs_mut().append_pair("limit", &limit.to_string());
            if let Some(cursor) = cursor {
                url.query_pairs_mut().append_pair("cursor", cursor);
            }
        }
        url
    }
}

#[async_trait]
impl EventSource for RemoteFeed {
    async fn fetch(&self, request: &FetchRequest) -> Result<Vec<Value>, Box<dyn Error + Send + Sync>> {
        let url = self.request_url(request);
        log::debug!("Fetching {}", url);

        let response = self.http.get(url.as_str()).send().await?;
        if response.status().is_success() == false {
            return Err(format!("The server answered {} to {}", response.status(), url).into());
        }

        let records: Vec<Value> = response.json().await?;
        Ok(records)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_urls() {
        let feed = RemoteFeed::new("http://localhost:5001/").unwrap();

        let url = feed.request_url(&FetchRequest::Everything);
        assert_eq!(url.as_str(), "http://localhost:5001/events");

        let url = feed.request_url(&FetchRequest::Page { limit: 25, cursor: None });
        assert_eq!(url.as_str(), "http://localhost:5001/events?limit=25");

        let url = feed.request_url(&FetchRequest::Page { limit: 25, cursor: Some("abc".to_string()) });
        assert_eq!(url.as_str(), "http://localhost:5001/events?limit=25&cursor=abc");
    }
}
