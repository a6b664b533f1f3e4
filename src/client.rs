//! Client entry points
//!
//! [`Client`] owns the transport; [`Collection`] is a named handle that hands
//! out lazily paginated [`ResultIter`]s for every listing endpoint. Creating
//! either one never touches the network.

use crate::error::{Error, Result};
use crate::http::{HttpClient, HttpClientConfig};
use crate::pagination::ResultIter;
use crate::query::{
    events_path, history_path, links_path, list_path, search_path, GetLinksQuery, HistoryQuery,
    ListEventsQuery, ListQuery, SearchQuery,
};
use crate::records::ResultKind;
use reqwest::StatusCode;
use tracing::debug;

/// Orchestrate API client
#[derive(Debug, Clone)]
pub struct Client {
    http: HttpClient,
}

impl Client {
    /// Client for the hosted API using the given API key
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Ok(Self {
            http: HttpClient::new(api_key)?,
        })
    }

    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        Ok(Self {
            http: HttpClient::with_config(config)?,
        })
    }

    /// Client configured from `ORCHESTRATE_API_KEY` / `ORCHESTRATE_API_HOST`
    pub fn from_env() -> Result<Self> {
        Self::with_config(HttpClientConfig::from_env()?)
    }

    /// Wrap an existing transport
    pub fn from_http(http: HttpClient) -> Self {
        Self { http }
    }

    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    /// Handle for a collection. Does not check that it exists.
    pub fn collection(&self, name: impl Into<String>) -> Collection {
        Collection {
            name: name.into(),
            http: self.http.clone(),
        }
    }

    /// Check that the API is reachable and the key is accepted
    pub fn ping(&self) -> Result<()> {
        let response = self.http.head("")?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(Error::http_status(
                status.as_u16(),
                format!("ping expected 200, got {status}"),
            ));
        }
        debug!(url = %self.http.base_url(), "ping ok");
        Ok(())
    }
}

/// A named collection
#[derive(Debug, Clone)]
pub struct Collection {
    name: String,
    http: HttpClient,
}

impl Collection {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Walk the collection's items in key order
    pub fn list(&self, query: Option<&ListQuery>) -> ResultIter<HttpClient> {
        self.iter(list_path(&self.name, query), ResultKind::Items)
    }

    /// Full text search over the collection
    pub fn search(&self, query: &str, options: Option<&SearchQuery>) -> ResultIter<HttpClient> {
        self.iter(search_path(&self.name, query, options), ResultKind::Search)
    }

    /// Walk every revision of one item, newest first
    pub fn history(&self, key: &str, query: Option<&HistoryQuery>) -> ResultIter<HttpClient> {
        self.iter(history_path(&self.name, key, query), ResultKind::History)
    }

    /// Walk the events of one type attached to an item, newest first
    pub fn list_events(
        &self,
        key: &str,
        event_type: &str,
        query: Option<&ListEventsQuery>,
    ) -> ResultIter<HttpClient> {
        self.iter(
            events_path(&self.name, key, event_type, query),
            ResultKind::Events,
        )
    }

    /// Follow one or more relation kinds out of an item.
    ///
    /// `kinds` is walked in order, so `["friends", "likes"]` yields the
    /// items liked by the item's friends.
    pub fn get_links(
        &self,
        key: &str,
        kinds: &[&str],
        query: Option<&GetLinksQuery>,
    ) -> ResultIter<HttpClient> {
        self.iter(links_path(&self.name, key, kinds, query), ResultKind::Items)
    }

    fn iter(&self, path: String, kind: ResultKind) -> ResultIter<HttpClient> {
        debug!(collection = %self.name, %kind, path = %path, "new result iterator");
        ResultIter::new(self.http.clone(), path, kind)
    }
}
