//! Pagination types
//!
//! The page envelope every listing endpoint returns, and the continuation
//! token handling shared by all iterators.

use crate::config::API_VERSION_PREFIX;
use crate::types::JsonValue;
use serde::Deserialize;

/// One page of listing results as sent by the server
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Page {
    /// Entries in this page
    pub count: u64,
    /// Total matches; only some endpoints report it, sometimes only once
    pub total_count: i64,
    /// Absolute path of the next page, if any
    pub next: Option<String>,
    /// Absolute path of the previous page, if any
    pub prev: Option<String>,
    pub results: Vec<RawEntry>,
}

impl Page {
    /// Continuation token for the page after this one
    pub fn next_token(&self) -> Option<String> {
        self.next.as_deref().and_then(continuation_token)
    }
}

/// A single listing entry before projection
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawEntry {
    pub path: EntryPath,
    /// Search relevance
    pub score: f32,
    /// Geo search distance
    pub distance: f32,
    /// Revision time in ms since epoch
    pub reftime: i64,
    /// Event time in ms since epoch (events)
    pub timestamp: i64,
    pub ordinal: i64,
    /// Unparsed value, `Null` when omitted
    pub value: JsonValue,
}

/// Location descriptor of an entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EntryPath {
    pub collection: String,
    pub key: String,
    #[serde(rename = "ref")]
    pub reference: String,
    pub ordinal: i64,
    pub timestamp: i64,
    pub tombstone: bool,
    #[serde(rename = "type")]
    pub event_type: String,
}

/// Turn a server `next`/`prev` value into a relative request path.
///
/// The server answers with paths from the root (`/v0/c?offset=10`) while the
/// transport joins paths onto the versioned base URL. Empty values mean there
/// is no such page.
pub fn continuation_token(link: &str) -> Option<String> {
    let trimmed = link.trim();
    let relative = trimmed
        .strip_prefix(API_VERSION_PREFIX)
        .or_else(|| trimmed.strip_prefix(API_VERSION_PREFIX.trim_start_matches('/')))
        .unwrap_or(trimmed);
    if relative.is_empty() {
        None
    } else {
        Some(relative.to_string())
    }
}
