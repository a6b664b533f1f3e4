//! Record types
//!
//! The four result shapes a listing can produce, and the closed set of
//! iterator kinds that select between them.

use crate::error::{Error, Result};
use crate::types::JsonValue;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which result shape an iterator produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultKind {
    /// Key/value listings and graph link walks
    Items,
    /// Event listings for a key and type
    Events,
    /// Full-text search results
    Search,
    /// Ref history of a single key
    History,
}

impl ResultKind {
    /// Short lowercase name used in messages
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Items => "item",
            Self::Events => "event",
            Self::Search => "search",
            Self::History => "history",
        }
    }
}

impl fmt::Display for ResultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Item
// ============================================================================

/// A key/value item from a plain listing or a graph walk
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Item {
    /// Collection holding the item
    pub collection: String,
    /// Key of the item within its collection
    pub key: String,
    /// Immutable identifier of this revision
    #[serde(rename = "ref")]
    pub reference: String,
    /// When this revision was written
    pub updated: DateTime<Utc>,
    /// Raw JSON value
    pub value: JsonValue,
}

impl Item {
    /// Decode the value into a typed structure
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        decode_value(&self.key, &self.value)
    }
}

// ============================================================================
// Event
// ============================================================================

/// A single event attached to a key
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    pub collection: String,
    pub key: String,
    /// Per-key sequence number, increasing
    pub ordinal: i64,
    #[serde(rename = "ref")]
    pub reference: String,
    /// User supplied event type
    #[serde(rename = "type")]
    pub event_type: String,
    /// Event time, millisecond precision
    pub timestamp: DateTime<Utc>,
    pub value: JsonValue,
}

impl Event {
    /// Decode the value into a typed structure
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        decode_value(&self.key, &self.value)
    }
}

// ============================================================================
// Search hit
// ============================================================================

/// An item matched by a search query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub collection: String,
    pub key: String,
    #[serde(rename = "ref")]
    pub reference: String,
    /// Relevance score; higher is a better match
    pub score: f32,
    /// Set by geo queries, in which case `score` is zero
    pub distance: f32,
    /// When the matched revision was written
    pub updated: DateTime<Utc>,
    pub value: JsonValue,
}

impl SearchHit {
    /// Decode the value into a typed structure
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        decode_value(&self.key, &self.value)
    }
}

// ============================================================================
// History entry
// ============================================================================

/// One revision of a key, newest first
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub collection: String,
    pub key: String,
    #[serde(rename = "ref")]
    pub reference: String,
    /// True when this revision is a delete marker
    pub tombstone: bool,
    /// When the revision was written
    pub updated: DateTime<Utc>,
    /// `Null` unless the history was requested with values
    pub value: JsonValue,
}

impl HistoryEntry {
    /// Decode the value into a typed structure
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        decode_value(&self.key, &self.value)
    }
}

// ============================================================================
// Record
// ============================================================================

/// A typed result, one variant per [`ResultKind`]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Record {
    Item(Item),
    Event(Event),
    SearchHit(SearchHit),
    History(HistoryEntry),
}

impl Record {
    /// The iterator kind that produces this variant
    pub fn kind(&self) -> ResultKind {
        match self {
            Self::Item(_) => ResultKind::Items,
            Self::Event(_) => ResultKind::Events,
            Self::SearchHit(_) => ResultKind::Search,
            Self::History(_) => ResultKind::History,
        }
    }

    /// Collection the record belongs to
    pub fn collection(&self) -> &str {
        match self {
            Self::Item(r) => &r.collection,
            Self::Event(r) => &r.collection,
            Self::SearchHit(r) => &r.collection,
            Self::History(r) => &r.collection,
        }
    }

    pub fn key(&self) -> &str {
        match self {
            Self::Item(r) => &r.key,
            Self::Event(r) => &r.key,
            Self::SearchHit(r) => &r.key,
            Self::History(r) => &r.key,
        }
    }

    pub fn reference(&self) -> &str {
        match self {
            Self::Item(r) => &r.reference,
            Self::Event(r) => &r.reference,
            Self::SearchHit(r) => &r.reference,
            Self::History(r) => &r.reference,
        }
    }

    /// Raw JSON value
    pub fn value(&self) -> &JsonValue {
        match self {
            Self::Item(r) => &r.value,
            Self::Event(r) => &r.value,
            Self::SearchHit(r) => &r.value,
            Self::History(r) => &r.value,
        }
    }

    /// Decode the value into a typed structure
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        decode_value(self.key(), self.value())
    }
}

fn decode_value<T: DeserializeOwned>(key: &str, value: &JsonValue) -> Result<T> {
    T::deserialize(value).map_err(|e| Error::payload(key, e))
}
