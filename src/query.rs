//! Listing options and request path construction
//!
//! Each listing call turns its options into the initial request path of a
//! result iterator. Only options that are set end up in the query string,
//! and parameters are emitted in name order so paths are stable.

use crate::types::datetime_to_millis;
use chrono::{DateTime, Utc};
use url::form_urlencoded::{self, Serializer};

// ============================================================================
// Options
// ============================================================================

/// Options for a key/value listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    /// Items per page; the server defaults to 10 and caps at 100
    pub page_size: Option<u32>,
    /// First key included in the listing
    pub start_key: Option<String>,
    /// Only keys strictly after this one
    pub after_key: Option<String>,
    /// Only keys strictly before this one
    pub before_key: Option<String>,
    /// Last key included in the listing
    pub end_key: Option<String>,
}

/// Options for a search
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    /// Results per page. A negative value asks for no results at all, which
    /// still reports the total count.
    pub page_size: Option<i32>,
    /// Skip this many results
    pub offset: Option<u64>,
    /// Sort clause, e.g. `value.name:asc`
    pub sort: Option<String>,
}

/// Options for a ref history listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryQuery {
    pub page_size: Option<u32>,
    pub offset: Option<u64>,
    /// Include the value of every revision
    pub values: bool,
}

/// Position in an event timeline: a timestamp, optionally narrowed to one
/// ordinal within that millisecond
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventBound {
    pub timestamp: DateTime<Utc>,
    pub ordinal: Option<i64>,
}

impl EventBound {
    pub fn at(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            ordinal: None,
        }
    }

    pub fn at_ordinal(timestamp: DateTime<Utc>, ordinal: i64) -> Self {
        Self {
            timestamp,
            ordinal: Some(ordinal),
        }
    }

    /// Wire form: `ms` or `ms/ordinal`
    fn to_param(self) -> String {
        let millis = datetime_to_millis(&self.timestamp);
        match self.ordinal {
            Some(ordinal) => format!("{millis}/{ordinal}"),
            None => millis.to_string(),
        }
    }
}

/// Options for an event listing. Events are listed newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListEventsQuery {
    pub page_size: Option<u32>,
    /// Oldest event included
    pub start: Option<EventBound>,
    /// Newest event included
    pub end: Option<EventBound>,
    /// Only events strictly newer than this
    pub after: Option<EventBound>,
    /// Only events strictly older than this
    pub before: Option<EventBound>,
}

/// Options for a graph walk
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetLinksQuery {
    pub page_size: Option<u32>,
}

// ============================================================================
// Paths
// ============================================================================

/// Percent-encode one path segment
pub fn encode_segment(segment: &str) -> String {
    form_urlencoded::byte_serialize(segment.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

/// Join segments into an encoded relative path
fn segments<'a>(parts: impl IntoIterator<Item = &'a str>) -> String {
    parts
        .into_iter()
        .map(encode_segment)
        .collect::<Vec<_>>()
        .join("/")
}

/// Append a query string built from the set parameters, if any
fn with_query(path: String, params: &[(&str, Option<String>)]) -> String {
    let mut serializer = Serializer::new(String::new());
    let mut any = false;
    for (name, value) in params {
        if let Some(value) = value {
            serializer.append_pair(name, value);
            any = true;
        }
    }
    if any {
        format!("{path}?{}", serializer.finish())
    } else {
        path
    }
}

/// Initial path of a key/value listing
pub fn list_path(collection: &str, query: Option<&ListQuery>) -> String {
    let path = encode_segment(collection);
    let Some(q) = query else {
        return path;
    };
    with_query(
        path,
        &[
            ("afterKey", q.after_key.clone()),
            ("beforeKey", q.before_key.clone()),
            ("endKey", q.end_key.clone()),
            ("limit", q.page_size.map(|n| n.to_string())),
            ("startKey", q.start_key.clone()),
        ],
    )
}

/// Initial path of a search
pub fn search_path(collection: &str, query: &str, options: Option<&SearchQuery>) -> String {
    let opts = options.cloned().unwrap_or_default();
    let limit = opts.page_size.map(|n| n.max(0).to_string());
    with_query(
        encode_segment(collection),
        &[
            ("limit", limit),
            ("offset", opts.offset.map(|n| n.to_string())),
            ("query", Some(query.to_string())),
            ("sort", opts.sort),
        ],
    )
}

/// Initial path of a ref history listing
pub fn history_path(collection: &str, key: &str, query: Option<&HistoryQuery>) -> String {
    let path = segments([collection, key, "refs"]);
    let Some(q) = query else {
        return path;
    };
    with_query(
        path,
        &[
            ("limit", q.page_size.map(|n| n.to_string())),
            ("offset", q.offset.map(|n| n.to_string())),
            ("values", q.values.then(|| "true".to_string())),
        ],
    )
}

/// Initial path of an event listing
pub fn events_path(
    collection: &str,
    key: &str,
    event_type: &str,
    query: Option<&ListEventsQuery>,
) -> String {
    let path = segments([collection, key, "events", event_type]);
    let Some(q) = query else {
        return path;
    };
    with_query(
        path,
        &[
            ("afterEvent", q.after.map(EventBound::to_param)),
            ("beforeEvent", q.before.map(EventBound::to_param)),
            ("endEvent", q.end.map(EventBound::to_param)),
            ("limit", q.page_size.map(|n| n.to_string())),
            ("startEvent", q.start.map(EventBound::to_param)),
        ],
    )
}

/// Initial path of a graph walk over one or more relation kinds
pub fn links_path(
    collection: &str,
    key: &str,
    kinds: &[&str],
    query: Option<&GetLinksQuery>,
) -> String {
    let path = segments(
        [collection, key, "relations"]
            .into_iter()
            .chain(kinds.iter().copied()),
    );
    with_query(
        path,
        &[("limit", query.and_then(|q| q.page_size).map(|n| n.to_string()))],
    )
}
