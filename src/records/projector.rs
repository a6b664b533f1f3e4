//! Raw entry projection
//!
//! Maps one page entry onto the record shape of the iterator's kind.
//! Timestamps arrive as milliseconds since epoch.

use super::types::{Event, HistoryEntry, Item, Record, ResultKind, SearchHit};
use crate::pagination::RawEntry;
use crate::types::millis_to_datetime;

/// Project an entry according to the iterator kind
pub fn project(kind: ResultKind, entry: &RawEntry) -> Record {
    match kind {
        ResultKind::Items => Record::Item(project_item(entry)),
        ResultKind::Events => Record::Event(project_event(entry)),
        ResultKind::Search => Record::SearchHit(project_search_hit(entry)),
        ResultKind::History => Record::History(project_history(entry)),
    }
}

pub fn project_item(entry: &RawEntry) -> Item {
    Item {
        collection: entry.path.collection.clone(),
        key: entry.path.key.clone(),
        reference: entry.path.reference.clone(),
        updated: millis_to_datetime(entry.reftime),
        value: entry.value.clone(),
    }
}

/// Events take their ordinal and type from the path, and the time from the
/// entry itself.
pub fn project_event(entry: &RawEntry) -> Event {
    Event {
        collection: entry.path.collection.clone(),
        key: entry.path.key.clone(),
        ordinal: entry.path.ordinal,
        reference: entry.path.reference.clone(),
        event_type: entry.path.event_type.clone(),
        timestamp: millis_to_datetime(entry.timestamp),
        value: entry.value.clone(),
    }
}

pub fn project_search_hit(entry: &RawEntry) -> SearchHit {
    SearchHit {
        collection: entry.path.collection.clone(),
        key: entry.path.key.clone(),
        reference: entry.path.reference.clone(),
        score: entry.score,
        distance: entry.distance,
        updated: millis_to_datetime(entry.reftime),
        value: entry.value.clone(),
    }
}

pub fn project_history(entry: &RawEntry) -> HistoryEntry {
    HistoryEntry {
        collection: entry.path.collection.clone(),
        key: entry.path.key.clone(),
        reference: entry.path.reference.clone(),
        tombstone: entry.path.tombstone,
        updated: millis_to_datetime(entry.reftime),
        value: entry.value.clone(),
    }
}
