//! Typed results module
//!
//! Supports: Items, Events, Search hits, History entries
//!
//! # Overview
//!
//! Every listing endpoint returns the same page envelope, but what an entry
//! means depends on the call that produced it. A result iterator is created
//! with a fixed [`ResultKind`] and the projector turns each raw entry into
//! the matching [`Record`] variant when it is asked for.

mod projector;
mod types;

pub use projector::{project, project_event, project_history, project_item, project_search_hit};
pub use types::{Event, HistoryEntry, Item, Record, ResultKind, SearchHit};
