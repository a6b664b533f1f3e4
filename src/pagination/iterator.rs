//! Result iterator
//!
//! Pull interface over a paginated listing. Pages are fetched lazily: a
//! network call only happens when [`ResultIter::advance`] runs off the end
//! of the buffered page, or when [`ResultIter::advance_page`] is called.
//!
//! ```rust,ignore
//! let mut users = client.collection("users").list(None);
//! while users.advance() {
//!     let item = users.current_item()?;
//!     println!("{} {}", item.key, item.value);
//! }
//! if let Some(err) = users.error() {
//!     return Err(err.clone());
//! }
//! ```

use super::cursor::{Cursor, CursorState};
use super::fetcher::PageFetcher;
use super::types::RawEntry;
use crate::error::{Error, Result};
use crate::records::{
    project, project_event, project_history, project_item, project_search_hit, Event,
    HistoryEntry, Item, Record, ResultKind, SearchHit,
};
use serde::de::DeserializeOwned;
use std::iter::FusedIterator;

/// Lazily paginated results of one listing call.
///
/// Single owner, forward only. Once `advance` returns `false` the iterator
/// is finished: check [`error`](Self::error) to tell a clean end from a
/// failure. Later calls keep returning `false` without touching the network.
#[derive(Debug)]
pub struct ResultIter<F> {
    fetcher: F,
    kind: ResultKind,
    cursor: Cursor,
    error_yielded: bool,
}

impl<F: PageFetcher> ResultIter<F> {
    /// Create a fresh iterator; nothing is fetched until the first advance
    pub fn new(fetcher: F, initial_path: impl Into<String>, kind: ResultKind) -> Self {
        Self {
            fetcher,
            kind,
            cursor: Cursor::new(initial_path),
            error_yielded: false,
        }
    }

    /// Shape of the records this iterator produces
    pub fn kind(&self) -> ResultKind {
        self.kind
    }

    pub fn state(&self) -> CursorState {
        self.cursor.state()
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Move to the next entry. Returns `false` at the end or on failure.
    pub fn advance(&mut self) -> bool {
        self.cursor.step(&self.fetcher)
    }

    /// Skip any unread entries in the buffered page and load the next page.
    ///
    /// Meant to be paired with the `current_*page` accessors.
    pub fn advance_page(&mut self) -> bool {
        self.cursor.skip_page(&self.fetcher)
    }

    /// Like [`advance`](Self::advance) but also returns the terminal error
    pub fn advance_with_error(&mut self) -> Result<bool> {
        let more = self.advance();
        self.terminal_result(more)
    }

    /// Like [`advance_page`](Self::advance_page) but also returns the
    /// terminal error
    pub fn advance_page_with_error(&mut self) -> Result<bool> {
        let more = self.advance_page();
        self.terminal_result(more)
    }

    /// Total matches reported by the server; 0 until known
    pub fn total_count(&self) -> i64 {
        self.cursor.total_count()
    }

    /// Terminal error. `None` after a clean end.
    pub fn error(&self) -> Option<&Error> {
        self.cursor.error()
    }

    // ========================================================================
    // Single entry accessors
    // ========================================================================

    /// The current entry as a record of this iterator's kind
    pub fn current(&self) -> Result<Record> {
        Ok(project(self.kind, self.current_entry()?))
    }

    /// The current record plus its value decoded as `T`.
    ///
    /// Items, search hits and history entries without a value (a `null`,
    /// as in a history listed without values) give `None`. Event values are
    /// always decoded.
    ///
    /// A decode failure is returned as [`Error::Payload`]; the iterator
    /// itself is unaffected and can keep advancing.
    pub fn current_decoded<T: DeserializeOwned>(&self) -> Result<(Record, Option<T>)> {
        let record = self.current()?;
        if record.kind() != ResultKind::Events && record.value().is_null() {
            return Ok((record, None));
        }
        let value = record.decode()?;
        Ok((record, Some(value)))
    }

    pub fn current_item(&self) -> Result<Item> {
        self.expect_kind(ResultKind::Items)?;
        Ok(project_item(self.current_entry()?))
    }

    pub fn current_event(&self) -> Result<Event> {
        self.expect_kind(ResultKind::Events)?;
        Ok(project_event(self.current_entry()?))
    }

    pub fn current_search_hit(&self) -> Result<SearchHit> {
        self.expect_kind(ResultKind::Search)?;
        Ok(project_search_hit(self.current_entry()?))
    }

    pub fn current_history(&self) -> Result<HistoryEntry> {
        self.expect_kind(ResultKind::History)?;
        Ok(project_history(self.current_entry()?))
    }

    // ========================================================================
    // Page accessors
    // ========================================================================

    /// Drain every unread entry of the buffered page, current one included.
    ///
    /// Never fetches; follow up with [`advance_page`](Self::advance_page)
    /// (or `advance`) to load more.
    pub fn current_page(&mut self) -> Result<Vec<Record>> {
        let kind = self.kind;
        self.drain_with(|entry| project(kind, entry))
    }

    pub fn current_item_page(&mut self) -> Result<Vec<Item>> {
        self.expect_kind(ResultKind::Items)?;
        self.drain_with(project_item)
    }

    pub fn current_event_page(&mut self) -> Result<Vec<Event>> {
        self.expect_kind(ResultKind::Events)?;
        self.drain_with(project_event)
    }

    pub fn current_search_page(&mut self) -> Result<Vec<SearchHit>> {
        self.expect_kind(ResultKind::Search)?;
        self.drain_with(project_search_hit)
    }

    pub fn current_history_page(&mut self) -> Result<Vec<HistoryEntry>> {
        self.expect_kind(ResultKind::History)?;
        self.drain_with(project_history)
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn expect_kind(&self, expected: ResultKind) -> Result<()> {
        if self.kind == expected {
            Ok(())
        } else {
            Err(Error::WrongIteratorKind {
                expected,
                actual: self.kind,
            })
        }
    }

    fn current_entry(&self) -> Result<&RawEntry> {
        if let Some(err) = self.cursor.error() {
            return Err(err.clone());
        }
        self.cursor.current().ok_or(Error::NoCurrentEntry)
    }

    fn drain_with<T>(&mut self, map: impl Fn(&RawEntry) -> T) -> Result<Vec<T>> {
        if let Some(err) = self.cursor.error() {
            return Err(err.clone());
        }
        Ok(self.cursor.drain().iter().map(map).collect())
    }

    fn terminal_result(&self, more: bool) -> Result<bool> {
        match self.cursor.error() {
            Some(err) => Err(err.clone()),
            None => Ok(more),
        }
    }
}

/// Yields every entry in order, then the terminal error once if there is
/// one, then `None`.
impl<F: PageFetcher> Iterator for ResultIter<F> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.advance() {
            return Some(self.current());
        }
        match self.cursor.error() {
            Some(err) if !self.error_yielded => {
                self.error_yielded = true;
                Some(Err(err.clone()))
            }
            _ => None,
        }
    }
}

impl<F: PageFetcher> FusedIterator for ResultIter<F> {}
