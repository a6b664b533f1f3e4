//! Cursor state machine
//!
//! Holds at most one page, the read position inside it, the continuation
//! token for the page after it, and the terminal error once one happens.
//!
//! ```text
//!  Fresh ──fetch──▶ Loaded ──empty page / no token──▶ Exhausted
//!    │                │
//!    └──── error ─────┴──────────────▶ Failed
//! ```

use super::fetcher::PageFetcher;
use super::types::RawEntry;
use crate::error::Error;
use tracing::{trace, warn};

/// Where a cursor is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorState {
    /// Nothing fetched yet
    #[default]
    Fresh,
    /// A page is buffered
    Loaded,
    /// The server has no more entries
    Exhausted,
    /// A fetch failed; the cursor is frozen
    Failed,
}

impl CursorState {
    /// Exhausted or Failed: no further network calls will be made
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Exhausted | Self::Failed)
    }
}

/// Forward-only cursor over a paginated listing
#[derive(Debug, Clone)]
pub struct Cursor {
    state: CursorState,
    next: Option<String>,
    entries: Vec<RawEntry>,
    index: usize,
    total_count: i64,
    error: Option<Error>,
}

impl Cursor {
    /// Create a fresh cursor that will start at `initial_path`
    pub fn new(initial_path: impl Into<String>) -> Self {
        Self {
            state: CursorState::Fresh,
            next: Some(initial_path.into()),
            entries: Vec::new(),
            index: 0,
            total_count: 0,
            error: None,
        }
    }

    pub fn state(&self) -> CursorState {
        self.state
    }

    /// Terminal error, if the cursor failed
    pub fn error(&self) -> Option<&Error> {
        self.error.as_ref()
    }

    /// Last non-zero total count reported by the server
    pub fn total_count(&self) -> i64 {
        self.total_count
    }

    /// Path the next fetch will use
    pub fn next_path(&self) -> Option<&str> {
        self.next.as_deref()
    }

    /// Entry at the read position, if one is loaded and unread
    pub fn current(&self) -> Option<&RawEntry> {
        match self.state {
            CursorState::Loaded => self.entries.get(self.index),
            _ => None,
        }
    }

    /// Move to the next entry, fetching a page when the buffer is used up
    pub fn step<F: PageFetcher + ?Sized>(&mut self, fetcher: &F) -> bool {
        match self.state {
            CursorState::Exhausted | CursorState::Failed => false,
            CursorState::Loaded if self.index + 1 < self.entries.len() => {
                self.index += 1;
                trace!(index = self.index, "advanced within page");
                true
            }
            CursorState::Fresh | CursorState::Loaded => self.load_next(fetcher),
        }
    }

    /// Drop whatever is unread in the buffer and fetch the next page
    pub fn skip_page<F: PageFetcher + ?Sized>(&mut self, fetcher: &F) -> bool {
        if self.state.is_terminal() {
            return false;
        }
        self.load_next(fetcher)
    }

    /// Hand out every unread buffered entry and move the read position to
    /// the end of the page. Never fetches.
    pub fn drain(&mut self) -> &[RawEntry] {
        if self.state != CursorState::Loaded {
            return &[];
        }
        let start = self.index.min(self.entries.len());
        self.index = self.entries.len();
        &self.entries[start..]
    }

    fn load_next<F: PageFetcher + ?Sized>(&mut self, fetcher: &F) -> bool {
        let Some(path) = self.next.take() else {
            trace!("no continuation token, listing complete");
            self.finish();
            return false;
        };

        match fetcher.fetch_page(&path) {
            Ok(page) => {
                if page.total_count != 0 {
                    self.total_count = page.total_count;
                }
                self.next = page.next_token();

                if page.results.is_empty() {
                    self.finish();
                    return false;
                }
                self.entries = page.results;
                self.index = 0;
                self.state = CursorState::Loaded;
                true
            }
            Err(err) => {
                warn!(path = %path, error = %err, "page fetch failed, iterator stopped");
                self.next = Some(path);
                self.error = Some(err);
                self.state = CursorState::Failed;
                false
            }
        }
    }

    fn finish(&mut self) {
        self.entries = Vec::new();
        self.index = 0;
        self.state = CursorState::Exhausted;
    }
}
