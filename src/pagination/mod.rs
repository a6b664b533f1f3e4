//! Pagination module
//!
//! Cursor-based continuation over the server's listing endpoints.
//!
//! # Overview
//!
//! Every listing (key/value list, search, ref history, events, graph walks)
//! answers with the same page envelope and a `next` link. A [`ResultIter`]
//! follows those links one page at a time, keeping a single page in memory,
//! and projects entries into typed records on demand.
//!
//! The network is reached only through [`PageFetcher`], which
//! [`HttpClient`](crate::http::HttpClient) implements.

mod cursor;
mod fetcher;
mod iterator;
mod types;

pub use cursor::{Cursor, CursorState};
pub use fetcher::{decode_page, PageFetcher};
pub use iterator::ResultIter;
pub use types::{continuation_token, EntryPath, Page, RawEntry};
