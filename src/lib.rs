// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]

//! # Orchestrate Client
//!
//! A blocking Rust client for the Orchestrate multi-model database REST API,
//! built around lazily paginated result iterators.
//!
//! ## Features
//!
//! - **Lazy Pagination**: One page in memory, fetched only when iteration needs it
//! - **Typed Records**: Items, events, search hits, and ref history entries
//! - **Sticky Errors**: A failed page fetch stops the iterator for good
//! - **Transport**: Basic auth, optional retries with backoff, rate limiting
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use orchestrate_client::{Client, ListQuery, Result};
//!
//! fn main() -> Result<()> {
//!     let client = Client::from_env()?;
//!
//!     let query = ListQuery { page_size: Some(50), ..Default::default() };
//!     let mut users = client.collection("users").list(Some(&query));
//!     while users.advance() {
//!         let item = users.current_item()?;
//!         println!("{} => {}", item.key, item.value);
//!     }
//!     if let Some(err) = users.error() {
//!         return Err(err.clone());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                 Client / Collection                             │
//! │  list()  search()  history()  list_events()  get_links()        │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │  initial path + kind
//! ┌──────────────────────────────┴──────────────────────────────────┐
//! │                        ResultIter                               │
//! │  advance / advance_page / current_* / current_*_page            │
//! ├──────────────┬─────────────────────────┬────────────────────────┤
//! │    Cursor    │       PageFetcher       │      Projector         │
//! ├──────────────┼─────────────────────────┼────────────────────────┤
//! │ Fresh        │ HttpClient (GET, auth,  │ Item                   │
//! │ Loaded       │ retry, rate limit,      │ Event                  │
//! │ Exhausted    │ status classification)  │ SearchHit              │
//! │ Failed       │                         │ HistoryEntry           │
//! └──────────────┴─────────────────────────┴────────────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the client
pub mod error;

/// Common types and type aliases
pub mod types;

/// Defaults and environment configuration
pub mod config;

/// HTTP transport with retry and rate limiting
pub mod http;

/// Paginated result iteration
pub mod pagination;

/// Typed records projected from listing entries
pub mod records;

/// Listing options and request paths
pub mod query;

/// Client and collection handles
pub mod client;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use client::{Client, Collection};
pub use error::{Error, Result};
pub use http::{HttpClient, HttpClientConfig, RateLimiterConfig};
pub use pagination::{CursorState, PageFetcher, ResultIter};
pub use query::{EventBound, GetLinksQuery, HistoryQuery, ListEventsQuery, ListQuery, SearchQuery};
pub use records::{Event, HistoryEntry, Item, Record, ResultKind, SearchHit};
pub use types::*;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
