//! CLI module
//!
//! Command-line interface over the listing operations.
//!
//! # Commands
//!
//! - `ping` - Check that the API is reachable
//! - `list` - List items of a collection
//! - `search` - Search a collection
//! - `history` - Show the ref history of an item
//! - `events` - List events on an item
//! - `links` - Walk graph relations

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;
