//! CLI commands and argument parsing

use crate::query::EventBound;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};

/// Orchestrate command-line client
#[derive(Parser, Debug)]
#[command(name = "orchestrate")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// API key
    #[arg(long, global = true, env = "ORCHESTRATE_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// API host, e.g. api.aws-eu-west-1.orchestrate.io or http://localhost:8080
    #[arg(long, global = true, env = "ORCHESTRATE_API_HOST")]
    pub host: Option<String>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Stop after this many records
    #[arg(long, global = true)]
    pub max_records: Option<usize>,

    /// Read whole pages at a time instead of record by record
    #[arg(long, global = true)]
    pub by_page: bool,

    /// Retry failed requests this many times
    #[arg(long, global = true, default_value = "0")]
    pub retries: u32,

    /// Client-side limit in requests per second
    #[arg(long, global = true)]
    pub rate_limit: Option<u32>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check that the API is reachable
    Ping,

    /// List the items of a collection in key order
    List {
        collection: String,

        /// Items per page
        #[arg(long)]
        limit: Option<u32>,

        #[arg(long)]
        start_key: Option<String>,

        #[arg(long)]
        after_key: Option<String>,

        #[arg(long)]
        before_key: Option<String>,

        #[arg(long)]
        end_key: Option<String>,
    },

    /// Search a collection
    Search {
        collection: String,

        /// Lucene query, e.g. 'value.name:alice'
        query: String,

        /// Results per page; negative asks only for the total count
        #[arg(long, allow_hyphen_values = true)]
        limit: Option<i32>,

        #[arg(long)]
        offset: Option<u64>,

        /// Sort clause, e.g. value.age:desc
        #[arg(long)]
        sort: Option<String>,
    },

    /// Show the revision history of an item
    History {
        collection: String,
        key: String,

        #[arg(long)]
        limit: Option<u32>,

        #[arg(long)]
        offset: Option<u64>,

        /// Include the value of every revision
        #[arg(long)]
        values: bool,
    },

    /// List the events of one type on an item
    Events {
        collection: String,
        key: String,
        event_type: String,

        #[arg(long)]
        limit: Option<u32>,

        /// Oldest event included (ms or ms/ordinal)
        #[arg(long, value_parser = parse_event_bound)]
        start: Option<EventBound>,

        /// Newest event included (ms or ms/ordinal)
        #[arg(long, value_parser = parse_event_bound)]
        end: Option<EventBound>,

        /// Only events newer than this (ms or ms/ordinal)
        #[arg(long, value_parser = parse_event_bound)]
        after: Option<EventBound>,

        /// Only events older than this (ms or ms/ordinal)
        #[arg(long, value_parser = parse_event_bound)]
        before: Option<EventBound>,
    },

    /// Walk graph relations out of an item
    Links {
        collection: String,
        key: String,

        /// Relation kinds, walked in order
        #[arg(required = true, num_args = 1..)]
        kinds: Vec<String>,

        #[arg(long)]
        limit: Option<u32>,
    },
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one record per line)
    Json,
    /// Human-readable output
    Pretty,
}

/// Parse `ms` or `ms/ordinal`
fn parse_event_bound(raw: &str) -> Result<EventBound, String> {
    let (millis, ordinal) = match raw.split_once('/') {
        Some((millis, ordinal)) => (millis, Some(ordinal)),
        None => (raw, None),
    };
    let millis: i64 = millis
        .trim()
        .parse()
        .map_err(|_| format!("invalid timestamp '{millis}', expected milliseconds"))?;
    let timestamp: DateTime<Utc> = DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| format!("timestamp {millis} is out of range"))?;

    match ordinal {
        Some(ordinal) => {
            let ordinal = ordinal
                .trim()
                .parse()
                .map_err(|_| format!("invalid ordinal '{ordinal}'"))?;
            Ok(EventBound::at_ordinal(timestamp, ordinal))
        }
        None => Ok(EventBound::at(timestamp)),
    }
}
