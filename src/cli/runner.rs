//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::client::Client;
use crate::config::{base_url_for_host, ENV_API_KEY};
use crate::error::Error;
use crate::http::{HttpClientConfig, RateLimiterConfig};
use crate::pagination::{PageFetcher, ResultIter};
use crate::query::{GetLinksQuery, HistoryQuery, ListEventsQuery, ListQuery, SearchQuery};
use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::json;
use std::io::{self, Write};
use tracing::{debug, info};

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub fn run(&self) -> Result<()> {
        let client = self.client()?;

        match &self.cli.command {
            Commands::Ping => {
                client.ping().context("ping failed")?;
                self.output(&json!({"status": "ok", "url": client.http().base_url().as_str()}))
            }
            Commands::List {
                collection,
                limit,
                start_key,
                after_key,
                before_key,
                end_key,
            } => {
                let query = ListQuery {
                    page_size: *limit,
                    start_key: start_key.clone(),
                    after_key: after_key.clone(),
                    before_key: before_key.clone(),
                    end_key: end_key.clone(),
                };
                self.drain(client.collection(collection).list(Some(&query)))
            }
            Commands::Search {
                collection,
                query,
                limit,
                offset,
                sort,
            } => {
                let options = SearchQuery {
                    page_size: *limit,
                    offset: *offset,
                    sort: sort.clone(),
                };
                self.drain(client.collection(collection).search(query, Some(&options)))
            }
            Commands::History {
                collection,
                key,
                limit,
                offset,
                values,
            } => {
                let query = HistoryQuery {
                    page_size: *limit,
                    offset: *offset,
                    values: *values,
                };
                self.drain(client.collection(collection).history(key, Some(&query)))
            }
            Commands::Events {
                collection,
                key,
                event_type,
                limit,
                start,
                end,
                after,
                before,
            } => {
                let query = ListEventsQuery {
                    page_size: *limit,
                    start: *start,
                    end: *end,
                    after: *after,
                    before: *before,
                };
                self.drain(
                    client
                        .collection(collection)
                        .list_events(key, event_type, Some(&query)),
                )
            }
            Commands::Links {
                collection,
                key,
                kinds,
                limit,
            } => {
                let kinds: Vec<&str> = kinds.iter().map(String::as_str).collect();
                let query = GetLinksQuery { page_size: *limit };
                self.drain(
                    client
                        .collection(collection)
                        .get_links(key, &kinds, Some(&query)),
                )
            }
        }
    }

    /// Build the API client from the global flags
    fn client(&self) -> Result<Client> {
        let api_key = self
            .cli
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or_else(|| Error::missing_field(ENV_API_KEY))
            .context("an API key is required (use --api-key)")?;

        let mut builder = HttpClientConfig::builder()
            .auth_token(api_key)
            .max_retries(self.cli.retries);
        if let Some(ref host) = self.cli.host {
            builder = builder.base_url(base_url_for_host(host));
        }
        if let Some(rps) = self.cli.rate_limit {
            builder = builder.rate_limit(RateLimiterConfig::per_second(rps));
        }

        let config = builder.build();
        debug!(config = ?config, "building client");
        Ok(Client::with_config(config)?)
    }

    /// Print every record of a listing, then the total count if known
    fn drain<F: PageFetcher>(&self, mut iter: ResultIter<F>) -> Result<()> {
        let limit = self.cli.max_records.unwrap_or(usize::MAX);
        let mut written = 0usize;

        if self.cli.by_page {
            'pages: while written < limit && iter.advance_page() {
                for record in iter.current_page()? {
                    if written >= limit {
                        break 'pages;
                    }
                    self.output(&record)?;
                    written += 1;
                }
            }
        } else {
            while written < limit && iter.advance() {
                self.output(&iter.current()?)?;
                written += 1;
            }
        }

        if let Some(err) = iter.error() {
            return Err(anyhow::Error::new(err.clone()).context("listing failed"));
        }

        info!(kind = %iter.kind(), records = written, "listing complete");
        if iter.total_count() > 0 {
            eprintln!("total_count: {}", iter.total_count());
        }
        Ok(())
    }

    /// Output a value in the selected format
    fn output<T: Serialize>(&self, value: &T) -> Result<()> {
        let line = match self.cli.format {
            OutputFormat::Json => serde_json::to_string(value)?,
            OutputFormat::Pretty => serde_json::to_string_pretty(value)?,
        };
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{line}").context("failed to write output")?;
        Ok(())
    }
}
