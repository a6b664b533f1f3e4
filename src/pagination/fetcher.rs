//! Page fetching
//!
//! The seam between the cursor and the network. The cursor only ever asks
//! for "the page at this path"; transport, auth, retries and status
//! classification all happen behind [`PageFetcher`].

use super::types::Page;
use crate::error::{Error, Result};
use crate::http::HttpClient;
use reqwest::StatusCode;
use tracing::debug;

/// Something that can load one page of listing results
pub trait PageFetcher {
    /// GET `path` (relative to the API root) and decode the page envelope
    fn fetch_page(&self, path: &str) -> Result<Page>;
}

impl<F: PageFetcher + ?Sized> PageFetcher for &F {
    fn fetch_page(&self, path: &str) -> Result<Page> {
        (**self).fetch_page(path)
    }
}

impl<F: PageFetcher + ?Sized> PageFetcher for Box<F> {
    fn fetch_page(&self, path: &str) -> Result<Page> {
        (**self).fetch_page(path)
    }
}

impl PageFetcher for HttpClient {
    fn fetch_page(&self, path: &str) -> Result<Page> {
        let response = self.get(path)?;

        // Any other success status has no page body
        let status = response.status();
        if status != StatusCode::OK {
            return Err(Error::http_status(
                status.as_u16(),
                format!("expected 200 for a page, got {status}"),
            ));
        }

        let body = response.text()?;
        let page = decode_page(path, &body)?;
        debug!(
            path,
            entries = page.results.len(),
            next = page.next.as_deref().unwrap_or(""),
            "fetched page"
        );
        Ok(page)
    }
}

/// Decode a page envelope, attributing failures to the page path
pub fn decode_page(path: &str, body: &str) -> Result<Page> {
    serde_json::from_str(body).map_err(|e| Error::decode(path, e.to_string()))
}
