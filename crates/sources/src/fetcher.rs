//! Asset downloads for the download cache.

use std::path::Path;
use talk_core::{Fetch, Result};

use crate::client::HttpClient;

/// Downloads assets over HTTP.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: HttpClient,
}

impl HttpFetcher {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }
}

impl Fetch for HttpFetcher {
    fn fetch(&self, locator: &str, destination: &Path) -> Result<()> {
        let bytes = self.client.download(locator, destination)?;
        log::debug!("Downloaded {} bytes from {}", bytes, locator);
        Ok(())
    }
}
