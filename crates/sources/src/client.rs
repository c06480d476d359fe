//! Shared blocking HTTP client and its configuration.

use reqwest::blocking::{Client, Response};
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io;
use std::path::Path;
use std::time::Duration;
use talk_core::{Error, Result};
use url::Url;

/// Settings shared by every HTTP source.
#[derive(Debug, Clone)]
pub struct SourceConfig {
    pub user_agent: String,
    pub timeout_seconds: u64,
    /// Giphy API key; without one the gif source stays empty.
    pub giphy_api_key: Option<String>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            user_agent: concat!("talk-gen/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_seconds: 15,
            giphy_api_key: None,
        }
    }
}

impl SourceConfig {
    pub fn with_giphy_api_key(mut self, key: Option<String>) -> Self {
        self.giphy_api_key = key.filter(|k| !k.trim().is_empty());
        self
    }
}

/// Thin wrapper over a blocking `reqwest` client that maps failures into
/// [`talk_core::Error`].
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new(config: &SourceConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .gzip(true)
            .build()
            .map_err(|e| Error::SourceUnavailable(format!("failed to create HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    /// Build a url with query parameters.
    pub fn url(base: &str, params: &[(&str, &str)]) -> Result<Url> {
        Url::parse_with_params(base, params)
            .map_err(|e| Error::SourceUnavailable(format!("invalid url {}: {}", base, e)))
    }

    fn get(&self, url: &str) -> Result<Response> {
        log::debug!("GET {}", url);
        let response = self.client.get(url).send().map_err(|e| Error::FetchError {
            locator: url.to_string(),
            reason: e.to_string(),
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::FetchError {
                locator: url.to_string(),
                reason: format!("HTTP {}", status),
            });
        }

        Ok(response)
    }

    pub fn get_text(&self, url: &str) -> Result<String> {
        self.get(url)?.text().map_err(|e| Error::FetchError {
            locator: url.to_string(),
            reason: e.to_string(),
        })
    }

    pub fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        self.get(url)?.json().map_err(|e| Error::FetchError {
            locator: url.to_string(),
            reason: format!("invalid JSON: {}", e),
        })
    }

    /// Stream the body at `url` into a new file at `destination`.
    pub fn download(&self, url: &str, destination: &Path) -> Result<u64> {
        let mut response = self.get(url)?;
        let mut file = File::create(destination)?;
        let written = io::copy(&mut response, &mut file)?;
        if written == 0 {
            return Err(Error::FetchError {
                locator: url.to_string(),
                reason: "empty response body".to_string(),
            });
        }
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SourceConfig::default();
        assert!(config.user_agent.starts_with("talk-gen/"));
        assert_eq!(config.giphy_api_key, None);
    }

    #[test]
    fn test_blank_giphy_key_is_ignored() {
        let config = SourceConfig::default().with_giphy_api_key(Some("  ".to_string()));
        assert_eq!(config.giphy_api_key, None);
        let config = SourceConfig::default().with_giphy_api_key(Some("abc".to_string()));
        assert_eq!(config.giphy_api_key.as_deref(), Some("abc"));
    }

    #[test]
    fn test_url_encodes_params() {
        let url = HttpClient::url("https://api.datamuse.com/words", &[("ml", "black cat"), ("max", "5")]).unwrap();
        assert_eq!(url.as_str(), "https://api.datamuse.com/words?ml=black+cat&max=5");
    }
}
