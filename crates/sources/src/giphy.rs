//! Random gifs by tag from the Giphy API.

use serde::Deserialize;
use talk_core::{Error, RandomSource, Result};

use crate::client::HttpClient;

const GIPHY_RANDOM_URL: &str = "https://api.giphy.com/v1/gifs/random";

#[derive(Debug, Deserialize)]
struct RandomResponse {
    // An empty result comes back as `"data": []`.
    data: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct Gif {
    images: Images,
}

#[derive(Debug, Deserialize)]
struct Images {
    original: Rendition,
}

#[derive(Debug, Deserialize)]
struct Rendition {
    url: String,
}

/// The original-size gif url in a random-endpoint response, if any.
pub fn parse_random(body: &str) -> Result<Option<String>> {
    let response: RandomResponse = serde_json::from_str(body)
        .map_err(|e| Error::SourceUnavailable(format!("invalid giphy response: {}", e)))?;

    if !response.data.is_object() {
        return Ok(None);
    }

    let gif: Gif = serde_json::from_value(response.data)
        .map_err(|e| Error::SourceUnavailable(format!("unexpected giphy gif: {}", e)))?;
    Ok(Some(gif.images.original.url))
}

#[derive(Debug, Clone)]
pub struct GiphyRandom {
    client: HttpClient,
    api_key: String,
}

impl GiphyRandom {
    pub fn new(client: HttpClient, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
        }
    }

    fn try_random(&self, tag: &str) -> Result<Option<String>> {
        let url = HttpClient::url(
            GIPHY_RANDOM_URL,
            &[("api_key", self.api_key.as_str()), ("tag", tag), ("rating", "pg-13")],
        )?;
        parse_random(&self.client.get_text(url.as_str())?)
    }
}

impl RandomSource for GiphyRandom {
    fn random(&self, tag: &str) -> Option<String> {
        match self.try_random(tag) {
            Ok(gif) => gif,
            Err(e) => {
                log::warn!("Giphy request for '{}' failed: {}", tag, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_random() {
        let body = r#"{"data": {"id": "abc", "images": {"original": {"url": "https://media.giphy.com/media/abc/giphy.gif", "width": "480"}}}, "meta": {"status": 200}}"#;
        assert_eq!(
            parse_random(body).unwrap(),
            Some("https://media.giphy.com/media/abc/giphy.gif".to_string())
        );
    }

    #[test]
    fn test_parse_random_without_result() {
        assert_eq!(parse_random(r#"{"data": [], "meta": {"status": 200}}"#).unwrap(), None);
    }

    #[test]
    fn test_parse_random_invalid() {
        assert!(parse_random("not json").is_err());
        assert!(parse_random(r#"{"data": {"images": {}}}"#).is_err());
    }
}
