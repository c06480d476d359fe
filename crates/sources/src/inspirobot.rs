//! Random motivational posters from Inspirobot.

use talk_core::{Error, RandomSource, Result};

use crate::client::HttpClient;

const INSPIROBOT_API: &str = "https://inspirobot.me/api?generate=true";

/// The generator endpoint answers with a bare image url.
pub fn parse_generated(body: &str) -> Result<String> {
    let url = body.trim();
    if url.starts_with("https://") || url.starts_with("http://") {
        Ok(url.to_string())
    } else {
        Err(Error::SourceUnavailable(format!("unexpected inspirobot answer: {:.60}", url)))
    }
}

#[derive(Debug, Clone)]
pub struct Inspirobot {
    client: HttpClient,
}

impl Inspirobot {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }
}

impl RandomSource for Inspirobot {
    /// Posters are not topical; the tag is ignored.
    fn random(&self, _tag: &str) -> Option<String> {
        match self.client.get_text(INSPIROBOT_API).and_then(|body| parse_generated(&body)) {
            Ok(url) => Some(url),
            Err(e) => {
                log::warn!("Inspirobot request failed: {}", e);
                None
            }
        }
    }
}
