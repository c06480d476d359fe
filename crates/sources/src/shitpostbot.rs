//! Source images from the ShitpostBot 5000 meme archive.

use serde::Deserialize;
use talk_core::{Error, RandomSource, Result, SearchSource};

use crate::client::HttpClient;

const SHITPOSTBOT_URL: &str = "https://www.shitpostbot.com/";
const SHITPOSTBOT_SEARCH_URL: &str = "https://www.shitpostbot.com/api/sourceimages";
const SHITPOSTBOT_RANDOM_URL: &str = "https://www.shitpostbot.com/api/randsource";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    results: SearchResults,
}

#[derive(Debug, Deserialize)]
struct SearchResults {
    #[serde(default)]
    data: Vec<SourceImage>,
}

#[derive(Debug, Deserialize)]
struct RandomResponse {
    sub: SourceImage,
}

#[derive(Debug, Deserialize)]
struct SourceImage {
    img: ImageLinks,
}

#[derive(Debug, Deserialize)]
struct ImageLinks {
    full: String,
}

/// Image links are relative to the site root.
fn absolute(link: &str) -> String {
    if link.starts_with("http://") || link.starts_with("https://") {
        link.to_string()
    } else {
        format!("{}{}", SHITPOSTBOT_URL, link.trim_start_matches('/'))
    }
}

/// Full-size image urls in a search response.
pub fn parse_search(body: &str) -> Result<Vec<String>> {
    let response: SearchResponse = serde_json::from_str(body)
        .map_err(|e| Error::SourceUnavailable(format!("invalid shitpostbot search response: {}", e)))?;
    Ok(response
        .results
        .data
        .iter()
        .filter(|image| !image.img.full.trim().is_empty())
        .map(|image| absolute(&image.img.full))
        .collect())
}

/// Full-size image url in a random-endpoint response.
pub fn parse_random(body: &str) -> Result<String> {
    let response: RandomResponse = serde_json::from_str(body)
        .map_err(|e| Error::SourceUnavailable(format!("invalid shitpostbot random response: {}", e)))?;
    Ok(absolute(&response.sub.img.full))
}

#[derive(Debug, Clone)]
pub struct ShitpostBot {
    client: HttpClient,
}

impl ShitpostBot {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }

    fn try_search(&self, query: &str) -> Result<Vec<String>> {
        let url = HttpClient::url(
            SHITPOSTBOT_SEARCH_URL,
            &[("query", query), ("order", "total_rating"), ("direction", "DESC")],
        )?;
        parse_search(&self.client.get_text(url.as_str())?)
    }
}

impl SearchSource for ShitpostBot {
    fn search(&self, query: &str, limit: usize) -> Vec<String> {
        if query.trim().is_empty() {
            return Vec::new();
        }
        match self.try_search(query) {
            Ok(mut images) => {
                images.truncate(limit);
                log::debug!("ShitpostBot '{}': {} images", query, images.len());
                images
            }
            Err(e) => {
                log::warn!("ShitpostBot search for '{}' failed: {}", query, e);
                Vec::new()
            }
        }
    }
}

impl RandomSource for ShitpostBot {
    fn random(&self, _tag: &str) -> Option<String> {
        let body = self.client.get_text(SHITPOSTBOT_RANDOM_URL);
        match body.and_then(|body| parse_random(&body)) {
            Ok(image) => Some(image),
            Err(e) => {
                log::warn!("ShitpostBot random image failed: {}", e);
                None
            }
        }
    }
}
