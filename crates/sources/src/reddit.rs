//! Image search over groups of subreddits.

use serde::Deserialize;
use talk_core::{BoardSearch, Result};

use crate::client::HttpClient;

const REDDIT_BASE: &str = "https://www.reddit.com";

/// Image file extensions accepted from posts.
const IMAGE_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png", ".gif"];

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<Child>,
}

#[derive(Debug, Deserialize)]
struct Child {
    data: Post,
}

#[derive(Debug, Deserialize)]
struct Post {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    over_18: bool,
}

fn is_image_url(url: &str) -> bool {
    let path = url.split(['?', '#']).next().unwrap_or(url).to_ascii_lowercase();
    IMAGE_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}

/// Image urls of the safe-for-work posts in a listing response.
pub fn parse_listing(body: &str) -> Result<Vec<String>> {
    let listing: Listing = serde_json::from_str(body)
        .map_err(|e| talk_core::Error::SourceUnavailable(format!("invalid reddit listing: {}", e)))?;

    Ok(listing
        .data
        .children
        .into_iter()
        .map(|child| child.data)
        .filter(|post| !post.over_18)
        .filter_map(|post| post.url)
        .filter(|url| is_image_url(url))
        .collect())
}

/// Searches subreddits through the public JSON listings.
#[derive(Debug, Clone)]
pub struct RedditSearch {
    client: HttpClient,
}

impl RedditSearch {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }

    fn listing_url(board: &str, query: &str, limit: usize) -> Result<url::Url> {
        let limit = limit.to_string();
        if query.trim().is_empty() {
            HttpClient::url(&format!("{}/r/{}/hot.json", REDDIT_BASE, board), &[("limit", limit.as_str())])
        } else {
            let q = format!("{} nsfw:no (url:.jpg OR url:.png OR url:.gif)", query.trim());
            HttpClient::url(
                &format!("{}/r/{}/search.json", REDDIT_BASE, board),
                &[("q", q.as_str()), ("restrict_sr", "on"), ("sort", "relevance"), ("limit", limit.as_str())],
            )
        }
    }

    fn try_search(&self, board: &str, query: &str, limit: usize) -> Result<Vec<String>> {
        let url = Self::listing_url(board, query, limit)?;
        let body = self.client.get_text(url.as_str())?;
        let mut urls = parse_listing(&body)?;
        urls.truncate(limit);
        Ok(urls)
    }
}

impl BoardSearch for RedditSearch {
    fn search(&self, board: &str, query: &str, limit: usize) -> Vec<String> {
        match self.try_search(board, query, limit) {
            Ok(urls) => {
                log::debug!("Reddit r/{} '{}': {} images", board, query, urls.len());
                urls
            }
            Err(e) => {
                log::warn!("Reddit search in r/{} failed: {}", board, e);
                Vec::new()
            }
        }
    }
}
