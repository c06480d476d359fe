//! Image urls scraped from Google image search result pages.

use regex::Regex;
use std::sync::LazyLock;
use talk_core::{Result, SearchSource};

use crate::client::HttpClient;

const GOOGLE_SEARCH_URL: &str = "https://www.google.com/search";

/// Original image entries in the result page data: `["<url>",<height>,<width>]`.
static IMAGE_ENTRY_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\["(https?://[^"]+?\.(?:jpe?g|png|gif)(?:\?[^"]*)?)",(\d+),(\d+)\]"#).unwrap()
});

/// Older result pages list originals as `"ou":"<url>"`.
static ORIGINAL_URL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""ou":"(https?://[^"]+)""#).unwrap());

/// Size restriction passed to the search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSize {
    Any,
    /// Large pictures that fill a slide.
    FullScreen,
    /// Pictures wider than they are tall.
    Wide,
}

impl ImageSize {
    /// Value of the `tbs` search parameter, if any.
    pub fn filter(&self) -> Option<&'static str> {
        match self {
            ImageSize::Any => None,
            ImageSize::FullScreen => Some("isz:l"),
            ImageSize::Wide => Some("iar:w"),
        }
    }
}

fn unescape(url: &str) -> String {
    url.replace("\\u003d", "=").replace("\\u0026", "&").replace("\\/", "/")
}

/// Original image urls on a result page, skipping Google's own thumbnails.
pub fn parse_image_urls(html: &str) -> Vec<String> {
    let entries = IMAGE_ENTRY_REGEX.captures_iter(html).map(|caps| caps[1].to_string());
    let originals = ORIGINAL_URL_REGEX.captures_iter(html).map(|caps| caps[1].to_string());

    let mut urls: Vec<String> = Vec::new();
    for url in entries.chain(originals).map(|u| unescape(&u)) {
        if url.contains("gstatic.com") || url.contains("googleusercontent.com") {
            continue;
        }
        if !urls.contains(&url) {
            urls.push(url);
        }
    }
    urls
}

#[derive(Debug, Clone)]
pub struct GoogleImages {
    client: HttpClient,
    size: ImageSize,
}

impl GoogleImages {
    pub fn new(client: HttpClient, size: ImageSize) -> Self {
        Self { client, size }
    }

    fn try_search(&self, query: &str) -> Result<Vec<String>> {
        let mut params = vec![("q", query), ("tbm", "isch"), ("safe", "active")];
        if let Some(filter) = self.size.filter() {
            params.push(("tbs", filter));
        }
        let url = HttpClient::url(GOOGLE_SEARCH_URL, &params)?;
        Ok(parse_image_urls(&self.client.get_text(url.as_str())?))
    }
}

impl SearchSource for GoogleImages {
    fn search(&self, query: &str, limit: usize) -> Vec<String> {
        if query.trim().is_empty() {
            return Vec::new();
        }
        match self.try_search(query) {
            Ok(mut urls) => {
                urls.truncate(limit);
                log::debug!("Google images {:?} '{}': {} results", self.size, query, urls.len());
                urls
            }
            Err(e) => {
                log::warn!("Google image search for '{}' failed: {}", query, e);
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_image_urls() {
        let html = r#"
            ["https://encrypted-tbn0.gstatic.com/images?q=tbn:abc",163,310]
            ["https://example.com/cats/big.jpg",1080,1920]
            ["https://example.com/cats/big.jpg",1080,1920]
            ["https://example.com/cat.png?size=l&v=2",600,800]
            "ou":"https://old.example.com/kitten.gif"
        "#;
        assert_eq!(
            parse_image_urls(html),
            vec![
                "https://example.com/cats/big.jpg",
                "https://example.com/cat.png?size=l&v=2",
                "https://old.example.com/kitten.gif"
            ]
        );
    }

    #[test]
    fn test_parse_image_urls_without_results() {
        assert!(parse_image_urls("<html><body>No results</body></html>").is_empty());
    }

    #[test]
    fn test_size_filters() {
        assert_eq!(ImageSize::Any.filter(), None);
        assert_eq!(ImageSize::FullScreen.filter(), Some("isz:l"));
        assert_eq!(ImageSize::Wide.filter(), Some("iar:w"));
    }
}
