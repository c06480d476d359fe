//! Quote search scraped from Goodreads.

use regex::Regex;
use std::sync::LazyLock;
use talk_core::{Result, SearchSource};

use crate::client::HttpClient;

const GOODREADS_SEARCH_URL: &str = "https://www.goodreads.com/quotes/search";

/// Quotes shown per result page.
const QUOTES_PER_PAGE: usize = 20;

/// Never fetch more than this many pages for one search.
const MAX_PAGES: usize = 5;

/// Quote body between curly quote entities inside a quote block.
static QUOTE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?s)<div class="quoteText">\s*&ldquo;(.*?)&rdquo;"#).unwrap());

static TAG_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());

static WHITESPACE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Decode the handful of entities Goodreads uses in quote text.
fn decode_entities(text: &str) -> String {
    text.replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&rsquo;", "'")
        .replace("&lsquo;", "'")
        .replace("&hellip;", "...")
        .replace("&mdash;", "-")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

/// Quotes on one result page, each wrapped in plain double quotes.
pub fn parse_quotes(html: &str) -> Vec<String> {
    QUOTE_REGEX
        .captures_iter(html)
        .filter_map(|caps| {
            let without_tags = TAG_REGEX.replace_all(&caps[1], " ");
            let decoded = decode_entities(&without_tags);
            let text = WHITESPACE_REGEX.replace_all(decoded.trim(), " ");
            if text.is_empty() {
                None
            } else {
                Some(format!("\"{}\"", text))
            }
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct GoodreadsQuotes {
    client: HttpClient,
}

impl GoodreadsQuotes {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }

    fn fetch_page(&self, query: &str, page: usize) -> Result<Vec<String>> {
        let page = page.to_string();
        let url = HttpClient::url(
            GOODREADS_SEARCH_URL,
            &[("q", query), ("commit", "Search"), ("page", page.as_str())],
        )?;
        Ok(parse_quotes(&self.client.get_text(url.as_str())?))
    }
}

impl SearchSource for GoodreadsQuotes {
    fn search(&self, query: &str, limit: usize) -> Vec<String> {
        if query.trim().is_empty() || limit == 0 {
            return Vec::new();
        }

        let pages = limit.div_ceil(QUOTES_PER_PAGE).min(MAX_PAGES);
        let mut quotes = Vec::new();
        for page in 1..=pages {
            match self.fetch_page(query, page) {
                Ok(found) if found.is_empty() => break,
                Ok(found) => quotes.extend(found),
                Err(e) => {
                    log::warn!("Goodreads search for '{}' failed on page {}: {}", query, page, e);
                    break;
                }
            }
            if quotes.len() >= limit {
                break;
            }
        }

        quotes.truncate(limit);
        log::debug!("Goodreads '{}': {} quotes", query, quotes.len());
        quotes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
      <div class="quote">
        <div class="quoteText">
          &ldquo;Time spent with cats is never wasted.&rdquo;
          <br>  &#8213;
          <span class="authorOrTitle">Sigmund Freud</span>
        </div>
      </div>
      <div class="quote">
        <div class="quoteText">
          &ldquo;I have lived with several Zen masters &mdash; all of them cats.<br>
          They&#39;re <i>wise</i> &amp; patient.&rdquo;
        </div>
      </div>
      <div class="quoteText">&ldquo;   &rdquo;</div>
    "#;

    #[test]
    fn test_parse_quotes() {
        let quotes = parse_quotes(PAGE);
        assert_eq!(
            quotes,
            vec![
                "\"Time spent with cats is never wasted.\"",
                "\"I have lived with several Zen masters - all of them cats. They're wise & patient.\"",
            ]
        );
    }

    #[test]
    fn test_quotes_start_with_quote_mark() {
        for quote in parse_quotes(PAGE) {
            assert!(quote.starts_with('"'));
        }
    }

    #[test]
    fn test_parse_quotes_empty_page() {
        assert!(parse_quotes("<html><body>No quotes found</body></html>").is_empty());
    }
}
