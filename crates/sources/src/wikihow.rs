//! Related "how to" actions scraped from WikiHow search results.

use regex::Regex;
use std::sync::LazyLock;
use talk_core::{Result, SearchSource};

use crate::client::HttpClient;

const WIKIHOW_SEARCH_URL: &str = "https://www.wikihow.com/wikiHowTo";

static RESULT_TITLE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?s)<div class="result_title">(.*?)</div>"#).unwrap());

static HOW_TO_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^how\s+to\s+").unwrap());

static TAG_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());

/// Section headings that show up among result titles.
const NOT_ACTIONS: &[&str] = &["articles from wikihow", "related articles"];

/// Actions from a search result page, without the "How to" prefix.
pub fn parse_actions(html: &str) -> Vec<String> {
    let mut actions: Vec<String> = Vec::new();
    for caps in RESULT_TITLE_REGEX.captures_iter(html) {
        let title = TAG_REGEX.replace_all(&caps[1], "");
        let title = title.replace("&amp;", "&").replace("&#39;", "'").replace("&quot;", "\"");
        let title = title.split_whitespace().collect::<Vec<_>>().join(" ");

        if NOT_ACTIONS.contains(&title.to_lowercase().as_str()) {
            continue;
        }
        let action = HOW_TO_REGEX.replace(&title, "").trim().to_string();
        if !action.is_empty() && !actions.contains(&action) {
            actions.push(action);
        }
    }
    actions
}

#[derive(Debug, Clone)]
pub struct WikihowActions {
    client: HttpClient,
}

impl WikihowActions {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }

    fn try_search(&self, query: &str) -> Result<Vec<String>> {
        let url = HttpClient::url(WIKIHOW_SEARCH_URL, &[("search", query)])?;
        Ok(parse_actions(&self.client.get_text(url.as_str())?))
    }
}

impl SearchSource for WikihowActions {
    fn search(&self, query: &str, limit: usize) -> Vec<String> {
        if query.trim().is_empty() {
            return Vec::new();
        }
        match self.try_search(query) {
            Ok(mut actions) => {
                actions.truncate(limit);
                log::debug!("WikiHow '{}': {} actions", query, actions.len());
                actions
            }
            Err(e) => {
                log::warn!("WikiHow search for '{}' failed: {}", query, e);
                Vec::new()
            }
        }
    }
}
