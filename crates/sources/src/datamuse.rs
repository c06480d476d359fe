//! Related words from the Datamuse API, used to vary slide topics.

use serde::Deserialize;
use talk_core::{Result, SearchSource};

use crate::client::HttpClient;

const DATAMUSE_WORDS_URL: &str = "https://api.datamuse.com/words";

#[derive(Debug, Deserialize)]
struct Word {
    word: String,
}

#[derive(Debug, Clone)]
pub struct DatamuseSynonyms {
    client: HttpClient,
}

impl DatamuseSynonyms {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }

    fn try_search(&self, query: &str, limit: usize) -> Result<Vec<String>> {
        let max = limit.to_string();
        // `ml` asks for words with a similar meaning.
        let url = HttpClient::url(DATAMUSE_WORDS_URL, &[("ml", query), ("max", max.as_str())])?;
        let words: Vec<Word> = self.client.get_json(url.as_str())?;
        Ok(words.into_iter().map(|w| w.word).collect())
    }
}

impl SearchSource for DatamuseSynonyms {
    fn search(&self, query: &str, limit: usize) -> Vec<String> {
        if query.trim().is_empty() {
            return Vec::new();
        }
        match self.try_search(query, limit) {
            Ok(words) => {
                log::debug!("Datamuse '{}': {:?}", query, words);
                words
            }
            Err(e) => {
                log::warn!("Datamuse lookup for '{}' failed: {}", query, e);
                Vec::new()
            }
        }
    }
}
