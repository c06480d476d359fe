//! Network-backed content sources for the talk generator.
//!
//! Every source implements one of the `talk-core` source traits. Requests
//! are blocking; failures are logged and turned into empty results at the
//! trait boundary, so a slow or unreachable site only costs its slides.

pub mod client;
pub mod datamuse;
pub mod fetcher;
pub mod giphy;
pub mod goodreads;
pub mod google;
pub mod inspirobot;
pub mod reddit;
pub mod shitpostbot;
pub mod wikihow;

use std::sync::Arc;
use talk_core::{EmptySource, RandomSource, Result, Sources};

pub use client::{HttpClient, SourceConfig};
pub use datamuse::DatamuseSynonyms;
pub use fetcher::HttpFetcher;
pub use giphy::GiphyRandom;
pub use goodreads::GoodreadsQuotes;
pub use google::{GoogleImages, ImageSize};
pub use inspirobot::Inspirobot;
pub use reddit::RedditSearch;
pub use shitpostbot::ShitpostBot;
pub use wikihow::WikihowActions;

/// Every source backed by its website, sharing one HTTP client.
///
/// Gifs come from Giphy only when `config` carries an API key.
pub fn online(config: &SourceConfig) -> Result<Sources> {
    let client = HttpClient::new(config)?;

    let gifs: Arc<dyn RandomSource> = match &config.giphy_api_key {
        Some(key) => Arc::new(GiphyRandom::new(client.clone(), key.clone())),
        None => {
            log::info!("No Giphy API key, gif slides will use Reddit only");
            Arc::new(EmptySource)
        }
    };

    let shitposts = Arc::new(ShitpostBot::new(client.clone()));

    Ok(Sources {
        boards: Arc::new(RedditSearch::new(client.clone())),
        gifs,
        inspiration: Arc::new(Inspirobot::new(client.clone())),
        quotes: Arc::new(GoodreadsQuotes::new(client.clone())),
        actions: Arc::new(WikihowActions::new(client.clone())),
        synonyms: Arc::new(DatamuseSynonyms::new(client.clone())),
        full_screen_images: Arc::new(GoogleImages::new(client.clone(), ImageSize::FullScreen)),
        wide_images: Arc::new(GoogleImages::new(client.clone(), ImageSize::Wide)),
        shitposts: shitposts.clone(),
        random_shitposts: shitposts,
        fetcher: Arc::new(HttpFetcher::new(client)),
    })
}
