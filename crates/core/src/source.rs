//! Contracts for the external content sources the generators draw from.
//!
//! Implementations live outside this crate (see `talk-sources`). Every method
//! here answers "nothing" rather than failing: a source that cannot be
//! reached returns an empty list or `None` and logs why.

use rand::rngs::StdRng;
use std::path::Path;
use std::sync::Arc;

use crate::cache::Fetch;
use crate::error::{Error, Result};
use crate::generator::{from_fn, Generator};
use crate::types::Context;

/// Free-text search returning candidate items (quotes, actions, synonyms, URLs).
pub trait SearchSource: Send + Sync {
    fn search(&self, query: &str, limit: usize) -> Vec<String>;
}

/// Search scoped to a board, such as a `+`-joined group of subreddits.
pub trait BoardSearch: Send + Sync {
    /// Search `board` for image URLs matching `query`. An empty query asks
    /// for whatever the board currently offers.
    fn search(&self, board: &str, query: &str, limit: usize) -> Vec<String>;
}

/// Source of a single random item, optionally steered by a tag.
pub trait RandomSource: Send + Sync {
    fn random(&self, tag: &str) -> Option<String>;
}

/// A source that never has anything. Used offline and for disabled sources.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptySource;

impl SearchSource for EmptySource {
    fn search(&self, _query: &str, _limit: usize) -> Vec<String> {
        Vec::new()
    }
}

impl BoardSearch for EmptySource {
    fn search(&self, _board: &str, _query: &str, _limit: usize) -> Vec<String> {
        Vec::new()
    }
}

impl RandomSource for EmptySource {
    fn random(&self, _tag: &str) -> Option<String> {
        None
    }
}

/// A fetcher with no network: every download fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFetch;

impl Fetch for NoFetch {
    fn fetch(&self, locator: &str, _destination: &Path) -> Result<()> {
        Err(Error::SourceUnavailable(format!("offline, cannot fetch {}", locator)))
    }
}

/// Every external collaborator a registry needs.
#[derive(Clone)]
pub struct Sources {
    /// Image boards (subreddit groups).
    pub boards: Arc<dyn BoardSearch>,
    /// Random gifs by tag.
    pub gifs: Arc<dyn RandomSource>,
    /// Random motivational poster images.
    pub inspiration: Arc<dyn RandomSource>,
    /// Quote search.
    pub quotes: Arc<dyn SearchSource>,
    /// "How to" action search.
    pub actions: Arc<dyn SearchSource>,
    /// Related-word search for topic expansion.
    pub synonyms: Arc<dyn SearchSource>,
    /// Web image search limited to large pictures.
    pub full_screen_images: Arc<dyn SearchSource>,
    /// Web image search limited to wide pictures.
    pub wide_images: Arc<dyn SearchSource>,
    /// Meme source image search.
    pub shitposts: Arc<dyn SearchSource>,
    /// Random meme source images, used when the search finds nothing.
    pub random_shitposts: Arc<dyn RandomSource>,
    /// Asset downloader behind the download cache.
    pub fetcher: Arc<dyn Fetch>,
}

impl Sources {
    /// Sources that never return anything and never touch the network.
    pub fn offline() -> Self {
        Self {
            boards: Arc::new(EmptySource),
            gifs: Arc::new(EmptySource),
            inspiration: Arc::new(EmptySource),
            quotes: Arc::new(EmptySource),
            actions: Arc::new(EmptySource),
            synonyms: Arc::new(EmptySource),
            full_screen_images: Arc::new(EmptySource),
            wide_images: Arc::new(EmptySource),
            shitposts: Arc::new(EmptySource),
            random_shitposts: Arc::new(EmptySource),
            fetcher: Arc::new(NoFetch),
        }
    }
}

/// Generator searching `source` for the slide topic.
pub fn search_generator(source: Arc<dyn SearchSource>, limit: usize) -> impl Generator<Vec<String>> {
    from_fn(move |ctx: &Context, _rng: &mut StdRng| Some(source.search(ctx.topic(), limit)))
}

/// Generator searching one board for the slide topic.
pub fn board_generator(source: Arc<dyn BoardSearch>, board: &str, limit: usize) -> impl Generator<Vec<String>> {
    let board = board.to_string();
    from_fn(move |ctx: &Context, _rng: &mut StdRng| Some(source.search(&board, ctx.topic(), limit)))
}

/// Generator asking `source` for one random item tagged with the slide topic,
/// as a one-element candidate list.
pub fn random_generator(source: Arc<dyn RandomSource>) -> impl Generator<Vec<String>> {
    from_fn(move |ctx: &Context, _rng: &mut StdRng| source.random(ctx.topic()).map(|item| vec![item]))
}
