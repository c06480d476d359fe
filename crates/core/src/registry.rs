//! The set of content generators every schema draws from.
//!
//! Built once at startup from a [`Sources`] bundle and the bundled text
//! data, then shared read-only by the schemas.

use rand::rngs::StdRng;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::cache::DownloadCache;
use crate::error::Result;
use crate::generator::{
    backup, boxed, combined, filtered, from_external_list, from_fn, from_list, retain, seeded, seeded_with,
    split_pair, titled_identity, BoxedGenerator, Generator,
};
use crate::normalize::{cache_key, sanitize_component, title_case};
use crate::source::{board_generator, random_generator, search_generator, SearchSource, Sources};
use crate::text::{Grammar, TemplatedText};
use crate::types::Context;

const TALK_TITLES: &str = include_str!("../data/talk_title.txt");
const TALK_SUBTITLES: &str = include_str!("../data/talk_subtitle.json");
const INSPIRATION_TITLES: &str = include_str!("../data/inspiration.txt");
const HISTORY_TITLES: &str = include_str!("../data/history.txt");
const HISTORY_PERSON_TITLES: &str = include_str!("../data/history_person.txt");
const ABOUT_ME_TITLES: &str = include_str!("../data/about_me_title.txt");
const BOLD_STATEMENTS: &str = include_str!("../data/bold_statements.txt");
const DOUBLE_CAPTIONS: &str = include_str!("../data/double_captions.txt");
const NAMES: &str = include_str!("../data/name.json");
const ABOUT_ME_FACTS: &str = include_str!("../data/about_me_facts.json");

/// Search result count requested from image boards.
const BOARD_SEARCH_LIMIT: usize = 50;

/// Quote search result count.
const QUOTE_SEARCH_LIMIT: usize = 50;

/// Longest quote shown on a slide, in characters.
pub const MAX_QUOTE_LENGTH: usize = 280;

/// Related "how to" actions requested per bold statement.
const ACTION_SEARCH_LIMIT: usize = 25;

/// Web image search result count.
const IMAGE_SEARCH_LIMIT: usize = 20;

/// Meme source image search result count.
const SHITPOST_SEARCH_LIMIT: usize = 25;

pub const WEIRD_BOARDS: &[&str] = &[
    "hmmm",
    "hmm",
    "wtf",
    "wtfstockphotos",
    "photoshopbattles",
    "confusing_perspective",
    "cursedimages",
    "HybridAnimals",
];
pub const GIF_BOARDS: &[&str] = &["gifs", "gif", "gifextra", "nonononoYES"];
pub const VINTAGE_PERSON_BOARDS: &[&str] = &["OldSchoolCool"];
pub const VINTAGE_PICTURE_BOARDS: &[&str] = &["TheWayWeWere", "100yearsago", "ColorizedHistory"];
pub const BOOK_COVER_BOARDS: &[&str] = &["BookCovers", "fakebookcovers", "coverdesign", "bookdesign"];
pub const LOCATION_BOARDS: &[&str] = &["evilbuildings", "itookapicture", "SkyPorn", "EarthPorn"];

/// Cache identifier for a Giphy url: `giphy/<gif id>.gif`.
///
/// Giphy serves every gif as `.../media/<id>/giphy.gif`, so the id is the
/// parent path segment.
fn giphy_cache_key(url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next()?;
    let mut segments = path.trim_end_matches('/').rsplit('/');
    let file = segments.next()?;
    let id = match segments.next() {
        Some(parent) if file.starts_with("giphy") => parent,
        _ => file.trim_end_matches(".gif"),
    };
    let id = sanitize_component(id);
    if id.is_empty() {
        None
    } else {
        Some(format!("giphy/{}.gif", id))
    }
}

/// Every content generator the bundled schemas use.
pub struct GeneratorRegistry {
    pub sources: Sources,
    pub cache: Arc<DownloadCache>,

    pub talk_title: BoxedGenerator<String>,
    pub talk_subtitle: BoxedGenerator<String>,
    pub inspiration_title: BoxedGenerator<String>,
    pub history_title: BoxedGenerator<String>,
    pub history_person_title: BoxedGenerator<String>,
    /// History or history-person titles, 4 to 6.
    pub history_and_person_title: BoxedGenerator<String>,
    pub about_me_title: BoxedGenerator<String>,
    /// The slide topic in title case, fixed per position.
    pub titled_topic: BoxedGenerator<String>,

    pub full_name: BoxedGenerator<String>,
    pub historical_name: BoxedGenerator<String>,
    pub book_description: BoxedGenerator<String>,
    pub location_description: BoxedGenerator<String>,
    pub hobby_description: BoxedGenerator<String>,
    pub job: BoxedGenerator<String>,

    /// Bold statement built around a related how-to action when one exists.
    pub bold_statement: BoxedGenerator<String>,
    /// Bold statement using only the topic; never touches a source.
    pub offline_bold_statement: BoxedGenerator<String>,
    /// Two captions meant to be read side by side.
    pub double_captions: BoxedGenerator<(String, String)>,
    /// Quote about the topic, at most [`MAX_QUOTE_LENGTH`] characters.
    pub quote: BoxedGenerator<String>,

    pub weird_image: BoxedGenerator<PathBuf>,
    pub shitpostbot_image: BoxedGenerator<PathBuf>,
    /// Weird board images or meme source images, 1 to 2.
    pub weird_and_shitpost_image: BoxedGenerator<PathBuf>,
    /// Large web image search result for the slide topic.
    pub full_screen_image: BoxedGenerator<PathBuf>,
    /// Wide web image search result for the slide topic.
    pub wide_image: BoxedGenerator<PathBuf>,
    pub vintage_person_image: BoxedGenerator<PathBuf>,
    pub vintage_picture_image: BoxedGenerator<PathBuf>,
    pub book_cover_image: BoxedGenerator<PathBuf>,
    pub location_image: BoxedGenerator<PathBuf>,
    pub reddit_gif: BoxedGenerator<PathBuf>,
    pub giphy_gif: BoxedGenerator<PathBuf>,
    /// Giphy or reddit gifs, even odds.
    pub gif: BoxedGenerator<PathBuf>,
    pub inspirobot_image: BoxedGenerator<PathBuf>,

    names: Grammar,
}

impl GeneratorRegistry {
    /// Build every generator, storing downloads under `cache_root`.
    ///
    /// Fails only when bundled text data does not load.
    pub fn load(sources: Sources, cache_root: impl Into<PathBuf>) -> Result<Self> {
        let cache = Arc::new(DownloadCache::new(cache_root, sources.fetcher.clone()));
        log::debug!("Loading generators, downloads under {}", cache.root().display());

        let history_title = boxed(TemplatedText::from_lines(HISTORY_TITLES)?);
        let history_person_title = boxed(TemplatedText::from_lines(HISTORY_PERSON_TITLES)?);
        let history_and_person_title = boxed(combined(vec![
            (4.0, history_title.clone()),
            (6.0, history_person_title.clone()),
        ]));

        let names = Grammar::from_json(NAMES, "full_name")?;
        let facts = Grammar::from_json(ABOUT_ME_FACTS, "location_description")?;

        let bold_templates = TemplatedText::from_lines(BOLD_STATEMENTS)?;

        let weird_image = reddit_image_generator(&sources, &cache, WEIRD_BOARDS);
        let shitpostbot_image = shitpostbot_image_generator(&sources, &cache);
        let weird_and_shitpost_image = boxed(combined(vec![
            (1.0, weird_image.clone()),
            (2.0, shitpostbot_image.clone()),
        ]));
        let reddit_gif = reddit_image_generator(&sources, &cache, GIF_BOARDS);
        let giphy_gif = boxed(seeded_with(
            2,
            from_external_list(random_generator(sources.gifs.clone()), cache.clone(), giphy_cache_key),
        ));
        let gif = boxed(combined(vec![(0.5, giphy_gif.clone()), (0.5, reddit_gif.clone())]));

        let validator = cache.clone();
        let inspirobot_image = boxed(filtered(
            from_external_list(random_generator(sources.inspiration.clone()), cache.clone(), |url: &str| {
                cache_key("inspirobot", url)
            }),
            move |path: &PathBuf| validator.keep_if_image(path),
        ));

        Ok(Self {
            talk_title: boxed(TemplatedText::from_lines(TALK_TITLES)?),
            talk_subtitle: boxed(Grammar::from_json(TALK_SUBTITLES, "origin")?),
            inspiration_title: boxed(TemplatedText::from_lines(INSPIRATION_TITLES)?),
            history_title,
            history_person_title,
            history_and_person_title,
            about_me_title: boxed(TemplatedText::from_lines(ABOUT_ME_TITLES)?),
            titled_topic: boxed(seeded(titled_identity())),

            full_name: boxed(names.clone()),
            historical_name: boxed(names.with_origin("title_name")?),
            book_description: boxed(facts.with_origin("book_description")?),
            location_description: boxed(facts.clone()),
            hobby_description: boxed(facts.with_origin("hobby_description")?),
            job: boxed(facts.with_origin("job")?),

            bold_statement: boxed(wikihow_bold_statement(&sources, bold_templates.clone())),
            offline_bold_statement: boxed(bold_templates),
            double_captions: boxed(split_pair(TemplatedText::from_lines(DOUBLE_CAPTIONS)?, '|')),
            quote: boxed(quote_generator(&sources, MAX_QUOTE_LENGTH)),

            vintage_person_image: reddit_image_generator(&sources, &cache, VINTAGE_PERSON_BOARDS),
            vintage_picture_image: reddit_image_generator(&sources, &cache, VINTAGE_PICTURE_BOARDS),
            book_cover_image: reddit_image_generator(&sources, &cache, BOOK_COVER_BOARDS),
            location_image: reddit_image_generator(&sources, &cache, LOCATION_BOARDS),
            full_screen_image: web_image_generator(sources.full_screen_images.clone(), &cache, "google/full"),
            wide_image: web_image_generator(sources.wide_images.clone(), &cache, "google/wide"),
            weird_image,
            shitpostbot_image,
            weird_and_shitpost_image,
            reddit_gif,
            giphy_gif,
            gif,
            inspirobot_image,

            names,
            sources,
            cache,
        })
    }

    /// Root directory of the download cache.
    pub fn downloads(&self) -> &Path {
        self.cache.root()
    }

    /// A random presenter name.
    pub fn random_presenter(&self, rng: &mut StdRng) -> String {
        self.names.expand(rng).unwrap_or_else(|| "Anonymous".to_string())
    }
}

/// Images from a group of boards searched for the slide topic.
///
/// Falls back to whatever the boards offer for an empty query when the
/// topic finds nothing. Files are cached as `reddit/<group>/<file name>`.
pub fn reddit_image_generator(sources: &Sources, cache: &Arc<DownloadCache>, boards: &[&str]) -> BoxedGenerator<PathBuf> {
    let group = boards.join("+");
    let key_prefix = format!("reddit/{}", group);

    let images = cached_images(
        board_generator(sources.boards.clone(), &group, BOARD_SEARCH_LIMIT),
        cache,
        move |url: &str| cache_key(&key_prefix, url),
    );

    boxed(backup(images.clone(), images))
}

/// Meme source images for the slide topic, or random ones when the search
/// finds nothing. Files are cached as `shitpostbot/<file name>`.
pub fn shitpostbot_image_generator(sources: &Sources, cache: &Arc<DownloadCache>) -> BoxedGenerator<PathBuf> {
    let candidates = backup(
        retain(
            search_generator(sources.shitposts.clone(), SHITPOST_SEARCH_LIMIT),
            |url: &String| !url.trim().is_empty(),
        ),
        random_generator(sources.random_shitposts.clone()),
    );
    cached_images(candidates, cache, |url: &str| cache_key("shitpostbot", url))
}

/// Web image search results for the slide topic, cached under `key_prefix`.
pub fn web_image_generator(
    source: Arc<dyn SearchSource>,
    cache: &Arc<DownloadCache>,
    key_prefix: &'static str,
) -> BoxedGenerator<PathBuf> {
    cached_images(
        search_generator(source, IMAGE_SEARCH_LIMIT),
        cache,
        move |url: &str| cache_key(key_prefix, url),
    )
}

/// One downloaded image per context from a list of remote candidates.
/// Files that do not decode are evicted from the cache and yield nothing.
fn cached_images<G, K>(candidates: G, cache: &Arc<DownloadCache>, key: K) -> BoxedGenerator<PathBuf>
where
    G: Generator<Vec<String>> + 'static,
    K: Fn(&str) -> Option<String> + Send + Sync + 'static,
{
    let validator = cache.clone();
    boxed(seeded(filtered(
        from_external_list(candidates, cache.clone(), key),
        move |path: &PathBuf| validator.keep_if_image(path),
    )))
}

/// Quotes about the slide topic, no longer than `max_length` characters.
pub fn quote_generator(sources: &Sources, max_length: usize) -> impl Generator<String> {
    seeded_with(
        1,
        from_list(retain(
            search_generator(sources.quotes.clone(), QUOTE_SEARCH_LIMIT),
            move |quote: &String| !quote.trim().is_empty() && quote.chars().count() <= max_length,
        )),
    )
}

/// Bold statements that use a related how-to action as `{action}` when the
/// action search finds one, and topic-only statements otherwise.
pub fn wikihow_bold_statement(sources: &Sources, templates: TemplatedText) -> impl Generator<String> {
    let actions = boxed(seeded_with(3, from_list(search_generator(sources.actions.clone(), ACTION_SEARCH_LIMIT))));
    from_fn(move |ctx: &Context, rng: &mut StdRng| match actions.generate(ctx, rng) {
        Some(action) => templates.generate(&ctx.with_var("action", title_case(&action)), rng),
        None => templates.generate(ctx, rng),
    })
}
