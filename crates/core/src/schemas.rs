//! The bundled presentation schemas.

use std::path::PathBuf;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::generator::{none, static_value};
use crate::registry::GeneratorRegistry;
use crate::schema::{plain_deck, PresentationSchema, SlideGenerator};
use crate::slides::{
    full_image_slide, image_column, image_slide, large_quote_slide, text_column, three_column_slide, title_slide,
    two_column_slide, two_column_tuple_caption_slide,
};
use crate::topics::SynonymTopics;
use crate::weight::{constant, peaked, BoxedWeight};

/// Names accepted by [`by_name`].
pub const SCHEMA_NAMES: &[&str] = &["default", "test"];

/// Image the smoke-test schema shows on every inspiration slide.
pub const STATIC_INSPIRATION_IMAGE: &str = "downloads/inspirobot/01-743.jpg";

/// Related words requested per talk for topic expansion.
const SYNONYM_LIMIT: usize = 20;

/// Look up a bundled schema. `smoke` is accepted as an alias of `test`.
pub fn by_name(name: &str, registry: &GeneratorRegistry) -> Result<PresentationSchema> {
    match name {
        "default" => Ok(default_schema(registry)),
        "test" | "smoke" => Ok(smoke_schema(registry)),
        other => Err(Error::UnknownSchema(other.to_string())),
    }
}

fn synonym_topics(registry: &GeneratorRegistry) -> Arc<SynonymTopics> {
    Arc::new(SynonymTopics::new(registry.sources.synonyms.clone(), SYNONYM_LIMIT))
}

/// The full talk: title, an about-me section early on, then a mix of gifs,
/// quotes, motivational posters and bold statements.
pub fn default_schema(r: &GeneratorRegistry) -> PresentationSchema {
    let entries = vec![
        SlideGenerator::new("Title slide", title_slide(r.talk_title.clone(), r.talk_subtitle.clone()))
            .with_weight(peaked(&[0], 100_000.0, 0.0)),
        SlideGenerator::new(
            "About Me: Location-Book-WeirdHobby",
            three_column_slide(
                r.about_me_title.clone(),
                image_column(r.location_description.clone(), r.location_image.clone()),
                image_column(r.book_description.clone(), r.book_cover_image.clone()),
                image_column(r.hobby_description.clone(), r.weird_and_shitpost_image.clone()),
            ),
        )
        .with_weight(peaked(&[1], 2000.0, 0.0))
        .with_allowed_repeated_elements(0),
        SlideGenerator::new(
            "Weird Hobby",
            image_slide(r.hobby_description.clone(), r.weird_and_shitpost_image.clone()),
        )
        .with_weight(peaked(&[1, 2], 10.0, 0.0))
        .with_allowed_repeated_elements(0),
        SlideGenerator::new(
            "Historical Figure Quote",
            two_column_slide(
                r.history_and_person_title.clone(),
                image_column(r.historical_name.clone(), r.vintage_person_image.clone()),
                text_column(none(), r.quote.clone()),
            ),
        )
        .with_weight(peaked(&[1, 2], 10.0, 0.4))
        .with_allowed_repeated_elements(1),
        SlideGenerator::new(
            "Two History Pictures",
            two_column_slide(
                r.history_title.clone(),
                image_column(none(), r.vintage_picture_image.clone()),
                image_column(none(), r.vintage_picture_image.clone()),
            ),
        )
        .with_weight(peaked(&[1, 2], 4.0, 0.2))
        .with_allowed_repeated_elements(1),
        SlideGenerator::new("Full Screen Gif", full_image_slide(r.titled_topic.clone(), r.gif.clone())),
        SlideGenerator::new(
            "Inspirobot",
            image_slide(r.inspiration_title.clone(), r.inspirobot_image.clone()),
        )
        .with_weight(constant(0.6)),
        SlideGenerator::new("Wikihow Bold Statement", large_quote_slide(r.bold_statement.clone())),
        SlideGenerator::new("Google Images", full_image_slide(none(), r.full_screen_image.clone())),
        SlideGenerator::new(
            "Google Images Wide",
            full_image_slide(r.titled_topic.clone(), r.wide_image.clone()),
        ),
        SlideGenerator::new(
            "Two Captions Gifs",
            two_column_tuple_caption_slide(
                r.titled_topic.clone(),
                r.double_captions.clone(),
                r.gif.clone(),
                r.gif.clone(),
            ),
        ),
        SlideGenerator::new(
            "Two Captions Weird Reddit",
            two_column_tuple_caption_slide(
                r.titled_topic.clone(),
                r.double_captions.clone(),
                r.weird_image.clone(),
                r.weird_image.clone(),
            ),
        ),
    ];

    PresentationSchema::new(plain_deck, synonym_topics(r), entries)
}

/// A small schema that works without any source: up to three inspiration
/// slides with a fixed image, and topic-only bold statements after the
/// first slide.
pub fn smoke_schema(r: &GeneratorRegistry) -> PresentationSchema {
    let after_first: BoxedWeight = Arc::new(|position: usize| if position == 0 { 0.0 } else { 0.5 });

    let entries = vec![
        SlideGenerator::new(
            "Fake Inspirobot",
            image_slide(
                r.inspiration_title.clone(),
                static_value(PathBuf::from(STATIC_INSPIRATION_IMAGE)),
            ),
        )
        .with_weight(constant(1.0))
        .with_allowed_repeated_elements(2),
        SlideGenerator::new("Offline Bold Statement", large_quote_slide(r.offline_bold_statement.clone()))
            .with_weight(after_first),
    ];

    PresentationSchema::new(plain_deck, synonym_topics(r), entries)
}
