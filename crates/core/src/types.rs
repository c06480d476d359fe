//! Domain types for generated talks: the per-slide context and the deck.

use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

use crate::normalize::file_stem_from_topic;

const DETACHED_SALT: u64 = 0x5eed_0ff5_e7d1_7a11;

/// Mix a value into a seed, producing a new reproducible seed.
pub fn mix_seed(seed: u64, salt: impl Hash) -> u64 {
    let mut hasher = DefaultHasher::new();
    seed.hash(&mut hasher);
    salt.hash(&mut hasher);
    hasher.finish()
}

/// Per-slide input handed to every generator.
///
/// A context is never modified once built; derived contexts (an extra
/// template variable, a retry, a detached fallback) are new values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Context {
    topic: String,
    seed: u64,
    slide_index: usize,
    presenter: String,
    vars: BTreeMap<String, String>,
}

impl Context {
    /// Create the context for one slide position.
    ///
    /// The seed is derived from the topic and the index, so the same topic at
    /// the same position always starts from the same randomness.
    pub fn new(topic: impl Into<String>, slide_index: usize, presenter: impl Into<String>) -> Self {
        let topic = topic.into();
        let seed = mix_seed(slide_index as u64, &topic);
        Self {
            topic,
            seed,
            slide_index,
            presenter: presenter.into(),
            vars: BTreeMap::new(),
        }
    }

    /// The topic of this slide.
    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// 0-based position of the slide in the deck.
    pub fn slide_index(&self) -> usize {
        self.slide_index
    }

    pub fn presenter(&self) -> &str {
        &self.presenter
    }

    /// Look up a template variable.
    ///
    /// `topic` and `presenter` are always available; anything else must have
    /// been added with [`Context::with_var`].
    pub fn var(&self, key: &str) -> Option<&str> {
        match key {
            "topic" => Some(self.topic.as_str()),
            "presenter" => Some(self.presenter.as_str()),
            _ => self.vars.get(key).map(String::as_str),
        }
    }

    /// A copy of this context with one more template variable.
    pub fn with_var(&self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut ctx = self.clone();
        ctx.vars.insert(key.into(), value.into());
        ctx
    }

    /// A copy of this context whose seed has been moved by `salt`.
    pub fn reseeded(&self, salt: u64) -> Self {
        let mut ctx = self.clone();
        ctx.seed = mix_seed(self.seed, salt);
        ctx
    }

    /// A fresh context unrelated to this slide's topic draw.
    ///
    /// Keeps position and presenter, drops the topic and extra variables and
    /// moves the seed. Sources read an empty topic as "anything".
    pub fn detached(&self) -> Self {
        Self {
            topic: String::new(),
            seed: mix_seed(self.seed, DETACHED_SALT),
            slide_index: self.slide_index,
            presenter: self.presenter.clone(),
            vars: BTreeMap::new(),
        }
    }
}

/// Layout family of a generated slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlideLayout {
    /// Talk title and subtitle.
    Title,
    /// Title above one image.
    Image,
    /// One image filling the slide, optional title.
    FullImage,
    /// A single large statement.
    LargeQuote,
    /// Two captioned columns.
    TwoColumn,
    /// Three captioned columns.
    ThreeColumn,
}

impl SlideLayout {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Image => "image",
            Self::FullImage => "full-image",
            Self::LargeQuote => "large-quote",
            Self::TwoColumn => "two-column",
            Self::ThreeColumn => "three-column",
        }
    }
}

/// A piece of rendered content placed on a slide.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SlideContent {
    /// A text block such as a quote or a statement.
    Text(String),
    /// A local image file.
    Image(PathBuf),
}

impl SlideContent {
    /// Identity of this value for repetition tracking across a deck.
    pub fn key(&self) -> String {
        match self {
            Self::Text(text) => format!("text:{}", text),
            Self::Image(path) => format!("image:{}", path.display()),
        }
    }

    pub fn as_image(&self) -> Option<&Path> {
        match self {
            Self::Image(path) => Some(path),
            Self::Text(_) => None,
        }
    }
}

/// One column of a slide: an optional caption over optional content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub caption: Option<String>,
    pub content: Option<SlideContent>,
}

impl Column {
    pub fn new(caption: Option<String>, content: Option<SlideContent>) -> Self {
        Self { caption, content }
    }
}

/// A single generated slide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slide {
    /// 0-based position in the deck.
    pub index: usize,

    /// Name of the slide generator that produced this slide.
    pub generator: String,

    pub layout: SlideLayout,

    pub title: Option<String>,

    pub subtitle: Option<String>,

    /// Body columns, left to right.
    pub columns: Vec<Column>,
}

impl Slide {
    /// Create an empty slide with the given layout.
    pub fn new(layout: SlideLayout) -> Self {
        Self {
            index: 0,
            generator: String::new(),
            layout,
            title: None,
            subtitle: None,
            columns: Vec::new(),
        }
    }

    pub fn with_title(mut self, title: Option<String>) -> Self {
        self.title = title;
        self
    }

    pub fn with_subtitle(mut self, subtitle: Option<String>) -> Self {
        self.subtitle = subtitle;
        self
    }

    /// Add a body column.
    pub fn add_column(&mut self, caption: Option<String>, content: Option<SlideContent>) {
        self.columns.push(Column::new(caption, content));
    }

    /// All body content values on this slide, in column order.
    pub fn contents(&self) -> impl Iterator<Item = &SlideContent> {
        self.columns.iter().filter_map(|c| c.content.as_ref())
    }

    /// All images on this slide.
    pub fn images(&self) -> Vec<&Path> {
        self.contents().filter_map(SlideContent::as_image).collect()
    }
}

/// A deck position that no slide generator could fill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlideGap {
    /// 0-based position in the deck.
    pub index: usize,

    /// Names of the generators tried for this position, in order.
    pub attempted: Vec<String>,
}

/// A generated talk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Presentation {
    /// Root topic the talk was generated for.
    pub topic: String,

    pub presenter: String,

    /// Slides in deck order.
    pub slides: Vec<Slide>,

    /// Positions left empty, in deck order.
    pub gaps: Vec<SlideGap>,
}

impl Presentation {
    /// Create an empty deck for a topic and presenter.
    pub fn new(topic: impl Into<String>, presenter: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            presenter: presenter.into(),
            slides: Vec::new(),
            gaps: Vec::new(),
        }
    }

    pub fn add_slide(&mut self, slide: Slide) {
        self.slides.push(slide);
    }

    pub fn add_gap(&mut self, gap: SlideGap) {
        self.gaps.push(gap);
    }

    /// Number of positions accounted for, filled or not.
    pub fn positions(&self) -> usize {
        self.slides.len() + self.gaps.len()
    }

    /// True when every position holds a slide.
    pub fn is_complete(&self) -> bool {
        self.gaps.is_empty()
    }

    /// Base file name suggested for saving this deck.
    pub fn suggested_file_stem(&self) -> String {
        file_stem_from_topic(&self.topic)
    }
}
