//! Core of the talk generator: generator combinators, weighted slide
//! selection, presentation schemas and the download cache.

pub mod cache;
pub mod error;
pub mod generator;
pub mod normalize;
pub mod outline;
pub mod registry;
pub mod schema;
pub mod schemas;
pub mod slides;
pub mod source;
pub mod text;
pub mod topics;
pub mod types;
pub mod weight;

pub use cache::{DownloadCache, Fetch};
pub use error::{Error, Result};
pub use generator::{BoxedGenerator, Generator};
pub use outline::OutlineFormatter;
pub use registry::GeneratorRegistry;
pub use schema::{PresentationSchema, SlideGenerator};
pub use source::{BoardSearch, EmptySource, RandomSource, SearchSource, Sources};
pub use types::{Column, Context, Presentation, Slide, SlideContent, SlideGap, SlideLayout};
pub use weight::WeightFunction;
