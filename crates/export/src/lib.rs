//! Persistence of generated talks.
//!
//! A saved talk is a ZIP archive with a `.deck` extension. It holds
//! `deck.xml`, describing every slide and gap in order, and a `media/`
//! folder with copies of the images the slides show.

pub mod bundle;
pub mod writer;

pub use bundle::{deck_xml, write_bundle, MediaIndex};
pub use writer::{DeckWriter, MAX_SAVE_ATTEMPTS};
