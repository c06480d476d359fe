//! Error types for talk generation.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while configuring, generating or saving a talk.
///
/// Content generators never return these for missing data; absence is an
/// empty result. Only configuration problems, unrecoverable I/O and
/// exhausted persistence attempts reach the caller.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to read or write a local file.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// No schema is registered under the requested name.
    #[error("Unknown presentation schema: {0}")]
    UnknownSchema(String),

    /// The requested number of slides is not usable.
    #[error("Invalid slide count: {0} (must be at least 1)")]
    InvalidSlideCount(usize),

    /// A bundled text template or grammar could not be loaded.
    #[error("Template error: {0}")]
    TemplateError(String),

    /// An external content source could not be reached or answered badly.
    #[error("Source unavailable: {0}")]
    SourceUnavailable(String),

    /// Downloading an asset failed.
    #[error("Fetch failed for {locator}: {reason}")]
    FetchError { locator: String, reason: String },

    /// ZIP archive error (for the deck bundle).
    #[error("ZIP error: {0}")]
    ZipError(String),

    /// XML writing error (for the deck bundle).
    #[error("XML error: {0}")]
    XmlError(String),

    /// Every candidate file name was taken or unwritable.
    #[error("Could not persist presentation after {attempts} attempts: {last}")]
    PersistenceExhausted { attempts: usize, last: String },
}
