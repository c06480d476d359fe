//! Saving decks next to earlier ones without overwriting them.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use talk_core::{Error, Presentation, Result};

use crate::bundle::write_bundle;

/// File extension of saved decks.
pub const DECK_EXTENSION: &str = "deck";

/// Names tried before giving up on an output folder.
pub const MAX_SAVE_ATTEMPTS: usize = 100;

/// Writes deck bundles into an output folder.
#[derive(Debug, Clone)]
pub struct DeckWriter {
    max_attempts: usize,
}

impl Default for DeckWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl DeckWriter {
    pub fn new() -> Self {
        Self {
            max_attempts: MAX_SAVE_ATTEMPTS,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Candidate file name for the given attempt.
    ///
    /// The first attempt uses the bare stem, later ones append `_1`, `_2`...
    pub fn file_name(stem: &str, attempt: usize) -> String {
        if attempt == 0 {
            format!("{}.{}", stem, DECK_EXTENSION)
        } else {
            format!("{}_{}.{}", stem, attempt, DECK_EXTENSION)
        }
    }

    /// Save `presentation` into `output_folder` under the first free name
    /// derived from `stem`, creating the folder when needed.
    ///
    /// Names that already exist or cannot be created are skipped. Returns
    /// the path of the written file.
    pub fn save(&self, presentation: &Presentation, output_folder: &Path, stem: &str) -> Result<PathBuf> {
        fs::create_dir_all(output_folder)?;

        let mut last = String::from("no attempt made");
        for attempt in 0..self.max_attempts {
            let path = output_folder.join(Self::file_name(stem, attempt));
            let file = match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => file,
                Err(e) if matches!(e.kind(), ErrorKind::AlreadyExists | ErrorKind::PermissionDenied) => {
                    log::debug!("Skipping {}: {}", path.display(), e);
                    last = format!("{}: {}", path.display(), e);
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            if let Err(e) = write_file(presentation, file) {
                // Leave no truncated deck behind.
                let _ = fs::remove_file(&path);
                return Err(e);
            }

            log::info!("Saved deck to {}", path.display());
            return Ok(path);
        }

        Err(Error::PersistenceExhausted {
            attempts: self.max_attempts,
            last,
        })
    }

    /// Save under the stem suggested by the deck's topic.
    pub fn save_default(&self, presentation: &Presentation, output_folder: &Path) -> Result<PathBuf> {
        self.save(presentation, output_folder, &presentation.suggested_file_stem())
    }
}

fn write_file(presentation: &Presentation, file: File) -> Result<()> {
    let mut out = BufWriter::new(file);
    write_bundle(presentation, &mut out)?;
    out.flush()?;
    Ok(())
}
