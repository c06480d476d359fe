//! Local cache of downloaded assets.
//!
//! Assets are stored under a root directory at a path given by their
//! normalized cache key. The first request for a key downloads it; later
//! requests, including ones from a later process, read the stored file.
//! Concurrent requests for the same key wait for the one download in flight
//! instead of starting their own, while different keys proceed independently.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use crate::error::Result;

/// Downloads a remote asset to a local file.
pub trait Fetch: Send + Sync {
    /// Write the asset at `locator` to `destination`.
    fn fetch(&self, locator: &str, destination: &Path) -> Result<()>;
}

type Slot = Arc<OnceLock<Option<PathBuf>>>;

/// Keyed store of downloaded assets. Entries are only evicted when they
/// turn out not to be usable.
pub struct DownloadCache {
    root: PathBuf,
    fetcher: Arc<dyn Fetch>,
    slots: Mutex<HashMap<String, Slot>>,
}

impl DownloadCache {
    /// Create a cache storing files under `root` and downloading with `fetcher`.
    pub fn new(root: impl Into<PathBuf>, fetcher: Arc<dyn Fetch>) -> Self {
        Self {
            root: root.into(),
            fetcher,
            slots: Mutex::new(HashMap::new()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Local path an asset with this key is stored at.
    pub fn path_for(&self, key: &str) -> PathBuf {
        key.split('/')
            .filter(|segment| !segment.is_empty() && *segment != "..")
            .fold(self.root.clone(), |path, segment| path.join(segment))
    }

    /// Return the local path for `key`, downloading `locator` if needed.
    ///
    /// Yields `None` when the download fails; a failed key is retried on the
    /// next request.
    pub fn fetch(&self, key: &str, locator: &str) -> Option<PathBuf> {
        let slot = self
            .lock_slots()
            .entry(key.to_string())
            .or_default()
            .clone();

        let result = slot.get_or_init(|| self.materialize(key, locator)).clone();

        if result.is_none() {
            let mut slots = self.lock_slots();
            if slots.get(key).is_some_and(|current| Arc::ptr_eq(current, &slot)) {
                slots.remove(key);
            }
        }

        result
    }

    /// Whether `key` is already stored on disk.
    pub fn contains(&self, key: &str) -> bool {
        self.path_for(key).is_file()
    }

    /// Keep a stored image only if it decodes. A corrupt file is deleted and
    /// its key forgotten, so the next request downloads it again.
    pub fn keep_if_image(&self, path: &Path) -> bool {
        if is_decodable_image(path) {
            return true;
        }
        self.evict(path);
        false
    }

    /// Delete a stored file and forget the key that produced it.
    pub fn evict(&self, path: &Path) {
        if let Err(e) = fs::remove_file(path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                log::warn!("Failed to remove {}: {}", path.display(), e);
            }
        }
        self.lock_slots()
            .retain(|_, slot| !matches!(slot.get(), Some(Some(stored)) if stored == path));
        log::debug!("Evicted {}", path.display());
    }

    fn lock_slots(&self) -> MutexGuard<'_, HashMap<String, Slot>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn materialize(&self, key: &str, locator: &str) -> Option<PathBuf> {
        let path = self.path_for(key);
        if path.is_file() {
            log::debug!("Cache hit for {}", key);
            return Some(path);
        }

        if let Some(parent) = path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                log::warn!("Failed to create cache directory {}: {}", parent.display(), e);
                return None;
            }
        }

        // Download next to the final path so a partial file is never served.
        let file_name = path.file_name()?.to_string_lossy().into_owned();
        let partial = path.with_file_name(format!("{}.part", file_name));

        log::debug!("Downloading {} to {}", locator, path.display());
        let stored = self
            .fetcher
            .fetch(locator, &partial)
            .and_then(|()| fs::rename(&partial, &path).map_err(Into::into));

        match stored {
            Ok(()) => Some(path),
            Err(e) => {
                log::warn!("Download failed for {}: {}", locator, e);
                let _ = fs::remove_file(&partial);
                None
            }
        }
    }
}

/// Whether the file at `path` decodes as an image.
pub fn is_decodable_image(path: &Path) -> bool {
    match image::open(path) {
        Ok(_) => true,
        Err(e) => {
            log::debug!("Discarding invalid image {}: {}", path.display(), e);
            false
        }
    }
}
