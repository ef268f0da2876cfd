//! Filesystem-backed attachment cache.

use std::fs;
use std::path::{Path, PathBuf};

use crate::cell::CacheStore;

/// Cache directory holding downloaded attachments under their derived
/// names. Absolute names (local paths of outgoing attachments) bypass the
/// directory.
pub struct FsCache {
    dir: PathBuf,
}

impl FsCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_of(&self, name: &str) -> PathBuf {
        let candidate = Path::new(name);
        if candidate.is_absolute() {
            candidate.to_path_buf()
        } else {
            self.dir.join(name)
        }
    }
}

impl CacheStore for FsCache {
    fn exists(&self, name: &str) -> bool {
        self.path_of(name).is_file()
    }

    fn size_of(&self, name: &str) -> u64 {
        fs::metadata(self.path_of(name))
            .map(|meta| meta.len())
            .unwrap_or(0)
    }

    fn remove(&self, name: &str) {
        let path = self.path_of(name);
        if let Err(e) = fs::remove_file(&path) {
            log::warn!("failed to remove cache file {}: {e}", path.display());
        }
    }
}
