//! Per-decode caches: parsed themes and the media deduplication index.
//!
//! Both live inside a single decode's context and are dropped with it.
//! [`ThemeCache`] is shared by reference across the rayon workers that map
//! slides, so it locks internally.

use crate::model::Theme;
use parking_lot::Mutex;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Arc;

/// Default number of themes kept by [`ThemeCache`].
pub const DEFAULT_THEME_CAPACITY: usize = 16;

/// Weight of one cache hit relative to one tick of recency.
const HIT_WEIGHT: u64 = 4;

#[derive(Debug)]
struct CachedTheme {
    theme: Arc<Theme>,
    last_used: u64,
    hits: u64,
}

impl CachedTheme {
    fn score(&self) -> u64 {
        self.last_used + self.hits * HIT_WEIGHT
    }
}

#[derive(Debug, Default)]
struct ThemeCacheInner {
    entries: HashMap<String, CachedTheme>,
    clock: u64,
}

impl ThemeCacheInner {
    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    /// Id of the entry to evict: lowest score, ties to the least recent.
    fn victim(&self) -> Option<String> {
        self.entries
            .iter()
            .min_by_key(|(_, e)| (e.score(), e.last_used))
            .map(|(id, _)| id.clone())
    }
}

/// Bounded, thread-safe cache of parsed themes.
///
/// When full, inserting a new theme evicts the entry with the lowest score,
/// where the score grows with both recency and access count.
#[derive(Debug)]
pub struct ThemeCache {
    inner: Mutex<ThemeCacheInner>,
    capacity: usize,
}

impl Default for ThemeCache {
    fn default() -> Self {
        Self::new(DEFAULT_THEME_CAPACITY)
    }
}

impl ThemeCache {
    /// Create a cache holding at most `capacity` themes (minimum 1).
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(ThemeCacheInner::default()),
            capacity: capacity.max(1),
        }
    }

    /// Insert or replace a theme.
    pub fn set(&self, id: impl Into<String>, theme: Theme) -> Arc<Theme> {
        let id = id.into();
        let theme = Arc::new(theme);
        let mut inner = self.inner.lock();
        let now = inner.tick();

        if !inner.entries.contains_key(&id) && inner.entries.len() >= self.capacity {
            if let Some(victim) = inner.victim() {
                log::debug!("theme cache full, evicting {}", victim);
                inner.entries.remove(&victim);
            }
        }

        inner.entries.insert(
            id,
            CachedTheme {
                theme: Arc::clone(&theme),
                last_used: now,
                hits: 0,
            },
        );
        theme
    }

    /// Look up a theme, recording the access.
    pub fn get(&self, id: &str) -> Option<Arc<Theme>> {
        let mut inner = self.inner.lock();
        let now = inner.tick();
        let entry = inner.entries.get_mut(id)?;
        entry.last_used = now;
        entry.hits += 1;
        Some(Arc::clone(&entry.theme))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.inner.lock().entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Hex SHA-256 of the full content.
pub fn content_digest(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Outcome of registering a media part with [`MediaIndex`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaRegistration {
    /// Canonical media id for this content
    pub id: String,
    pub digest: String,
    /// Whether identical content was registered earlier under another path
    pub duplicate: bool,
}

/// Maps media part paths to canonical media ids.
///
/// Parts with byte-identical content share the id of the first part
/// registered with that content.
#[derive(Debug, Clone, Default)]
pub struct MediaIndex {
    by_digest: HashMap<String, String>,
    by_path: HashMap<String, String>,
}

impl MediaIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a media part under `id`, returning its canonical id.
    pub fn register(&mut self, path: &str, id: &str, bytes: &[u8]) -> MediaRegistration {
        let digest = content_digest(bytes);
        let (canonical, duplicate) = match self.by_digest.get(&digest) {
            Some(existing) => (existing.clone(), true),
            None => {
                self.by_digest.insert(digest.clone(), id.to_string());
                (id.to_string(), false)
            }
        };
        self.by_path.insert(path.to_string(), canonical.clone());
        MediaRegistration {
            id: canonical,
            digest,
            duplicate,
        }
    }

    /// Canonical media id for a package path.
    pub fn media_id(&self, path: &str) -> Option<&str> {
        self.by_path.get(path).map(String::as_str)
    }

    /// Number of distinct contents.
    pub fn unique_count(&self) -> usize {
        self.by_digest.len()
    }

    pub fn len(&self) -> usize {
        self.by_path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_path.is_empty()
    }
}
