//! Session-scoped memo of rendered notes.
//!
//! Entries are keyed by note name and wrap width, so a resize never reuses a
//! layout computed for another width. Nothing expires on its own; entries go
//! away through [`RenderCache::invalidate`], [`RenderCache::retain_names`] or
//! [`RenderCache::clear`].

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::document::Document;
use crate::error::Result;
use crate::notes::Note;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub name: String,
    pub width: u16,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

#[derive(Debug, Default)]
pub struct RenderCache {
    entries: HashMap<CacheKey, Arc<Document>>,
    stats: CacheStats,
}

impl RenderCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the rendering of `note` at `width`, producing it on a miss.
    ///
    /// On a hit neither closure runs. On a miss `read` loads the source and
    /// `render` lays it out; the result is stored only if both succeed.
    ///
    /// # Errors
    ///
    /// Propagates whatever `read` or `render` returns.
    pub fn get_or_render<R, F>(
        &mut self,
        note: &Note,
        width: u16,
        read: R,
        render: F,
    ) -> Result<Arc<Document>>
    where
        R: FnOnce(&Note) -> Result<String>,
        F: FnOnce(&str, u16) -> Result<Document>,
    {
        let key = CacheKey {
            name: note.name.clone(),
            width,
        };

        if let Some(doc) = self.entries.get(&key) {
            self.stats.hits += 1;
            tracing::debug!(note = %note.name, width, "render cache hit");
            return Ok(Arc::clone(doc));
        }

        self.stats.misses += 1;
        tracing::debug!(note = %note.name, width, "render cache miss");
        let source = read(note)?;
        let doc = Arc::new(render(&source, width)?);
        self.entries.insert(key, Arc::clone(&doc));
        Ok(doc)
    }

    /// Drop every width rendered for `name`.
    pub fn invalidate(&mut self, name: &str) {
        let before = self.entries.len();
        self.entries.retain(|key, _| key.name != name);
        let dropped = before - self.entries.len();
        if dropped > 0 {
            tracing::debug!(note = name, dropped, "invalidated cached renders");
        }
    }

    /// Keep only entries whose note is still in `names`.
    pub fn retain_names<'a>(&mut self, names: impl IntoIterator<Item = &'a str>) {
        let keep: HashSet<&str> = names.into_iter().collect();
        self.entries.retain(|key, _| keep.contains(key.name.as_str()));
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, name: &str, width: u16) -> bool {
        self.entries.contains_key(&CacheKey {
            name: name.to_string(),
            width,
        })
    }

    pub const fn stats(&self) -> CacheStats {
        self.stats
    }
}
