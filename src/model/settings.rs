//! Reader preferences and bookmarks, persisted through a key-value store
//!
//! Each value lives under its own key and is written through on every
//! mutation. Storage failures never reach the user: the in-memory value
//! stays authoritative for the session.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};

pub const FONT_SIZE_KEY: &str = "fontSize";
pub const DARK_MODE_KEY: &str = "darkMode";
pub const BOOKMARKS_KEY: &str = "bookmarks";

/// Ordered font-size levels, smallest first
pub const FONT_SIZES: [&str; 5] = ["Small", "Normal", "Large", "X-Large", "XX-Large"];
pub const DEFAULT_FONT_SIZE: usize = FONT_SIZES.len() / 2;

/// Minimal string key-value persistence
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// One file per key inside a data directory
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        let value = fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?;
        Ok(Some(value))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir)
                .with_context(|| format!("creating {}", self.dir.display()))?;
        }
        let path = self.path_for(key);
        fs::write(&path, value).with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }
}

/// In-memory store, used in tests and when no data directory is usable
#[derive(Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let values = self
            .values
            .lock()
            .map_err(|_| anyhow::anyhow!("memory store poisoned"))?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self
            .values
            .lock()
            .map_err(|_| anyhow::anyhow!("memory store poisoned"))?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Preferences and bookmarks for the current session
pub struct Settings {
    store: Box<dyn KeyValueStore>,
    font_size: usize,
    dark_mode: bool,
    bookmarks: Vec<String>,
}

impl Settings {
    /// Restore all values, substituting defaults for anything absent or unreadable
    pub fn load(store: Box<dyn KeyValueStore>) -> Self {
        let font_size = read_value(store.as_ref(), FONT_SIZE_KEY, |raw| {
            raw.trim().parse::<usize>().ok().filter(|level| *level < FONT_SIZES.len())
        })
        .unwrap_or(DEFAULT_FONT_SIZE);

        let dark_mode = read_value(store.as_ref(), DARK_MODE_KEY, |raw| raw.trim().parse::<bool>().ok())
            .unwrap_or(false);

        let bookmarks = read_value(store.as_ref(), BOOKMARKS_KEY, |raw| {
            serde_json::from_str::<Vec<String>>(raw).ok()
        })
        .map(dedup_in_order)
        .unwrap_or_default();

        tracing::info!(font_size, dark_mode, bookmarks = bookmarks.len(), "Settings loaded");

        Self { store, font_size, dark_mode, bookmarks }
    }

    pub fn font_size(&self) -> usize {
        self.font_size
    }

    pub fn font_size_label(&self) -> &'static str {
        FONT_SIZES[self.font_size]
    }

    pub fn dark_mode(&self) -> bool {
        self.dark_mode
    }

    pub fn bookmarks(&self) -> &[String] {
        &self.bookmarks
    }

    pub fn is_bookmarked(&self, section_id: &str) -> bool {
        self.bookmarks.iter().any(|id| id == section_id)
    }

    pub fn increase_font(&mut self) {
        if self.font_size + 1 < FONT_SIZES.len() {
            self.font_size += 1;
            self.persist(FONT_SIZE_KEY, self.font_size.to_string());
        }
    }

    pub fn decrease_font(&mut self) {
        if self.font_size > 0 {
            self.font_size -= 1;
            self.persist(FONT_SIZE_KEY, self.font_size.to_string());
        }
    }

    pub fn toggle_theme(&mut self) {
        self.dark_mode = !self.dark_mode;
        self.persist(DARK_MODE_KEY, self.dark_mode.to_string());
    }

    /// Add or remove a bookmark; returns whether the section is now bookmarked.
    /// New bookmarks go to the end, so display order is insertion order.
    pub fn toggle_bookmark(&mut self, section_id: &str) -> bool {
        let now_bookmarked = match self.bookmarks.iter().position(|id| id == section_id) {
            Some(index) => {
                self.bookmarks.remove(index);
                false
            }
            None => {
                self.bookmarks.push(section_id.to_string());
                true
            }
        };

        match serde_json::to_string(&self.bookmarks) {
            Ok(json) => self.persist(BOOKMARKS_KEY, json),
            Err(e) => tracing::warn!(error = %e, "Failed to serialize bookmarks"),
        }
        now_bookmarked
    }

    fn persist(&self, key: &str, value: String) {
        match self.store.set(key, &value) {
            Ok(()) => tracing::debug!(key, value = %value, "Setting persisted"),
            Err(e) => tracing::warn!(key, error = %e, "Failed to persist setting"),
        }
    }
}

fn read_value<T>(store: &dyn KeyValueStore, key: &str, parse: impl FnOnce(&str) -> Option<T>) -> Option<T> {
    match store.get(key) {
        Ok(Some(raw)) => {
            let parsed = parse(&raw);
            if parsed.is_none() {
                tracing::debug!(key, raw = %raw, "Ignoring malformed setting");
            }
            parsed
        }
        Ok(None) => None,
        Err(e) => {
            tracing::warn!(key, error = %e, "Failed to read setting");
            None
        }
    }
}

fn dedup_in_order(ids: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(ids.len());
    for id in ids {
        if !out.contains(&id) {
            out.push(id);
        }
    }
    out
}
