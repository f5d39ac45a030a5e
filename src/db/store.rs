use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::Result;
use crate::models::{Bookmark, ReadingProgress};

pub const PROGRESS_KEY: &str = "essencialismo_progress";
pub const BOOKMARKS_KEY: &str = "essencialismo_bookmarks";
pub const UNLOCKED_CARDS_KEY: &str = "essencialismo_unlocked_cards";

/// String key-value storage. Writes are last-write-wins.
#[allow(async_fn_in_trait)]
pub trait KeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn set(&self, key: &str, value: String) -> Result<()>;
    async fn remove(&self, key: &str) -> Result<()>;
}

/// Typed JSON records on top of a [`KeyValueStore`].
///
/// Loading never fails: a missing key, a store error or a record that no
/// longer parses all yield the type's default.
pub struct Storage<S> {
    store: S,
}

impl<S: KeyValueStore> Storage<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    #[cfg(test)]
    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn load<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        let raw = match self.store.get(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return T::default(),
            Err(e) => {
                tracing::warn!("Failed to read {}: {}", key, e);
                return T::default();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Discarding malformed record {}: {}", key, e);
                T::default()
            }
        }
    }

    pub async fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)?;
        self.store.set(key, raw).await
    }

    pub async fn load_progress(&self) -> Option<ReadingProgress> {
        self.load(PROGRESS_KEY).await
    }

    /// Overwrites the progress record with `page_index` stamped now.
    pub async fn save_progress(&self, page_index: usize) -> Result<ReadingProgress> {
        let progress = ReadingProgress::now(page_index);
        self.save(PROGRESS_KEY, &progress).await?;
        Ok(progress)
    }

    pub async fn clear_progress(&self) -> Result<()> {
        self.store.remove(PROGRESS_KEY).await
    }

    pub async fn load_bookmarks(&self) -> Vec<Bookmark> {
        self.load(BOOKMARKS_KEY).await
    }

    pub async fn save_bookmarks(&self, bookmarks: &[Bookmark]) -> Result<()> {
        self.save(BOOKMARKS_KEY, bookmarks).await
    }

    pub async fn load_unlocked(&self) -> Vec<String> {
        self.load(UNLOCKED_CARDS_KEY).await
    }

    pub async fn save_unlocked(&self, ids: &[String]) -> Result<()> {
        self.save(UNLOCKED_CARDS_KEY, ids).await
    }
}
