use chrono::{DateTime, SubsecRound, Utc};

use crate::content::PageIndex;
use crate::db::{KeyValueStore, Storage};
use crate::models::{Bookmark, Page};

const PREVIEW_CHARS: usize = 100;

/// Adds a bookmark for `page`, or removes it if the page is already
/// bookmarked. New bookmarks go to the end of the list. `now` is kept at
/// the millisecond precision it is stored with.
pub fn toggle(bookmarks: &[Bookmark], page: &Page, now: DateTime<Utc>) -> Vec<Bookmark> {
    if is_bookmarked(bookmarks, page.id) {
        return bookmarks
            .iter()
            .filter(|b| b.page_id != page.id)
            .cloned()
            .collect();
    }

    let chapter_title = page
        .chapter_title
        .clone()
        .unwrap_or_else(|| format!("Página {}", page.id));

    let mut updated = bookmarks.to_vec();
    updated.push(Bookmark {
        page_id: page.id,
        chapter_title,
        preview: preview(&page.content),
        created_at: now.trunc_subsecs(3),
    });
    updated
}

pub fn is_bookmarked(bookmarks: &[Bookmark], page_id: i64) -> bool {
    bookmarks.iter().any(|b| b.page_id == page_id)
}

/// Page position for a bookmark, `None` if its page no longer exists.
pub fn resolve(bookmark: &Bookmark, index: &PageIndex) -> Option<usize> {
    index.index_of(bookmark.page_id)
}

fn preview(content: &str) -> String {
    let head: String = content.chars().take(PREVIEW_CHARS).collect();
    format!("{}...", head.replace('\n', " "))
}

/// The persisted bookmark list. Every change rewrites the whole record.
#[derive(Debug, Default)]
pub struct BookmarkManager {
    items: Vec<Bookmark>,
}

impl BookmarkManager {
    pub async fn load<S: KeyValueStore>(storage: &Storage<S>) -> Self {
        Self {
            items: storage.load_bookmarks().await,
        }
    }

    pub fn items(&self) -> &[Bookmark] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&Bookmark> {
        self.items.get(position)
    }

    pub fn contains(&self, page_id: i64) -> bool {
        is_bookmarked(&self.items, page_id)
    }

    /// Toggles the bookmark for `page` and persists. Returns whether the
    /// page is bookmarked afterwards.
    pub async fn toggle<S: KeyValueStore>(&mut self, page: &Page, storage: &Storage<S>) -> bool {
        self.items = toggle(&self.items, page, Utc::now());
        if let Err(e) = storage.save_bookmarks(&self.items).await {
            tracing::warn!("Failed to save bookmarks: {}", e);
        }
        self.contains(page.id)
    }
}
