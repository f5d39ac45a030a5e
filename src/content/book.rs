use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;

use crate::error::{AppError, Result};
use crate::models::{Book, Page};

const BUILTIN_BOOK: &str = include_str!("../../assets/book.json");

const WORDS_PER_MINUTE: usize = 200;

impl Book {
    /// The edition bundled with the binary.
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_BOOK)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading book file {}", path.display()))?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let book: Book = serde_json::from_str(json)?;
        book.validate()?;
        Ok(book)
    }

    pub fn validate(&self) -> Result<()> {
        if self.pages.is_empty() {
            return Err(AppError::Content("book has no pages".to_string()));
        }

        let mut seen = HashMap::new();
        for (index, page) in self.pages.iter().enumerate() {
            if let Some(first) = seen.insert(page.id, index) {
                return Err(AppError::Content(format!(
                    "page id {} appears at positions {} and {}",
                    page.id, first, index
                )));
            }
        }
        Ok(())
    }

    /// Pages that open a chapter, in book order.
    pub fn chapters(&self) -> Vec<&Page> {
        self.pages
            .iter()
            .filter(|page| page.chapter_title.is_some())
            .collect()
    }
}

/// Resolves `Page::id` to a position in the page sequence.
#[derive(Debug, Clone, Default)]
pub struct PageIndex {
    positions: HashMap<i64, usize>,
}

impl PageIndex {
    pub fn new(pages: &[Page]) -> Self {
        let mut positions = HashMap::with_capacity(pages.len());
        for (index, page) in pages.iter().enumerate() {
            positions.entry(page.id).or_insert(index);
        }
        Self { positions }
    }

    pub fn index_of(&self, page_id: i64) -> Option<usize> {
        self.positions.get(&page_id).copied()
    }

    pub fn contains(&self, page_id: i64) -> bool {
        self.positions.contains_key(&page_id)
    }
}

/// Estimated minutes to read a page, never less than one.
pub fn reading_time_minutes(page: &Page) -> usize {
    let words = page.content.split_whitespace().count();
    words.div_ceil(WORDS_PER_MINUTE).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::testing::page;

    #[test]
    fn builtin_book_loads() {
        let book = Book::builtin().unwrap();

        assert!(!book.pages.is_empty());
        assert!(!book.title.is_empty());
        assert!(book.pages.iter().any(|p| p.is_image_placeholder));
        assert_eq!(book.chapters().first().unwrap().id, 1);
    }

    #[test]
    fn parses_camel_case_pages() {
        let json = r#"{
            "title": "T", "author": "A",
            "pages": [
                {"id": 1, "content": "x", "chapterTitle": "CAPÍTULO 1"},
                {"id": 2, "content": "", "isImagePlaceholder": true}
            ]
        }"#;

        let book = Book::from_json(json).unwrap();

        assert_eq!(book.description, "");
        assert_eq!(book.pages[0].chapter_title.as_deref(), Some("CAPÍTULO 1"));
        assert!(book.pages[1].is_image_placeholder);
        assert!(!book.pages[0].is_image_placeholder);
    }

    #[test]
    fn rejects_empty_and_duplicate_pages() {
        let empty = r#"{"title": "T", "author": "A", "pages": []}"#;
        assert!(matches!(Book::from_json(empty), Err(AppError::Content(_))));

        let dup = r#"{"title": "T", "author": "A",
            "pages": [{"id": 4, "content": "a"}, {"id": 4, "content": "b"}]}"#;
        assert!(matches!(Book::from_json(dup), Err(AppError::Content(_))));
    }

    #[test]
    fn page_index_resolves_sparse_ids() {
        let pages = vec![page(10, "a", None), page(20, "b", None), page(35, "c", None)];
        let index = PageIndex::new(&pages);

        assert_eq!(index.index_of(20), Some(1));
        assert_eq!(index.index_of(35), Some(2));
        assert_eq!(index.index_of(2), None);
        assert!(!index.contains(1));
    }

    #[test]
    fn reading_time_rounds_up() {
        assert_eq!(reading_time_minutes(&page(1, "", None)), 1);
        assert_eq!(reading_time_minutes(&page(1, "uma palavra", None)), 1);
        assert_eq!(reading_time_minutes(&page(1, &"p ".repeat(200), None)), 1);
        assert_eq!(reading_time_minutes(&page(1, &"p ".repeat(201), None)), 2);
    }

    #[test]
    fn loads_book_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("book.json");
        std::fs::write(
            &path,
            r#"{"title": "T", "author": "A", "pages": [{"id": 1, "content": "x"}]}"#,
        )
        .unwrap();

        let book = Book::from_path(&path).unwrap();
        assert_eq!(book.pages.len(), 1);
        assert!(book.description.is_empty());

        let missing = Book::from_path(&dir.path().join("missing.json"));
        assert!(matches!(missing, Err(AppError::Other(_))));
    }
}
