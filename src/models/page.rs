use serde::{Deserialize, Serialize};

/// One unit of book content. `id` is stable and 1-based but is not
/// guaranteed to match the page's position in the book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub id: i64,
    #[serde(default)]
    pub content: String,
    /// Set when this page opens a new chapter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chapter_title: Option<String>,
    #[serde(default)]
    pub is_image_placeholder: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Book {
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub description: String,
    pub pages: Vec<Page>,
}
