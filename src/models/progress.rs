use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Last position in the book. `last_read_page` is an index into the page
/// sequence, not a `Page::id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingProgress {
    pub last_read_page: usize,
    pub last_read_date: DateTime<Utc>,
}

impl ReadingProgress {
    pub fn now(page_index: usize) -> Self {
        Self {
            last_read_page: page_index,
            last_read_date: Utc::now(),
        }
    }
}
