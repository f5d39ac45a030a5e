use std::sync::LazyLock;

use regex::Regex;

use crate::models::{Page, ReadingProgress};

/// Label shown once the reader is past the last chapter opening.
pub const CONCLUSION_LABEL: &str = "Conclusão";

static CHAPTER_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*CAPÍTULO \d+\s*:?\s*").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChapterStatus {
    Completed,
    Current,
    Upcoming,
}

/// Percentage of the book read when positioned at `last_read_page`.
pub fn percent(last_read_page: usize, total_pages: usize) -> u8 {
    if total_pages == 0 {
        return 0;
    }
    let ratio = (last_read_page + 1) as f64 / total_pages as f64;
    (ratio * 100.0).round().min(100.0) as u8
}

/// Title of the first chapter opening whose page id is past the stored
/// position, [`CONCLUSION_LABEL`] when there is none, or the first
/// chapter's title when nothing has been read yet.
pub fn current_chapter_label(progress: Option<&ReadingProgress>, chapters: &[&Page]) -> String {
    let Some(progress) = progress else {
        return chapters
            .first()
            .and_then(|page| page.chapter_title.clone())
            .unwrap_or_else(|| CONCLUSION_LABEL.to_string());
    };

    let position = progress.last_read_page as i64;
    chapters
        .iter()
        .find(|page| page.id > position)
        .and_then(|page| page.chapter_title.clone())
        .unwrap_or_else(|| CONCLUSION_LABEL.to_string())
}

/// Status of chapter `position` given the page indices where each chapter
/// starts. The final chapter ends at the last page of the book.
pub fn chapter_status(
    progress: Option<&ReadingProgress>,
    chapter_starts: &[usize],
    position: usize,
    total_pages: usize,
) -> ChapterStatus {
    let (Some(progress), Some(&start)) = (progress, chapter_starts.get(position)) else {
        return ChapterStatus::Upcoming;
    };

    let end = chapter_starts
        .get(position + 1)
        .copied()
        .unwrap_or_else(|| total_pages.saturating_sub(1));
    let last = progress.last_read_page;

    if last >= end {
        ChapterStatus::Completed
    } else if last >= start {
        ChapterStatus::Current
    } else {
        ChapterStatus::Upcoming
    }
}

/// Pulls a stored position back inside the book if the content shrank.
pub fn clamp_progress(mut progress: ReadingProgress, total_pages: usize) -> ReadingProgress {
    let last = total_pages.saturating_sub(1);
    if progress.last_read_page > last {
        tracing::warn!(
            "Stored page {} is past the end of the book, using {}",
            progress.last_read_page,
            last
        );
        progress.last_read_page = last;
    }
    progress
}

/// Chapter name for listings, without the `CAPÍTULO n:` prefix.
pub fn chapter_display_name(title: Option<&str>, ordinal: usize) -> String {
    let name = title
        .map(|t| CHAPTER_PREFIX.replace(t, "").trim().to_string())
        .unwrap_or_default();
    if name.is_empty() {
        format!("Capítulo {ordinal}")
    } else {
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::testing::page;

    fn at(index: usize) -> ReadingProgress {
        ReadingProgress::now(index)
    }

    #[test]
    fn percent_of_four_pages() {
        assert_eq!(percent(0, 4), 25);
        assert_eq!(percent(1, 4), 50);
        assert_eq!(percent(3, 4), 100);
    }

    #[test]
    fn percent_rounds_and_clamps() {
        assert_eq!(percent(0, 3), 33);
        assert_eq!(percent(1, 3), 67);
        assert_eq!(percent(0, 8), 13);
        assert_eq!(percent(9, 4), 100);
        assert_eq!(percent(0, 0), 0);
    }

    #[test]
    fn chapter_label_follows_progress() {
        let pages = vec![
            page(1, "", Some("PREFÁCIO")),
            page(5, "", Some("CAPÍTULO 1")),
            page(9, "", Some("CAPÍTULO 2")),
        ];
        let chapters: Vec<&Page> = pages.iter().collect();

        assert_eq!(current_chapter_label(None, &chapters), "PREFÁCIO");
        assert_eq!(current_chapter_label(Some(&at(0)), &chapters), "PREFÁCIO");
        assert_eq!(current_chapter_label(Some(&at(4)), &chapters), "CAPÍTULO 1");
        assert_eq!(current_chapter_label(Some(&at(5)), &chapters), "CAPÍTULO 2");
        assert_eq!(current_chapter_label(Some(&at(9)), &chapters), CONCLUSION_LABEL);
    }

    #[test]
    fn chapter_label_without_chapters() {
        assert_eq!(current_chapter_label(None, &[]), CONCLUSION_LABEL);
    }

    #[test]
    fn chapter_status_ranges() {
        let starts = [0, 3, 6];
        let total = 8;
        let progress = at(4);

        assert_eq!(chapter_status(Some(&progress), &starts, 0, total), ChapterStatus::Completed);
        assert_eq!(chapter_status(Some(&progress), &starts, 1, total), ChapterStatus::Current);
        assert_eq!(chapter_status(Some(&progress), &starts, 2, total), ChapterStatus::Upcoming);
        assert_eq!(chapter_status(None, &starts, 0, total), ChapterStatus::Upcoming);
    }

    #[test]
    fn final_chapter_completes_on_last_page() {
        let starts = [0, 3];
        assert_eq!(chapter_status(Some(&at(5)), &starts, 1, 7), ChapterStatus::Current);
        assert_eq!(chapter_status(Some(&at(6)), &starts, 1, 7), ChapterStatus::Completed);
    }

    #[test]
    fn clamp_keeps_valid_positions() {
        assert_eq!(clamp_progress(at(2), 5).last_read_page, 2);
        assert_eq!(clamp_progress(at(40), 5).last_read_page, 4);
    }

    #[test]
    fn display_name_strips_chapter_prefix() {
        assert_eq!(chapter_display_name(Some("CAPÍTULO 2: Escolher"), 3), "Escolher");
        assert_eq!(chapter_display_name(Some("PREFÁCIO"), 1), "PREFÁCIO");
        assert_eq!(chapter_display_name(Some("CAPÍTULO 7"), 8), "Capítulo 8");
        assert_eq!(chapter_display_name(None, 2), "Capítulo 2");
    }
}
